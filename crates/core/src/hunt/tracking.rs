//! Background task feeding a position watch into a session.

use std::sync::Arc;

use futures_util::StreamExt;
use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;

use crate::hunt::location::PositionWatch;
use crate::hunt::session::HuntSession;

/// Handle to a running tracking task. Cancelling, or dropping the handle,
/// stops the task and releases its watch.
pub struct TrackingHandle {
    cancel: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl TrackingHandle {
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Cancel and wait for the task to wind down
    pub async fn stop(mut self) {
        self.cancel();
        let Some(task) = self.task.take() else {
            return;
        };
        if let Err(error) = task.await {
            tracing::warn!(%error, "tracking task ended abnormally");
        }
    }
}

impl Drop for TrackingHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Must be called from within a tokio runtime.
pub fn spawn_tracking(session: Arc<Mutex<HuntSession>>, mut watch: PositionWatch) -> TrackingHandle {
    let (cancel_tx, mut cancel_rx) = oneshot::channel();

    let task = tokio::spawn(async move {
        tracing::info!("location tracking started");
        loop {
            tokio::select! {
                _ = &mut cancel_rx => break,
                update = watch.next() => match update {
                    Some(Ok(sample)) => {
                        session.lock().await.on_position(sample);
                    }
                    Some(Err(error)) => {
                        session.lock().await.on_position_error(&error);
                    }
                    None => break,
                },
            }
        }
        tracing::info!("location tracking stopped");
    });

    TrackingHandle {
        cancel: Some(cancel_tx),
        task: Some(task),
    }
}
