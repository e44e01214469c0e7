//! Position feeds.
//!
//! A [`LocationSource`] hands out open-ended [`PositionWatch`] subscriptions.
//! Dropping a watch releases it; the source notices on its next publish.

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::task::{Context, Poll};

use futures_core::Stream;
use futures_util::StreamExt;
use tokio::sync::mpsc;

use crate::hunt::state::LocationSample;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PositionError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Unable to get your location: {0}")]
    Unavailable(String),

    #[error("Timed out waiting for a location fix")]
    Timeout,
}

pub type PositionUpdate = Result<LocationSample, PositionError>;

/// Platform position provider
pub trait LocationSource: Send + Sync {
    /// Subscribe to every future fix (and error) until the watch is dropped
    fn watch(&self) -> PositionWatch;

    /// One-shot fix. Callers wanting a bound wrap this in a timeout.
    fn current_position<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = PositionUpdate> + Send + 'a>>;
}

/// An open-ended subscription to position updates.
pub struct PositionWatch {
    updates: mpsc::UnboundedReceiver<PositionUpdate>,
}

impl PositionWatch {
    /// A watch plus the sender that feeds it
    pub fn channel() -> (mpsc::UnboundedSender<PositionUpdate>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { updates: rx })
    }
}

impl Stream for PositionWatch {
    type Item = PositionUpdate;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().updates.poll_recv(cx)
    }
}

/// Source fed by the host pushing fixes in, e.g. from a platform callback.
#[derive(Default)]
pub struct ChannelLocationSource {
    watchers: Mutex<Vec<mpsc::UnboundedSender<PositionUpdate>>>,
}

impl ChannelLocationSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fan an update out to every live watch, dropping released ones
    pub fn publish(&self, update: PositionUpdate) {
        self.watchers()
            .retain(|tx| tx.send(update.clone()).is_ok());
    }

    /// Watches that have not been dropped yet
    pub fn active_watches(&self) -> usize {
        self.watchers().iter().filter(|tx| !tx.is_closed()).count()
    }

    fn watchers(&self) -> std::sync::MutexGuard<'_, Vec<mpsc::UnboundedSender<PositionUpdate>>> {
        self.watchers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl LocationSource for ChannelLocationSource {
    fn watch(&self) -> PositionWatch {
        let (tx, watch) = PositionWatch::channel();
        self.watchers().push(tx);
        watch
    }

    fn current_position<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = PositionUpdate> + Send + 'a>> {
        let mut watch = self.watch();
        Box::pin(async move {
            watch
                .next()
                .await
                .unwrap_or_else(|| Err(PositionError::Unavailable("location feed closed".into())))
        })
    }
}
