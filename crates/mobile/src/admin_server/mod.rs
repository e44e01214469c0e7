mod routes;

use std::sync::Arc;

use eyre::WrapErr;
use tokio::runtime::Runtime;
use tokio::sync::{Mutex, oneshot};
use yessplora_core::HuntSession;
use yessplora_core::backend::ParticipantBackend;

pub use routes::AdminApi;

/// Local HTTP surface for editing spots and reading the leaderboard,
/// bound to loopback on an ephemeral port.
pub struct AdminServer {
    #[allow(dead_code)] // Kept alive to keep server running
    runtime: Runtime,
    port: u16,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl AdminServer {
    pub fn start(
        session: Arc<Mutex<HuntSession>>,
        backend: Arc<dyn ParticipantBackend>,
    ) -> eyre::Result<Self> {
        let runtime = Runtime::new().wrap_err("failed to create admin server runtime")?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let app = routes::create_router(AdminApi { session, backend });

        let listener = runtime
            .block_on(tokio::net::TcpListener::bind("127.0.0.1:0"))
            .wrap_err("failed to bind admin server")?;
        let port = listener.local_addr()?.port();

        runtime.spawn(async move {
            let served = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(error) = served {
                tracing::error!(%error, "admin server stopped");
            }
        });

        tracing::info!(port, "admin server listening");
        Ok(Self {
            runtime,
            port,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl Drop for AdminServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
