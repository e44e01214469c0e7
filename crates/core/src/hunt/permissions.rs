//! One-shot permission probes run during onboarding.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::hunt::location::{LocationSource, PositionError, PositionUpdate};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CameraError {
    #[error("Camera permission denied")]
    Denied,

    #[error("Camera unavailable: {0}")]
    Unavailable(String),
}

/// Platform camera grant. Acquiring and releasing the stream is the host's job;
/// only the outcome matters here.
pub trait CameraAccess: Send + Sync {
    fn request<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<(), CameraError>> + Send + 'a>>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct PermissionOutcome {
    pub camera: Result<(), CameraError>,
    pub location: PositionUpdate,
}

/// Ask for a single fix, failing with [`PositionError::Timeout`] after `timeout`.
pub async fn probe_location(source: &dyn LocationSource, timeout: Duration) -> PositionUpdate {
    match tokio::time::timeout(timeout, source.current_position()).await {
        Ok(update) => update,
        Err(_) => {
            tracing::warn!(?timeout, "location probe timed out");
            Err(PositionError::Timeout)
        }
    }
}

/// Request the camera, then probe location. Both are attempted even if the
/// first fails, and neither is retried.
pub async fn request_permissions(
    camera: &dyn CameraAccess,
    location: &dyn LocationSource,
    timeout: Duration,
) -> PermissionOutcome {
    let camera = camera.request().await;
    if let Err(error) = &camera {
        tracing::info!(%error, "camera permission not granted");
    }

    let location = probe_location(location, timeout).await;
    if let Err(error) = &location {
        tracing::info!(%error, "location permission not granted");
    }

    PermissionOutcome { camera, location }
}
