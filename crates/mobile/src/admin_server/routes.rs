use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get};
use axum::Json;
use serde_json::json;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use yessplora_core::HuntSession;
use yessplora_core::backend::{BackendError, ParticipantBackend};
use yessplora_core::hunt::SessionError;
use yessplora_core::spots::{SpotDraft, SpotError, SpotIdentifier, TreasureSpot};

#[derive(Clone)]
pub struct AdminApi {
    pub session: Arc<Mutex<HuntSession>>,
    pub backend: Arc<dyn ParticipantBackend>,
}

pub fn create_router(api: AdminApi) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/spots", get(list_spots).post(add_spot))
        .route("/spots/{id}", delete(remove_spot))
        .route("/leaderboard", get(leaderboard))
        // Browsers may read the catalogue but never mutate it cross-origin
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET]),
        )
        .with_state(api)
}

enum ApiError {
    Forbidden,
    NotFound,
    InvalidSpot(SpotError),
    Upstream(BackendError),
    Internal(String),
}

impl From<SessionError> for ApiError {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::AdminRequired => Self::Forbidden,
            SessionError::Spot(error) => Self::InvalidSpot(error),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Forbidden => (StatusCode::FORBIDDEN, "Admin login required".to_string()),
            Self::NotFound => (StatusCode::NOT_FOUND, "No such treasure spot".to_string()),
            Self::InvalidSpot(error) => (StatusCode::UNPROCESSABLE_ENTITY, error.to_string()),
            Self::Upstream(error) => {
                tracing::warn!(%error, "leaderboard request failed");
                (StatusCode::BAD_GATEWAY, error.to_string())
            }
            Self::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn list_spots(State(api): State<AdminApi>) -> Json<Vec<TreasureSpot>> {
    let session = api.session.lock().await;
    Json(session.spots().iter().map(|spot| TreasureSpot::clone(spot)).collect())
}

async fn add_spot(
    State(api): State<AdminApi>,
    Json(draft): Json<SpotDraft>,
) -> Result<(StatusCode, Json<TreasureSpot>), ApiError> {
    let spot = api.session.lock().await.add_spot(draft)?;
    Ok((StatusCode::CREATED, Json(spot)))
}

async fn remove_spot(
    State(api): State<AdminApi>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let removed = api
        .session
        .lock()
        .await
        .remove_spot(&SpotIdentifier::new(id))?;

    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

async fn leaderboard(
    State(api): State<AdminApi>,
) -> Result<Json<Vec<yessplora_core::api_types::LeaderboardEntry>>, ApiError> {
    let entries = api.backend.get_leaderboard().await.map_err(ApiError::Upstream)?;
    Ok(Json(entries))
}
