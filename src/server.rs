// HTTP surface of the sync service.
// Two read-only proxy routes plus a liveness probe; handlers are thin
// wrappers over the per-source sync services.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router, extract::Query};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::SyncError;
use crate::github::client::GithubClient;
use crate::github::types::ProjectsPayload;
use crate::status::Availability;
use crate::sync::{ActivityService, ProjectsService};
use crate::wakatime::client::ActivityClient;
use crate::wakatime::types::ActivitySample;

pub struct AppState {
    pub projects: ProjectsService<GithubClient>,
    pub activity: ActivityService<ActivityClient>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Error surfaced to callers; only reached when no cached payload exists.
#[derive(Debug)]
pub struct ApiError(SyncError);

impl From<SyncError> for ApiError {
    fn from(err: SyncError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self.0 {
            SyncError::MissingConfig(_) | SyncError::InvalidConfig { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.status_code();
        let body = ErrorBody {
            error: self.0.to_string(),
        };
        (code, Json(body)).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct ProjectsQuery {
    #[serde(default)]
    pub force: bool,
}

/// Activity sample plus the availability derived from it on this read.
#[derive(Debug, Serialize)]
pub struct ActivityResponse {
    #[serde(flatten)]
    pub sample: ActivitySample,
    pub status: Availability,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/projects", get(get_projects))
        .route("/activity", get(get_activity))
        .route("/health", get(get_health))
        .layer(Extension(Arc::new(state)))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

pub async fn get_projects(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<ProjectsQuery>,
) -> Result<Json<ProjectsPayload>, ApiError> {
    let payload = state.projects.read(query.force, Utc::now()).await?;
    Ok(Json(payload))
}

pub async fn get_activity(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<ActivityResponse>, ApiError> {
    let now = Utc::now();
    let sample = state.activity.read(now).await?;
    let status = state.activity.status(now);
    Ok(Json(ActivityResponse { sample, status }))
}

pub async fn get_health() -> &'static str {
    "ok"
}
