//! Health check handler

use axum::{extract::State, response::Json};

use crate::server::state::AppState;
use crate::store::BackendStatus;

/// GET /status
pub async fn status(State(state): State<AppState>) -> Json<BackendStatus> {
  let ideas = state.repo.read().await.len();
  Json(BackendStatus {
    status: "healthy".to_string(),
    version: env!("CARGO_PKG_VERSION").to_string(),
    ideas,
  })
}
