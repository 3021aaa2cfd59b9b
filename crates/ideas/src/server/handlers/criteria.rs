//! Evaluation criteria handlers

use axum::{
  extract::{Extension, Json, State},
  response::Json as ResponseJson,
};

use crate::models::EvaluationCriteria;
use crate::server::middleware::RequestContext;
use crate::server::state::AppState;
use crate::server::types::ApiEvaluationCriteria;

/// GET /evaluation-criteria - `null` until criteria have been saved
pub async fn get_criteria(
  State(state): State<AppState>,
) -> ResponseJson<Option<ApiEvaluationCriteria>> {
  ResponseJson(state.repo.read().await.criteria().cloned())
}

/// POST /evaluation-criteria - create or replace the criteria
pub async fn save_criteria(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  Json(criteria): Json<EvaluationCriteria>,
) -> ResponseJson<ApiEvaluationCriteria> {
  let stored = state.repo.write().await.save_criteria(criteria);
  context.log_info("Saved evaluation criteria");
  ResponseJson(stored)
}
