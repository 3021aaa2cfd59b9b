//! Evaluation, clustering and classification handlers

use axum::{
  extract::{Extension, Json, Path, State},
  http::StatusCode,
  response::Json as ResponseJson,
};
use futures::future::join_all;

use crate::models::{ClusterConfig, IdeaCluster, SingleClusterSuggestion};
use crate::server::handlers::{reject, reject_analyst};
use crate::server::middleware::RequestContext;
use crate::server::state::{ActivityGuard, AppState};
use crate::server::types::{failure, ApiIdea, ApiResult, EvaluationRequest, MessageResponse};

/// POST /ideas/evaluate
///
/// Fans out one analyst call per idea. Evaluations are stored only when every call succeeds;
/// either way all requested ideas leave the evaluating state, even if the request is dropped.
pub async fn evaluate_ideas(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  Json(request): Json<EvaluationRequest>,
) -> ApiResult<MessageResponse> {
  let ids = request.idea_ids;
  let (briefs, criteria) = {
    let mut repo = state.repo.write().await;
    let criteria = repo.criteria().map(|c| c.criteria.clone()).unwrap_or_default();
    let briefs = repo.begin_evaluation(&ids).map_err(|e| reject(&context, e))?;
    (briefs, criteria)
  };
  let guard = ActivityGuard::new(state.repo.clone(), ids.clone());

  context.log_info(&format!("Evaluating {} ideas", briefs.len()));
  let results = join_all(briefs.iter().map(|brief| state.analyst.evaluate(brief, &criteria))).await;
  let outcome: Result<Vec<_>, _> = briefs
    .iter()
    .zip(results)
    .map(|(brief, result)| result.map(|evaluation| (brief.id.clone(), evaluation)))
    .collect();

  let mut repo = state.repo.write().await;
  let response = match outcome {
    Ok(evaluations) => {
      let count = evaluations.len();
      repo.finish_evaluation(&ids, Some(evaluations));
      Ok(ResponseJson(MessageResponse::new(format!("Successfully evaluated {count} ideas"))))
    }
    Err(e) => {
      repo.finish_evaluation(&ids, None);
      Err(reject_analyst(&context, e))
    }
  };
  guard.disarm();
  response
}

/// POST /ideas/cluster - propose clusters for every idea without saving them
pub async fn cluster_ideas(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  Json(config): Json<ClusterConfig>,
) -> ApiResult<Vec<IdeaCluster>> {
  let briefs = state.repo.read().await.briefs();
  if briefs.is_empty() {
    return Err(failure(StatusCode::BAD_REQUEST, "No ideas found to cluster"));
  }

  context.log_info(&format!(
    "Clustering {} ideas into {} groups",
    briefs.len(),
    config.number_of_clusters()
  ));
  let clusters =
    state.analyst.cluster(&briefs, &config).await.map_err(|e| reject_analyst(&context, e))?;
  Ok(ResponseJson(clusters))
}

/// POST /ideas/save-clusters
pub async fn save_clusters(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  Json(clusters): Json<Vec<IdeaCluster>>,
) -> ApiResult<MessageResponse> {
  let count = state.repo.write().await.save_clusters(&clusters);
  context.log_info(&format!("Saved {} clusters covering {count} ideas", clusters.len()));
  Ok(ResponseJson(MessageResponse::new(format!("Successfully saved clusters for {count} ideas"))))
}

/// POST /ideas/{id}/classify - suggest a cluster for one idea
pub async fn classify_idea(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  Path(id): Path<String>,
) -> ApiResult<SingleClusterSuggestion> {
  let (brief, existing) = {
    let mut repo = state.repo.write().await;
    let brief = repo.begin_classification(&id).map_err(|e| reject(&context, e))?;
    (brief, repo.existing_clusters())
  };
  let guard = ActivityGuard::new(state.repo.clone(), vec![id.clone()]);

  let result = state.analyst.classify(&brief, &existing).await;
  state.repo.write().await.finish_classification(&id);
  guard.disarm();

  result.map(ResponseJson).map_err(|e| reject_analyst(&context, e))
}

/// POST /ideas/{id}/apply-classification
pub async fn apply_classification(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  Path(id): Path<String>,
  Json(suggestion): Json<SingleClusterSuggestion>,
) -> ApiResult<ApiIdea> {
  let mut repo = state.repo.write().await;
  let idea = repo.assign_cluster(&id, &suggestion.cluster_name).map_err(|e| reject(&context, e))?;
  context.log_info(&format!("Assigned idea {id} to {}", suggestion.cluster_name));
  Ok(ResponseJson(idea))
}

/// DELETE /ideas/clusters
pub async fn clear_clusters(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
) -> ResponseJson<MessageResponse> {
  state.repo.write().await.clear_clusters();
  context.log_info("Cleared all clusters");
  ResponseJson(MessageResponse::new("All clusters cleared successfully"))
}
