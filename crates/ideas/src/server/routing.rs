//! Axum router configuration for all endpoints

use axum::{
  middleware,
  routing::{delete, get, post},
  Router,
};

use crate::server::handlers::{ai, criteria, ideas, status};
use crate::server::middleware::request_context_middleware;
use crate::server::state::AppState;

/// Prefix shared by every route
pub const API_PREFIX: &str = "/api";

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
  let api = Router::new()
    .route("/status", get(status::status))
    // Ideas
    .route("/ideas", get(ideas::list_ideas).post(ideas::create_idea))
    .route("/ideas/upload", post(ideas::upload_ideas))
    .route(
      "/ideas/{id}",
      get(ideas::get_idea).put(ideas::update_idea).delete(ideas::delete_idea),
    )
    .route("/ideas/{id}/vote", post(ideas::vote_idea))
    .route("/ideas/{id}/publish", post(ideas::publish_idea))
    // AI
    .route("/ideas/evaluate", post(ai::evaluate_ideas))
    .route("/ideas/cluster", post(ai::cluster_ideas))
    .route("/ideas/save-clusters", post(ai::save_clusters))
    .route("/ideas/clusters", delete(ai::clear_clusters))
    .route("/ideas/{id}/classify", post(ai::classify_idea))
    .route("/ideas/{id}/apply-classification", post(ai::apply_classification))
    // Criteria
    .route("/evaluation-criteria", get(criteria::get_criteria).post(criteria::save_criteria));

  Router::new()
    .nest(API_PREFIX, api)
    .layer(middleware::from_fn(request_context_middleware))
    .with_state(state)
}
