//! REST backend for the ideas service
//!
//! Serves the idea store contract over HTTP with axum, keeping ideas in memory and delegating
//! evaluation, clustering and classification to an [`services::IdeaAnalyst`].

pub mod handlers;
pub mod middleware;
pub mod routing;
pub mod services;
pub mod startup;
pub mod state;
pub mod types;

pub use routing::create_router;
pub use startup::start_server;
pub use state::{AppState, Repository};
