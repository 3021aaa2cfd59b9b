pub mod ai;
pub mod criteria;
pub mod ideas;
pub mod status;

use axum::http::StatusCode;

use crate::error::IdeasError;
use crate::server::middleware::RequestContext;
use crate::server::services::AnalystError;
use crate::server::types::{failure, ApiFailure};

/// Map a library error onto its HTTP status and log it against the request
pub(crate) fn reject(context: &RequestContext, error: IdeasError) -> ApiFailure {
  let status = match &error {
    IdeasError::IdeaNotFound { .. } => StatusCode::NOT_FOUND,
    IdeasError::InvalidTransition { .. } => StatusCode::CONFLICT,
    IdeasError::InvalidClusterConfig { .. } => StatusCode::UNPROCESSABLE_ENTITY,
    IdeasError::MalformedInput { .. }
    | IdeasError::NoValidRecords
    | IdeasError::UnsupportedFormat { .. } => StatusCode::BAD_REQUEST,
    IdeasError::RemoteOperation { .. } => StatusCode::BAD_GATEWAY,
    IdeasError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
  };
  respond(context, status, error.to_string())
}

pub(crate) fn reject_analyst(context: &RequestContext, error: AnalystError) -> ApiFailure {
  let status = match &error {
    AnalystError::NotConfigured { .. } => StatusCode::SERVICE_UNAVAILABLE,
    _ => StatusCode::BAD_GATEWAY,
  };
  respond(context, status, error.to_string())
}

fn respond(context: &RequestContext, status: StatusCode, detail: String) -> ApiFailure {
  if status.is_server_error() {
    context.log_error(&detail);
  } else {
    context.log_warn(&detail);
  }
  failure(status, detail)
}
