//! Request context and middleware for the ideas REST API
//!
//! Every request gets a [`RequestContext`] in its extensions so handlers can tag their log
//! lines with the request id.

use axum::{
  extract::Request,
  http::{HeaderMap, Method, Uri},
  middleware::Next,
  response::Response,
};
use std::time::Instant;
use uuid::Uuid;

/// Request metadata shared with handlers
#[derive(Clone, Debug)]
pub struct RequestContext {
  /// Unique ID for this request
  pub request_id: Uuid,
  pub method: Method,
  pub uri: Uri,
  pub headers: HeaderMap,
}

impl RequestContext {
  pub fn new(method: Method, uri: Uri, headers: HeaderMap) -> Self {
    Self { request_id: Uuid::new_v4(), method, uri, headers }
  }

  fn user_agent(&self) -> &str {
    self.headers.get("user-agent").and_then(|v| v.to_str().ok()).unwrap_or("none")
  }

  pub fn log_info(&self, message: &str) {
    tracing::info!(
      request_id = %self.request_id,
      "{} {} - {}",
      self.method,
      self.uri.path(),
      message
    );
  }

  pub fn log_warn(&self, message: &str) {
    tracing::warn!(
      request_id = %self.request_id,
      "{} {} - {}",
      self.method,
      self.uri.path(),
      message
    );
  }

  pub fn log_error(&self, message: &str) {
    tracing::error!(
      request_id = %self.request_id,
      "{} {} - {}",
      self.method,
      self.uri.path(),
      message
    );
  }

  fn log_request_start(&self) {
    tracing::debug!(
      request_id = %self.request_id,
      user_agent = self.user_agent(),
      "{} {} - Request started",
      self.method,
      self.uri.path()
    );
  }

  fn log_request_complete(&self, status: u16, duration_ms: f64) {
    tracing::info!(
      request_id = %self.request_id,
      status,
      "{} {} - Request completed in {:.2}ms",
      self.method,
      self.uri.path(),
      duration_ms
    );
  }
}

/// Inject a [`RequestContext`] into every request and log its outcome
pub async fn request_context_middleware(mut request: Request, next: Next) -> Response {
  let context = RequestContext::new(
    request.method().clone(),
    request.uri().clone(),
    request.headers().clone(),
  );

  let start_time = Instant::now();
  context.log_request_start();
  request.extensions_mut().insert(context.clone());

  let response = next.run(request).await;

  let duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;
  context.log_request_complete(response.status().as_u16(), duration_ms);
  response
}
