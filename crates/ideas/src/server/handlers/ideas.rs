//! Idea CRUD, lifecycle and upload handlers

use axum::{
  extract::{Extension, Json, Multipart, Path, State},
  http::StatusCode,
  response::Json as ResponseJson,
};

use crate::codec;
use crate::server::handlers::reject;
use crate::server::middleware::RequestContext;
use crate::server::state::AppState;
use crate::server::types::{
  failure, ApiIdea, ApiResult, IdeaCreate, IdeaUpdate, MessageResponse,
};

/// Multipart field carrying the uploaded file
const UPLOAD_FIELD: &str = "file";

/// GET /ideas
pub async fn list_ideas(State(state): State<AppState>) -> ResponseJson<Vec<ApiIdea>> {
  ResponseJson(state.repo.read().await.list())
}

/// GET /ideas/{id}
pub async fn get_idea(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  Path(id): Path<String>,
) -> ApiResult<ApiIdea> {
  let repo = state.repo.read().await;
  repo.get(&id).map(ResponseJson).map_err(|e| reject(&context, e))
}

/// POST /ideas
pub async fn create_idea(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  Json(request): Json<IdeaCreate>,
) -> ApiResult<ApiIdea> {
  let idea = state
    .repo
    .write()
    .await
    .create(&request.title, &request.description)
    .map_err(|e| reject(&context, e))?;

  context.log_info(&format!("Created idea {}", idea.id));
  Ok(ResponseJson(idea))
}

/// PUT /ideas/{id}
pub async fn update_idea(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  Path(id): Path<String>,
  Json(request): Json<IdeaUpdate>,
) -> ApiResult<ApiIdea> {
  let mut repo = state.repo.write().await;
  repo.update(&id, request).map(ResponseJson).map_err(|e| reject(&context, e))
}

/// DELETE /ideas/{id}
pub async fn delete_idea(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  Path(id): Path<String>,
) -> ApiResult<MessageResponse> {
  state.repo.write().await.delete(&id).map_err(|e| reject(&context, e))?;
  context.log_info(&format!("Deleted idea {id}"));
  Ok(ResponseJson(MessageResponse::new("Idea deleted successfully")))
}

/// POST /ideas/{id}/vote
pub async fn vote_idea(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  Path(id): Path<String>,
) -> ApiResult<ApiIdea> {
  let mut repo = state.repo.write().await;
  repo.vote(&id).map(ResponseJson).map_err(|e| reject(&context, e))
}

/// POST /ideas/{id}/publish
pub async fn publish_idea(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  Path(id): Path<String>,
) -> ApiResult<ApiIdea> {
  let mut repo = state.repo.write().await;
  repo.publish(&id).map(ResponseJson).map_err(|e| reject(&context, e))
}

/// POST /ideas/upload - multipart CSV or JSON file
pub async fn upload_ideas(
  State(state): State<AppState>,
  Extension(context): Extension<RequestContext>,
  mut multipart: Multipart,
) -> ApiResult<MessageResponse> {
  let mut upload = None;
  while let Some(field) = multipart
    .next_field()
    .await
    .map_err(|e| failure(StatusCode::BAD_REQUEST, format!("Invalid multipart body: {e}")))?
  {
    if field.name() != Some(UPLOAD_FIELD) {
      continue;
    }
    let file_name = field.file_name().unwrap_or_default().to_string();
    let content = field
      .text()
      .await
      .map_err(|e| failure(StatusCode::BAD_REQUEST, format!("Failed to read upload: {e}")))?;
    upload = Some((file_name, content));
    break;
  }

  let Some((file_name, content)) = upload else {
    return Err(failure(StatusCode::BAD_REQUEST, "No file uploaded"));
  };

  let records = codec::parse_upload(&file_name, &content).map_err(|e| reject(&context, e))?;
  let count = state.repo.write().await.import(records);

  context.log_info(&format!("Imported {count} ideas from {file_name}"));
  Ok(ResponseJson(MessageResponse::new(format!("Successfully uploaded {count} ideas"))))
}
