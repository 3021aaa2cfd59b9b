//! REST API request and response types

use axum::{http::StatusCode, response::Json as ResponseJson};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{AiActivity, EvaluationCriteria, Idea, IdeaEvaluation, IdeaStatus};

/// Idea as exchanged over the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiIdea {
  pub id: String,
  pub title: String,
  pub description: String,
  pub status: IdeaStatus,
  pub votes: u32,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub cluster_name: Option<String>,
  #[serde(default)]
  pub is_evaluating: bool,
  #[serde(default)]
  pub is_classifying: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub evaluation: Option<IdeaEvaluation>,
}

impl ApiIdea {
  pub fn from_idea(idea: &Idea, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
    Self {
      id: idea.id.clone(),
      title: idea.title.clone(),
      description: idea.description.clone(),
      status: idea.status(),
      votes: idea.votes(),
      cluster_name: idea.cluster_name.clone(),
      is_evaluating: idea.activity == AiActivity::Evaluating,
      is_classifying: idea.activity == AiActivity::Classifying,
      created_at,
      updated_at,
      evaluation: idea.evaluation.clone(),
    }
  }
}

impl From<ApiIdea> for Idea {
  fn from(api: ApiIdea) -> Self {
    let mut idea = Idea::restored(api.id, api.title, api.description, api.status, api.votes);
    idea.cluster_name = api.cluster_name;
    idea.evaluation = api.evaluation;
    idea.activity = AiActivity::from_flags(api.is_evaluating, api.is_classifying);
    idea
  }
}

/// Body of POST /ideas
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdeaCreate {
  pub title: String,
  pub description: String,
}

/// Body of PUT /ideas/{id}; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdeaUpdate {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status: Option<IdeaStatus>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub votes: Option<u32>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub cluster_name: Option<String>,
}

/// Body of POST /ideas/evaluate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRequest {
  pub idea_ids: Vec<String>,
}

/// Stored evaluation criteria with bookkeeping fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiEvaluationCriteria {
  pub id: u32,
  #[serde(flatten)]
  pub criteria: EvaluationCriteria,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
  pub message: String,
}

impl MessageResponse {
  pub fn new(message: impl Into<String>) -> Self {
    Self { message: message.into() }
  }
}

/// Error body of every non-2xx response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
  pub detail: String,
}

pub type ApiFailure = (StatusCode, ResponseJson<ErrorResponse>);
pub type ApiResult<T> = Result<ResponseJson<T>, ApiFailure>;

/// Build an error response
pub fn failure(status: StatusCode, detail: impl Into<String>) -> ApiFailure {
  (status, ResponseJson(ErrorResponse { detail: detail.into() }))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::fixtures::evaluation;

  #[test]
  fn test_api_idea_round_trip_keeps_flags() {
    let mut idea = Idea::draft("Garden robot", "Waters plants");
    idea.activity = AiActivity::Classifying;
    idea.evaluation = Some(evaluation(6.0, 7.0, 8.0));
    let now = Utc::now();

    let api = ApiIdea::from_idea(&idea, now, now);
    assert!(api.is_classifying);
    assert!(!api.is_evaluating);

    let back: Idea = api.into();
    assert_eq!(back, idea);
  }

  #[test]
  fn test_api_idea_wire_names() {
    let now = Utc::now();
    let mut idea = Idea::draft("Garden robot", "Waters plants");
    idea.cluster_name = Some("Home".into());

    let json = serde_json::to_value(ApiIdea::from_idea(&idea, now, now)).unwrap();

    assert_eq!(json["status"], "DRAFT");
    assert_eq!(json["cluster_name"], "Home");
    assert_eq!(json["is_evaluating"], false);
    assert!(json.get("evaluation").is_none());
  }

  #[test]
  fn test_criteria_are_flattened() {
    let now = Utc::now();
    let api = ApiEvaluationCriteria {
      id: 1,
      criteria: EvaluationCriteria::default(),
      created_at: now,
      updated_at: now,
    };

    let json = serde_json::to_value(&api).unwrap();

    assert!(json["desirability"].as_str().unwrap().ends_with('?'));
    let parsed: ApiEvaluationCriteria = serde_json::from_value(json).unwrap();
    assert_eq!(parsed.criteria, EvaluationCriteria::default());
  }
}
