//! AI analyst seam and response validation

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::models::{
  ClusterConfig, CriterionScore, EvaluationCriteria, IdeaCluster, IdeaEvaluation,
  SingleClusterSuggestion,
};
use crate::server::services::prompts;

#[derive(Error, Debug)]
pub enum AnalystError {
  #[error("AI request failed: {message}")]
  Request { message: String },

  #[error("Malformed AI response: {message}")]
  MalformedResponse { message: String },

  #[error("AI analyst is not configured: {message}")]
  NotConfigured { message: String },

  #[error("Failed to encode prompt: {0}")]
  Encoding(#[from] serde_json::Error),
}

impl AnalystError {
  pub fn request(message: impl Into<String>) -> Self {
    Self::Request { message: message.into() }
  }

  pub fn malformed(message: impl Into<String>) -> Self {
    Self::MalformedResponse { message: message.into() }
  }

  pub fn not_configured(message: impl Into<String>) -> Self {
    Self::NotConfigured { message: message.into() }
  }
}

/// The parts of an idea an analyst gets to see
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdeaBrief {
  pub id: String,
  pub title: String,
  pub description: String,
}

/// A saved cluster with the titles of its members
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingCluster {
  pub name: String,
  pub titles: Vec<String>,
}

/// Evaluates, clusters and classifies ideas
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdeaAnalyst: Send + Sync {
  async fn evaluate(
    &self,
    idea: &IdeaBrief,
    criteria: &EvaluationCriteria,
  ) -> Result<IdeaEvaluation, AnalystError>;

  async fn cluster(
    &self,
    ideas: &[IdeaBrief],
    config: &ClusterConfig,
  ) -> Result<Vec<IdeaCluster>, AnalystError>;

  async fn classify(
    &self,
    idea: &IdeaBrief,
    existing: &[ExistingCluster],
  ) -> Result<SingleClusterSuggestion, AnalystError>;
}

/// A generative model that answers a prompt with JSON text
#[async_trait]
pub trait TextModel: Send + Sync {
  async fn generate(&self, prompt: &str) -> Result<String, AnalystError>;
}

/// [`IdeaAnalyst`] that builds prompts, sends them to a [`TextModel`] and validates the answers
pub struct PromptAnalyst<M: TextModel> {
  model: M,
}

impl<M: TextModel> PromptAnalyst<M> {
  pub fn new(model: M) -> Self {
    Self { model }
  }
}

#[async_trait]
impl<M: TextModel> IdeaAnalyst for PromptAnalyst<M> {
  async fn evaluate(
    &self,
    idea: &IdeaBrief,
    criteria: &EvaluationCriteria,
  ) -> Result<IdeaEvaluation, AnalystError> {
    let prompt = prompts::evaluation(idea, criteria)?;
    parse_evaluation(&self.model.generate(&prompt).await?)
  }

  async fn cluster(
    &self,
    ideas: &[IdeaBrief],
    config: &ClusterConfig,
  ) -> Result<Vec<IdeaCluster>, AnalystError> {
    let prompt = prompts::clustering(ideas, config)?;
    parse_clusters(&self.model.generate(&prompt).await?)
  }

  async fn classify(
    &self,
    idea: &IdeaBrief,
    existing: &[ExistingCluster],
  ) -> Result<SingleClusterSuggestion, AnalystError> {
    let prompt = prompts::classification(idea, existing)?;
    parse_suggestion(&self.model.generate(&prompt).await?)
  }
}

/// Drop a surrounding Markdown code fence, with or without a `json` tag
pub fn strip_code_fences(text: &str) -> &str {
  let text = text.trim();
  let Some(body) = text.strip_prefix("```") else {
    return text;
  };
  let body = body.strip_prefix("json").unwrap_or(body);
  body.strip_suffix("```").unwrap_or(body).trim()
}

fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T, AnalystError> {
  serde_json::from_str(strip_code_fences(text)).map_err(|e| AnalystError::malformed(e.to_string()))
}

pub fn parse_evaluation(text: &str) -> Result<IdeaEvaluation, AnalystError> {
  let evaluation: IdeaEvaluation = parse_json(text)?;

  let criteria = [
    ("desirability", &evaluation.desirability),
    ("feasibility", &evaluation.feasibility),
    ("viability", &evaluation.viability),
  ];
  for (name, CriterionScore { score, .. }) in criteria {
    if !(1.0..=10.0).contains(score) {
      return Err(AnalystError::malformed(format!("{name} score {score} is outside 1-10")));
    }
  }

  Ok(evaluation)
}

pub fn parse_clusters(text: &str) -> Result<Vec<IdeaCluster>, AnalystError> {
  let clusters: Vec<IdeaCluster> = parse_json(text)?;
  if clusters.iter().any(|c| c.cluster_name.trim().is_empty()) {
    return Err(AnalystError::malformed("cluster without a name"));
  }
  Ok(clusters)
}

pub fn parse_suggestion(text: &str) -> Result<SingleClusterSuggestion, AnalystError> {
  let suggestion: SingleClusterSuggestion = parse_json(text)?;
  if suggestion.cluster_name.trim().is_empty() {
    return Err(AnalystError::malformed("suggestion without a cluster name"));
  }
  Ok(suggestion)
}
