//! HTTP client for the ideas REST API
//!
//! Implements [`IdeaBackend`] so the store and view controller can run against a remote
//! `ideas_server` (or any server honoring the same contract).

use async_trait::async_trait;
use reqwest::{multipart, Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::Settings;
use crate::error::{IdeasError, Result};
use crate::models::{
  ClusterConfig, EvaluationCriteria, Idea, IdeaCluster, SingleClusterSuggestion,
};
use crate::server::types::{
  ApiEvaluationCriteria, ApiIdea, ErrorResponse, EvaluationRequest, IdeaCreate, IdeaUpdate,
  MessageResponse,
};
use crate::store::{BackendStatus, IdeaBackend};

const HEALTH_CHECK_TIMEOUT_SECS: u64 = 5;

/// Configuration for the ideas HTTP client
#[derive(Debug, Clone)]
pub struct ClientConfig {
  /// Base URL including the API prefix (e.g. "http://localhost:8000/api")
  pub base_url: String,
  /// Request timeout in seconds
  pub timeout_secs: u64,
}

impl Default for ClientConfig {
  fn default() -> Self {
    let settings = Settings::default();
    Self { base_url: settings.base_url().to_string(), timeout_secs: settings.timeout_secs }
  }
}

impl From<&Settings> for ClientConfig {
  fn from(settings: &Settings) -> Self {
    Self { base_url: settings.base_url().to_string(), timeout_secs: settings.timeout_secs }
  }
}

/// HTTP client for the ideas REST API
pub struct IdeasClient {
  client: Client,
  config: ClientConfig,
}

impl IdeasClient {
  pub fn with_config(config: ClientConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()
      .map_err(|e| IdeasError::config(format!("Failed to create HTTP client: {e}")))?;

    Ok(Self { client, config })
  }

  pub fn base_url(&self) -> &str {
    &self.config.base_url
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url, path)
  }

  async fn send(&self, operation: &str, request: RequestBuilder) -> Result<Response> {
    self.send_within(operation, request, self.config.timeout_secs).await
  }

  async fn send_within(
    &self,
    operation: &str,
    request: RequestBuilder,
    timeout_secs: u64,
  ) -> Result<Response> {
    let response = timeout(Duration::from_secs(timeout_secs), request.send())
      .await
      .map_err(|_| IdeasError::remote(operation, format!("timed out after {timeout_secs}s")))?
      .map_err(|e| IdeasError::remote(operation, e))?;

    if !response.status().is_success() {
      let status = response.status();
      let error_text = response.text().await.unwrap_or_default();
      let detail = serde_json::from_str::<ErrorResponse>(&error_text)
        .map(|body| body.detail)
        .unwrap_or(error_text);
      return Err(IdeasError::remote(operation, format!("HTTP {}: {}", status.as_u16(), detail)));
    }

    Ok(response)
  }

  async fn fetch<T: DeserializeOwned>(
    &self,
    operation: &str,
    request: RequestBuilder,
  ) -> Result<T> {
    let response = self.send(operation, request).await?;
    response.json().await.map_err(|e| IdeasError::remote(operation, e))
  }

  async fn fetch_idea(&self, operation: &str, request: RequestBuilder) -> Result<Idea> {
    let idea: ApiIdea = self.fetch(operation, request).await?;
    Ok(idea.into())
  }
}

#[async_trait]
impl IdeaBackend for IdeasClient {
  async fn list_ideas(&self) -> Result<Vec<Idea>> {
    let ideas: Vec<ApiIdea> = self.fetch("Load ideas", self.client.get(self.url("/ideas"))).await?;
    Ok(ideas.into_iter().map(Idea::from).collect())
  }

  async fn get_idea(&self, id: &str) -> Result<Idea> {
    self.fetch_idea("Load idea", self.client.get(self.url(&format!("/ideas/{id}")))).await
  }

  async fn create_idea(&self, title: &str, description: &str) -> Result<Idea> {
    let body = IdeaCreate { title: title.to_string(), description: description.to_string() };
    self.fetch_idea("Create idea", self.client.post(self.url("/ideas")).json(&body)).await
  }

  async fn update_idea(&self, id: &str, title: &str, description: &str) -> Result<Idea> {
    let body = IdeaUpdate {
      title: Some(title.to_string()),
      description: Some(description.to_string()),
      ..IdeaUpdate::default()
    };
    let request = self.client.put(self.url(&format!("/ideas/{id}"))).json(&body);
    self.fetch_idea("Update idea", request).await
  }

  async fn delete_idea(&self, id: &str) -> Result<()> {
    let request = self.client.delete(self.url(&format!("/ideas/{id}")));
    let _message: MessageResponse = self.fetch("Delete idea", request).await?;
    Ok(())
  }

  async fn vote(&self, id: &str) -> Result<Idea> {
    self.fetch_idea("Vote on idea", self.client.post(self.url(&format!("/ideas/{id}/vote")))).await
  }

  async fn publish(&self, id: &str) -> Result<Idea> {
    let request = self.client.post(self.url(&format!("/ideas/{id}/publish")));
    self.fetch_idea("Publish idea", request).await
  }

  async fn upload(&self, file_name: &str, content: &str) -> Result<String> {
    let part = multipart::Part::text(content.to_string()).file_name(file_name.to_string());
    let form = multipart::Form::new().part("file", part);
    let request = self.client.post(self.url("/ideas/upload")).multipart(form);
    let response: MessageResponse = self.fetch("Upload ideas", request).await?;
    Ok(response.message)
  }

  async fn evaluate(&self, ids: &[String]) -> Result<()> {
    let body = EvaluationRequest { idea_ids: ids.to_vec() };
    let request = self.client.post(self.url("/ideas/evaluate")).json(&body);
    let _message: MessageResponse = self.fetch("Evaluate ideas", request).await?;
    Ok(())
  }

  async fn cluster(&self, config: &ClusterConfig) -> Result<Vec<IdeaCluster>> {
    self.fetch("Cluster ideas", self.client.post(self.url("/ideas/cluster")).json(config)).await
  }

  async fn save_clusters(&self, clusters: &[IdeaCluster]) -> Result<()> {
    let request = self.client.post(self.url("/ideas/save-clusters")).json(clusters);
    let _message: MessageResponse = self.fetch("Save clusters", request).await?;
    Ok(())
  }

  async fn classify(&self, id: &str) -> Result<SingleClusterSuggestion> {
    self.fetch("Classify idea", self.client.post(self.url(&format!("/ideas/{id}/classify")))).await
  }

  async fn apply_classification(
    &self,
    id: &str,
    suggestion: &SingleClusterSuggestion,
  ) -> Result<Idea> {
    let request =
      self.client.post(self.url(&format!("/ideas/{id}/apply-classification"))).json(suggestion);
    self.fetch_idea("Apply classification", request).await
  }

  async fn clear_clusters(&self) -> Result<()> {
    let request = self.client.delete(self.url("/ideas/clusters"));
    let _message: MessageResponse = self.fetch("Clear clusters", request).await?;
    Ok(())
  }

  async fn get_criteria(&self) -> Result<Option<EvaluationCriteria>> {
    let request = self.client.get(self.url("/evaluation-criteria"));
    let stored: Option<ApiEvaluationCriteria> = self.fetch("Load criteria", request).await?;
    Ok(stored.map(|s| s.criteria))
  }

  async fn save_criteria(&self, criteria: &EvaluationCriteria) -> Result<EvaluationCriteria> {
    let request = self.client.post(self.url("/evaluation-criteria")).json(criteria);
    let stored: ApiEvaluationCriteria = self.fetch("Save criteria", request).await?;
    Ok(stored.criteria)
  }

  async fn status(&self) -> Result<BackendStatus> {
    let request = self.client.get(self.url("/status"));
    let response =
      self.send_within("Server health check", request, HEALTH_CHECK_TIMEOUT_SECS).await?;
    response.json().await.map_err(|e| IdeasError::remote("Server health check", e))
  }
}

/// Build a client from the loaded settings
pub fn get_client() -> Result<IdeasClient> {
  let settings = Settings::load()?;
  IdeasClient::with_config(ClientConfig::from(&settings))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_config_points_at_local_api() {
    let config = ClientConfig::default();
    assert_eq!(config.base_url, "http://localhost:8000/api");
    assert_eq!(config.timeout_secs, 30);
  }

  #[test]
  fn test_urls_are_joined_onto_base() {
    let client = IdeasClient::with_config(ClientConfig {
      base_url: "http://ideas.test/api".to_string(),
      timeout_secs: 1,
    })
    .unwrap();

    assert_eq!(client.url("/ideas/42/vote"), "http://ideas.test/api/ideas/42/vote");
  }

  #[tokio::test]
  async fn test_unreachable_server_is_remote_error() {
    let client = IdeasClient::with_config(ClientConfig {
      base_url: "http://127.0.0.1:9/api".to_string(),
      timeout_secs: 2,
    })
    .unwrap();

    let result = client.list_ideas().await;

    assert!(matches!(
      result,
      Err(IdeasError::RemoteOperation { ref operation, .. }) if operation == "Load ideas"
    ));
  }
}
