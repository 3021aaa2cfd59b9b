//! Gemini `generateContent` text model

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::timeout;

use crate::config::{AiSettings, API_KEY_VAR};
use crate::server::services::analyst::{AnalystError, TextModel};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
  contents: Vec<Content<'a>>,
  generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
  parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
  text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
  response_mime_type: &'static str,
}

#[derive(Deserialize)]
struct GenerateResponse {
  #[serde(default)]
  candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
  content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
  #[serde(default)]
  parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
  #[serde(default)]
  text: String,
}

impl GenerateResponse {
  fn into_text(self) -> Option<String> {
    let content = self.candidates.into_iter().next()?.content?;
    let text: String = content.parts.into_iter().map(|p| p.text).collect();
    Some(text).filter(|t| !t.trim().is_empty())
  }
}

pub struct GeminiModel {
  client: Client,
  settings: AiSettings,
  timeout_secs: u64,
}

impl GeminiModel {
  pub fn new(settings: AiSettings, timeout_secs: u64) -> Result<Self, AnalystError> {
    let client = Client::builder()
      .build()
      .map_err(|e| AnalystError::request(format!("Failed to create HTTP client: {e}")))?;

    if settings.api_key.is_none() {
      tracing::warn!("{API_KEY_VAR} is not set; AI endpoints will be unavailable");
    }

    Ok(Self { client, settings, timeout_secs })
  }

  fn endpoint(&self) -> String {
    format!(
      "{}/models/{}:generateContent",
      self.settings.api_base.trim_end_matches('/'),
      self.settings.model
    )
  }
}

#[async_trait]
impl TextModel for GeminiModel {
  async fn generate(&self, prompt: &str) -> Result<String, AnalystError> {
    let api_key = self
      .settings
      .api_key
      .as_deref()
      .ok_or_else(|| AnalystError::not_configured(format!("{API_KEY_VAR} is not set")))?;

    let body = GenerateRequest {
      contents: vec![Content { parts: vec![Part { text: prompt }] }],
      generation_config: GenerationConfig { response_mime_type: "application/json" },
    };
    let request = self.client.post(self.endpoint()).query(&[("key", api_key)]).json(&body);

    tracing::debug!("Sending prompt to {}", self.settings.model);
    let response = timeout(Duration::from_secs(self.timeout_secs), request.send())
      .await
      .map_err(|_| AnalystError::request(format!("timed out after {}s", self.timeout_secs)))?
      .map_err(|e| AnalystError::request(e.to_string()))?;

    if !response.status().is_success() {
      let status = response.status();
      let error_text = response.text().await.unwrap_or_default();
      return Err(AnalystError::request(format!("HTTP {}: {}", status.as_u16(), error_text)));
    }

    let parsed: GenerateResponse =
      response.json().await.map_err(|e| AnalystError::malformed(e.to_string()))?;
    parsed.into_text().ok_or_else(|| AnalystError::malformed("response contained no text"))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn settings(api_key: Option<&str>) -> AiSettings {
    AiSettings {
      api_key: api_key.map(str::to_string),
      api_base: "http://127.0.0.1:9/v1beta/".to_string(),
      ..AiSettings::default()
    }
  }

  #[test]
  fn test_request_body_shape() {
    let body = GenerateRequest {
      contents: vec![Content { parts: vec![Part { text: "hi" }] }],
      generation_config: GenerationConfig { response_mime_type: "application/json" },
    };

    let json = serde_json::to_value(&body).unwrap();

    assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
    assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
  }

  #[test]
  fn test_response_text_is_joined() {
    let response: GenerateResponse = serde_json::from_str(
      r#"{"candidates": [{"content": {"parts": [{"text": "{\"a\":"}, {"text": " 1}"}]}}]}"#,
    )
    .unwrap();

    assert_eq!(response.into_text().as_deref(), Some("{\"a\": 1}"));
  }

  #[test]
  fn test_empty_response_has_no_text() {
    let response: GenerateResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
    assert!(response.into_text().is_none());
  }

  #[test]
  fn test_endpoint_uses_model() {
    let model = GeminiModel::new(settings(Some("k")), 1).unwrap();
    assert_eq!(
      model.endpoint(),
      "http://127.0.0.1:9/v1beta/models/gemini-2.5-flash:generateContent"
    );
  }

  #[tokio::test]
  async fn test_missing_key_is_not_configured() {
    let model = GeminiModel::new(settings(None), 1).unwrap();

    let result = model.generate("prompt").await;

    assert!(matches!(result, Err(AnalystError::NotConfigured { .. })));
  }
}
