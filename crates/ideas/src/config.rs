//! Settings for the CLI client and the server
//!
//! Values come from `$IDEAS_CONFIG` or `~/.ideas/config.yaml` when present, then environment
//! variables override individual fields.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::{IdeasError, Result};

pub const CONFIG_PATH_VAR: &str = "IDEAS_CONFIG";
pub const SERVER_URL_VAR: &str = "IDEAS_SERVER_URL";
pub const TIMEOUT_VAR: &str = "IDEAS_TIMEOUT_SECS";
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const MODEL_VAR: &str = "IDEAS_AI_MODEL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
  /// Base URL of the ideas REST API, including the `/api` prefix
  #[serde(default = "default_server_url")]
  pub server_url: String,
  /// Per-request timeout in seconds
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
  #[serde(default)]
  pub ai: AiSettings,
  #[serde(default)]
  pub server: ServerSettings,
}

/// Generative model used by the server for evaluations and clustering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiSettings {
  #[serde(default)]
  pub api_key: Option<String>,
  #[serde(default = "default_model")]
  pub model: String,
  #[serde(default = "default_api_base")]
  pub api_base: String,
}

/// Listen address of `ideas_server`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSettings {
  #[serde(default = "default_host")]
  pub host: String,
  #[serde(default = "default_port")]
  pub port: u16,
}

fn default_server_url() -> String {
  "http://localhost:8000/api".to_string()
}
fn default_timeout_secs() -> u64 {
  30
}
fn default_model() -> String {
  "gemini-2.5-flash".to_string()
}
fn default_api_base() -> String {
  "https://generativelanguage.googleapis.com/v1beta".to_string()
}
fn default_host() -> String {
  "127.0.0.1".to_string()
}
fn default_port() -> u16 {
  8000
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      server_url: default_server_url(),
      timeout_secs: default_timeout_secs(),
      ai: AiSettings::default(),
      server: ServerSettings::default(),
    }
  }
}

impl Default for AiSettings {
  fn default() -> Self {
    Self { api_key: None, model: default_model(), api_base: default_api_base() }
  }
}

impl Default for ServerSettings {
  fn default() -> Self {
    Self { host: default_host(), port: default_port() }
  }
}

impl Settings {
  /// Load a YAML settings file
  pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
      .map_err(|e| IdeasError::config(format!("Failed to read {}: {}", path.display(), e)))?;
    serde_yaml::from_str(&content)
      .map_err(|e| IdeasError::config(format!("Failed to parse {}: {}", path.display(), e)))
  }

  /// Load from the settings file if there is one, then apply environment overrides
  pub fn load() -> Result<Self> {
    let mut settings = match Self::config_path() {
      Some(path) if path.exists() => {
        tracing::debug!("Loading settings from {}", path.display());
        Self::load_from_file(&path)?
      }
      _ => Settings::default(),
    };

    settings.apply_env()?;
    settings.validate()?;
    Ok(settings)
  }

  /// Where settings are read from: `$IDEAS_CONFIG`, else `~/.ideas/config.yaml`
  pub fn config_path() -> Option<PathBuf> {
    match std::env::var(CONFIG_PATH_VAR) {
      Ok(path) if !path.is_empty() => Some(PathBuf::from(path)),
      _ => dirs::home_dir().map(|home| home.join(".ideas").join("config.yaml")),
    }
  }

  fn apply_env(&mut self) -> Result<()> {
    if let Ok(url) = std::env::var(SERVER_URL_VAR) {
      self.server_url = url;
    }
    if let Ok(timeout) = std::env::var(TIMEOUT_VAR) {
      self.timeout_secs = timeout
        .parse()
        .map_err(|_| {
          IdeasError::config(format!("{TIMEOUT_VAR} must be a whole number of seconds"))
        })?;
    }
    if let Ok(key) = std::env::var(API_KEY_VAR) {
      self.ai.api_key = Some(key).filter(|k| !k.is_empty());
    }
    if let Ok(model) = std::env::var(MODEL_VAR) {
      self.ai.model = model;
    }
    Ok(())
  }

  fn validate(&self) -> Result<()> {
    let url = Url::parse(&self.server_url)
      .map_err(|e| IdeasError::config(format!("Invalid server URL '{}': {}", self.server_url, e)))?;
    if !matches!(url.scheme(), "http" | "https") {
      return Err(IdeasError::config(format!(
        "Server URL must use http or https, got '{}'",
        url.scheme()
      )));
    }
    if self.timeout_secs == 0 {
      return Err(IdeasError::config("Timeout must be at least one second"));
    }
    Ok(())
  }

  /// Server URL without a trailing slash
  pub fn base_url(&self) -> &str {
    self.server_url.trim_end_matches('/')
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;
  use tempfile::TempDir;

  fn clear_env() {
    for var in [CONFIG_PATH_VAR, SERVER_URL_VAR, TIMEOUT_VAR, API_KEY_VAR, MODEL_VAR] {
      std::env::remove_var(var);
    }
  }

  #[test]
  fn test_defaults() {
    let settings = Settings::default();
    assert_eq!(settings.base_url(), "http://localhost:8000/api");
    assert_eq!(settings.timeout_secs, 30);
    assert_eq!(settings.ai.model, "gemini-2.5-flash");
    assert_eq!(settings.server.port, 8000);
  }

  #[test]
  fn test_partial_yaml_uses_defaults() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.yaml");
    std::fs::write(&path, "timeout_secs: 5\nai:\n  model: gemini-pro\n").unwrap();

    let settings = Settings::load_from_file(&path)?;

    assert_eq!(settings.timeout_secs, 5);
    assert_eq!(settings.ai.model, "gemini-pro");
    assert_eq!(settings.server_url, default_server_url());
    assert_eq!(settings.ai.api_base, default_api_base());
    Ok(())
  }

  #[test]
  fn test_invalid_yaml_is_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.yaml");
    std::fs::write(&path, "timeout_secs: [not a number").unwrap();

    assert!(matches!(Settings::load_from_file(&path), Err(IdeasError::Config { .. })));
  }

  #[test]
  #[serial]
  fn test_env_overrides_file() -> Result<()> {
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.yaml");
    std::fs::write(&path, "server_url: http://ideas.internal/api/\ntimeout_secs: 10\n").unwrap();

    std::env::set_var(CONFIG_PATH_VAR, &path);
    std::env::set_var(TIMEOUT_VAR, "3");
    std::env::set_var(API_KEY_VAR, "secret");
    let settings = Settings::load();
    clear_env();

    let settings = settings?;
    assert_eq!(settings.base_url(), "http://ideas.internal/api");
    assert_eq!(settings.timeout_secs, 3);
    assert_eq!(settings.ai.api_key.as_deref(), Some("secret"));
    Ok(())
  }

  #[test]
  #[serial]
  fn test_invalid_server_url_is_rejected() {
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    std::env::set_var(CONFIG_PATH_VAR, temp_dir.path().join("missing.yaml"));
    std::env::set_var(SERVER_URL_VAR, "not a url");
    let result = Settings::load();
    clear_env();

    assert!(matches!(result, Err(IdeasError::Config { .. })));
  }

  #[test]
  #[serial]
  fn test_bad_timeout_is_rejected() {
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    std::env::set_var(CONFIG_PATH_VAR, temp_dir.path().join("missing.yaml"));
    std::env::set_var(TIMEOUT_VAR, "soon");
    let result = Settings::load();
    clear_env();

    assert!(result.is_err());
  }
}
