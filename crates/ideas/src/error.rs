use thiserror::Error;

/// Errors surfaced by the idea library
#[derive(Error, Debug)]
pub enum IdeasError {
  #[error("Malformed input: {message}")]
  MalformedInput { message: String },

  #[error("No valid ideas found. Each idea must have a non-empty 'title' and 'description'.")]
  NoValidRecords,

  #[error("Unsupported file type '{extension}'. Please upload a .json or .csv file.")]
  UnsupportedFormat { extension: String },

  #[error("{operation} failed: {message}")]
  RemoteOperation { operation: String, message: String },

  #[error("Idea '{id}' not found")]
  IdeaNotFound { id: String },

  #[error("Invalid transition: {message}")]
  InvalidTransition { message: String },

  #[error("Number of clusters must be between 2 and 10, got {count}")]
  InvalidClusterConfig { count: u32 },

  #[error("Configuration error: {message}")]
  Config { message: String },
}

impl IdeasError {
  pub fn malformed_input(message: impl Into<String>) -> Self {
    Self::MalformedInput { message: message.into() }
  }

  pub fn unsupported_format(extension: impl Into<String>) -> Self {
    Self::UnsupportedFormat { extension: extension.into() }
  }

  pub fn remote(operation: impl Into<String>, message: impl std::fmt::Display) -> Self {
    Self::RemoteOperation { operation: operation.into(), message: message.to_string() }
  }

  pub fn idea_not_found(id: impl Into<String>) -> Self {
    Self::IdeaNotFound { id: id.into() }
  }

  pub fn invalid_transition(message: impl Into<String>) -> Self {
    Self::InvalidTransition { message: message.into() }
  }

  pub fn config(message: impl Into<String>) -> Self {
    Self::Config { message: message.into() }
  }

  /// Whether this error came from parsing or validating an uploaded file
  pub fn is_upload_error(&self) -> bool {
    matches!(
      self,
      Self::MalformedInput { .. } | Self::NoValidRecords | Self::UnsupportedFormat { .. }
    )
  }
}

pub type Result<T> = std::result::Result<T, IdeasError>;
