//! Bulk upload parsing and validation

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use super::tokenizer::parse_records;
use crate::error::{IdeasError, Result};
use crate::models::Idea;

/// Supported upload file types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFormat {
  Csv,
  Json,
}

impl UploadFormat {
  /// Pick the format from a file name, ignoring case
  pub fn from_file_name(file_name: &str) -> Result<Self> {
    let extension = Path::new(file_name)
      .extension()
      .and_then(|ext| ext.to_str())
      .map(str::to_lowercase)
      .unwrap_or_default();

    match extension.as_str() {
      "csv" => Ok(UploadFormat::Csv),
      "json" => Ok(UploadFormat::Json),
      _ => Err(IdeasError::unsupported_format(extension)),
    }
  }
}

/// A validated upload record, not yet an idea
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIdea {
  pub title: String,
  pub description: String,
}

impl NewIdea {
  /// Materialize as a fresh draft with a new id and no votes
  pub fn into_idea(self) -> Idea {
    Idea::draft(self.title, self.description)
  }
}

/// Parse an uploaded file into validated records
///
/// Structural problems abort the whole upload. Records with an empty or non-string title or
/// description are skipped with a warning; if none survive, the upload fails.
pub fn parse_upload(file_name: &str, content: &str) -> Result<Vec<NewIdea>> {
  let candidates = match UploadFormat::from_file_name(file_name)? {
    UploadFormat::Csv => csv_candidates(content)?,
    UploadFormat::Json => json_candidates(content)?,
  };

  let total = candidates.len();
  let ideas: Vec<NewIdea> = candidates.into_iter().filter_map(validate).collect();

  if ideas.is_empty() && total > 0 {
    return Err(IdeasError::NoValidRecords);
  }

  tracing::debug!("Parsed {} of {} records from {}", ideas.len(), total, file_name);
  Ok(ideas)
}

fn csv_candidates(content: &str) -> Result<Vec<Value>> {
  let records = parse_records(content.trim());
  if records.len() < 2 {
    return Err(IdeasError::malformed_input(
      "CSV file must have a header and at least one data row.",
    ));
  }

  let headers: Vec<String> = records[0].iter().map(|h| h.trim().to_lowercase()).collect();
  let column = |name: &str| headers.iter().position(|h| h == name);
  let (Some(title_index), Some(description_index)) = (column("title"), column("description"))
  else {
    return Err(IdeasError::malformed_input(
      "CSV file must contain 'title' and 'description' columns.",
    ));
  };

  let field = |values: &[String], index: usize| values.get(index).cloned().unwrap_or_default();

  Ok(
    records[1..]
      .iter()
      .map(|values| {
        serde_json::json!({
          "title": field(values, title_index),
          "description": field(values, description_index),
        })
      })
      .collect(),
  )
}

fn json_candidates(content: &str) -> Result<Vec<Value>> {
  let parsed: Value = serde_json::from_str(content)
    .map_err(|e| IdeasError::malformed_input(format!("Invalid JSON: {e}")))?;

  match parsed {
    Value::Array(items) => Ok(items),
    _ => Err(IdeasError::malformed_input("JSON file must contain an array of ideas.")),
  }
}

fn validate(item: Value) -> Option<NewIdea> {
  let text = |key: &str| item.get(key).and_then(Value::as_str).filter(|s| !s.is_empty());

  match (text("title"), text("description")) {
    (Some(title), Some(description)) => {
      Some(NewIdea { title: title.to_string(), description: description.to_string() })
    }
    _ => {
      tracing::warn!("Skipping invalid item in uploaded file: {}", item);
      None
    }
  }
}
