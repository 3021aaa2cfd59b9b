//! Clustering inputs and AI clustering outputs

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{IdeasError, Result};

pub const MIN_CLUSTERS: u32 = 2;
pub const MAX_CLUSTERS: u32 = 10;

const DEFAULT_CLUSTER_COUNT: u32 = 5;
const DEFAULT_CLUSTERING_BASIS: &str = "the core problem the idea is trying to solve";

/// Parameters for an AI clustering run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawClusterConfig")]
pub struct ClusterConfig {
  number_of_clusters: u32,
  clustering_basis: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawClusterConfig {
  number_of_clusters: u32,
  clustering_basis: String,
}

impl TryFrom<RawClusterConfig> for ClusterConfig {
  type Error = IdeasError;

  fn try_from(raw: RawClusterConfig) -> Result<Self> {
    ClusterConfig::new(raw.number_of_clusters, raw.clustering_basis)
  }
}

impl ClusterConfig {
  pub fn new(number_of_clusters: u32, clustering_basis: impl Into<String>) -> Result<Self> {
    if !(MIN_CLUSTERS..=MAX_CLUSTERS).contains(&number_of_clusters) {
      return Err(IdeasError::InvalidClusterConfig { count: number_of_clusters });
    }
    Ok(Self { number_of_clusters, clustering_basis: clustering_basis.into() })
  }

  pub fn number_of_clusters(&self) -> u32 {
    self.number_of_clusters
  }

  pub fn clustering_basis(&self) -> &str {
    &self.clustering_basis
  }
}

impl Default for ClusterConfig {
  fn default() -> Self {
    Self {
      number_of_clusters: DEFAULT_CLUSTER_COUNT,
      clustering_basis: DEFAULT_CLUSTERING_BASIS.to_string(),
    }
  }
}

/// One AI-proposed group of ideas, not persisted until explicitly saved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IdeaCluster {
  /// Short, descriptive name for the cluster (e.g. "Sustainable Living Tech")
  pub cluster_name: String,
  /// One-sentence summary of the common theme
  pub cluster_description: String,
  /// Ids of the ideas that belong to the cluster
  pub idea_ids: Vec<String>,
}

/// Whether a classification reuses a cluster or proposes a new one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SuggestionType {
  ExistingCluster,
  NewCluster,
}

impl fmt::Display for SuggestionType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SuggestionType::ExistingCluster => f.write_str("existing cluster"),
      SuggestionType::NewCluster => f.write_str("new cluster"),
    }
  }
}

/// AI suggestion for the cluster of a single idea
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SingleClusterSuggestion {
  /// Why the idea fits an existing cluster or needs a new one
  pub reasoning: String,
  pub suggestion_type: SuggestionType,
  /// Name of the suggested cluster
  pub cluster_name: String,
}
