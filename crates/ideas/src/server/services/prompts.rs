//! Prompt builders for the AI analyst
//!
//! Each prompt ends with the JSON schema of the expected answer so the model can be held to
//! the exact structure the parsers in [`super::analyst`] accept.

use schemars::schema_for;

use crate::models::{
  ClusterConfig, EvaluationCriteria, IdeaCluster, IdeaEvaluation, SingleClusterSuggestion,
};
use crate::server::services::analyst::{AnalystError, ExistingCluster, IdeaBrief};

/// Example titles shown per existing cluster
const SAMPLE_TITLES: usize = 2;

pub fn evaluation(idea: &IdeaBrief, criteria: &EvaluationCriteria) -> Result<String, AnalystError> {
  let schema = serde_json::to_string_pretty(&schema_for!(IdeaEvaluation))?;

  Ok(format!(
    r#"Please evaluate the following business/product idea based on the provided criteria.

Idea Title: "{title}"
Idea Description: "{description}"

Evaluation Criteria:
1. Desirability: {desirability}
2. Feasibility: {feasibility}
3. Viability: {viability}

Provide a score from 1-10 for each criterion, with 1 being the lowest and 10 being the highest.
Also provide detailed reasoning for each score, and a brief one-paragraph summary of your
overall impression of the idea.

Return your response as a JSON object matching this schema:
{schema}
"#,
    title = idea.title,
    description = idea.description,
    desirability = criteria.desirability,
    feasibility = criteria.feasibility,
    viability = criteria.viability,
  ))
}

pub fn clustering(ideas: &[IdeaBrief], config: &ClusterConfig) -> Result<String, AnalystError> {
  let ideas_json = serde_json::to_string_pretty(ideas)?;
  let schema = serde_json::to_string_pretty(&schema_for!(Vec<IdeaCluster>))?;

  Ok(format!(
    r#"Analyze the following list of ideas and group them into {count} distinct clusters.
The primary basis for clustering should be: "{basis}".

For each cluster, provide a short descriptive name, a one-sentence summary of the common theme,
and the IDs of the ideas that belong to it. Ensure every idea is assigned to exactly one cluster.

Here is the list of ideas in JSON format:
{ideas_json}

Return your response as a JSON array matching this schema:
{schema}
"#,
    count = config.number_of_clusters(),
    basis = config.clustering_basis(),
  ))
}

pub fn classification(
  idea: &IdeaBrief,
  existing: &[ExistingCluster],
) -> Result<String, AnalystError> {
  let schema = serde_json::to_string_pretty(&schema_for!(SingleClusterSuggestion))?;

  Ok(format!(
    r#"I have a new idea and I need to classify it into my existing organizational clusters.

Here are my existing clusters and some example ideas within them:
{clusters}

Here is the new idea to classify:
- Title: "{title}"
- Description: "{description}"

Your task:
1. Analyze the new idea.
2. Decide if it fits well into one of the existing clusters.
3. If it doesn't fit, suggest a new, appropriate cluster name for it.
4. Provide a brief reasoning for your decision.

Return your suggestion as a JSON object matching this schema, with suggestionType set to
EXISTING_CLUSTER or NEW_CLUSTER:
{schema}
"#,
    clusters = describe_clusters(existing),
    title = idea.title,
    description = idea.description,
  ))
}

fn describe_clusters(existing: &[ExistingCluster]) -> String {
  existing
    .iter()
    .map(|cluster| {
      let samples: Vec<&str> =
        cluster.titles.iter().take(SAMPLE_TITLES).map(String::as_str).collect();
      format!("- {}: (Includes ideas like: {}, etc.)", cluster.name, samples.join(", "))
    })
    .collect::<Vec<_>>()
    .join("\n")
}
