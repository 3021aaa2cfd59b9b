//! CSV download formats

use crate::models::{CriterionScore, Idea};

pub const EXPORT_HEADERS: [&str; 13] = [
  "ID",
  "Title",
  "Description",
  "Status",
  "Votes",
  "Cluster",
  "AI Evaluation Summary",
  "AI Desirability Score",
  "AI Desirability Reasoning",
  "AI Feasibility Score",
  "AI Feasibility Reasoning",
  "AI Viability Score",
  "AI Viability Reasoning",
];

const TEMPLATE_CSV: &str = "title,description\n\
  \"Your Brilliant Idea Title\",\"A detailed, compelling description of your idea, explaining \
  the problem it solves and its potential impact.\"";

/// Quote a field iff it contains a comma, a double quote or a line break
pub fn escape_field(field: &str) -> String {
  if field.contains([',', '"', '\n', '\r']) {
    format!("\"{}\"", field.replace('"', "\"\""))
  } else {
    field.to_string()
  }
}

/// Serialize ideas in order under the fixed 13-column header
pub fn export_ideas(ideas: &[Idea]) -> String {
  let mut rows = Vec::with_capacity(ideas.len() + 1);
  rows.push(EXPORT_HEADERS.join(","));

  for idea in ideas {
    let evaluation = idea.evaluation.as_ref();
    let (desirability, desirability_reasoning) = criterion(evaluation.map(|e| &e.desirability));
    let (feasibility, feasibility_reasoning) = criterion(evaluation.map(|e| &e.feasibility));
    let (viability, viability_reasoning) = criterion(evaluation.map(|e| &e.viability));

    let fields = [
      idea.id.clone(),
      idea.title.clone(),
      idea.description.clone(),
      idea.status().to_string(),
      idea.votes().to_string(),
      idea.cluster_name.clone().unwrap_or_default(),
      evaluation.map(|e| e.summary.clone()).unwrap_or_default(),
      desirability,
      desirability_reasoning,
      feasibility,
      feasibility_reasoning,
      viability,
      viability_reasoning,
    ];

    rows.push(fields.iter().map(|f| escape_field(f)).collect::<Vec<_>>().join(","));
  }

  rows.join("\n")
}

fn criterion(score: Option<&CriterionScore>) -> (String, String) {
  score.map(|c| (c.score.to_string(), c.reasoning.clone())).unwrap_or_default()
}

/// Two-line starter file for bulk uploads
pub fn template_csv() -> &'static str {
  TEMPLATE_CSV
}
