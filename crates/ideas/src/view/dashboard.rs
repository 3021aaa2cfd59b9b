//! Aggregate statistics for the dashboard screen

use serde::Serialize;
use std::cmp::Ordering;

use crate::models::{Idea, IdeaStatus};

const TOP_N: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct AverageScores {
  pub desirability: f64,
  pub feasibility: f64,
  pub viability: f64,
  pub overall: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterCount {
  pub cluster_name: String,
  pub ideas: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
  pub total_ideas: usize,
  pub published: usize,
  pub drafts: usize,
  /// Votes across published ideas only
  pub total_votes: u64,
  pub top_voted: Vec<Idea>,
  pub evaluated: usize,
  pub average_scores: AverageScores,
  pub top_rated: Vec<Idea>,
  /// Largest cluster first
  pub clusters: Vec<ClusterCount>,
}

pub fn summarize(ideas: &[Idea]) -> DashboardSummary {
  let published: Vec<&Idea> = ideas.iter().filter(|i| i.is_published()).collect();
  let drafts = ideas.iter().filter(|i| i.status() == IdeaStatus::Draft).count();
  let total_votes = published.iter().map(|i| u64::from(i.votes())).sum();

  let mut top_voted = published.clone();
  top_voted.sort_by(|a, b| b.votes().cmp(&a.votes()));

  let evaluated: Vec<&Idea> = ideas.iter().filter(|i| i.evaluation.is_some()).collect();
  let average_scores = average_scores(&evaluated);

  let mut top_rated = evaluated.clone();
  top_rated.sort_by(|a, b| {
    let score = |idea: &Idea| idea.average_score().unwrap_or(0.0);
    score(b).partial_cmp(&score(a)).unwrap_or(Ordering::Equal)
  });

  DashboardSummary {
    total_ideas: ideas.len(),
    published: published.len(),
    drafts,
    total_votes,
    top_voted: top_voted.into_iter().take(TOP_N).cloned().collect(),
    evaluated: evaluated.len(),
    average_scores,
    top_rated: top_rated.into_iter().take(TOP_N).cloned().collect(),
    clusters: cluster_counts(ideas),
  }
}

fn average_scores(evaluated: &[&Idea]) -> AverageScores {
  if evaluated.is_empty() {
    return AverageScores::default();
  }

  let count = evaluated.len() as f64;
  let mut sums = AverageScores::default();
  for evaluation in evaluated.iter().filter_map(|i| i.evaluation.as_ref()) {
    sums.desirability += evaluation.desirability.score;
    sums.feasibility += evaluation.feasibility.score;
    sums.viability += evaluation.viability.score;
  }

  AverageScores {
    desirability: sums.desirability / count,
    feasibility: sums.feasibility / count,
    viability: sums.viability / count,
    overall: (sums.desirability + sums.feasibility + sums.viability) / (count * 3.0),
  }
}

/// Cluster sizes, largest first; equal sizes keep first-seen order
fn cluster_counts(ideas: &[Idea]) -> Vec<ClusterCount> {
  let mut counts: Vec<ClusterCount> = Vec::new();
  for name in ideas.iter().filter_map(|i| i.cluster_name.as_deref()) {
    match counts.iter_mut().find(|c| c.cluster_name == name) {
      Some(count) => count.ideas += 1,
      None => counts.push(ClusterCount { cluster_name: name.to_string(), ideas: 1 }),
    }
  }
  counts.sort_by(|a, b| b.ideas.cmp(&a.ideas));
  counts
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::fixtures::{draft, evaluation, published};

  #[test]
  fn test_empty_collection() {
    let summary = summarize(&[]);
    assert_eq!(summary.total_ideas, 0);
    assert_eq!(summary.average_scores, AverageScores::default());
    assert!(summary.clusters.is_empty());
  }

  #[test]
  fn test_counts_and_votes() {
    let ideas: Vec<Idea> = (1..=7)
      .map(|i| published(&format!("Idea {i}"), i))
      .chain([draft("Draft one"), draft("Draft two")])
      .collect();

    let summary = summarize(&ideas);

    assert_eq!(summary.total_ideas, 9);
    assert_eq!(summary.published, 7);
    assert_eq!(summary.drafts, 2);
    assert_eq!(summary.total_votes, 28);
    assert_eq!(summary.top_voted.len(), 5);
    assert_eq!(summary.top_voted[0].votes(), 7);
    assert_eq!(summary.top_voted[4].votes(), 3);
  }

  #[test]
  fn test_scores() {
    let mut a = published("A", 0);
    a.evaluation = Some(evaluation(8.0, 6.0, 4.0));
    let mut b = published("B", 0);
    b.evaluation = Some(evaluation(10.0, 10.0, 10.0));
    let ideas = vec![a, b, published("C", 0)];

    let summary = summarize(&ideas);

    assert_eq!(summary.evaluated, 2);
    assert_eq!(summary.average_scores.desirability, 9.0);
    assert_eq!(summary.average_scores.feasibility, 8.0);
    assert_eq!(summary.average_scores.viability, 7.0);
    assert_eq!(summary.average_scores.overall, 8.0);
    assert_eq!(summary.top_rated[0].title, "B");
    assert_eq!(summary.top_rated.len(), 2);
  }

  #[test]
  fn test_clusters_sorted_by_size() {
    let mut ideas = vec![published("A", 0), published("B", 0), published("C", 0), draft("D")];
    ideas[0].cluster_name = Some("Small".into());
    ideas[1].cluster_name = Some("Large".into());
    ideas[2].cluster_name = Some("Large".into());

    let clusters = summarize(&ideas).clusters;

    assert_eq!(
      clusters,
      vec![
        ClusterCount { cluster_name: "Large".into(), ideas: 2 },
        ClusterCount { cluster_name: "Small".into(), ideas: 1 },
      ]
    );
  }
}
