//! The idea record and its lifecycle

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{IdeasError, Result};

/// Publication status of an idea
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IdeaStatus {
  Draft,
  Published,
}

impl IdeaStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      IdeaStatus::Draft => "DRAFT",
      IdeaStatus::Published => "PUBLISHED",
    }
  }
}

impl fmt::Display for IdeaStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Score and reasoning for a single evaluation criterion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CriterionScore {
  /// Score from 1 to 10
  pub score: f64,
  /// Reasoning for the score, based on the configured criterion
  pub reasoning: String,
}

/// AI assessment of an idea against the three evaluation criteria
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct IdeaEvaluation {
  /// One-paragraph overall impression of the idea
  pub summary: String,
  pub desirability: CriterionScore,
  pub feasibility: CriterionScore,
  pub viability: CriterionScore,
}

impl IdeaEvaluation {
  /// Mean of the three criterion scores
  pub fn average_score(&self) -> f64 {
    (self.desirability.score + self.feasibility.score + self.viability.score) / 3.0
  }
}

/// In-flight AI operation on an idea
///
/// `Evaluating` and `Classifying` are only ever set for the duration of a remote
/// call and must return to `Idle` whether the call succeeds or fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiActivity {
  #[default]
  Idle,
  Evaluating,
  Classifying,
}

impl AiActivity {
  /// Rebuild the activity from the backend's two flags
  pub fn from_flags(is_evaluating: bool, is_classifying: bool) -> Self {
    if is_evaluating {
      AiActivity::Evaluating
    } else if is_classifying {
      AiActivity::Classifying
    } else {
      AiActivity::Idle
    }
  }

  pub fn is_pending(&self) -> bool {
    !matches!(self, AiActivity::Idle)
  }
}

/// A user-submitted idea
///
/// Status and votes are private: the only ways to change them are [`Idea::publish`]
/// and [`Idea::vote`], which keeps the lifecycle one-way.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Idea {
  pub id: String,
  pub title: String,
  pub description: String,
  status: IdeaStatus,
  votes: u32,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub evaluation: Option<IdeaEvaluation>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub cluster_name: Option<String>,
  pub activity: AiActivity,
}

impl Idea {
  /// Create a fresh draft with a newly generated id
  pub fn draft(title: impl Into<String>, description: impl Into<String>) -> Self {
    Self {
      id: Uuid::new_v4().to_string(),
      title: title.into(),
      description: description.into(),
      status: IdeaStatus::Draft,
      votes: 0,
      evaluation: None,
      cluster_name: None,
      activity: AiActivity::Idle,
    }
  }

  /// Rebuild an idea from a backend snapshot
  pub fn restored(
    id: impl Into<String>,
    title: impl Into<String>,
    description: impl Into<String>,
    status: IdeaStatus,
    votes: u32,
  ) -> Self {
    Self {
      id: id.into(),
      title: title.into(),
      description: description.into(),
      status,
      votes,
      evaluation: None,
      cluster_name: None,
      activity: AiActivity::Idle,
    }
  }

  pub fn status(&self) -> IdeaStatus {
    self.status
  }

  pub fn votes(&self) -> u32 {
    self.votes
  }

  pub fn is_published(&self) -> bool {
    self.status == IdeaStatus::Published
  }

  /// Move a draft to `PUBLISHED`
  pub fn publish(&mut self) -> Result<()> {
    if self.is_published() {
      let message = format!("idea '{}' is already published", self.id);
      return Err(IdeasError::invalid_transition(message));
    }
    self.status = IdeaStatus::Published;
    Ok(())
  }

  /// Add one vote to a published idea
  pub fn vote(&mut self) -> Result<u32> {
    if !self.is_published() {
      return Err(IdeasError::invalid_transition(format!(
        "idea '{}' must be published before it can receive votes",
        self.id
      )));
    }
    self.votes = self.votes.saturating_add(1);
    Ok(self.votes)
  }

  /// Average AI score, `None` until the idea has been evaluated
  pub fn average_score(&self) -> Option<f64> {
    self.evaluation.as_ref().map(IdeaEvaluation::average_score)
  }

  /// Published, not yet evaluated and not busy
  pub fn is_eligible_for_evaluation(&self) -> bool {
    self.is_published() && self.evaluation.is_none() && !self.activity.is_pending()
  }

  /// Published, unclustered and not busy; the caller decides whether clusters exist
  pub fn is_eligible_for_classification(&self) -> bool {
    self.is_published() && self.cluster_name.is_none() && !self.activity.is_pending()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::fixtures::evaluation;

  #[test]
  fn test_fresh_idea_starts_as_draft() {
    let idea = Idea::draft("Garden robot", "Waters plants");
    assert_eq!(idea.status(), IdeaStatus::Draft);
    assert_eq!(idea.votes(), 0);
    assert_eq!(idea.activity, AiActivity::Idle);
    assert!(Uuid::parse_str(&idea.id).is_ok());
  }

  #[test]
  fn test_publish_then_vote_twice() -> Result<()> {
    let mut idea = Idea::draft("Garden robot", "Waters plants");
    idea.publish()?;
    idea.vote()?;
    idea.vote()?;

    assert_eq!(idea.status(), IdeaStatus::Published);
    assert_eq!(idea.votes(), 2);
    Ok(())
  }

  #[test]
  fn test_lifecycle_is_one_way() {
    let mut idea = Idea::draft("Garden robot", "Waters plants");
    assert!(matches!(idea.vote(), Err(IdeasError::InvalidTransition { .. })));
    assert_eq!(idea.votes(), 0);

    idea.publish().unwrap();
    assert!(idea.publish().is_err());
    assert_eq!(idea.status(), IdeaStatus::Published);
  }

  #[test]
  fn test_average_score() {
    let mut idea = Idea::draft("AR chess", "Animated pieces");
    assert_eq!(idea.average_score(), None);

    idea.evaluation = Some(evaluation(9.0, 6.0, 6.0));
    assert_eq!(idea.average_score(), Some(7.0));
  }

  #[test]
  fn test_evaluation_eligibility() {
    let mut idea = Idea::draft("AR chess", "Animated pieces");
    assert!(!idea.is_eligible_for_evaluation());

    idea.publish().unwrap();
    assert!(idea.is_eligible_for_evaluation());

    idea.activity = AiActivity::Evaluating;
    assert!(!idea.is_eligible_for_evaluation());

    idea.activity = AiActivity::Idle;
    idea.evaluation = Some(evaluation(5.0, 5.0, 5.0));
    assert!(!idea.is_eligible_for_evaluation());
  }

  #[test]
  fn test_activity_from_flags() {
    assert_eq!(AiActivity::from_flags(false, false), AiActivity::Idle);
    assert_eq!(AiActivity::from_flags(true, false), AiActivity::Evaluating);
    assert_eq!(AiActivity::from_flags(false, true), AiActivity::Classifying);
  }

  #[test]
  fn test_status_serializes_uppercase() {
    assert_eq!(serde_json::to_string(&IdeaStatus::Published).unwrap(), "\"PUBLISHED\"");
    let status: IdeaStatus = serde_json::from_str("\"DRAFT\"").unwrap();
    assert_eq!(status, IdeaStatus::Draft);
  }
}
