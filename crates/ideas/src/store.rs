//! Client-side cache of ideas and evaluation criteria

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::codec::{export_ideas, parse_upload};
use crate::error::{IdeasError, Result};
use crate::models::{
  AiActivity, ClusterConfig, EvaluationCriteria, Idea, IdeaCluster, SingleClusterSuggestion,
};

/// Health information reported by a backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendStatus {
  pub status: String,
  pub version: String,
  pub ideas: usize,
}

/// Remote service that owns the canonical ideas
///
/// Every failure is reported as [`IdeasError::RemoteOperation`] naming the operation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdeaBackend: Send + Sync {
  async fn list_ideas(&self) -> Result<Vec<Idea>>;
  async fn get_idea(&self, id: &str) -> Result<Idea>;
  async fn create_idea(&self, title: &str, description: &str) -> Result<Idea>;
  async fn update_idea(&self, id: &str, title: &str, description: &str) -> Result<Idea>;
  async fn delete_idea(&self, id: &str) -> Result<()>;
  async fn vote(&self, id: &str) -> Result<Idea>;
  async fn publish(&self, id: &str) -> Result<Idea>;
  async fn upload(&self, file_name: &str, content: &str) -> Result<String>;
  async fn evaluate(&self, ids: &[String]) -> Result<()>;
  async fn cluster(&self, config: &ClusterConfig) -> Result<Vec<IdeaCluster>>;
  async fn save_clusters(&self, clusters: &[IdeaCluster]) -> Result<()>;
  async fn classify(&self, id: &str) -> Result<SingleClusterSuggestion>;
  async fn apply_classification(
    &self,
    id: &str,
    suggestion: &SingleClusterSuggestion,
  ) -> Result<Idea>;
  async fn clear_clusters(&self) -> Result<()>;
  async fn get_criteria(&self) -> Result<Option<EvaluationCriteria>>;
  async fn save_criteria(&self, criteria: &EvaluationCriteria) -> Result<EvaluationCriteria>;
  async fn status(&self) -> Result<BackendStatus>;
}

/// Authoritative in-memory copy of the backend's ideas
///
/// Mutations go to the backend first and are followed by a full reload, so readers only ever
/// see a snapshot the backend has confirmed. The only local edits are the transient AI flags.
pub struct IdeaStore<B: IdeaBackend> {
  backend: B,
  ideas: Vec<Idea>,
  criteria: EvaluationCriteria,
}

impl<B: IdeaBackend> IdeaStore<B> {
  pub fn new(backend: B) -> Self {
    Self { backend, ideas: Vec::new(), criteria: EvaluationCriteria::default() }
  }

  pub fn backend(&self) -> &B {
    &self.backend
  }

  pub fn ideas(&self) -> &[Idea] {
    &self.ideas
  }

  pub fn get(&self, id: &str) -> Option<&Idea> {
    self.ideas.iter().find(|idea| idea.id == id)
  }

  pub fn criteria(&self) -> &EvaluationCriteria {
    &self.criteria
  }

  /// Whether any idea carries a saved cluster
  pub fn has_clusters(&self) -> bool {
    self.ideas.iter().any(|idea| idea.cluster_name.is_some())
  }

  /// Fetch ideas and criteria; missing criteria fall back to the defaults
  pub async fn load(&mut self) -> Result<()> {
    self.reload().await?;
    self.criteria = self.backend.get_criteria().await?.unwrap_or_default();
    Ok(())
  }

  pub async fn reload(&mut self) -> Result<()> {
    self.ideas = self.backend.list_ideas().await?;
    tracing::debug!("Loaded {} ideas", self.ideas.len());
    Ok(())
  }

  pub async fn create(&mut self, title: &str, description: &str) -> Result<Idea> {
    require_text(title, description)?;
    let created = self.backend.create_idea(title, description).await?;
    self.reload().await?;
    Ok(created)
  }

  pub async fn update(&mut self, id: &str, title: &str, description: &str) -> Result<Idea> {
    self.require(id)?;
    require_text(title, description)?;
    let updated = self.backend.update_idea(id, title, description).await?;
    self.reload().await?;
    Ok(updated)
  }

  pub async fn delete(&mut self, id: &str) -> Result<()> {
    self.require(id)?;
    self.backend.delete_idea(id).await?;
    self.reload().await
  }

  /// Vote on a published idea
  pub async fn vote(&mut self, id: &str) -> Result<Idea> {
    self.require(id)?.clone().vote()?;
    let voted = self.backend.vote(id).await?;
    self.reload().await?;
    Ok(voted)
  }

  /// Publish a draft
  pub async fn publish(&mut self, id: &str) -> Result<Idea> {
    self.require(id)?.clone().publish()?;
    let published = self.backend.publish(id).await?;
    self.reload().await?;
    Ok(published)
  }

  /// Validate the file locally, then hand it to the backend; returns how many ideas it held
  pub async fn upload(&mut self, file_name: &str, content: &str) -> Result<usize> {
    let accepted = parse_upload(file_name, content)?;
    if accepted.is_empty() {
      return Ok(0);
    }

    let message = self.backend.upload(file_name, content).await?;
    tracing::info!("{}", message);
    self.reload().await?;
    Ok(accepted.len())
  }

  pub fn export_csv(&self) -> String {
    export_ideas(&self.ideas)
  }

  /// Evaluate a batch of ideas
  ///
  /// Every selected idea is marked `Evaluating` until the batch settles. On any failure the
  /// whole selection goes back to `Idle`.
  pub async fn evaluate(&mut self, ids: &[String]) -> Result<()> {
    self.set_activity(ids, AiActivity::Evaluating);

    let outcome = match self.backend.evaluate(ids).await {
      Ok(()) => self.reload().await,
      Err(e) => Err(e),
    };

    if outcome.is_err() {
      self.set_activity(ids, AiActivity::Idle);
    }
    outcome
  }

  /// Ask the backend for a cluster preview; nothing is stored
  pub async fn cluster(&self, config: &ClusterConfig) -> Result<Vec<IdeaCluster>> {
    self.backend.cluster(config).await
  }

  pub async fn save_clusters(&mut self, clusters: &[IdeaCluster]) -> Result<()> {
    self.backend.save_clusters(clusters).await?;
    self.reload().await
  }

  pub async fn clear_clusters(&mut self) -> Result<()> {
    self.backend.clear_clusters().await?;
    self.reload().await
  }

  /// Ask for a cluster suggestion for one idea
  ///
  /// The snapshot is not marked while the call runs; the server's `is_classifying` flag is
  /// what other clients observe.
  pub async fn classify(&mut self, id: &str) -> Result<SingleClusterSuggestion> {
    self.require(id)?;
    self.backend.classify(id).await
  }

  pub async fn apply_classification(
    &mut self,
    id: &str,
    suggestion: &SingleClusterSuggestion,
  ) -> Result<Idea> {
    self.require(id)?;
    let classified = self.backend.apply_classification(id, suggestion).await?;
    self.reload().await?;
    Ok(classified)
  }

  pub async fn save_criteria(&mut self, criteria: &EvaluationCriteria) -> Result<()> {
    self.criteria = self.backend.save_criteria(criteria).await?;
    Ok(())
  }

  fn require(&self, id: &str) -> Result<&Idea> {
    self.get(id).ok_or_else(|| IdeasError::idea_not_found(id))
  }

  fn set_activity(&mut self, ids: &[String], activity: AiActivity) {
    for idea in self.ideas.iter_mut().filter(|idea| ids.contains(&idea.id)) {
      idea.activity = activity;
    }
  }
}

fn require_text(title: &str, description: &str) -> Result<()> {
  if title.trim().is_empty() || description.trim().is_empty() {
    return Err(IdeasError::malformed_input("Title and description are required."));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::fixtures::{draft, evaluation, published};
  use crate::models::SuggestionType;

  fn store_with(mut mock: MockIdeaBackend, ideas: Vec<Idea>) -> IdeaStore<MockIdeaBackend> {
    mock.expect_list_ideas().returning(move || Ok(ideas.clone()));
    IdeaStore::new(mock)
  }

  #[tokio::test]
  async fn test_load_falls_back_to_default_criteria() -> Result<()> {
    let mut mock = MockIdeaBackend::new();
    mock.expect_get_criteria().times(1).returning(|| Ok(None));
    let mut store = store_with(mock, vec![published("Garden robot", 2)]);

    store.load().await?;

    assert_eq!(store.ideas().len(), 1);
    assert_eq!(store.criteria(), &EvaluationCriteria::default());
    Ok(())
  }

  #[tokio::test]
  async fn test_vote_on_draft_never_reaches_backend() -> Result<()> {
    let mut mock = MockIdeaBackend::new();
    mock.expect_vote().times(0);
    let mut store = store_with(mock, vec![draft("Garden robot")]);
    store.reload().await?;

    let result = store.vote("garden-robot").await;

    assert!(matches!(result, Err(IdeasError::InvalidTransition { .. })));
    Ok(())
  }

  #[tokio::test]
  async fn test_vote_reloads_after_mutation() -> Result<()> {
    let mut mock = MockIdeaBackend::new();
    mock
      .expect_vote()
      .withf(|id| id == "garden-robot")
      .times(1)
      .returning(|_| Ok(published("Garden robot", 3)));
    let mut snapshots =
      vec![vec![published("Garden robot", 3)], vec![published("Garden robot", 2)]];
    mock.expect_list_ideas().times(2).returning(move || Ok(snapshots.pop().unwrap_or_default()));
    let mut store = IdeaStore::new(mock);
    store.reload().await?;

    let voted = store.vote("garden-robot").await?;

    assert_eq!(voted.votes(), 3);
    assert_eq!(store.get("garden-robot").map(Idea::votes), Some(3));
    Ok(())
  }

  #[tokio::test]
  async fn test_unknown_idea() {
    let mut store = store_with(MockIdeaBackend::new(), vec![]);
    assert!(matches!(store.publish("missing").await, Err(IdeasError::IdeaNotFound { .. })));
  }

  #[tokio::test]
  async fn test_failed_evaluation_resets_every_selected_idea() -> Result<()> {
    let mut mock = MockIdeaBackend::new();
    mock
      .expect_evaluate()
      .withf(|ids| ids.len() == 2)
      .times(1)
      .returning(|_| Err(IdeasError::remote("Evaluate ideas", "HTTP 502")));
    let mut store = store_with(mock, vec![published("A", 0), published("B", 0), published("C", 0)]);
    store.reload().await?;

    let result = store.evaluate(&["a".to_string(), "b".to_string()]).await;

    assert!(matches!(result, Err(IdeasError::RemoteOperation { .. })));
    assert!(store.ideas().iter().all(|idea| idea.activity == AiActivity::Idle));
    Ok(())
  }

  #[tokio::test]
  async fn test_successful_evaluation_takes_backend_snapshot() -> Result<()> {
    let mut evaluated = published("A", 0);
    evaluated.evaluation = Some(evaluation(7.0, 7.0, 7.0));

    let mut mock = MockIdeaBackend::new();
    let mut snapshots = vec![vec![evaluated], vec![published("A", 0)]];
    mock.expect_list_ideas().times(2).returning(move || Ok(snapshots.pop().unwrap_or_default()));
    mock.expect_evaluate().times(1).returning(|_| Ok(()));
    let mut store = IdeaStore::new(mock);
    store.reload().await?;

    store.evaluate(&["a".to_string()]).await?;

    let idea = store.get("a").unwrap();
    assert_eq!(idea.average_score(), Some(7.0));
    assert_eq!(idea.activity, AiActivity::Idle);
    Ok(())
  }

  #[tokio::test]
  async fn test_failed_classify_leaves_idea_idle() -> Result<()> {
    let mut mock = MockIdeaBackend::new();
    mock
      .expect_classify()
      .times(1)
      .returning(|_| Err(IdeasError::remote("Classify idea", "timeout")));
    let mut store = store_with(mock, vec![published("A", 0)]);
    store.reload().await?;

    assert!(store.classify("a").await.is_err());
    assert_eq!(store.get("a").unwrap().activity, AiActivity::Idle);
    Ok(())
  }

  #[tokio::test]
  async fn test_classify_returns_suggestion() -> Result<()> {
    let mut mock = MockIdeaBackend::new();
    mock.expect_classify().times(1).returning(|_| {
      Ok(SingleClusterSuggestion {
        reasoning: "fits".into(),
        suggestion_type: SuggestionType::NewCluster,
        cluster_name: "Gardening".into(),
      })
    });
    let mut store = store_with(mock, vec![published("A", 0)]);
    store.reload().await?;

    let suggestion = store.classify("a").await?;

    assert_eq!(suggestion.cluster_name, "Gardening");
    assert_eq!(store.get("a").unwrap().activity, AiActivity::Idle);
    Ok(())
  }

  #[tokio::test]
  async fn test_malformed_upload_creates_nothing() {
    let mut mock = MockIdeaBackend::new();
    mock.expect_upload().times(0);
    let mut store = store_with(mock, vec![]);

    let result = store.upload("ideas.csv", "title,summary\nA,B").await;

    assert!(matches!(result, Err(IdeasError::MalformedInput { .. })));
    assert!(store.ideas().is_empty());
  }

  #[tokio::test]
  async fn test_upload_forwards_validated_file() -> Result<()> {
    let mut mock = MockIdeaBackend::new();
    mock
      .expect_upload()
      .withf(|name, _| name == "ideas.csv")
      .times(1)
      .returning(|_, _| Ok("Successfully uploaded 1 ideas".into()));
    let mut store = store_with(mock, vec![draft("Idea A")]);

    let count = store.upload("ideas.csv", "title,description\nIdea A,Desc A\n,Desc B").await?;

    assert_eq!(count, 1);
    assert_eq!(store.ideas().len(), 1);
    Ok(())
  }

  #[tokio::test]
  async fn test_create_requires_text() {
    let mut mock = MockIdeaBackend::new();
    mock.expect_create_idea().times(0);
    let mut store = store_with(mock, vec![]);

    assert!(store.create("  ", "Something").await.is_err());
  }

  #[tokio::test]
  async fn test_has_clusters() -> Result<()> {
    let mut clustered = published("A", 0);
    clustered.cluster_name = Some("Home".into());
    let mut store = store_with(MockIdeaBackend::new(), vec![clustered, published("B", 0)]);

    assert!(!store.has_clusters());
    store.reload().await?;
    assert!(store.has_clusters());
    Ok(())
  }
}
