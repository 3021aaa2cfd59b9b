//! In-memory repository shared by the request handlers

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::codec::NewIdea;
use crate::error::{IdeasError, Result};
use crate::models::{AiActivity, EvaluationCriteria, Idea, IdeaCluster, IdeaEvaluation, IdeaStatus};
use crate::server::services::{ExistingCluster, IdeaAnalyst, IdeaBrief};
use crate::server::types::{ApiEvaluationCriteria, ApiIdea, IdeaUpdate};

/// Id of the single stored criteria record
const CRITERIA_ID: u32 = 1;

#[derive(Debug, Clone)]
struct StoredIdea {
  idea: Idea,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl StoredIdea {
  fn new(idea: Idea) -> Self {
    let now = Utc::now();
    Self { idea, created_at: now, updated_at: now }
  }

  fn to_api(&self) -> ApiIdea {
    ApiIdea::from_idea(&self.idea, self.created_at, self.updated_at)
  }

  fn touch(&mut self) {
    self.updated_at = Utc::now();
  }

  fn brief(&self) -> IdeaBrief {
    IdeaBrief {
      id: self.idea.id.clone(),
      title: self.idea.title.clone(),
      description: self.idea.description.clone(),
    }
  }
}

/// Ideas in insertion order plus the evaluation criteria record
#[derive(Debug, Default)]
pub struct Repository {
  ideas: Vec<StoredIdea>,
  criteria: Option<ApiEvaluationCriteria>,
}

impl Repository {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.ideas.len()
  }

  pub fn is_empty(&self) -> bool {
    self.ideas.is_empty()
  }

  fn find(&self, id: &str) -> Result<&StoredIdea> {
    self.ideas.iter().find(|s| s.idea.id == id).ok_or_else(|| IdeasError::idea_not_found(id))
  }

  fn find_mut(&mut self, id: &str) -> Result<&mut StoredIdea> {
    self.ideas.iter_mut().find(|s| s.idea.id == id).ok_or_else(|| IdeasError::idea_not_found(id))
  }

  pub fn list(&self) -> Vec<ApiIdea> {
    self.ideas.iter().map(StoredIdea::to_api).collect()
  }

  pub fn get(&self, id: &str) -> Result<ApiIdea> {
    self.find(id).map(StoredIdea::to_api)
  }

  pub fn create(&mut self, title: &str, description: &str) -> Result<ApiIdea> {
    if title.trim().is_empty() || description.trim().is_empty() {
      return Err(IdeasError::malformed_input("Title and description are required"));
    }
    let stored = StoredIdea::new(Idea::draft(title, description));
    let api = stored.to_api();
    self.ideas.push(stored);
    Ok(api)
  }

  /// Apply a partial update; status and votes may only move forward
  pub fn update(&mut self, id: &str, update: IdeaUpdate) -> Result<ApiIdea> {
    let stored = self.find_mut(id)?;
    let mut idea = stored.idea.clone();

    if let Some(title) = update.title {
      idea.title = title;
    }
    if let Some(description) = update.description {
      idea.description = description;
    }
    if let Some(cluster_name) = update.cluster_name {
      idea.cluster_name = Some(cluster_name).filter(|name| !name.is_empty());
    }
    match update.status {
      Some(IdeaStatus::Published) if !idea.is_published() => idea.publish()?,
      Some(IdeaStatus::Draft) if idea.is_published() => {
        return Err(IdeasError::invalid_transition(format!(
          "idea '{id}' cannot return to draft once published"
        )));
      }
      _ => {}
    }
    if let Some(votes) = update.votes {
      idea = with_votes(idea, votes)?;
    }

    stored.idea = idea;
    stored.touch();
    Ok(stored.to_api())
  }

  pub fn delete(&mut self, id: &str) -> Result<()> {
    let index = self
      .ideas
      .iter()
      .position(|s| s.idea.id == id)
      .ok_or_else(|| IdeasError::idea_not_found(id))?;
    self.ideas.remove(index);
    Ok(())
  }

  pub fn vote(&mut self, id: &str) -> Result<ApiIdea> {
    let stored = self.find_mut(id)?;
    stored.idea.vote()?;
    stored.touch();
    Ok(stored.to_api())
  }

  pub fn publish(&mut self, id: &str) -> Result<ApiIdea> {
    let stored = self.find_mut(id)?;
    stored.idea.publish()?;
    stored.touch();
    Ok(stored.to_api())
  }

  /// Append validated upload records as drafts
  pub fn import(&mut self, records: Vec<NewIdea>) -> usize {
    let count = records.len();
    self.ideas.extend(records.into_iter().map(|r| StoredIdea::new(r.into_idea())));
    count
  }

  /// Mark ideas as being evaluated and return what the analyst needs
  pub fn begin_evaluation(&mut self, ids: &[String]) -> Result<Vec<IdeaBrief>> {
    for id in ids {
      self.find(id)?;
    }
    let mut briefs = Vec::with_capacity(ids.len());
    for id in ids {
      let stored = self.find_mut(id)?;
      stored.idea.activity = AiActivity::Evaluating;
      briefs.push(stored.brief());
    }
    Ok(briefs)
  }

  /// Store a whole batch of evaluations, or none of them when `results` is `None`
  pub fn finish_evaluation(
    &mut self,
    ids: &[String],
    results: Option<Vec<(String, IdeaEvaluation)>>,
  ) {
    self.reset_activity(ids);
    for (id, evaluation) in results.into_iter().flatten() {
      if let Ok(stored) = self.find_mut(&id) {
        stored.idea.evaluation = Some(evaluation);
        stored.touch();
      }
    }
  }

  pub fn briefs(&self) -> Vec<IdeaBrief> {
    self.ideas.iter().map(StoredIdea::brief).collect()
  }

  /// Saved clusters in order of first appearance, with member titles
  pub fn existing_clusters(&self) -> Vec<ExistingCluster> {
    let mut clusters: Vec<ExistingCluster> = Vec::new();
    for stored in &self.ideas {
      let Some(name) = &stored.idea.cluster_name else {
        continue;
      };
      match clusters.iter_mut().find(|c| &c.name == name) {
        Some(cluster) => cluster.titles.push(stored.idea.title.clone()),
        None => clusters.push(ExistingCluster {
          name: name.clone(),
          titles: vec![stored.idea.title.clone()],
        }),
      }
    }
    clusters
  }

  pub fn begin_classification(&mut self, id: &str) -> Result<IdeaBrief> {
    let stored = self.find_mut(id)?;
    stored.idea.activity = AiActivity::Classifying;
    Ok(stored.brief())
  }

  pub fn finish_classification(&mut self, id: &str) {
    self.reset_activity(&[id.to_string()]);
  }

  /// Return the listed ideas to idle; unknown ids are skipped
  pub fn reset_activity(&mut self, ids: &[String]) {
    for stored in self.ideas.iter_mut().filter(|s| ids.contains(&s.idea.id)) {
      stored.idea.activity = AiActivity::Idle;
    }
  }

  /// Assign each listed idea its cluster name and return how many distinct ideas were
  /// assigned; unknown ids are skipped and a later cluster wins over an earlier one
  pub fn save_clusters(&mut self, clusters: &[IdeaCluster]) -> usize {
    let mut assigned: HashSet<String> = HashSet::new();
    for cluster in clusters {
      for id in &cluster.idea_ids {
        if let Ok(stored) = self.find_mut(id) {
          stored.idea.cluster_name = Some(cluster.cluster_name.clone());
          stored.touch();
          assigned.insert(id.clone());
        }
      }
    }
    assigned.len()
  }

  pub fn assign_cluster(&mut self, id: &str, cluster_name: &str) -> Result<ApiIdea> {
    let stored = self.find_mut(id)?;
    stored.idea.cluster_name = Some(cluster_name.to_string());
    stored.touch();
    Ok(stored.to_api())
  }

  pub fn clear_clusters(&mut self) {
    for stored in self.ideas.iter_mut().filter(|s| s.idea.cluster_name.is_some()) {
      stored.idea.cluster_name = None;
      stored.touch();
    }
  }

  pub fn criteria(&self) -> Option<&ApiEvaluationCriteria> {
    self.criteria.as_ref()
  }

  pub fn save_criteria(&mut self, criteria: EvaluationCriteria) -> ApiEvaluationCriteria {
    let now = Utc::now();
    let created_at = self.criteria.as_ref().map_or(now, |c| c.created_at);
    let stored = ApiEvaluationCriteria { id: CRITERIA_ID, criteria, created_at, updated_at: now };
    self.criteria = Some(stored.clone());
    stored
  }
}

fn with_votes(idea: Idea, votes: u32) -> Result<Idea> {
  if votes == idea.votes() {
    return Ok(idea);
  }
  if votes < idea.votes() {
    return Err(IdeasError::invalid_transition(format!(
      "votes for '{}' cannot decrease from {} to {votes}",
      idea.id,
      idea.votes()
    )));
  }
  if !idea.is_published() {
    return Err(IdeasError::invalid_transition(format!(
      "idea '{}' must be published before it can receive votes",
      idea.id
    )));
  }

  let mut next =
    Idea::restored(
      idea.id.clone(),
      idea.title.clone(),
      idea.description.clone(),
      idea.status(),
      votes,
    );
  next.evaluation = idea.evaluation;
  next.cluster_name = idea.cluster_name;
  next.activity = idea.activity;
  Ok(next)
}

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
  pub repo: Arc<RwLock<Repository>>,
  pub analyst: Arc<dyn IdeaAnalyst>,
}

impl AppState {
  pub fn new(analyst: Arc<dyn IdeaAnalyst>) -> Self {
    Self { repo: Arc::new(RwLock::new(Repository::new())), analyst }
  }
}

/// Puts ideas back to idle if a handler is dropped between its begin and finish phases.
///
/// Hyper drops the handler future when the client disconnects, so the finish phase after the
/// analyst call may never run. Call [`ActivityGuard::disarm`] once the finish phase is done.
pub struct ActivityGuard {
  repo: Arc<RwLock<Repository>>,
  ids: Vec<String>,
  armed: bool,
}

impl ActivityGuard {
  pub fn new(repo: Arc<RwLock<Repository>>, ids: Vec<String>) -> Self {
    Self { repo, ids, armed: true }
  }

  pub fn disarm(mut self) {
    self.armed = false;
  }
}

impl Drop for ActivityGuard {
  fn drop(&mut self) {
    if !self.armed {
      return;
    }
    let ids = std::mem::take(&mut self.ids);
    tracing::warn!("AI request for {} ideas was cancelled, resetting activity", ids.len());
    match self.repo.try_write() {
      Ok(mut repo) => repo.reset_activity(&ids),
      Err(_) => {
        let repo = Arc::clone(&self.repo);
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
          handle.spawn(async move { repo.write().await.reset_activity(&ids) });
        }
      }
    }
  }
}
