//! Wires user actions to the idea store and the list pipeline

use crate::codec::template_csv;
use crate::error::{IdeasError, Result};
use crate::models::{ClusterConfig, EvaluationCriteria, Idea, SingleClusterSuggestion};
use crate::store::{IdeaBackend, IdeaStore};
use crate::view::pipeline::{derive, ListPage};
use crate::view::state::{PendingSuggestion, ViewEvent, ViewState};

/// Owns the store and the current view snapshot
///
/// Every failed workflow writes its message to the error slot of the snapshot and also returns
/// the error. Workflows that are already running, or whose subject is busy, are ignored.
pub struct ViewController<B: IdeaBackend> {
  store: IdeaStore<B>,
  state: ViewState,
}

impl<B: IdeaBackend> ViewController<B> {
  pub fn new(backend: B) -> Self {
    Self { store: IdeaStore::new(backend), state: ViewState::default() }
  }

  pub fn state(&self) -> &ViewState {
    &self.state
  }

  pub fn store(&self) -> &IdeaStore<B> {
    &self.store
  }

  pub fn dispatch(&mut self, event: ViewEvent) {
    self.state = self.state.apply(event);
  }

  /// The idea shown on the detail screen, if any
  pub fn selected_idea(&self) -> Option<&Idea> {
    self.state.selected_idea.as_deref().and_then(|id| self.store.get(id))
  }

  /// Derive the visible list and keep the stored page inside the valid range
  pub fn visible(&mut self) -> ListPage {
    let page = derive(self.store.ideas(), &self.state.query);
    if page.current_page != self.state.query.current_page {
      self.dispatch(ViewEvent::ChangePage(page.current_page));
    }
    page
  }

  pub async fn load(&mut self) -> Result<()> {
    let outcome = self.store.load().await;
    self.settle("Failed to load ideas", outcome)
  }

  /// Create a new idea, or update the selected one
  pub async fn save_idea(&mut self, title: &str, description: &str) -> Result<Idea> {
    let outcome = match self.state.selected_idea.clone() {
      Some(id) => self.store.update(&id, title, description).await,
      None => self.store.create(title, description).await,
    };
    let saved = self.settle("Failed to save idea", outcome)?;
    self.dispatch(ViewEvent::SelectIdea(saved.id.clone()));
    Ok(saved)
  }

  pub async fn publish(&mut self, id: &str) -> Result<Idea> {
    let outcome = self.store.publish(id).await;
    self.settle("Failed to publish idea", outcome)
  }

  pub async fn vote(&mut self, id: &str) -> Result<Idea> {
    let outcome = self.store.vote(id).await;
    self.settle("Failed to vote", outcome)
  }

  pub async fn delete(&mut self, id: &str) -> Result<()> {
    let outcome = self.store.delete(id).await;
    self.settle("Failed to delete idea", outcome)?;
    if self.state.selected_idea.as_deref() == Some(id) {
      self.dispatch(ViewEvent::ShowList);
    }
    Ok(())
  }

  /// Evaluate the ideas ticked in evaluation mode; returns how many were sent
  pub async fn start_evaluation(&mut self) -> Result<usize> {
    let ids: Vec<String> = self
      .state
      .selected_for_evaluation
      .iter()
      .filter(|id| self.store.get(id).is_some_and(Idea::is_eligible_for_evaluation))
      .cloned()
      .collect();

    if ids.is_empty() {
      return Ok(0);
    }

    self.dispatch(ViewEvent::EvaluationStarted);
    tracing::info!("Evaluating {} ideas", ids.len());
    let outcome = self.store.evaluate(&ids).await;
    self.settle("Error evaluating ideas", outcome)?;
    Ok(ids.len())
  }

  /// Run a clustering preview; `None` when a run is already in progress
  pub async fn start_clustering(&mut self, config: &ClusterConfig) -> Result<Option<usize>> {
    if self.state.is_clustering {
      return Ok(None);
    }

    self.dispatch(ViewEvent::ClusteringStarted);
    match self.store.cluster(config).await {
      Ok(clusters) => {
        let count = clusters.len();
        self.dispatch(ViewEvent::ClusteringFinished(clusters));
        Ok(Some(count))
      }
      Err(e) => {
        self.dispatch(ViewEvent::ClusteringFailed(format!("AI Clustering failed: {e}")));
        Err(e)
      }
    }
  }

  /// Persist the current preview onto the ideas
  pub async fn save_clusters(&mut self) -> Result<()> {
    let Some(clusters) = self.state.cluster_preview.clone() else {
      return Ok(());
    };

    let outcome = self.store.save_clusters(&clusters).await;
    self.settle("Failed to save clusters", outcome)?;
    self.dispatch(ViewEvent::PreviewDiscarded);
    Ok(())
  }

  pub fn discard_clusters(&mut self) {
    self.dispatch(ViewEvent::PreviewDiscarded);
  }

  pub async fn clear_clusters(&mut self) -> Result<()> {
    let outcome = self.store.clear_clusters().await;
    self.settle("Failed to clear clusters", outcome)
  }

  /// Ask for a cluster suggestion
  ///
  /// Only published, unclustered, idle ideas can be classified, and only once some cluster
  /// exists. Anything else is ignored and yields `None`.
  pub async fn classify(&mut self, id: &str) -> Result<Option<SingleClusterSuggestion>> {
    let eligible = self.store.get(id).is_some_and(Idea::is_eligible_for_classification);
    if !eligible || !self.store.has_clusters() {
      return Ok(None);
    }

    self.dispatch(ViewEvent::ErrorDismissed);
    let outcome = self.store.classify(id).await;
    let suggestion = self.settle("AI Classification failed", outcome)?;
    self.dispatch(ViewEvent::SuggestionReceived(PendingSuggestion {
      idea_id: id.to_string(),
      suggestion: suggestion.clone(),
    }));
    Ok(Some(suggestion))
  }

  /// Apply the pending suggestion to its idea
  pub async fn accept_suggestion(&mut self) -> Result<Option<Idea>> {
    let Some(pending) = self.state.suggestion.clone() else {
      return Ok(None);
    };

    let outcome = self.store.apply_classification(&pending.idea_id, &pending.suggestion).await;
    let classified = self.settle("Failed to apply classification", outcome)?;
    self.dispatch(ViewEvent::SuggestionClosed);
    Ok(Some(classified))
  }

  pub fn reject_suggestion(&mut self) {
    self.dispatch(ViewEvent::SuggestionClosed);
  }

  /// Upload a CSV or JSON file of ideas; returns how many were accepted
  pub async fn upload(&mut self, file_name: &str, content: &str) -> Result<usize> {
    let outcome = self.store.upload(file_name, content).await;
    let count = self.settle("Failed to upload ideas", outcome)?;
    if count > 0 {
      self.dispatch(ViewEvent::ShowList);
    }
    Ok(count)
  }

  pub fn export(&self) -> String {
    self.store.export_csv()
  }

  pub fn template(&self) -> &'static str {
    template_csv()
  }

  pub async fn save_criteria(&mut self, criteria: &EvaluationCriteria) -> Result<()> {
    let outcome = self.store.save_criteria(criteria).await;
    self.settle("Failed to save criteria", outcome)
  }

  fn settle<T>(&mut self, context: &str, outcome: Result<T>) -> Result<T> {
    outcome.inspect_err(|e: &IdeasError| {
      tracing::warn!("{}: {}", context, e);
      self.state = self.state.apply(ViewEvent::ErrorRaised(format!("{context}: {e}")));
    })
  }
}
