//! Immutable UI snapshots and the transitions between them

use crate::models::{IdeaCluster, SingleClusterSuggestion};
use crate::view::pipeline::{Column, ListQuery, SortConfig, StatusFilter, ViewMode};

/// Top-level screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
  #[default]
  Dashboard,
  List,
  Settings,
  /// Detail of `ViewState::selected_idea`, or an empty form when nothing is selected
  Detail,
}

/// A classification waiting for the user to accept or reject it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSuggestion {
  pub idea_id: String,
  pub suggestion: SingleClusterSuggestion,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewState {
  pub screen: Screen,
  pub selected_idea: Option<String>,
  pub query: ListQuery,
  /// Ideas ticked for a batch evaluation, in selection order
  pub selected_for_evaluation: Vec<String>,
  pub cluster_config_open: bool,
  pub is_clustering: bool,
  /// Unsaved clustering result
  pub cluster_preview: Option<Vec<IdeaCluster>>,
  pub suggestion: Option<PendingSuggestion>,
  /// The single dismissible error message
  pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
  ShowDashboard,
  ShowList,
  ShowSettings,
  AddNew,
  SelectIdea(String),
  SetStatusFilter(StatusFilter),
  SetColumnFilter(Column, String),
  RequestSort(Column),
  SetViewMode(ViewMode),
  ChangePage(usize),
  ToggleEvaluationMode,
  ToggleSelection(String),
  EvaluationStarted,
  OpenClusterConfig,
  CloseClusterConfig,
  ClusteringStarted,
  ClusteringFinished(Vec<IdeaCluster>),
  ClusteringFailed(String),
  PreviewDiscarded,
  SuggestionReceived(PendingSuggestion),
  SuggestionClosed,
  ErrorRaised(String),
  ErrorDismissed,
}

impl ViewState {
  pub fn in_evaluation_mode(&self) -> bool {
    self.query.evaluation_mode
  }

  /// Produce the snapshot that follows `event`
  pub fn apply(&self, event: ViewEvent) -> ViewState {
    let mut next = self.clone();

    match event {
      ViewEvent::ShowDashboard => {
        next.navigate(Screen::Dashboard, None);
        next.query.evaluation_mode = false;
      }
      ViewEvent::ShowList => next.navigate(Screen::List, None),
      ViewEvent::ShowSettings => {
        next.navigate(Screen::Settings, None);
        next.query.evaluation_mode = false;
      }
      ViewEvent::AddNew => {
        next.navigate(Screen::Detail, None);
        next.query.evaluation_mode = false;
      }
      ViewEvent::SelectIdea(id) => next.navigate(Screen::Detail, Some(id)),
      ViewEvent::SetStatusFilter(filter) => {
        next.query.status_filter = filter;
        next.query.current_page = 1;
      }
      ViewEvent::SetColumnFilter(column, value) => {
        next.query.column_filters.set(column, value);
        next.query.current_page = 1;
      }
      ViewEvent::RequestSort(column) => {
        next.query.sort = Some(SortConfig::toggled(self.query.sort, column));
      }
      ViewEvent::SetViewMode(mode) => next.query.view_mode = mode,
      ViewEvent::ChangePage(page) => next.query.current_page = page.max(1),
      ViewEvent::ToggleEvaluationMode => {
        next.query.evaluation_mode = !self.query.evaluation_mode;
        next.selected_for_evaluation.clear();
        next.error = None;
      }
      ViewEvent::ToggleSelection(id) => {
        if let Some(position) = next.selected_for_evaluation.iter().position(|s| *s == id) {
          next.selected_for_evaluation.remove(position);
        } else {
          next.selected_for_evaluation.push(id);
        }
      }
      ViewEvent::EvaluationStarted => {
        next.query.evaluation_mode = false;
        next.selected_for_evaluation.clear();
      }
      ViewEvent::OpenClusterConfig => next.cluster_config_open = true,
      ViewEvent::CloseClusterConfig => next.cluster_config_open = false,
      ViewEvent::ClusteringStarted => {
        next.is_clustering = true;
        next.cluster_config_open = false;
        next.error = None;
      }
      ViewEvent::ClusteringFinished(clusters) => {
        next.is_clustering = false;
        next.cluster_preview = Some(clusters);
      }
      ViewEvent::ClusteringFailed(message) => {
        next.is_clustering = false;
        next.error = Some(message);
      }
      ViewEvent::PreviewDiscarded => next.cluster_preview = None,
      ViewEvent::SuggestionReceived(pending) => next.suggestion = Some(pending),
      ViewEvent::SuggestionClosed => next.suggestion = None,
      ViewEvent::ErrorRaised(message) => next.error = Some(message),
      ViewEvent::ErrorDismissed => next.error = None,
    }

    next
  }

  fn navigate(&mut self, screen: Screen, selected: Option<String>) {
    self.screen = screen;
    self.selected_idea = selected;
    self.error = None;
  }
}
