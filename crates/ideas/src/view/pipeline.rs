//! Filter, sort and paginate the displayed idea list

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::models::{Idea, IdeaStatus};

pub const PAGE_SIZE: usize = 10;

/// Status buttons above the list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusFilter {
  #[default]
  All,
  Draft,
  Published,
}

impl StatusFilter {
  fn admits(&self, status: IdeaStatus) -> bool {
    match self {
      StatusFilter::All => true,
      StatusFilter::Draft => status == IdeaStatus::Draft,
      StatusFilter::Published => status == IdeaStatus::Published,
    }
  }
}

/// Per-column text filters of the table view; an empty string is inactive
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ColumnFilters {
  pub title: String,
  pub status: String,
  pub votes: String,
  pub ai_score: String,
  pub cluster: String,
}

/// Table column a filter or sort applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
  Title,
  Status,
  Votes,
  Cluster,
  AiScore,
}

impl ColumnFilters {
  pub fn set(&mut self, column: Column, value: impl Into<String>) {
    let value = value.into();
    match column {
      Column::Title => self.title = value,
      Column::Status => self.status = value,
      Column::Votes => self.votes = value,
      Column::Cluster => self.cluster = value,
      Column::AiScore => self.ai_score = value,
    }
  }

  fn admits(&self, idea: &Idea) -> bool {
    contains_ignore_case(&idea.title, &self.title)
      && contains_ignore_case(idea.status().as_str(), &self.status)
      && self.admits_cluster(idea)
      && at_least(&self.votes, Some(f64::from(idea.votes())))
      && at_least(&self.ai_score, idea.average_score())
  }

  fn admits_cluster(&self, idea: &Idea) -> bool {
    if self.cluster.is_empty() {
      return true;
    }
    idea.cluster_name.as_deref().is_some_and(|name| contains_ignore_case(name, &self.cluster))
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
  #[default]
  Ascending,
  Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortConfig {
  pub key: Column,
  pub direction: SortDirection,
}

impl SortConfig {
  pub fn ascending(key: Column) -> Self {
    Self { key, direction: SortDirection::Ascending }
  }

  /// Next sort after the user clicks `key`: a second click on an ascending column flips it
  pub fn toggled(current: Option<SortConfig>, key: Column) -> Self {
    match current {
      Some(SortConfig { key: current_key, direction: SortDirection::Ascending })
        if current_key == key =>
      {
        Self { key, direction: SortDirection::Descending }
      }
      _ => Self::ascending(key),
    }
  }

  fn compare(&self, a: &Idea, b: &Idea) -> Ordering {
    let ordering = match self.key {
      Column::Title => a.title.cmp(&b.title),
      Column::Status => a.status().cmp(&b.status()),
      Column::Votes => a.votes().cmp(&b.votes()),
      Column::Cluster => {
        a.cluster_name.as_deref().unwrap_or("").cmp(b.cluster_name.as_deref().unwrap_or(""))
      }
      Column::AiScore => {
        let score = |idea: &Idea| idea.average_score().unwrap_or(-1.0);
        score(a).partial_cmp(&score(b)).unwrap_or(Ordering::Equal)
      }
    };

    match self.direction {
      SortDirection::Ascending => ordering,
      SortDirection::Descending => ordering.reverse(),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
  #[default]
  Card,
  Table,
}

/// Everything the list derivation depends on besides the ideas themselves
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
  pub status_filter: StatusFilter,
  pub column_filters: ColumnFilters,
  pub sort: Option<SortConfig>,
  pub view_mode: ViewMode,
  pub evaluation_mode: bool,
  pub current_page: usize,
}

impl Default for ListQuery {
  fn default() -> Self {
    Self {
      status_filter: StatusFilter::All,
      column_filters: ColumnFilters::default(),
      sort: Some(SortConfig::ascending(Column::Title)),
      view_mode: ViewMode::Card,
      evaluation_mode: false,
      current_page: 1,
    }
  }
}

/// The slice of ideas to render
#[derive(Debug, Clone, PartialEq)]
pub struct ListPage {
  pub ideas: Vec<Idea>,
  pub total_pages: usize,
  /// Requested page clamped into `1..=total_pages`
  pub current_page: usize,
  /// Ideas that passed the filters, across all pages
  pub filtered_count: usize,
}

/// Run the status filter, column filters, sort and pagination stages in order
pub fn derive(ideas: &[Idea], query: &ListQuery) -> ListPage {
  let table = query.view_mode == ViewMode::Table;

  let mut filtered: Vec<&Idea> = ideas
    .iter()
    .filter(|idea| query.evaluation_mode || query.status_filter.admits(idea.status()))
    .filter(|idea| !table || query.column_filters.admits(idea))
    .collect();

  if let Some(sort) = query.sort.filter(|_| table) {
    filtered.sort_by(|a, b| sort.compare(a, b));
  }

  let filtered_count = filtered.len();
  if !table {
    return ListPage {
      ideas: filtered.into_iter().cloned().collect(),
      total_pages: 1,
      current_page: 1,
      filtered_count,
    };
  }

  let total_pages = filtered_count.div_ceil(PAGE_SIZE).max(1);
  let current_page = query.current_page.clamp(1, total_pages);
  let start = (current_page - 1) * PAGE_SIZE;

  ListPage {
    ideas: filtered.into_iter().skip(start).take(PAGE_SIZE).cloned().collect(),
    total_pages,
    current_page,
    filtered_count,
  }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
  needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// A numeric filter keeps values at or above its threshold; an unparseable filter keeps everything
fn at_least(filter: &str, value: Option<f64>) -> bool {
  match parse_leading_number(filter) {
    Some(threshold) => value.is_some_and(|v| v >= threshold),
    None => true,
  }
}

/// Parse the longest numeric prefix after leading whitespace, e.g. `"7.5 or more"` is `7.5`
pub fn parse_leading_number(text: &str) -> Option<f64> {
  let text = text.trim_start();
  let bytes = text.as_bytes();
  let digits_from = |mut i: usize| {
    while i < bytes.len() && bytes[i].is_ascii_digit() {
      i += 1;
    }
    i
  };

  let mut end = 0;
  if matches!(bytes.first(), Some(b'+' | b'-')) {
    end = 1;
  }
  if text[end..].starts_with("Infinity") {
    return text[..end + "Infinity".len()].replace("Infinity", "inf").parse().ok();
  }

  let int_end = digits_from(end);
  let mut mantissa_end = int_end;
  if bytes.get(int_end) == Some(&b'.') {
    mantissa_end = digits_from(int_end + 1);
  }
  let has_digits = int_end > end || mantissa_end > int_end + 1;
  if !has_digits {
    return None;
  }
  end = mantissa_end;

  if matches!(bytes.get(end), Some(b'e' | b'E')) {
    let mut exp_start = end + 1;
    if matches!(bytes.get(exp_start), Some(b'+' | b'-')) {
      exp_start += 1;
    }
    let exp_end = digits_from(exp_start);
    if exp_end > exp_start {
      end = exp_end;
    }
  }

  text[..end].parse().ok()
}
