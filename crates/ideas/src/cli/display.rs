//! Display formatting utilities for CLI output

use colored::*;

use crate::models::{
  AiActivity, CriterionScore, Idea, IdeaCluster, IdeaStatus, SingleClusterSuggestion,
  SuggestionType,
};
use crate::view::{DashboardSummary, ListPage};

const CARD_WIDTH: usize = 76;
const TITLE_COLUMN: usize = 32;
const CLUSTER_COLUMN: usize = 20;
const ID_PREFIX: usize = 8;

/// Wrap text to fit within a specified width
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
  let mut lines = Vec::new();

  for paragraph in text.split('\n') {
    if paragraph.trim().is_empty() {
      lines.push(String::new());
      continue;
    }

    let mut current_line = String::new();
    for word in paragraph.split_whitespace() {
      if current_line.is_empty() {
        current_line = word.to_string();
      } else if current_line.chars().count() + 1 + word.chars().count() <= width {
        current_line.push(' ');
        current_line.push_str(word);
      } else {
        lines.push(std::mem::take(&mut current_line));
        current_line = word.to_string();
      }
    }

    if !current_line.is_empty() {
      lines.push(current_line);
    }
  }

  lines
}

/// Cut text to `width` characters, marking the cut with an ellipsis
pub fn truncate(text: &str, width: usize) -> String {
  if text.chars().count() <= width {
    return text.to_string();
  }
  let kept: String = text.chars().take(width.saturating_sub(1)).collect();
  format!("{kept}…")
}

pub fn format_score(score: Option<f64>) -> String {
  score.map_or_else(|| "-".to_string(), |s| format!("{s:.1}"))
}

fn short_id(id: &str) -> &str {
  id.get(..ID_PREFIX).unwrap_or(id)
}

fn status_badge(status: IdeaStatus) -> ColoredString {
  match status {
    IdeaStatus::Draft => status.as_str().yellow(),
    IdeaStatus::Published => status.as_str().green(),
  }
}

fn activity_note(idea: &Idea) -> Option<ColoredString> {
  match idea.activity {
    AiActivity::Idle => None,
    AiActivity::Evaluating => Some("evaluating…".magenta()),
    AiActivity::Classifying => Some("classifying…".magenta()),
  }
}

/// One idea as a card: title line, metadata line and wrapped description
pub fn display_idea_card(idea: &Idea) {
  println!("{} {}", "💡".yellow(), idea.title.bold());

  let mut meta = vec![
    format!("{}", short_id(&idea.id).dimmed()),
    format!("{}", status_badge(idea.status())),
  ];
  if idea.is_published() {
    meta.push(format!("{} votes", idea.votes().to_string().cyan()));
  }
  if let Some(score) = idea.average_score() {
    meta.push(format!("AI {}", format_score(Some(score)).blue()));
  }
  if let Some(cluster) = &idea.cluster_name {
    meta.push(format!("[{}]", cluster.magenta()));
  }
  if let Some(note) = activity_note(idea) {
    meta.push(note.to_string());
  }
  println!("   {}", meta.join("  "));

  for line in wrap_text(&idea.description, CARD_WIDTH) {
    println!("   {}", line.dimmed());
  }
  println!();
}

/// Ideas as an aligned table
pub fn display_idea_table(ideas: &[Idea]) {
  println!(
    "{}",
    format!(
      "{:<8}  {:<32}  {:<9}  {:>5}  {:<20}  {:>8}",
      "ID", "TITLE", "STATUS", "VOTES", "CLUSTER", "AI SCORE"
    )
    .bold()
  );

  for idea in ideas {
    let cluster = idea.cluster_name.as_deref().unwrap_or("-");
    println!(
      "{:<8}  {:<32}  {:<9}  {:>5}  {:<20}  {:>8}",
      short_id(&idea.id),
      truncate(&idea.title, TITLE_COLUMN),
      status_badge(idea.status()),
      idea.votes(),
      truncate(cluster, CLUSTER_COLUMN),
      format_score(idea.average_score()),
    );
  }
}

pub fn display_page_footer(page: &ListPage) {
  println!(
    "{}",
    format!(
      "Page {} of {} ({} matching ideas)",
      page.current_page, page.total_pages, page.filtered_count
    )
    .dimmed()
  );
}

fn display_criterion(name: &str, score: &CriterionScore) {
  println!("  {} {}/10", format!("{name}:").bold(), format_score(Some(score.score)).blue());
  for line in wrap_text(&score.reasoning, CARD_WIDTH - 4) {
    println!("    {}", line.dimmed());
  }
}

/// Everything known about one idea, including its evaluation
pub fn display_idea_detail(idea: &Idea) {
  println!("{}", idea.title.bold().underline());
  println!("{} {}", "ID:".dimmed(), idea.id);
  println!("{} {}", "Status:".dimmed(), status_badge(idea.status()));
  println!("{} {}", "Votes:".dimmed(), idea.votes());
  if let Some(cluster) = &idea.cluster_name {
    println!("{} {}", "Cluster:".dimmed(), cluster.magenta());
  }
  if let Some(note) = activity_note(idea) {
    println!("{} {}", "AI:".dimmed(), note);
  }
  println!();
  for line in wrap_text(&idea.description, CARD_WIDTH) {
    println!("{line}");
  }

  if let Some(evaluation) = &idea.evaluation {
    println!();
    println!(
      "{} {}",
      "🤖 AI Evaluation".cyan().bold(),
      format!("(average {})", format_score(Some(evaluation.average_score()))).dimmed()
    );
    for line in wrap_text(&evaluation.summary, CARD_WIDTH - 2) {
      println!("  {line}");
    }
    display_criterion("Desirability", &evaluation.desirability);
    display_criterion("Feasibility", &evaluation.feasibility);
    display_criterion("Viability", &evaluation.viability);
  }
}

/// A clustering preview with member titles resolved from the loaded ideas
pub fn display_clusters(clusters: &[IdeaCluster], ideas: &[Idea]) {
  for cluster in clusters {
    println!(
      "{} {} {}",
      "📂".cyan(),
      cluster.cluster_name.blue().bold(),
      format!("({} ideas)", cluster.idea_ids.len()).dimmed()
    );
    for line in wrap_text(&cluster.cluster_description, CARD_WIDTH - 3) {
      println!("   {}", line.dimmed());
    }
    for id in &cluster.idea_ids {
      let title = ideas.iter().find(|i| &i.id == id).map_or(id.as_str(), |i| i.title.as_str());
      println!("   {} {}", "•".yellow(), title);
    }
    println!();
  }
}

pub fn display_suggestion(suggestion: &SingleClusterSuggestion) {
  let kind = match suggestion.suggestion_type {
    SuggestionType::ExistingCluster => "existing cluster".green(),
    SuggestionType::NewCluster => "new cluster".yellow(),
  };
  println!("{} {} ({})", "Suggested:".bold(), suggestion.cluster_name.magenta().bold(), kind);
  for line in wrap_text(&suggestion.reasoning, CARD_WIDTH) {
    println!("  {}", line.dimmed());
  }
}

pub fn display_dashboard(summary: &DashboardSummary) {
  println!("{}", "📊 Idea Dashboard".bold());
  println!(
    "  {} total  {} published  {} drafts  {} votes",
    summary.total_ideas.to_string().bold(),
    summary.published.to_string().green(),
    summary.drafts.to_string().yellow(),
    summary.total_votes.to_string().cyan()
  );

  if !summary.top_voted.is_empty() {
    println!("\n{}", "Top voted".bold());
    for (rank, idea) in summary.top_voted.iter().enumerate() {
      println!("  {}. {} {}", rank + 1, idea.title, format!("({} votes)", idea.votes()).dimmed());
    }
  }

  if summary.evaluated > 0 {
    let scores = &summary.average_scores;
    println!("\n{} {}", "AI scores".bold(), format!("({} evaluated)", summary.evaluated).dimmed());
    println!(
      "  desirability {}  feasibility {}  viability {}  overall {}",
      format_score(Some(scores.desirability)).blue(),
      format_score(Some(scores.feasibility)).blue(),
      format_score(Some(scores.viability)).blue(),
      format_score(Some(scores.overall)).blue().bold()
    );
    for (rank, idea) in summary.top_rated.iter().enumerate() {
      println!(
        "  {}. {} {}",
        rank + 1,
        idea.title,
        format!("({})", format_score(idea.average_score())).dimmed()
      );
    }
  }

  if !summary.clusters.is_empty() {
    println!("\n{}", "Clusters".bold());
    for cluster in &summary.clusters {
      println!("  {} {}", cluster.cluster_name.magenta(), format!("({})", cluster.ideas).dimmed());
    }
  }
}
