use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, ValueEnum};
use colored::*;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::cli::client::{get_client, IdeasClient};
use crate::cli::display::{
  display_clusters, display_dashboard, display_idea_card, display_idea_detail, display_idea_table,
  display_page_footer, display_suggestion, format_score,
};
use crate::codec;
use crate::models::{ClusterConfig, EvaluationCriteria, Idea};
use crate::store::IdeaBackend;
use crate::view::pipeline::{Column, SortConfig, StatusFilter, ViewMode};
use crate::view::{summarize, ViewController, ViewEvent};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
  All,
  Draft,
  Published,
}

impl From<StatusArg> for StatusFilter {
  fn from(arg: StatusArg) -> Self {
    match arg {
      StatusArg::All => StatusFilter::All,
      StatusArg::Draft => StatusFilter::Draft,
      StatusArg::Published => StatusFilter::Published,
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColumnArg {
  Title,
  Status,
  Votes,
  Cluster,
  AiScore,
}

impl From<ColumnArg> for Column {
  fn from(arg: ColumnArg) -> Self {
    match arg {
      ColumnArg::Title => Column::Title,
      ColumnArg::Status => Column::Status,
      ColumnArg::Votes => Column::Votes,
      ColumnArg::Cluster => Column::Cluster,
      ColumnArg::AiScore => Column::AiScore,
    }
  }
}

/// Filtering, sorting and paging options for `ideas list`
///
/// Column filters, sorting and paging only apply to the table view, so they require `--table`.
#[derive(Args, Debug, Clone)]
pub struct ListOptions {
  /// Only show ideas with this status
  #[arg(short, long, value_enum, default_value_t = StatusArg::All)]
  pub status: StatusArg,
  /// Column to sort by (title when omitted)
  #[arg(long, value_enum, requires = "table")]
  pub sort: Option<ColumnArg>,
  /// Sort in descending order
  #[arg(long, requires = "table")]
  pub desc: bool,
  /// Page to show, 10 ideas per page
  #[arg(short, long, default_value_t = 1, requires = "table")]
  pub page: usize,
  /// Render as a table instead of cards
  #[arg(short, long)]
  pub table: bool,
  /// Title contains this text
  #[arg(long, requires = "table")]
  pub title: Option<String>,
  /// At least this many votes
  #[arg(long, requires = "table")]
  pub votes: Option<String>,
  /// Average AI score of at least this value
  #[arg(long, requires = "table")]
  pub score: Option<String>,
  /// Cluster name contains this text
  #[arg(long, requires = "table")]
  pub cluster: Option<String>,
}

async fn connect() -> Result<ViewController<IdeasClient>> {
  let mut controller = ViewController::new(get_client()?);
  controller.load().await?;
  Ok(controller)
}

/// Find an idea by full id or unique id prefix
pub fn resolve_id(ideas: &[Idea], query: &str) -> Result<String> {
  if let Some(idea) = ideas.iter().find(|i| i.id == query) {
    return Ok(idea.id.clone());
  }

  let matches: Vec<&Idea> = ideas.iter().filter(|i| i.id.starts_with(query)).collect();
  match matches.as_slice() {
    [idea] => Ok(idea.id.clone()),
    [] => Err(anyhow!("No idea matches '{query}'")),
    _ => Err(anyhow!("'{query}' matches {} ideas; use a longer id", matches.len())),
  }
}

fn select(controller: &mut ViewController<IdeasClient>, query: &str) -> Result<String> {
  let id = resolve_id(controller.store().ideas(), query)?;
  controller.dispatch(ViewEvent::SelectIdea(id.clone()));
  Ok(id)
}

fn apply_sort(controller: &mut ViewController<IdeasClient>, column: Column, descending: bool) {
  if controller.state().query.sort != Some(SortConfig::ascending(column)) {
    controller.dispatch(ViewEvent::RequestSort(column));
  }
  if descending {
    controller.dispatch(ViewEvent::RequestSort(column));
  }
}

fn confirm(prompt: &str) -> Result<bool> {
  print!("{prompt} [y/N] ");
  io::stdout().flush()?;
  let mut answer = String::new();
  io::stdin().lock().read_line(&mut answer)?;
  Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn file_name(path: &Path) -> Result<String> {
  path
    .file_name()
    .map(|name| name.to_string_lossy().to_string())
    .ok_or_else(|| anyhow!("'{}' is not a file path", path.display()))
}

fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
  match output {
    Some(path) => {
      std::fs::write(path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
      println!("{} Wrote {}", "✓".green(), path.display().to_string().cyan());
    }
    None => println!("{content}"),
  }
  Ok(())
}

/// List ideas through the filter, sort and pagination pipeline
pub async fn list_ideas(options: &ListOptions) -> Result<()> {
  let mut controller = connect().await?;
  controller.dispatch(ViewEvent::ShowList);
  controller.dispatch(ViewEvent::SetStatusFilter(options.status.into()));

  let filters = [
    (Column::Title, &options.title),
    (Column::Votes, &options.votes),
    (Column::AiScore, &options.score),
    (Column::Cluster, &options.cluster),
  ];
  for (column, value) in filters {
    if let Some(value) = value {
      controller.dispatch(ViewEvent::SetColumnFilter(column, value.clone()));
    }
  }

  let column = options.sort.map_or(Column::Title, Column::from);
  apply_sort(&mut controller, column, options.desc);
  if options.table {
    controller.dispatch(ViewEvent::SetViewMode(ViewMode::Table));
  }
  controller.dispatch(ViewEvent::ChangePage(options.page));

  let page = controller.visible();
  if page.ideas.is_empty() {
    println!("No ideas found.");
    return Ok(());
  }

  match controller.state().query.view_mode {
    ViewMode::Table => display_idea_table(&page.ideas),
    ViewMode::Card => page.ideas.iter().for_each(display_idea_card),
  }
  display_page_footer(&page);
  Ok(())
}

pub async fn show_idea(id: &str) -> Result<()> {
  let mut controller = connect().await?;
  select(&mut controller, id)?;
  let idea = controller.selected_idea().ok_or_else(|| anyhow!("No idea matches '{id}'"))?;
  display_idea_detail(idea);
  Ok(())
}

pub async fn add_idea(title: &str, description: &str) -> Result<()> {
  let mut controller = connect().await?;
  controller.dispatch(ViewEvent::AddNew);
  let idea = controller.save_idea(title, description).await?;

  println!("{} Added draft {} ({})", "✓".green(), idea.title.bold(), idea.id.dimmed());
  Ok(())
}

pub async fn edit_idea(id: &str, title: Option<&str>, description: Option<&str>) -> Result<()> {
  if title.is_none() && description.is_none() {
    bail!("Nothing to change; pass --title and/or --description");
  }

  let mut controller = connect().await?;
  select(&mut controller, id)?;
  let current = controller.selected_idea().ok_or_else(|| anyhow!("No idea matches '{id}'"))?;
  let title = title.unwrap_or(current.title.as_str()).to_string();
  let description = description.unwrap_or(current.description.as_str()).to_string();

  let idea = controller.save_idea(&title, &description).await?;
  println!("{} Updated {}", "✓".green(), idea.title.bold());
  Ok(())
}

pub async fn delete_idea(id: &str, force: bool) -> Result<()> {
  let mut controller = connect().await?;
  let id = resolve_id(controller.store().ideas(), id)?;
  let title = controller.store().get(&id).map(|i| i.title.clone()).unwrap_or_default();

  if !force && !confirm(&format!("Delete '{title}'?"))? {
    println!("Cancelled.");
    return Ok(());
  }

  controller.delete(&id).await?;
  println!("{} Deleted {}", "✓".green(), title.bold());
  Ok(())
}

pub async fn publish_idea(id: &str) -> Result<()> {
  let mut controller = connect().await?;
  let id = resolve_id(controller.store().ideas(), id)?;
  let idea = controller.publish(&id).await?;

  println!("{} Published {}", "✓".green(), idea.title.bold());
  Ok(())
}

pub async fn vote_idea(id: &str) -> Result<()> {
  let mut controller = connect().await?;
  let id = resolve_id(controller.store().ideas(), id)?;
  let idea = controller.vote(&id).await?;

  let votes = idea.votes().to_string();
  println!("{} {} now has {} votes", "▲".green(), idea.title.bold(), votes.cyan());
  Ok(())
}

pub async fn upload_file(path: &Path) -> Result<()> {
  let name = file_name(path)?;
  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read {}", path.display()))?;

  let mut controller = connect().await?;
  let count = controller.upload(&name, &content).await?;

  if count == 0 {
    println!("No ideas found in {}", name.yellow());
  } else {
    println!("{} Uploaded {} ideas from {}", "✓".green(), count.to_string().cyan(), name.cyan());
  }
  Ok(())
}

/// Validate an upload file locally without contacting the server
pub fn check_file(path: &Path) -> Result<()> {
  let name = file_name(path)?;
  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read {}", path.display()))?;

  let records = codec::parse_upload(&name, &content)?;
  for record in &records {
    println!("  {} {}", "•".yellow(), record.title);
  }
  println!("{} {} valid ideas in {}", "✓".green(), records.len(), name.cyan());
  Ok(())
}

pub async fn export_ideas(output: Option<&Path>) -> Result<()> {
  let controller = connect().await?;
  write_output(output, &controller.export())
}

pub fn template(output: Option<&Path>) -> Result<()> {
  write_output(output, codec::template_csv())
}

/// Evaluate the given ideas, or every eligible idea when none are named
pub async fn evaluate_ideas(ids: &[String]) -> Result<()> {
  let mut controller = connect().await?;
  let selected: Vec<String> = if ids.is_empty() {
    controller
      .store()
      .ideas()
      .iter()
      .filter(|i| i.is_eligible_for_evaluation())
      .map(|i| i.id.clone())
      .collect()
  } else {
    ids.iter().map(|id| resolve_id(controller.store().ideas(), id)).collect::<Result<_>>()?
  };

  controller.dispatch(ViewEvent::ShowList);
  controller.dispatch(ViewEvent::ToggleEvaluationMode);
  for id in &selected {
    controller.dispatch(ViewEvent::ToggleSelection(id.clone()));
  }

  let count = controller.start_evaluation().await?;
  if count == 0 {
    println!("No eligible ideas to evaluate (ideas must be published and not yet evaluated).");
    return Ok(());
  }

  println!("{} Evaluated {} ideas", "✓".green(), count.to_string().cyan());
  for idea in controller.store().ideas().iter().filter(|i| selected.contains(&i.id)) {
    println!("  {} {}", format_score(idea.average_score()).blue(), idea.title);
  }
  Ok(())
}

pub async fn cluster_ideas(count: u32, basis: &str, save: bool) -> Result<()> {
  let config = ClusterConfig::new(count, basis)?;
  let mut controller = connect().await?;
  controller.dispatch(ViewEvent::OpenClusterConfig);

  controller.start_clustering(&config).await?;
  let Some(preview) = controller.state().cluster_preview.clone() else {
    bail!("Clustering returned no result");
  };
  display_clusters(&preview, controller.store().ideas());

  if save {
    controller.save_clusters().await?;
    println!("{} Saved {} clusters", "✓".green(), preview.len());
  } else {
    controller.discard_clusters();
    println!("{}", "Preview only. Run with --save to assign ideas to clusters.".dimmed());
  }
  Ok(())
}

pub async fn classify_idea(id: &str, apply: bool) -> Result<()> {
  let mut controller = connect().await?;
  let id = resolve_id(controller.store().ideas(), id)?;

  let Some(suggestion) = controller.classify(&id).await? else {
    bail!("Only published, unclustered ideas can be classified, and only once clusters exist");
  };
  display_suggestion(&suggestion);

  if apply {
    if let Some(idea) = controller.accept_suggestion().await? {
      let cluster = suggestion.cluster_name.magenta();
      println!("{} {} is now in {}", "✓".green(), idea.title.bold(), cluster);
    }
  } else {
    controller.reject_suggestion();
  }
  Ok(())
}

pub async fn clear_clusters(force: bool) -> Result<()> {
  if !force && !confirm("Remove every idea from its cluster?")? {
    println!("Cancelled.");
    return Ok(());
  }

  let mut controller = connect().await?;
  controller.clear_clusters().await?;
  println!("{} Cleared all clusters", "✓".green());
  Ok(())
}

/// Show the evaluation criteria, or replace the ones given
pub async fn criteria(
  desirability: Option<String>,
  feasibility: Option<String>,
  viability: Option<String>,
) -> Result<()> {
  let mut controller = connect().await?;
  controller.dispatch(ViewEvent::ShowSettings);
  let current = controller.store().criteria().clone();

  let changed = desirability.is_some() || feasibility.is_some() || viability.is_some();
  let criteria = EvaluationCriteria {
    desirability: desirability.unwrap_or(current.desirability),
    feasibility: feasibility.unwrap_or(current.feasibility),
    viability: viability.unwrap_or(current.viability),
  };

  if changed {
    controller.save_criteria(&criteria).await?;
    println!("{} Saved evaluation criteria", "✓".green());
  }

  println!("{} {}", "Desirability:".bold(), criteria.desirability);
  println!("{} {}", "Feasibility:".bold(), criteria.feasibility);
  println!("{} {}", "Viability:".bold(), criteria.viability);
  Ok(())
}

pub async fn dashboard() -> Result<()> {
  let mut controller = connect().await?;
  controller.dispatch(ViewEvent::ShowDashboard);
  display_dashboard(&summarize(controller.store().ideas()));
  Ok(())
}

pub async fn status() -> Result<()> {
  let client = get_client()?;
  let status = client.status().await?;

  println!(
    "{} {} is {} (v{}, {} ideas)",
    "✓".green(),
    client.base_url().cyan(),
    status.status.green(),
    status.version,
    status.ideas
  );
  Ok(())
}

/// Default output path for `export` when the user asks for a file
pub fn default_export_path() -> PathBuf {
  PathBuf::from(format!("ideas_export_{}.csv", chrono::Local::now().format("%Y-%m-%d")))
}
