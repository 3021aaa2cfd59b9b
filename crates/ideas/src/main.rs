use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use ideas::cli::commands::{self, ListOptions};

#[derive(Parser)]
#[command(name = "ideas")]
#[command(about = "Ideas - capture, vote on and evaluate product ideas")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
  /// Enable verbose logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// List ideas with filtering, sorting and paging
  List {
    #[command(flatten)]
    options: ListOptions,
  },
  /// Show one idea with its AI evaluation
  Show {
    /// Idea id or unique id prefix
    id: String,
  },
  /// Add a new draft idea
  Add {
    title: String,
    description: String,
  },
  /// Change the title or description of an idea
  Edit {
    /// Idea id or unique id prefix
    id: String,
    #[arg(short, long)]
    title: Option<String>,
    #[arg(short, long)]
    description: Option<String>,
  },
  /// Delete an idea
  Delete {
    /// Idea id or unique id prefix
    id: String,
    /// Skip confirmation prompt
    #[arg(short, long)]
    force: bool,
  },
  /// Publish a draft so it can receive votes
  Publish {
    /// Idea id or unique id prefix
    id: String,
  },
  /// Add one vote to a published idea
  Vote {
    /// Idea id or unique id prefix
    id: String,
  },
  /// Upload ideas from a .csv or .json file
  Upload { file: PathBuf },
  /// Validate an upload file without sending it
  Check { file: PathBuf },
  /// Export all ideas as CSV
  Export {
    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Write to a dated file in the current directory
    #[arg(long, conflicts_with = "output")]
    save: bool,
  },
  /// Print the CSV upload template
  Template {
    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
  },
  /// Run the AI evaluation on published ideas
  Evaluate {
    /// Ideas to evaluate; every eligible idea when omitted
    ids: Vec<String>,
  },
  /// Group ideas into clusters with AI
  Cluster {
    /// Number of clusters (2-10)
    #[arg(short = 'n', long, default_value_t = 5)]
    count: u32,
    /// What the clustering should be based on
    #[arg(short, long, default_value = "the core problem the idea is trying to solve")]
    basis: String,
    /// Assign the ideas to the proposed clusters
    #[arg(long)]
    save: bool,
  },
  /// Ask the AI which cluster an idea belongs to
  Classify {
    /// Idea id or unique id prefix
    id: String,
    /// Assign the idea to the suggested cluster
    #[arg(long)]
    apply: bool,
  },
  /// Remove every idea from its cluster
  ClearClusters {
    /// Skip confirmation prompt
    #[arg(short, long)]
    force: bool,
  },
  /// Show or change the evaluation criteria
  Criteria {
    #[arg(long)]
    desirability: Option<String>,
    #[arg(long)]
    feasibility: Option<String>,
    #[arg(long)]
    viability: Option<String>,
  },
  /// Summary statistics
  Dashboard,
  /// Check that the server is reachable
  Status,
}

async fn handle(command: Command) -> Result<()> {
  match command {
    Command::List { options } => commands::list_ideas(&options).await,
    Command::Show { id } => commands::show_idea(&id).await,
    Command::Add { title, description } => commands::add_idea(&title, &description).await,
    Command::Edit { id, title, description } => {
      commands::edit_idea(&id, title.as_deref(), description.as_deref()).await
    }
    Command::Delete { id, force } => commands::delete_idea(&id, force).await,
    Command::Publish { id } => commands::publish_idea(&id).await,
    Command::Vote { id } => commands::vote_idea(&id).await,
    Command::Upload { file } => commands::upload_file(&file).await,
    Command::Check { file } => commands::check_file(&file),
    Command::Export { output, save } => {
      let path = output.or_else(|| save.then(commands::default_export_path));
      commands::export_ideas(path.as_deref()).await
    }
    Command::Template { output } => commands::template(output.as_deref()),
    Command::Evaluate { ids } => commands::evaluate_ideas(&ids).await,
    Command::Cluster { count, basis, save } => commands::cluster_ideas(count, &basis, save).await,
    Command::Classify { id, apply } => commands::classify_idea(&id, apply).await,
    Command::ClearClusters { force } => commands::clear_clusters(force).await,
    Command::Criteria { desirability, feasibility, viability } => {
      commands::criteria(desirability, feasibility, viability).await
    }
    Command::Dashboard => commands::dashboard().await,
    Command::Status => commands::status().await,
  }
}

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
    if cli.verbose {
      EnvFilter::new("ideas=debug,warn")
    } else {
      EnvFilter::new("error")
    }
  });
  tracing_subscriber::registry()
    .with(fmt::layer().with_writer(std::io::stderr))
    .with(filter)
    .init();

  handle(cli.command).await
}
