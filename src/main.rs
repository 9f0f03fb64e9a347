use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;

use flowdraft_config::WorkflowGraph;
use flowdraft_editor::{EditorConfig, EditorSession, format_relative_time};
use flowdraft_store::FsKvStore;
use flowdraft_validation::validate_graph;

/// Flowdraft - validate and inspect visual workflow drafts
#[derive(Parser)]
#[command(name = "flowdraft")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.flowdraft)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  /// Editor configuration file (JSON)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Validate a workflow file and print the result as JSON
  Validate {
    /// Path to the workflow file (JSON)
    workflow_file: PathBuf,
  },

  /// Inspect or modify the auto-save slot
  Autosave {
    #[command(subcommand)]
    action: AutosaveAction,
  },
}

#[derive(Subcommand)]
enum AutosaveAction {
  /// Print a summary of the saved workflow
  Show,

  /// Erase the saved workflow
  Clear,

  /// Validate a workflow file and store it as the saved workflow
  Write {
    /// Path to the workflow file (JSON)
    workflow_file: PathBuf,
  },
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
    )
    .init();

  let cli = Cli::parse();

  let data_dir = match cli.data_dir {
    Some(dir) => dir,
    None => dirs::home_dir()
      .context("could not determine home directory")?
      .join(".flowdraft"),
  };
  let config = match &cli.config {
    Some(path) => load_config(path)?,
    None => EditorConfig::default(),
  };

  match cli.command {
    Some(Commands::Validate { workflow_file }) => validate(&workflow_file)?,
    Some(Commands::Autosave { action }) => {
      let rt = tokio::runtime::Runtime::new()?;
      rt.block_on(autosave(action, data_dir, config))?;
    }
    None => {
      println!("flowdraft - use --help to see available commands");
    }
  }

  Ok(())
}

fn load_config(path: &Path) -> Result<EditorConfig> {
  let content = std::fs::read_to_string(path)
    .with_context(|| format!("failed to read config file: {}", path.display()))?;
  serde_json::from_str(&content)
    .with_context(|| format!("failed to parse config file: {}", path.display()))
}

fn load_workflow(path: &Path) -> Result<WorkflowGraph> {
  let content = std::fs::read_to_string(path)
    .with_context(|| format!("failed to read workflow file: {}", path.display()))?;
  serde_json::from_str(&content)
    .with_context(|| format!("failed to parse workflow file: {}", path.display()))
}

fn validate(workflow_file: &Path) -> Result<()> {
  let graph = load_workflow(workflow_file)?;
  let result = validate_graph(&graph);

  println!("{}", serde_json::to_string_pretty(&result)?);

  if !result.is_valid {
    bail!("workflow has {} validation error(s)", result.errors.len());
  }
  Ok(())
}

async fn autosave(action: AutosaveAction, data_dir: PathBuf, config: EditorConfig) -> Result<()> {
  let kv = FsKvStore::new(data_dir.join("autosave"));

  match action {
    AutosaveAction::Show => {
      let store = config.snapshot_store(kv);
      let Some(snapshot) = store.read().await else {
        println!("No saved workflow");
        return Ok(());
      };

      let saved = match snapshot.saved_at() {
        Some(at) => format_relative_time(at, chrono::Utc::now()),
        None => "at an unknown time".to_string(),
      };
      println!("Saved workflow (version {})", snapshot.version);
      println!("  saved: {}", saved);
      println!("  nodes: {}", snapshot.nodes.len());
      println!("  edges: {}", snapshot.edges.len());
    }
    AutosaveAction::Clear => {
      config.snapshot_store(kv).clear().await;
      println!("Cleared saved workflow");
    }
    AutosaveAction::Write { workflow_file } => {
      let graph = load_workflow(&workflow_file)?;
      let mut session = EditorSession::open(kv, &config).await;
      session.replace_graph(graph);

      let saved_at = session
        .flush()
        .await
        .context("failed to save workflow")?;
      session.close();

      info!(file = %workflow_file.display(), "stored workflow in auto-save slot");
      println!("Saved workflow at {}", saved_at.to_rfc3339());
    }
  }

  Ok(())
}
