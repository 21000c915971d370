//! Command-line surface.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tao_core::RecordStatus;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "tao", version)]
#[command(about = "Personal game catalog with bulk AI enrichment")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Catalog database file.
    #[arg(long, global = true, env = "TAO_DB")]
    pub db: Option<PathBuf>,
    /// TOML configuration file.
    #[arg(long, global = true, env = "TAO_CONFIG")]
    pub config: Option<PathBuf>,
    /// Directory for rolling log files.
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,
    /// Overrides `[logging] level` from the configuration file.
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add one record and classify it right away.
    Add {
        name: String,
        #[arg(long, default_value = "PC")]
        platform: String,
    },
    /// Import one record per line from a file, or stdin with `-`.
    Import { source: PathBuf },
    /// Classify every pending record in paced batches.
    Sync,
    /// List records in catalog order.
    List {
        /// Only records still waiting for classification.
        #[arg(long)]
        pending: bool,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Update notes or status of one record.
    Set {
        id: Uuid,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long, value_parser = parse_status)]
        status: Option<RecordStatus>,
    },
    /// Concept distribution and sync coverage.
    Stats,
    #[command(subcommand)]
    Idea(IdeaCommand),
    /// Ask for video titles based on the whole catalog.
    Sage {
        #[arg(long)]
        seed: Option<String>,
    },
    /// Write a JSON backup to a file, or stdout when omitted.
    Export {
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Merge a JSON backup into the catalog.
    Restore { input: PathBuf },
    /// Show resolved paths and logging state.
    Status,
}

#[derive(Debug, Subcommand)]
pub enum IdeaCommand {
    /// Store a new idea.
    Add {
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        trigger: String,
    },
    /// List stored ideas.
    List,
}

fn parse_status(value: &str) -> Result<RecordStatus, String> {
    RecordStatus::parse(value)
        .ok_or_else(|| format!("unknown status `{value}` (backlog, playing, finished)"))
}
