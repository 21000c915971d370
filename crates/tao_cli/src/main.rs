//! `tao` command-line entry point.
//!
//! # Responsibility
//! - Resolve paths and configuration, then wire core services together.
//! - Print progress lines to stdout; diagnostics go to the rolling log files.

mod cli;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cli::{Cli, Command, GlobalArgs, IdeaCommand};
use log::info;
use std::io::Read;
use std::path::{Path, PathBuf};
use tao_core::config::CONFIG_FILE_NAME;
use tao_core::db::{open_db, DB_FILE_NAME};
use tao_core::{
    export_snapshot, import_snapshot, AppConfig, CatalogService, CatalogSnapshot, GeminiClient,
    IdeaService, LogLevel, LoggingOptions, MirroredProgressLog, RecordListQuery,
    RecordRepository, SageService, SqliteIdeaRepository, SqliteRecordRepository,
    StdoutProgressLog, SyncConfig, SyncEngine,
};

const APP_DIR_NAME: &str = "tao";

/// Filesystem locations resolved from flags and platform defaults.
struct Paths {
    db: PathBuf,
    config: PathBuf,
    log_dir: PathBuf,
}

impl Paths {
    fn resolve(global: &GlobalArgs) -> Result<Self> {
        let data_dir = dirs::data_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .context("no data directory available on this platform")?;
        let config_dir = dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .unwrap_or_else(|| data_dir.clone());

        Ok(Self {
            db: absolute(global.db.clone().unwrap_or_else(|| data_dir.join(DB_FILE_NAME)))?,
            config: global
                .config
                .clone()
                .unwrap_or_else(|| config_dir.join(CONFIG_FILE_NAME)),
            log_dir: absolute(global.log_dir.clone().unwrap_or_else(|| data_dir.join("logs")))?,
        })
    }
}

fn absolute(path: PathBuf) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path);
    }
    Ok(std::env::current_dir()
        .context("failed to read the working directory")?
        .join(path))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let paths = Paths::resolve(&cli.global)?;
    let config = AppConfig::load(&paths.config)?;

    let level = cli
        .global
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    if let Err(err) = tao_core::init_logging_with(&LoggingOptions {
        level,
        log_dir: paths.log_dir.clone(),
        stderr_level: Some(LogLevel::Error),
    }) {
        eprintln!("warning: file logging disabled: {err}");
    }

    if let Some(parent) = paths.db.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let conn = open_db(&paths.db)
        .with_context(|| format!("failed to open catalog at {}", paths.db.display()))?;
    let records = SqliteRecordRepository::new(&conn);
    let ideas = SqliteIdeaRepository::new(&conn);
    let progress = MirroredProgressLog::new(StdoutProgressLog);

    info!(
        "event=cli_start module=cli status=ok version={}",
        tao_core::core_version()
    );

    match cli.command {
        Command::Add { name, platform } => {
            let classifier = GeminiClient::from_settings(config.classifier.clone())?;
            let record = CatalogService::new(&records, progress)
                .add_record(&classifier, &name, &platform)
                .await?;
            println!("{}", record.id);
        }
        Command::Import { source } => {
            let text = read_source(&source)?;
            CatalogService::new(&records, progress).mass_import(&text)?;
        }
        Command::Sync => {
            let classifier = GeminiClient::from_settings(config.classifier.clone())?;
            let engine = SyncEngine::new(
                &records,
                &classifier,
                progress,
                SyncConfig::from(&config.sync),
            );
            engine.synchronize().await;
        }
        Command::List { pending, limit } => {
            let query = RecordListQuery {
                pending_only: pending,
                limit,
                offset: 0,
            };
            for record in records.list_records(&query)? {
                let score = record
                    .score
                    .map(|score| format!("{score:.1}*"))
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{}  {} [{}] {} {} {}",
                    record.id,
                    record.name,
                    record.platform,
                    record.status.as_str(),
                    record.category.as_deref().unwrap_or("-"),
                    score
                );
            }
        }
        Command::Set { id, notes, status } => {
            let record = CatalogService::new(&records, progress)
                .update_user_fields(id, notes, status)?;
            println!("{} {}", record.name, record.status.as_str());
        }
        Command::Stats => {
            let catalog = CatalogService::new(&records, progress);
            println!("SYNC COVERAGE: {:.0}%", catalog.sync_coverage()?);
            for share in catalog.concept_stats()? {
                println!("{:>5.1}%  {}", share.percent, share.name);
            }
        }
        Command::Idea(IdeaCommand::Add {
            title,
            description,
            trigger,
        }) => {
            IdeaService::new(&ideas, progress).add_idea(&title, &description, &trigger)?;
        }
        Command::Idea(IdeaCommand::List) => {
            for idea in IdeaService::new(&ideas, progress).list_ideas()? {
                println!("{}  {} ({})", idea.id, idea.title, idea.trigger);
                if !idea.description.is_empty() {
                    println!("    {}", idea.description);
                }
            }
        }
        Command::Sage { seed } => {
            let client = GeminiClient::from_settings(config.classifier.clone())?;
            let response = SageService::new(&records, &ideas, &client)
                .consult(seed.as_deref())
                .await?;
            println!("SYNERGY: {}%", response.synergy);
            for title in &response.titles {
                println!(" * {title}");
            }
            println!("{}", response.analysis);
        }
        Command::Export { output } => {
            let json = export_snapshot(&records, &ideas)?.to_json()?;
            match output {
                Some(path) => std::fs::write(&path, json)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => println!("{json}"),
            }
        }
        Command::Restore { input } => {
            let snapshot = CatalogSnapshot::from_json(&read_source(&input)?)?;
            let summary = import_snapshot(&conn, &snapshot)?;
            println!(
                "[SYSTEM] RESTORED {} NEW / {} UPDATED RECORDS, {} IDEAS.",
                summary.records_created, summary.records_updated, summary.ideas
            );
        }
        Command::Status => {
            println!("version: {}", tao_core::core_version());
            println!("database: {}", paths.db.display());
            println!("config: {}", paths.config.display());
            match tao_core::logging_status() {
                Some((level, dir)) => println!("logging: {} -> {}", level.as_str(), dir.display()),
                None => println!("logging: inactive"),
            }
            let key = config.classifier.api_key_from_env().is_some();
            println!(
                "api key ({}): {}",
                config.classifier.api_key_env,
                if key { "set" } else { "missing" }
            );
        }
    }

    Ok(())
}

/// Reads a whole file, or stdin when `path` is `-`.
fn read_source(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read stdin")?;
        return Ok(text);
    }
    if !path.exists() {
        bail!("{} does not exist", path.display());
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
