//! Core domain logic for the Tao media catalog.
//! This crate is the single source of truth for catalog invariants and the
//! bulk enrichment engine.

pub mod ai;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod sync;

pub use ai::gemini::GeminiClient;
pub use ai::{ClassificationError, Classifier, SageClient, SageRequest, SageResponse};
pub use config::{AppConfig, ConfigError};
pub use logging::{
    default_log_level, init_logging, init_logging_with, logging_status, LogLevel, LoggingError,
    LoggingOptions,
};
pub use model::idea::{Idea, IdeaId};
pub use model::record::{Enrichment, Record, RecordId, RecordStatus, ValidationError};
pub use repo::idea_repo::{IdeaRepository, SqliteIdeaRepository};
pub use repo::record_repo::{
    RecordListQuery, RecordRepository, RepoError, RepoResult, SqliteRecordRepository,
};
pub use service::catalog_service::{CatalogService, ConceptShare};
pub use service::idea_service::IdeaService;
pub use service::sage_service::SageService;
pub use service::snapshot::{export_snapshot, import_snapshot, CatalogSnapshot, ImportSummary};
pub use service::{ServiceError, ServiceResult};
pub use sync::{
    MemoryProgressLog, MirroredProgressLog, Pacer, ProgressLog, RunState, StdoutProgressLog,
    SyncConfig, SyncEngine, TokioPacer,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
