//! Bulk enrichment synchronization.
//!
//! # Responsibility
//! - Select unclassified records from one catalog snapshot.
//! - Classify them in fixed-size batches with per-batch concurrency and
//!   pacing between batches.
//! - Report human-readable progress lines to a [`ProgressLog`].
//!
//! # Invariants
//! - At most one run is active per engine instance.
//! - Batch membership is computed once per run from the initial snapshot.
//! - A failed item never aborts its batch or the run.

pub mod batch;
pub mod engine;
pub mod pacing;
pub mod progress;

pub use batch::{batch_count, plan_batches, select_pending, Batch};
pub use engine::{RunState, SyncConfig, SyncEngine};
pub use pacing::{Pacer, TokioPacer};
pub use progress::{
    emit, MemoryProgressLog, MirroredProgressLog, ProgressEvent, ProgressLog, StdoutProgressLog,
};
