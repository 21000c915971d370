//! Batch synchronization engine.
//!
//! # Responsibility
//! - Drive one enrichment run over the unclassified part of the catalog.
//! - Merge each successful classification into the store by identity.
//!
//! # Invariants
//! - `synchronize` is a no-op while a run is already active.
//! - Items inside a batch run concurrently on the caller's task; batches run
//!   strictly one after another.
//! - The pacer is called between batches and never after the last one.
//! - `synchronize` never returns an error; outcomes are visible through the
//!   store and the progress log only.

use crate::ai::Classifier;
use crate::config::{SyncSettings, DEFAULT_BATCH_SIZE, DEFAULT_PAUSE_INTERVAL_MS};
use crate::model::record::Record;
use crate::repo::record_repo::{RecordListQuery, RecordRepository};
use crate::sync::batch::{plan_batches, select_pending};
use crate::sync::pacing::{Pacer, TokioPacer};
use crate::sync::progress::{emit, ProgressEvent, ProgressLog};
use futures::future::join_all;
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Engine run state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Active,
}

/// Batch size and pacing for one engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    pub batch_size: usize,
    pub pause_interval: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            pause_interval: Duration::from_millis(DEFAULT_PAUSE_INTERVAL_MS),
        }
    }
}

impl From<&SyncSettings> for SyncConfig {
    fn from(settings: &SyncSettings) -> Self {
        Self {
            batch_size: settings.batch_size.max(1),
            pause_interval: settings.pause_interval(),
        }
    }
}

/// Resets the run flag when a run ends, including on unwind.
struct ActiveRun<'a> {
    flag: &'a AtomicBool,
}

impl<'a> ActiveRun<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for ActiveRun<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Bulk enrichment engine over a record store and a classifier.
pub struct SyncEngine<S, C, L, P = TokioPacer> {
    store: S,
    classifier: C,
    progress: L,
    pacer: P,
    config: SyncConfig,
    active: AtomicBool,
}

impl<S, C, L> SyncEngine<S, C, L, TokioPacer>
where
    S: RecordRepository,
    C: Classifier,
    L: ProgressLog,
{
    /// Creates an engine that paces on the Tokio timer.
    pub fn new(store: S, classifier: C, progress: L, config: SyncConfig) -> Self {
        Self::with_pacer(store, classifier, progress, TokioPacer, config)
    }
}

impl<S, C, L, P> SyncEngine<S, C, L, P>
where
    S: RecordRepository,
    C: Classifier,
    L: ProgressLog,
    P: Pacer,
{
    /// Creates an engine with an injected pacer.
    ///
    /// A zero batch size is raised to one.
    pub fn with_pacer(store: S, classifier: C, progress: L, pacer: P, config: SyncConfig) -> Self {
        Self {
            store,
            classifier,
            progress,
            pacer,
            config: SyncConfig {
                batch_size: config.batch_size.max(1),
                ..config
            },
            active: AtomicBool::new(false),
        }
    }

    /// Returns whether a run is in progress on this engine.
    pub fn state(&self) -> RunState {
        if self.active.load(Ordering::Acquire) {
            RunState::Active
        } else {
            RunState::Idle
        }
    }

    /// Runs one bulk enrichment pass.
    ///
    /// Returns immediately when another run on this engine is active.
    pub async fn synchronize(&self) {
        let Some(_run) = ActiveRun::acquire(&self.active) else {
            debug!("event=sync_run module=sync status=skipped reason=already_active");
            return;
        };

        let snapshot = match self.store.list_records(&RecordListQuery::default()) {
            Ok(records) => records,
            Err(err) => {
                warn!(
                    "event=sync_run module=sync status=error error_code=snapshot_failed error={err}"
                );
                emit(&self.progress, ProgressEvent::SnapshotFailed);
                return;
            }
        };

        let pending = select_pending(&snapshot);
        if pending.is_empty() {
            info!("event=sync_run module=sync status=ok pending=0");
            emit(&self.progress, ProgressEvent::NothingPending);
            return;
        }

        self.run_batches(&pending).await;
    }

    async fn run_batches(&self, pending: &[Record]) {
        let started_at = Instant::now();
        let total = pending.len();
        let batches = plan_batches(pending, self.config.batch_size);
        info!(
            "event=sync_run module=sync status=start pending={total} batches={} batch_size={}",
            batches.len(),
            self.config.batch_size
        );
        emit(
            &self.progress,
            ProgressEvent::RunStarted {
                pending: total,
                batch_size: self.config.batch_size,
            },
        );

        let mut succeeded = 0;
        for batch in &batches {
            emit(
                &self.progress,
                ProgressEvent::BatchStarted {
                    number: batch.number,
                    total: batch.total,
                },
            );

            let outcomes = join_all(batch.records.iter().map(|record| self.enrich(record))).await;
            succeeded += outcomes.into_iter().filter(|ok| *ok).count();

            emit(
                &self.progress,
                ProgressEvent::BatchFinished {
                    number: batch.number,
                    attempted: batch.attempted_after,
                    pending: total,
                },
            );

            if !batch.is_last() {
                self.pacer.pause(self.config.pause_interval).await;
            }
        }

        emit(&self.progress, ProgressEvent::RunCompleted);
        info!(
            "event=sync_run module=sync status=ok pending={total} succeeded={succeeded} failed={} duration_ms={}",
            total - succeeded,
            started_at.elapsed().as_millis()
        );
    }

    /// Classifies one record and merges the result. Returns `true` on success.
    async fn enrich(&self, record: &Record) -> bool {
        let result = match self.classifier.classify(&record.name).await {
            Ok(enrichment) => self
                .store
                .apply_enrichment(record.id, &enrichment)
                .map_err(|err| ("store", err.to_string())),
            Err(err) => Err((err.code(), err.to_string())),
        };

        match result {
            Ok(()) => {
                debug!(
                    "event=sync_item module=sync status=ok record_id={}",
                    record.id
                );
                emit(
                    &self.progress,
                    ProgressEvent::ItemSucceeded {
                        name: &record.name,
                    },
                );
                true
            }
            Err((code, message)) => {
                warn!(
                    "event=sync_item module=sync status=error record_id={} error_code={code} error={message}",
                    record.id
                );
                emit(
                    &self.progress,
                    ProgressEvent::ItemFailed {
                        name: &record.name,
                    },
                );
                false
            }
        }
    }
}
