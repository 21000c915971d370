//! Progress reporting for sync runs and catalog actions.
//!
//! # Responsibility
//! - Render progress events as the user-facing status lines.
//! - Provide append-only sinks for those lines.
//!
//! # Invariants
//! - Sinks keep lines in call order.
//! - Appending never fails from the caller's point of view.

use crate::logging::sanitize_message;
use log::info;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, PoisonError};

const MAX_MIRRORED_CHARS: usize = 200;

/// Append-only sink for human-readable status lines.
pub trait ProgressLog {
    fn append(&self, line: &str);
}

impl<L: ProgressLog + ?Sized> ProgressLog for &L {
    fn append(&self, line: &str) {
        (**self).append(line);
    }
}

/// Observable milestones of sync runs and catalog actions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressEvent<'a> {
    NothingPending,
    SnapshotFailed,
    RunStarted { pending: usize, batch_size: usize },
    BatchStarted { number: usize, total: usize },
    ItemSucceeded { name: &'a str },
    ItemFailed { name: &'a str },
    BatchFinished { number: usize, attempted: usize, pending: usize },
    RunCompleted,
    SingleScanStarted { name: &'a str },
    SingleScanSucceeded { name: &'a str, score: f64 },
    SingleScanFailed { name: &'a str },
    RecordsImported { count: usize },
    IdeaStored { title: &'a str },
}

impl Display for ProgressEvent<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NothingPending => write!(f, "[SYSTEM] ALL RECORDS ARE ALREADY SYNCHRONIZED."),
            Self::SnapshotFailed => write!(f, "[ERROR] UNABLE TO READ THE CATALOG."),
            Self::RunStarted {
                pending,
                batch_size,
            } => write!(
                f,
                "[SYSTEM] {pending} PENDING RECORDS DETECTED. PROCESSING IN BATCHES OF {batch_size}..."
            ),
            Self::BatchStarted { number, total } => {
                write!(f, "[BATCH {number}/{total}] SCANNING GROUP...")
            }
            Self::ItemSucceeded { name } => write!(f, " -> {name} DONE."),
            Self::ItemFailed { name } => write!(f, " -> [FAILED] {name}: WEAK SIGNAL."),
            Self::BatchFinished {
                number,
                attempted,
                pending,
            } => write!(
                f,
                "[BATCH {number}] FINISHED. ({attempted}/{pending} RECORDS)"
            ),
            Self::RunCompleted => write!(f, "[SYSTEM] FULL SCAN COMPLETED."),
            Self::SingleScanStarted { name } => {
                write!(f, "[AI] STARTING SINGLE SCAN: {}...", name.to_uppercase())
            }
            Self::SingleScanSucceeded { name, score } => {
                write!(f, "[OK] {name} SYNCHRONIZED. SCORE: {score}*")
            }
            Self::SingleScanFailed { name } => {
                write!(f, "[ERROR] UPLINK FAILED FOR {name}. RECORD KEPT UNCLASSIFIED.")
            }
            Self::RecordsImported { count } => {
                write!(f, "[SYSTEM] {count} NEW RECORDS INJECTED INTO THE BUFFER.")
            }
            Self::IdeaStored { title } => {
                write!(f, "[SYSTEM] NEW IDEA STORED: {}", title.to_uppercase())
            }
        }
    }
}

/// Renders `event` and appends it to `log`.
pub fn emit<L: ProgressLog + ?Sized>(log: &L, event: ProgressEvent<'_>) {
    log.append(&event.to_string());
}

/// In-memory sink, used by tests and embedding front ends.
#[derive(Debug, Default)]
pub struct MemoryProgressLog {
    lines: Mutex<Vec<String>>,
}

impl MemoryProgressLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all lines appended so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ProgressLog for MemoryProgressLog {
    fn append(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
    }
}

/// Prints each line to stdout as it arrives.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutProgressLog;

impl ProgressLog for StdoutProgressLog {
    fn append(&self, line: &str) {
        println!("{line}");
    }
}

/// Forwards to an inner sink and copies every line into the diagnostic log.
#[derive(Debug, Default, Clone, Copy)]
pub struct MirroredProgressLog<L> {
    inner: L,
}

impl<L: ProgressLog> MirroredProgressLog<L> {
    /// Wraps `inner`; lines reach it unchanged.
    pub fn new(inner: L) -> Self {
        Self { inner }
    }

    /// Returns the wrapped sink.
    pub fn inner(&self) -> &L {
        &self.inner
    }
}

impl<L: ProgressLog> ProgressLog for MirroredProgressLog<L> {
    fn append(&self, line: &str) {
        info!(
            "event=progress module=sync status=ok line={}",
            sanitize_message(line.trim_start(), MAX_MIRRORED_CHARS)
        );
        self.inner.append(line);
    }
}
