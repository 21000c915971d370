//! JSON backup of the whole catalog.
//!
//! # Invariants
//! - Import upserts by identity: an existing record or idea is overwritten,
//!   an unknown one is appended after the current entries.
//! - Imported records are validated before any write.
//! - Import runs in one transaction: a failed import leaves the store as it
//!   was.

use crate::model::idea::Idea;
use crate::model::record::Record;
use crate::repo::idea_repo::{IdeaRepository, SqliteIdeaRepository};
use crate::repo::record_repo::{
    RecordListQuery, RecordRepository, RepoError, RepoResult, SqliteRecordRepository,
};
use crate::service::ServiceResult;
use log::{info, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use serde::{Deserialize, Serialize};

/// Serialized backup document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(rename = "tao_inventory", default)]
    pub records: Vec<Record>,
    #[serde(rename = "tao_ideas", default)]
    pub ideas: Vec<Idea>,
}

impl CatalogSnapshot {
    /// Pretty-printed JSON document.
    pub fn to_json(&self) -> ServiceResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a document; missing sections are empty.
    pub fn from_json(text: &str) -> ServiceResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Counts produced by [`import_snapshot`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub records_created: usize,
    pub records_updated: usize,
    pub ideas: usize,
}

/// Reads every record and idea in listing order.
pub fn export_snapshot<R, I>(records: &R, ideas: &I) -> ServiceResult<CatalogSnapshot>
where
    R: RecordRepository,
    I: IdeaRepository,
{
    let snapshot = CatalogSnapshot {
        records: records.list_records(&RecordListQuery::default())?,
        ideas: ideas.list_ideas()?,
    };
    info!(
        "event=snapshot_export module=service status=ok records={} ideas={}",
        snapshot.records.len(),
        snapshot.ideas.len()
    );
    Ok(snapshot)
}

/// Merges a snapshot into the catalog stored on `conn`.
///
/// # Errors
/// - `Validation` when any entry is invalid; nothing is written.
/// - `Repo` when a write fails; the transaction is rolled back.
pub fn import_snapshot(
    conn: &Connection,
    snapshot: &CatalogSnapshot,
) -> ServiceResult<ImportSummary> {
    for record in &snapshot.records {
        record.validate()?;
    }
    for idea in &snapshot.ideas {
        idea.validate()?;
    }

    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)
        .map_err(RepoError::from)?;
    let summary = match merge(&tx, snapshot) {
        Ok(summary) => summary,
        Err(err) => {
            warn!("event=snapshot_import module=service status=error error={err}");
            return Err(err.into());
        }
    };
    tx.commit().map_err(RepoError::from)?;

    info!(
        "event=snapshot_import module=service status=ok records_created={} records_updated={} ideas={}",
        summary.records_created, summary.records_updated, summary.ideas
    );
    Ok(summary)
}

fn merge(conn: &Connection, snapshot: &CatalogSnapshot) -> RepoResult<ImportSummary> {
    let records = SqliteRecordRepository::new(conn);
    let ideas = SqliteIdeaRepository::new(conn);

    let mut summary = ImportSummary::default();
    for record in &snapshot.records {
        if records.get_record(record.id)?.is_some() {
            records.update_record(record)?;
            summary.records_updated += 1;
        } else {
            records.append_record(record)?;
            summary.records_created += 1;
        }
    }
    for idea in &snapshot.ideas {
        ideas.upsert_idea(idea)?;
        summary.ideas += 1;
    }
    Ok(summary)
}
