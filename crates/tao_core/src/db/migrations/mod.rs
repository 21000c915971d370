//! Ordered schema migrations for the catalog database.
//!
//! # Invariants
//! - Versions start at 1 and increase by one per step.
//! - Each step commits together with its `PRAGMA user_version` bump, so an
//!   interrupted upgrade resumes at the first missing step.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// One schema step: `(version, label, sql)`.
type Step = (u32, &'static str, &'static str);

const STEPS: &[Step] = &[
    (1, "init", include_str!("0001_init.sql")),
    (2, "record_order", include_str!("0002_record_order.sql")),
];

/// Schema version this build writes.
pub fn latest_version() -> u32 {
    STEPS.len() as u32
}

/// Brings `conn` up to [`latest_version`].
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file was written by a newer build.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let found: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    let latest = latest_version();
    if found > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: found,
            latest_supported: latest,
        });
    }

    for &(version, label, sql) in STEPS.iter().skip(found as usize) {
        let tx = conn.transaction()?;
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", version)?;
        tx.commit()?;
        info!("event=db_migrate module=db status=ok version={version} step={label}");
    }
    Ok(())
}
