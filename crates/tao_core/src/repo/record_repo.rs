//! Record repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over the `records` table.
//! - Provide the identity-keyed enrichment merge used by bulk sync.
//!
//! # Invariants
//! - Write paths validate records/enrichments before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Listing order is `sort_key ASC, position ASC`; new records are placed
//!   in front unless explicitly appended.
//! - Batch inserts are all-or-nothing.

use crate::db::DbError;
use crate::model::record::{Enrichment, Record, RecordId, RecordStatus, ValidationError};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const RECORD_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    platform,
    category,
    tags,
    description,
    score,
    notes,
    status
FROM records";

const PENDING_FILTER_SQL: &str = "(description IS NULL OR description = '')";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for record and idea persistence.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    NotFound(Uuid),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "entry not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query options for listing records.
#[derive(Debug, Clone, Default)]
pub struct RecordListQuery {
    /// Only records that still need enrichment.
    pub pending_only: bool,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for catalog records.
///
/// The sync engine only relies on `list_records` and `apply_enrichment`.
pub trait RecordRepository {
    /// Inserts a record in front of the current listing order.
    fn create_record(&self, record: &Record) -> RepoResult<RecordId>;
    /// Inserts `records` in front of the current listing order, keeping
    /// their relative order. Either every record is stored or none is.
    fn create_records(&self, records: &[Record]) -> RepoResult<usize>;
    /// Inserts a record behind the current listing order.
    fn append_record(&self, record: &Record) -> RepoResult<RecordId>;
    fn update_record(&self, record: &Record) -> RepoResult<()>;
    fn get_record(&self, id: RecordId) -> RepoResult<Option<Record>>;
    fn list_records(&self, query: &RecordListQuery) -> RepoResult<Vec<Record>>;
    /// Merges enrichment attributes into the record with `id`.
    ///
    /// All other fields stay untouched.
    fn apply_enrichment(&self, id: RecordId, enrichment: &Enrichment) -> RepoResult<()>;
}

impl<R: RecordRepository + ?Sized> RecordRepository for &R {
    fn create_record(&self, record: &Record) -> RepoResult<RecordId> {
        (**self).create_record(record)
    }

    fn create_records(&self, records: &[Record]) -> RepoResult<usize> {
        (**self).create_records(records)
    }

    fn append_record(&self, record: &Record) -> RepoResult<RecordId> {
        (**self).append_record(record)
    }

    fn update_record(&self, record: &Record) -> RepoResult<()> {
        (**self).update_record(record)
    }

    fn get_record(&self, id: RecordId) -> RepoResult<Option<Record>> {
        (**self).get_record(id)
    }

    fn list_records(&self, query: &RecordListQuery) -> RepoResult<Vec<Record>> {
        (**self).list_records(query)
    }

    fn apply_enrichment(&self, id: RecordId, enrichment: &Enrichment) -> RepoResult<()> {
        (**self).apply_enrichment(id, enrichment)
    }
}

/// SQLite-backed record repository.
pub struct SqliteRecordRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecordRepository<'conn> {
    /// Creates a repository over an open, migrated connection.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn insert(&self, record: &Record, sort_key_sql: &str) -> RepoResult<RecordId> {
        record.validate()?;

        self.conn.execute(
            &format!(
                "INSERT INTO records (
                    uuid,
                    sort_key,
                    name,
                    platform,
                    category,
                    tags,
                    description,
                    score,
                    notes,
                    status
                ) VALUES (?1, ({sort_key_sql}), ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);"
            ),
            params![
                record.id.to_string(),
                record.name.as_str(),
                record.platform.as_str(),
                record.category.as_deref(),
                encode_tags(&record.tags)?,
                record.description.as_deref(),
                record.score,
                record.notes.as_str(),
                record.status.as_str(),
            ],
        )?;

        Ok(record.id)
    }
}

impl RecordRepository for SqliteRecordRepository<'_> {
    fn create_record(&self, record: &Record) -> RepoResult<RecordId> {
        self.insert(record, "SELECT COALESCE(MIN(sort_key), 0) - 1 FROM records")
    }

    fn create_records(&self, records: &[Record]) -> RepoResult<usize> {
        for record in records {
            record.validate()?;
        }

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let batch = SqliteRecordRepository::new(&tx);
        // Each insert goes to the front, so walk backwards to keep input order.
        for record in records.iter().rev() {
            batch.create_record(record)?;
        }
        tx.commit()?;

        Ok(records.len())
    }

    fn append_record(&self, record: &Record) -> RepoResult<RecordId> {
        self.insert(record, "SELECT COALESCE(MAX(sort_key), 0) + 1 FROM records")
    }

    fn update_record(&self, record: &Record) -> RepoResult<()> {
        record.validate()?;

        let changed = self.conn.execute(
            "UPDATE records
             SET
                name = ?1,
                platform = ?2,
                category = ?3,
                tags = ?4,
                description = ?5,
                score = ?6,
                notes = ?7,
                status = ?8,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?9;",
            params![
                record.name.as_str(),
                record.platform.as_str(),
                record.category.as_deref(),
                encode_tags(&record.tags)?,
                record.description.as_deref(),
                record.score,
                record.notes.as_str(),
                record.status.as_str(),
                record.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(record.id));
        }

        Ok(())
    }

    fn get_record(&self, id: RecordId) -> RepoResult<Option<Record>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RECORD_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_record_row(row)?));
        }

        Ok(None)
    }

    fn list_records(&self, query: &RecordListQuery) -> RepoResult<Vec<Record>> {
        let filter = if query.pending_only {
            PENDING_FILTER_SQL
        } else {
            "1 = 1"
        };
        // SQLite treats a negative LIMIT as "no limit".
        let limit = query.limit.map_or(-1, i64::from);

        let mut stmt = self.conn.prepare(&format!(
            "{RECORD_SELECT_SQL} WHERE {filter}
             ORDER BY sort_key ASC, position ASC
             LIMIT ?1 OFFSET ?2;"
        ))?;
        let records = stmt
            .query_and_then(params![limit, i64::from(query.offset)], parse_record_row)?
            .collect::<RepoResult<Vec<_>>>()?;
        Ok(records)
    }

    fn apply_enrichment(&self, id: RecordId, enrichment: &Enrichment) -> RepoResult<()> {
        enrichment.validate()?;

        let changed = self.conn.execute(
            "UPDATE records
             SET
                category = ?1,
                tags = ?2,
                description = ?3,
                score = ?4,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?5;",
            params![
                enrichment.category.as_str(),
                encode_tags(&enrichment.tags)?,
                enrichment.description.as_str(),
                enrichment.score,
                id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn parse_record_row(row: &Row<'_>) -> RepoResult<Record> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in records.uuid"))
    })?;

    let status_text: String = row.get("status")?;
    let status = RecordStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid status `{status_text}` in records.status"
        ))
    })?;

    let tags_text: String = row.get("tags")?;
    let tags = serde_json::from_str::<Vec<String>>(&tags_text).map_err(|err| {
        RepoError::InvalidData(format!("invalid tags payload in records.tags: {err}"))
    })?;

    let record = Record {
        id,
        name: row.get("name")?,
        platform: row.get("platform")?,
        category: row.get("category")?,
        tags,
        description: row.get("description")?,
        score: row.get("score")?,
        notes: row.get("notes")?,
        status,
    };
    record.validate()?;
    Ok(record)
}

fn encode_tags(tags: &[String]) -> RepoResult<String> {
    serde_json::to_string(tags)
        .map_err(|err| RepoError::InvalidData(format!("failed to encode tags: {err}")))
}
