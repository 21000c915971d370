//! Idea repository contracts and SQLite implementation.

use crate::model::idea::{Idea, IdeaId};
use crate::repo::record_repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

/// Repository interface for ideas.
///
/// Ideas are listed in insertion order.
pub trait IdeaRepository {
    fn create_idea(&self, idea: &Idea) -> RepoResult<IdeaId>;
    fn get_idea(&self, id: IdeaId) -> RepoResult<Option<Idea>>;
    fn list_ideas(&self) -> RepoResult<Vec<Idea>>;
    /// Inserts or replaces the idea with the same ID.
    fn upsert_idea(&self, idea: &Idea) -> RepoResult<()>;
}

impl<R: IdeaRepository + ?Sized> IdeaRepository for &R {
    fn create_idea(&self, idea: &Idea) -> RepoResult<IdeaId> {
        (**self).create_idea(idea)
    }

    fn get_idea(&self, id: IdeaId) -> RepoResult<Option<Idea>> {
        (**self).get_idea(id)
    }

    fn list_ideas(&self) -> RepoResult<Vec<Idea>> {
        (**self).list_ideas()
    }

    fn upsert_idea(&self, idea: &Idea) -> RepoResult<()> {
        (**self).upsert_idea(idea)
    }
}

/// SQLite-backed idea repository.
pub struct SqliteIdeaRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteIdeaRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl IdeaRepository for SqliteIdeaRepository<'_> {
    fn create_idea(&self, idea: &Idea) -> RepoResult<IdeaId> {
        idea.validate()?;

        self.conn.execute(
            "INSERT INTO ideas (uuid, title, description, trigger_label)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                idea.id.to_string(),
                idea.title.as_str(),
                idea.description.as_str(),
                idea.trigger.as_str(),
            ],
        )?;

        Ok(idea.id)
    }

    fn get_idea(&self, id: IdeaId) -> RepoResult<Option<Idea>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, title, description, trigger_label
             FROM ideas
             WHERE uuid = ?1;",
        )?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_idea_row(row)?));
        }

        Ok(None)
    }

    fn list_ideas(&self) -> RepoResult<Vec<Idea>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, title, description, trigger_label
             FROM ideas
             ORDER BY position ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut ideas = Vec::new();

        while let Some(row) = rows.next()? {
            ideas.push(parse_idea_row(row)?);
        }

        Ok(ideas)
    }

    fn upsert_idea(&self, idea: &Idea) -> RepoResult<()> {
        idea.validate()?;

        self.conn.execute(
            "INSERT INTO ideas (uuid, title, description, trigger_label)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(uuid) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                trigger_label = excluded.trigger_label;",
            params![
                idea.id.to_string(),
                idea.title.as_str(),
                idea.description.as_str(),
                idea.trigger.as_str(),
            ],
        )?;

        Ok(())
    }
}

fn parse_idea_row(row: &Row<'_>) -> RepoResult<Idea> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in ideas.uuid"))
    })?;

    let idea = Idea {
        id,
        title: row.get("title")?,
        description: row.get("description")?,
        trigger: row.get("trigger_label")?,
    };
    idea.validate()?;
    Ok(idea)
}
