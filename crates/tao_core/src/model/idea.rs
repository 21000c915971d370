//! Idea domain model.
//!
//! Ideas are free-form creative notes kept next to the inventory. They are
//! never enriched; the sage flow reads them as context.

use crate::model::record::ValidationError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type IdeaId = Uuid;

/// Trigger used when the caller leaves it blank.
pub const DEFAULT_TRIGGER: &str = "Curiosity";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Idea {
    pub id: IdeaId,
    pub title: String,
    pub description: String,
    /// Emotional trigger the idea is aimed at.
    pub trigger: String,
}

impl Idea {
    /// Creates a new idea with a generated ID.
    ///
    /// A blank `trigger` falls back to [`DEFAULT_TRIGGER`].
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        trigger: impl Into<String>,
    ) -> Self {
        let trigger = trigger.into();
        let trigger = if trigger.trim().is_empty() {
            DEFAULT_TRIGGER.to_string()
        } else {
            trigger.trim().to_string()
        };
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: description.into(),
            trigger,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        Ok(())
    }
}
