//! Catalog record domain model.
//!
//! # Responsibility
//! - Define the canonical inventory record and its enrichment attributes.
//! - Provide the classification membership test used by bulk sync.
//!
//! # Invariants
//! - `id` is stable and never reused for another record.
//! - Enrichment attributes stay `None` until a classification succeeds.
//! - `score`, when present, lies within `[SCORE_MIN, SCORE_MAX]`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for catalog records.
pub type RecordId = Uuid;

/// Lowest quality score a classifier may assign.
pub const SCORE_MIN: f64 = 0.0;
/// Highest quality score a classifier may assign.
pub const SCORE_MAX: f64 = 5.0;

/// Lifecycle state of a record in the user's backlog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    /// Owned but not started.
    #[default]
    Backlog,
    /// Currently being played.
    Playing,
    /// Completed.
    Finished,
}

impl RecordStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Backlog => "backlog",
            Self::Playing => "playing",
            Self::Finished => "finished",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "backlog" => Some(Self::Backlog),
            "playing" => Some(Self::Playing),
            "finished" => Some(Self::Finished),
            _ => None,
        }
    }
}

/// Attributes produced by one successful classification call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrichment {
    pub category: String,
    /// Ordered as returned by the classifier; may be empty.
    pub tags: Vec<String>,
    pub description: String,
    /// Quality score in `[SCORE_MIN, SCORE_MAX]`.
    pub score: f64,
}

/// Validation failures for records, ideas and enrichment payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyName,
    EmptyTitle,
    ScoreOutOfRange(f64),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "record name cannot be empty"),
            Self::EmptyTitle => write!(f, "idea title cannot be empty"),
            Self::ScoreOutOfRange(score) => write!(
                f,
                "score {score} is outside the allowed range {SCORE_MIN}..={SCORE_MAX}"
            ),
        }
    }
}

impl Error for ValidationError {}

impl Enrichment {
    /// Checks the score bound.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_score(self.score)
    }
}

/// Canonical inventory record.
///
/// `platform`, `notes` and `status` belong to the user; bulk sync never
/// touches them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub name: String,
    pub platform: String,
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub description: Option<String>,
    pub score: Option<f64>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub status: RecordStatus,
}

impl Record {
    /// Creates an unclassified record with a generated stable ID.
    pub fn new(name: impl Into<String>, platform: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name, platform)
    }

    /// Creates an unclassified record with a caller-provided ID.
    ///
    /// Used by snapshot import where identity already exists.
    pub fn with_id(id: RecordId, name: impl Into<String>, platform: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            platform: platform.into(),
            category: None,
            tags: Vec::new(),
            description: None,
            score: None,
            notes: String::new(),
            status: RecordStatus::Backlog,
        }
    }

    /// Returns whether this record already carries a usable description.
    ///
    /// This is the only membership test for "needs enrichment".
    pub fn is_classified(&self) -> bool {
        self.description
            .as_deref()
            .is_some_and(|description| !description.is_empty())
    }

    /// Overwrites the enrichment attributes, leaving user fields untouched.
    pub fn apply_enrichment(&mut self, enrichment: &Enrichment) {
        self.category = Some(enrichment.category.clone());
        self.tags = enrichment.tags.clone();
        self.description = Some(enrichment.description.clone());
        self.score = Some(enrichment.score);
    }

    /// Validates record invariants before persistence.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if let Some(score) = self.score {
            validate_score(score)?;
        }
        Ok(())
    }
}

fn validate_score(score: f64) -> Result<(), ValidationError> {
    if !score.is_finite() || !(SCORE_MIN..=SCORE_MAX).contains(&score) {
        return Err(ValidationError::ScoreOutOfRange(score));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Enrichment, Record, RecordStatus, ValidationError};

    fn sample_enrichment() -> Enrichment {
        Enrichment {
            category: "RPG".to_string(),
            tags: vec!["Dark".to_string(), "Story".to_string()],
            description: "A long journey.".to_string(),
            score: 4.5,
        }
    }

    #[test]
    fn new_record_is_unclassified() {
        let record = Record::new("Chrono Trigger", "SNES");
        assert!(!record.is_classified());
        assert!(record.category.is_none());
        assert!(record.tags.is_empty());
        assert_eq!(record.status, RecordStatus::Backlog);
    }

    #[test]
    fn empty_description_is_not_classified() {
        let mut record = Record::new("Silent Hill", "PS1");
        record.description = Some(String::new());
        assert!(!record.is_classified());
    }

    #[test]
    fn apply_enrichment_keeps_user_fields() {
        let mut record = Record::new("Shadow of the Colossus", "PS2");
        record.notes = "borrowed copy".to_string();
        record.status = RecordStatus::Playing;

        record.apply_enrichment(&sample_enrichment());

        assert!(record.is_classified());
        assert_eq!(record.category.as_deref(), Some("RPG"));
        assert_eq!(record.score, Some(4.5));
        assert_eq!(record.notes, "borrowed copy");
        assert_eq!(record.status, RecordStatus::Playing);
        assert_eq!(record.platform, "PS2");
    }

    #[test]
    fn validate_rejects_blank_name_and_out_of_range_score() {
        let blank = Record::new("   ", "PC");
        assert_eq!(blank.validate(), Err(ValidationError::EmptyName));

        let mut scored = Record::new("Doom", "PC");
        scored.score = Some(5.5);
        assert!(matches!(
            scored.validate(),
            Err(ValidationError::ScoreOutOfRange(_))
        ));

        scored.score = Some(f64::NAN);
        assert!(scored.validate().is_err());
    }

    #[test]
    fn status_parse_accepts_known_values() {
        assert_eq!(RecordStatus::parse(" Playing "), Some(RecordStatus::Playing));
        assert_eq!(RecordStatus::parse("unknown"), None);
    }
}
