//! Generative service contracts.
//!
//! # Responsibility
//! - Define the per-item [`Classifier`] contract consumed by bulk sync and
//!   single-item add.
//! - Define the [`SageClient`] contract used by the creative suggestion flow.
//!
//! # Invariants
//! - A successful `classify` yields an [`Enrichment`] that passes
//!   `Enrichment::validate` and has a non-empty description.
//! - Callers treat every [`ClassificationError`] kind the same way.

use crate::model::idea::Idea;
use crate::model::record::{Enrichment, Record};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod gemini;

/// Failure of one call to the generative service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassificationError {
    /// No API key configured.
    MissingApiKey,
    /// Transport failure or timeout.
    Network(String),
    /// Non-success HTTP status other than quota exhaustion.
    Http { status: u16, body: String },
    /// Rate limit or quota exhausted.
    Quota(String),
    /// Response could not be turned into a usable payload.
    Parse(String),
}

impl Display for ClassificationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingApiKey => write!(f, "no API key configured for the generation service"),
            Self::Network(message) => write!(f, "network error: {message}"),
            Self::Http { status, body } => write!(f, "service returned HTTP {status}: {body}"),
            Self::Quota(message) => write!(f, "quota exhausted: {message}"),
            Self::Parse(message) => write!(f, "unusable response: {message}"),
        }
    }
}

impl Error for ClassificationError {}

impl ClassificationError {
    /// Stable short code for diagnostic log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingApiKey => "missing_api_key",
            Self::Network(_) => "network",
            Self::Http { .. } => "http",
            Self::Quota(_) => "quota",
            Self::Parse(_) => "parse",
        }
    }
}

/// Per-item classification service.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, name: &str) -> Result<Enrichment, ClassificationError>;
}

#[async_trait]
impl<C: Classifier + ?Sized> Classifier for &C {
    async fn classify(&self, name: &str) -> Result<Enrichment, ClassificationError> {
        (**self).classify(name).await
    }
}

/// Creative suggestions produced from the whole catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SageResponse {
    pub titles: Vec<String>,
    /// Percentage in `0..=100`.
    pub synergy: u8,
    pub analysis: String,
}

/// Input for one sage consultation.
#[derive(Debug, Clone, Copy)]
pub struct SageRequest<'a> {
    pub records: &'a [Record],
    pub ideas: &'a [Idea],
    /// Optional theme the suggestions should lean towards.
    pub seed: Option<&'a str>,
}

/// Whole-catalog creative suggestion service.
#[async_trait]
pub trait SageClient: Send + Sync {
    async fn consult(&self, request: SageRequest<'_>) -> Result<SageResponse, ClassificationError>;
}

#[async_trait]
impl<C: SageClient + ?Sized> SageClient for &C {
    async fn consult(&self, request: SageRequest<'_>) -> Result<SageResponse, ClassificationError> {
        (**self).consult(request).await
    }
}
