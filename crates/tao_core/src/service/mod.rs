//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository and generative-service calls into use-case APIs.
//! - Keep the CLI decoupled from storage details.

use crate::ai::ClassificationError;
use crate::model::record::ValidationError;
use crate::repo::record_repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod catalog_service;
pub mod idea_service;
pub mod sage_service;
pub mod snapshot;

/// Service error shared by catalog, idea, sage and snapshot use-cases.
#[derive(Debug)]
pub enum ServiceError {
    Validation(ValidationError),
    NotFound(Uuid),
    /// Nothing to send to the sage service.
    EmptyCatalog,
    Repo(RepoError),
    Generation(ClassificationError),
    Snapshot(serde_json::Error),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "entry not found: {id}"),
            Self::EmptyCatalog => write!(f, "catalog has no records or ideas to analyse"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Generation(err) => write!(f, "{err}"),
            Self::Snapshot(err) => write!(f, "invalid snapshot: {err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Generation(err) => Some(err),
            Self::Snapshot(err) => Some(err),
            Self::NotFound(_) | Self::EmptyCatalog => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<ClassificationError> for ServiceError {
    fn from(value: ClassificationError) -> Self {
        Self::Generation(value)
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(value: serde_json::Error) -> Self {
        Self::Snapshot(value)
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
