//! Core use-case services.
//!
//! # Responsibility
//! - Validate caller input before it reaches a repository.
//! - Translate repository errors into the caller-facing error kinds.
//!
//! # Invariants
//! - Services hold no position state of their own; every call re-reads
//!   through the repository.

use crate::model::ValidationError;
use crate::repo::RepoError;
use thiserror::Error;
use uuid::Uuid;

pub mod card_service;
pub mod list_service;

/// Errors returned by list/card services.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },
    #[error("invalid position {requested}: expected 1..={max}")]
    InvalidPosition { requested: i64, max: i64 },
    #[error("{entity} name already exists within this {scope}")]
    DuplicateName {
        entity: &'static str,
        scope: &'static str,
    },
    /// A destination list was given without a target position.
    #[error("moving a card to another list requires a target position")]
    PositionRequired,
    #[error(transparent)]
    Storage(RepoError),
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            RepoError::InvalidPosition { requested, max } => {
                Self::InvalidPosition { requested, max }
            }
            RepoError::DuplicateName { entity, scope } => Self::DuplicateName { entity, scope },
            other => Self::Storage(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
