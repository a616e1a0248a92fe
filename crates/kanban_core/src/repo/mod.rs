//! Repository layer for ordered board content.
//!
//! # Responsibility
//! - Own every SQL statement that touches `lists` and `cards`.
//! - Run each position-changing operation inside one write transaction.
//!
//! # Invariants
//! - Positions within one parent are exactly `1..=n` between transactions.
//! - Any error rolls the whole operation back; no partial shift is persisted.
//! - Repository APIs return semantic errors (`NotFound`, `InvalidPosition`,
//!   `DuplicateName`) in addition to storage errors.

use crate::db::DbError;
use log::{info, warn};
use rusqlite::Connection;
use std::time::Instant;
use thiserror::Error;
use uuid::Uuid;

pub mod card_repo;
pub mod list_repo;
pub mod position;

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from list/card repository operations.
#[derive(Debug, Error)]
pub enum RepoError {
    /// Target row is absent.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },
    /// Requested position is outside `1..=max`.
    #[error("invalid position {requested}: expected 1..={max}")]
    InvalidPosition { requested: i64, max: i64 },
    /// Name uniqueness rule on the entity was violated.
    #[error("{entity} name already exists within this {scope}")]
    DuplicateName {
        entity: &'static str,
        scope: &'static str,
    },
    /// Transaction or I/O failure.
    #[error("storage error: {0}")]
    Storage(#[from] DbError),
    /// Connection schema is not at the expected migrated version.
    #[error("repository requires schema version {expected_version}, got {actual_version}")]
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table or column is missing.
    #[error("repository requires column `{column}` in table `{table}`")]
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted into a valid read model.
    #[error("invalid persisted data: {0}")]
    InvalidData(String),
}

impl RepoError {
    /// Stable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::InvalidPosition { .. } => "invalid_position",
            Self::DuplicateName { .. } => "duplicate_name",
            Self::Storage(_) => "storage_error",
            Self::UninitializedConnection { .. } => "uninitialized_connection",
            Self::MissingRequiredColumn { .. } => "missing_required_column",
            Self::InvalidData(_) => "invalid_data",
        }
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Storage(DbError::Sqlite(value))
    }
}

/// Emits one `status=ok|error` event for a finished write and passes the
/// result through.
pub(crate) fn log_write<T>(
    event: &'static str,
    id: Uuid,
    started_at: Instant,
    result: RepoResult<T>,
) -> RepoResult<T> {
    let duration_ms = started_at.elapsed().as_millis();
    match &result {
        Ok(_) => info!("event={event} module=repo status=ok id={id} duration_ms={duration_ms}"),
        Err(err) => warn!(
            "event={event} module=repo status=error id={id} duration_ms={duration_ms} error_code={} error={err}",
            err.code()
        ),
    }
    result
}

pub(crate) fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(inner, _)
            if inner.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Verifies schema version and required columns before a repository is used.
pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    table: &'static str,
    columns: &[&'static str],
) -> RepoResult<()> {
    let expected_version = crate::db::migrations::latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let present = table_columns(conn, table)?;
    for &column in columns {
        if !present.iter().any(|name| name == column) {
            return Err(RepoError::MissingRequiredColumn { table, column });
        }
    }
    Ok(())
}

fn table_columns(conn: &Connection, table: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        columns.push(row.get(1)?);
    }
    Ok(columns)
}
