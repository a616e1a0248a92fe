//! List domain model.
//!
//! # Invariants
//! - `name` is trimmed and unique within its board.
//! - `position` is 1-based and dense among lists sharing `board_id`.

use super::{normalize_bounded, ValidationError, LIST_NAME_MAX_CHARS};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ListId = Uuid;

/// Opaque board reference. Boards are owned by the board CRUD layer.
pub type BoardId = Uuid;

/// Persisted list row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct List {
    pub id: ListId,
    pub board_id: BoardId,
    pub name: String,
    pub position: i64,
    /// Epoch ms.
    pub created_at: i64,
    /// Epoch ms. Refreshed by renames and by every position shift.
    pub updated_at: i64,
}

/// Partial list update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateListRequest {
    pub name: Option<String>,
    pub position: Option<i64>,
}

/// Returns the trimmed list name or `InvalidName`.
pub fn normalize_list_name(name: &str) -> Result<String, ValidationError> {
    normalize_bounded(name, LIST_NAME_MAX_CHARS).ok_or(ValidationError::InvalidName)
}

#[cfg(test)]
mod tests {
    use super::normalize_list_name;
    use crate::model::ValidationError;

    #[test]
    fn list_name_is_trimmed() {
        assert_eq!(normalize_list_name("  Backlog  ").unwrap(), "Backlog");
    }

    #[test]
    fn blank_or_oversized_name_is_rejected() {
        assert_eq!(normalize_list_name(" \t"), Err(ValidationError::InvalidName));
        assert_eq!(
            normalize_list_name(&"x".repeat(101)),
            Err(ValidationError::InvalidName)
        );
    }
}
