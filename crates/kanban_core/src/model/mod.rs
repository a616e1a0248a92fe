//! Domain model for ordered board content.
//!
//! # Responsibility
//! - Define the list and card records that carry sibling positions.
//! - Normalize and validate user-supplied text fields before persistence.
//!
//! # Invariants
//! - Every record is identified by a stable UUID.
//! - `position` is 1-based and dense within the record's parent.

use thiserror::Error;

pub mod card;
pub mod list;

pub const LIST_NAME_MAX_CHARS: usize = 100;
pub const CARD_TITLE_MAX_CHARS: usize = 200;
pub const CARD_DESCRIPTION_MAX_CHARS: usize = 1000;

/// Input validation failures for list/card fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("list name must be 1..=100 characters")]
    InvalidName,
    #[error("card title must be 1..=200 characters")]
    InvalidTitle,
    #[error("card description must be at most 1000 characters")]
    DescriptionTooLong,
}

/// Trims `value` and checks it holds 1..=`max_chars` characters.
pub(crate) fn normalize_bounded(value: &str, max_chars: usize) -> Option<String> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();
    if len == 0 || len > max_chars {
        return None;
    }
    Some(trimmed.to_string())
}
