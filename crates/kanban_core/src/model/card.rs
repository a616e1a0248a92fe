//! Card domain model.
//!
//! # Invariants
//! - `title` is trimmed and non-empty.
//! - `position` is 1-based and dense among cards sharing `list_id`.
//! - `list_id` changes only through a cross-list move.

use super::list::ListId;
use super::{
    normalize_bounded, ValidationError, CARD_DESCRIPTION_MAX_CHARS, CARD_TITLE_MAX_CHARS,
};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

pub type CardId = Uuid;

/// Persisted card row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub list_id: ListId,
    pub title: String,
    pub description: String,
    pub notes: String,
    pub position: i64,
    /// Epoch ms.
    pub due_date: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Input for creating a card. Position is always assigned by append.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCard {
    pub title: String,
    pub description: String,
    pub due_date: Option<i64>,
}

impl NewCard {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Returns a copy with normalized title, or the first field violation.
    pub fn normalized(&self) -> Result<Self, ValidationError> {
        Ok(Self {
            title: normalize_card_title(&self.title)?,
            description: check_description(&self.description)?,
            due_date: self.due_date,
        })
    }
}

/// Partial card update. `None` fields are left untouched.
///
/// `position` triggers a move; `list_id` only matters together with it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCardRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    /// `Some(None)` clears the due date; JSON `null` maps to it.
    #[serde(
        default,
        deserialize_with = "present_due_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<Option<i64>>,
    pub list_id: Option<ListId>,
    pub position: Option<i64>,
}

impl UpdateCardRequest {
    /// Whether any non-positional field is set.
    pub fn has_field_changes(&self) -> bool {
        self.title.is_some()
            || self.description.is_some()
            || self.notes.is_some()
            || self.due_date.is_some()
    }
}

fn present_due_date<'de, D>(deserializer: D) -> Result<Option<Option<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<i64>::deserialize(deserializer).map(Some)
}

/// Returns the trimmed card title or `InvalidTitle`.
pub fn normalize_card_title(title: &str) -> Result<String, ValidationError> {
    normalize_bounded(title, CARD_TITLE_MAX_CHARS).ok_or(ValidationError::InvalidTitle)
}

pub(crate) fn check_description(description: &str) -> Result<String, ValidationError> {
    if description.chars().count() > CARD_DESCRIPTION_MAX_CHARS {
        return Err(ValidationError::DescriptionTooLong);
    }
    Ok(description.to_string())
}
