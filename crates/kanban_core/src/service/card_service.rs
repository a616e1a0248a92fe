//! Card use-case service.
//!
//! # Responsibility
//! - Validate card fields and dispatch moves to the within-list or
//!   cross-list repository path.
//!
//! # Invariants
//! - Field validation happens before any write of the same request.
//! - A move naming the card's current list takes the within-list path.

use super::{ServiceError, ServiceResult};
use crate::model::card::{
    check_description, normalize_card_title, Card, CardId, NewCard, UpdateCardRequest,
};
use crate::model::list::ListId;
use crate::repo::card_repo::{CardFieldsPatch, CardRepository};
use crate::repo::position::MoveOutcome;

/// Card service facade.
pub struct CardService<R: CardRepository> {
    repo: R,
}

impl<R: CardRepository> CardService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a card at the end of `list_id`.
    pub fn create_card(&self, list_id: ListId, card: &NewCard) -> ServiceResult<Card> {
        let card = card.normalized()?;
        Ok(self.repo.create_card(list_id, &card)?)
    }

    /// Cards of one list ordered by position.
    pub fn cards_for_list(&self, list_id: ListId) -> ServiceResult<Vec<Card>> {
        Ok(self.repo.cards_for_list(list_id)?)
    }

    pub fn get_card(&self, id: CardId) -> ServiceResult<Card> {
        self.repo
            .get_card(id)?
            .ok_or(ServiceError::NotFound { entity: "card", id })
    }

    /// Applies field changes and an optional move, then returns the card.
    pub fn update_card(&self, id: CardId, request: &UpdateCardRequest) -> ServiceResult<Card> {
        if request.list_id.is_some() && request.position.is_none() {
            return Err(ServiceError::PositionRequired);
        }

        let title = request
            .title
            .as_deref()
            .map(normalize_card_title)
            .transpose()?;
        let description = request
            .description
            .as_deref()
            .map(check_description)
            .transpose()?;

        if request.has_field_changes() {
            let patch = CardFieldsPatch {
                title: title.as_deref(),
                description: description.as_deref(),
                notes: request.notes.as_deref(),
                due_date: request.due_date,
            };
            self.repo.update_card_fields(id, patch)?;
        }
        if let Some(position) = request.position {
            self.move_card(id, request.list_id, position)?;
        }
        self.get_card(id)
    }

    /// Moves a card to `position`, in `list_id` when given, otherwise in its
    /// current list.
    pub fn move_card(
        &self,
        id: CardId,
        list_id: Option<ListId>,
        position: i64,
    ) -> ServiceResult<MoveOutcome> {
        let outcome = match list_id {
            Some(list_id) => self.repo.move_card_across(id, list_id, position)?,
            None => self.repo.move_card_within(id, position)?,
        };
        Ok(outcome)
    }

    pub fn delete_card(&self, id: CardId) -> ServiceResult<()> {
        Ok(self.repo.delete_card(id)?)
    }
}
