//! List use-case service.
//!
//! # Responsibility
//! - Normalize list names and run create/rename/move/delete through the
//!   list repository.
//!
//! # Invariants
//! - Blank or oversized names never reach persistence.
//! - Out-of-range targets are rejected, never clamped.

use super::{ServiceError, ServiceResult};
use crate::model::list::{normalize_list_name, BoardId, List, ListId, UpdateListRequest};
use crate::repo::list_repo::ListRepository;
use crate::repo::position::MoveOutcome;

/// List service facade.
pub struct ListService<R: ListRepository> {
    repo: R,
}

impl<R: ListRepository> ListService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a list at the end of `board_id`.
    pub fn create_list(
        &self,
        board_id: BoardId,
        name: impl Into<String>,
    ) -> ServiceResult<List> {
        let name = normalize_list_name(&name.into())?;
        Ok(self.repo.create_list(board_id, &name)?)
    }

    /// Lists of one board ordered by position.
    pub fn lists_for_board(&self, board_id: BoardId) -> ServiceResult<Vec<List>> {
        Ok(self.repo.lists_for_board(board_id)?)
    }

    pub fn get_list(&self, id: ListId) -> ServiceResult<List> {
        self.repo
            .get_list(id)?
            .ok_or(ServiceError::NotFound { entity: "list", id })
    }

    /// Applies a rename and/or a move, then returns the stored list.
    ///
    /// The rename and the move are separate transactions; a failed move
    /// leaves an applied rename in place.
    pub fn update_list(&self, id: ListId, request: &UpdateListRequest) -> ServiceResult<List> {
        let name = request
            .name
            .as_deref()
            .map(normalize_list_name)
            .transpose()?;

        if let Some(name) = name {
            self.repo.rename_list(id, &name)?;
        }
        if let Some(position) = request.position {
            self.repo.move_list(id, position)?;
        }
        self.get_list(id)
    }

    /// Moves a list to `position` within its board.
    pub fn move_list(&self, id: ListId, position: i64) -> ServiceResult<MoveOutcome> {
        Ok(self.repo.move_list(id, position)?)
    }

    /// Deletes a list with its cards.
    pub fn delete_list(&self, id: ListId) -> ServiceResult<()> {
        Ok(self.repo.delete_list(id)?)
    }
}
