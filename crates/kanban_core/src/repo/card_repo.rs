//! Card repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist cards and keep their positions dense within each list.
//! - Move cards across lists with source compaction and destination shift in
//!   a single transaction.
//!
//! # Invariants
//! - List listing is ordered by `position ASC`.
//! - A card is never observable in both lists, or in neither, mid-move.

use super::position::{begin_write, MoveOutcome, PositionManager, CARD_SIBLINGS, NOW_MS_SQL};
use super::{ensure_connection_ready, log_write, parse_uuid, RepoError, RepoResult};
use crate::model::card::{Card, CardId, NewCard};
use crate::model::list::ListId;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::time::Instant;
use uuid::Uuid;

const CARD_SELECT_SQL: &str = "SELECT
    id,
    list_id,
    title,
    description,
    notes,
    position,
    due_date,
    created_at,
    updated_at
FROM cards";

/// Non-positional card fields to overwrite. `None` keeps the stored value.
#[derive(Debug, Clone, Copy, Default)]
pub struct CardFieldsPatch<'a> {
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub notes: Option<&'a str>,
    /// `Some(None)` clears the stored due date.
    pub due_date: Option<Option<i64>>,
}

/// Repository interface for ordered cards.
pub trait CardRepository {
    /// Appends a card at the end of `list_id`.
    fn create_card(&self, list_id: ListId, card: &NewCard) -> RepoResult<Card>;
    fn get_card(&self, id: CardId) -> RepoResult<Option<Card>>;
    /// Cards of one list in display order.
    fn cards_for_list(&self, list_id: ListId) -> RepoResult<Vec<Card>>;
    fn update_card_fields(&self, id: CardId, patch: CardFieldsPatch<'_>) -> RepoResult<()>;
    /// Repositions a card within its current list.
    fn move_card_within(&self, id: CardId, target: i64) -> RepoResult<MoveOutcome>;
    /// Moves a card into another list at `target`.
    fn move_card_across(
        &self,
        id: CardId,
        dest_list_id: ListId,
        target: i64,
    ) -> RepoResult<MoveOutcome>;
    /// Deletes a card and compacts its list.
    fn delete_card(&self, id: CardId) -> RepoResult<()>;
}

/// SQLite-backed card repository.
pub struct SqliteCardRepository<'conn> {
    conn: &'conn Connection,
    positions: PositionManager,
}

impl<'conn> SqliteCardRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            "cards",
            &[
                "id",
                "list_id",
                "title",
                "description",
                "notes",
                "position",
                "due_date",
                "created_at",
                "updated_at",
            ],
        )?;
        Ok(Self {
            conn,
            positions: PositionManager::new(CARD_SIBLINGS),
        })
    }
}

impl SqliteCardRepository<'_> {
    fn append_card(&self, id: CardId, list_id: ListId, card: &NewCard) -> RepoResult<Card> {
        let tx = begin_write(self.conn)?;
        ensure_list_exists(&tx, list_id)?;
        let position = self.positions.next_position(&tx, list_id)?;
        tx.execute(
            "INSERT INTO cards (id, list_id, title, description, position, due_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                id.to_string(),
                list_id.to_string(),
                card.title.as_str(),
                card.description.as_str(),
                position,
                card.due_date,
            ],
        )?;
        let created = load_required_card(&tx, id)?;
        tx.commit()?;
        Ok(created)
    }

    fn patch_fields(&self, id: CardId, patch: CardFieldsPatch<'_>) -> RepoResult<()> {
        let changed = self.conn.execute(
            &format!(
                "UPDATE cards
                 SET title = COALESCE(?2, title),
                     description = COALESCE(?3, description),
                     notes = COALESCE(?4, notes),
                     due_date = CASE WHEN ?5 THEN ?6 ELSE due_date END,
                     updated_at = {NOW_MS_SQL}
                 WHERE id = ?1;"
            ),
            params![
                id.to_string(),
                patch.title,
                patch.description,
                patch.notes,
                patch.due_date.is_some(),
                patch.due_date.flatten(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "card", id });
        }
        Ok(())
    }

    fn reposition(&self, id: CardId, target: i64) -> RepoResult<MoveOutcome> {
        let tx = begin_write(self.conn)?;
        let outcome = self.positions.move_within(&tx, id, target)?;
        if outcome != MoveOutcome::Unchanged {
            tx.commit()?;
        }
        Ok(outcome)
    }

    fn relocate(&self, id: CardId, dest_list_id: ListId, target: i64) -> RepoResult<MoveOutcome> {
        let tx = begin_write(self.conn)?;
        let outcome = self.positions.move_across(&tx, id, dest_list_id, target)?;
        if outcome != MoveOutcome::Unchanged {
            tx.commit()?;
        }
        Ok(outcome)
    }

    fn remove(&self, id: CardId) -> RepoResult<()> {
        let tx = begin_write(self.conn)?;
        self.positions.remove(&tx, id)?;
        tx.commit()?;
        Ok(())
    }
}

impl CardRepository for SqliteCardRepository<'_> {
    fn create_card(&self, list_id: ListId, card: &NewCard) -> RepoResult<Card> {
        let id = Uuid::new_v4();
        log_write(
            "card_create",
            id,
            Instant::now(),
            self.append_card(id, list_id, card),
        )
    }

    fn get_card(&self, id: CardId) -> RepoResult<Option<Card>> {
        load_card(self.conn, id)
    }

    fn cards_for_list(&self, list_id: ListId) -> RepoResult<Vec<Card>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CARD_SELECT_SQL}
             WHERE list_id = ?1
             ORDER BY position ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([list_id.to_string()])?;
        let mut cards = Vec::new();
        while let Some(row) = rows.next()? {
            cards.push(parse_card_row(row)?);
        }
        Ok(cards)
    }

    fn update_card_fields(&self, id: CardId, patch: CardFieldsPatch<'_>) -> RepoResult<()> {
        log_write("card_update", id, Instant::now(), self.patch_fields(id, patch))
    }

    fn move_card_within(&self, id: CardId, target: i64) -> RepoResult<MoveOutcome> {
        log_write("card_move", id, Instant::now(), self.reposition(id, target))
    }

    fn move_card_across(
        &self,
        id: CardId,
        dest_list_id: ListId,
        target: i64,
    ) -> RepoResult<MoveOutcome> {
        log_write(
            "card_move_across",
            id,
            Instant::now(),
            self.relocate(id, dest_list_id, target),
        )
    }

    fn delete_card(&self, id: CardId) -> RepoResult<()> {
        log_write("card_delete", id, Instant::now(), self.remove(id))
    }
}

fn ensure_list_exists(conn: &Connection, list_id: ListId) -> RepoResult<()> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM lists WHERE id = ?1);",
        [list_id.to_string()],
        |row| row.get(0),
    )?;
    if exists == 0 {
        return Err(RepoError::NotFound {
            entity: "list",
            id: list_id,
        });
    }
    Ok(())
}

fn load_card(conn: &Connection, id: CardId) -> RepoResult<Option<Card>> {
    let mut stmt = conn.prepare(&format!("{CARD_SELECT_SQL} WHERE id = ?1;"))?;
    let row = stmt
        .query_row([id.to_string()], |row| Ok(parse_card_row(row)))
        .optional()?;
    row.transpose()
}

fn load_required_card(conn: &Connection, id: CardId) -> RepoResult<Card> {
    load_card(conn, id)?.ok_or(RepoError::NotFound { entity: "card", id })
}

fn parse_card_row(row: &Row<'_>) -> RepoResult<Card> {
    let id_text: String = row.get("id")?;
    let list_text: String = row.get("list_id")?;
    let position: i64 = row.get("position")?;
    if position < 1 {
        return Err(RepoError::InvalidData(format!(
            "invalid position `{position}` in cards.position"
        )));
    }

    Ok(Card {
        id: parse_uuid(&id_text, "cards.id")?,
        list_id: parse_uuid(&list_text, "cards.list_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        notes: row.get("notes")?,
        position,
        due_date: row.get("due_date")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
