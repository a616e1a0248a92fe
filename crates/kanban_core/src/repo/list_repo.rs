//! List repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist lists and keep their positions dense within each board.
//! - Map name uniqueness violations to `DuplicateName`.
//!
//! # Invariants
//! - Board listing is ordered by `position ASC`.
//! - Create, move and delete each run in exactly one write transaction.

use super::position::{begin_write, MoveOutcome, PositionManager, LIST_SIBLINGS, NOW_MS_SQL};
use super::{
    ensure_connection_ready, is_unique_violation, log_write, parse_uuid, RepoError, RepoResult,
};
use crate::model::list::{BoardId, List, ListId};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::time::Instant;
use uuid::Uuid;

const LIST_SELECT_SQL: &str = "SELECT
    id,
    board_id,
    name,
    position,
    created_at,
    updated_at
FROM lists";

/// Repository interface for ordered lists.
pub trait ListRepository {
    /// Appends a list at the end of its board.
    fn create_list(&self, board_id: BoardId, name: &str) -> RepoResult<List>;
    fn get_list(&self, id: ListId) -> RepoResult<Option<List>>;
    /// Lists of one board in display order.
    fn lists_for_board(&self, board_id: BoardId) -> RepoResult<Vec<List>>;
    fn rename_list(&self, id: ListId, name: &str) -> RepoResult<()>;
    /// Repositions a list within its board.
    fn move_list(&self, id: ListId, target: i64) -> RepoResult<MoveOutcome>;
    /// Deletes a list (and its cards) and compacts the board.
    fn delete_list(&self, id: ListId) -> RepoResult<()>;
}

/// SQLite-backed list repository.
pub struct SqliteListRepository<'conn> {
    conn: &'conn Connection,
    positions: PositionManager,
}

impl<'conn> SqliteListRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            "lists",
            &[
                "id",
                "board_id",
                "name",
                "position",
                "created_at",
                "updated_at",
            ],
        )?;
        Ok(Self {
            conn,
            positions: PositionManager::new(LIST_SIBLINGS),
        })
    }
}

impl SqliteListRepository<'_> {
    fn append_list(&self, id: ListId, board_id: BoardId, name: &str) -> RepoResult<List> {
        let tx = begin_write(self.conn)?;
        let position = self.positions.next_position(&tx, board_id)?;
        tx.execute(
            "INSERT INTO lists (id, board_id, name, position) VALUES (?1, ?2, ?3, ?4);",
            params![id.to_string(), board_id.to_string(), name, position],
        )
        .map_err(map_name_violation)?;
        let list = load_required_list(&tx, id)?;
        tx.commit()?;
        Ok(list)
    }

    fn update_name(&self, id: ListId, name: &str) -> RepoResult<()> {
        let changed = self
            .conn
            .execute(
                &format!(
                    "UPDATE lists
                     SET name = ?2,
                         updated_at = {NOW_MS_SQL}
                     WHERE id = ?1;"
                ),
                params![id.to_string(), name],
            )
            .map_err(map_name_violation)?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "list", id });
        }
        Ok(())
    }

    fn reposition(&self, id: ListId, target: i64) -> RepoResult<MoveOutcome> {
        let tx = begin_write(self.conn)?;
        let outcome = self.positions.move_within(&tx, id, target)?;
        if outcome != MoveOutcome::Unchanged {
            tx.commit()?;
        }
        Ok(outcome)
    }

    fn remove(&self, id: ListId) -> RepoResult<()> {
        let tx = begin_write(self.conn)?;
        self.positions.remove(&tx, id)?;
        tx.commit()?;
        Ok(())
    }
}

impl ListRepository for SqliteListRepository<'_> {
    fn create_list(&self, board_id: BoardId, name: &str) -> RepoResult<List> {
        let id = Uuid::new_v4();
        log_write(
            "list_create",
            id,
            Instant::now(),
            self.append_list(id, board_id, name),
        )
    }

    fn get_list(&self, id: ListId) -> RepoResult<Option<List>> {
        load_list(self.conn, id)
    }

    fn lists_for_board(&self, board_id: BoardId) -> RepoResult<Vec<List>> {
        let mut stmt = self.conn.prepare(&format!(
            "{LIST_SELECT_SQL}
             WHERE board_id = ?1
             ORDER BY position ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([board_id.to_string()])?;
        let mut lists = Vec::new();
        while let Some(row) = rows.next()? {
            lists.push(parse_list_row(row)?);
        }
        Ok(lists)
    }

    fn rename_list(&self, id: ListId, name: &str) -> RepoResult<()> {
        log_write("list_rename", id, Instant::now(), self.update_name(id, name))
    }

    fn move_list(&self, id: ListId, target: i64) -> RepoResult<MoveOutcome> {
        log_write("list_move", id, Instant::now(), self.reposition(id, target))
    }

    fn delete_list(&self, id: ListId) -> RepoResult<()> {
        log_write("list_delete", id, Instant::now(), self.remove(id))
    }
}

fn map_name_violation(err: rusqlite::Error) -> RepoError {
    if is_unique_violation(&err) {
        return RepoError::DuplicateName {
            entity: "list",
            scope: "board",
        };
    }
    err.into()
}

fn load_list(conn: &Connection, id: ListId) -> RepoResult<Option<List>> {
    let mut stmt = conn.prepare(&format!("{LIST_SELECT_SQL} WHERE id = ?1;"))?;
    let row = stmt
        .query_row([id.to_string()], |row| Ok(parse_list_row(row)))
        .optional()?;
    row.transpose()
}

fn load_required_list(conn: &Connection, id: ListId) -> RepoResult<List> {
    load_list(conn, id)?.ok_or(RepoError::NotFound { entity: "list", id })
}

fn parse_list_row(row: &Row<'_>) -> RepoResult<List> {
    let id_text: String = row.get("id")?;
    let board_text: String = row.get("board_id")?;
    let position: i64 = row.get("position")?;
    if position < 1 {
        return Err(RepoError::InvalidData(format!(
            "invalid position `{position}` in lists.position"
        )));
    }

    Ok(List {
        id: parse_uuid(&id_text, "lists.id")?,
        board_id: parse_uuid(&board_text, "lists.board_id")?,
        name: row.get("name")?,
        position,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
