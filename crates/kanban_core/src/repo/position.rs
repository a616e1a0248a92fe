//! Ordered-sibling position engine.
//!
//! # Responsibility
//! - Compute positions for append, move and delete over one sibling table.
//! - Issue the range shifts that keep sibling positions dense.
//!
//! # Invariants
//! - Every function here runs against a caller-owned write transaction; the
//!   caller commits, and dropping the transaction on error rolls back.
//! - Range shifts never include the row being moved, and always run before
//!   the moved row is placed at its target.
//! - State is re-read inside the transaction; nothing is cached across calls.

use super::{parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use uuid::Uuid;

pub(crate) const NOW_MS_SQL: &str = "(strftime('%s', 'now') * 1000)";

/// Table that holds parent rows, when the parent lives in this database.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ParentTable {
    pub entity: &'static str,
    pub table: &'static str,
}

/// Describes one sibling collection: which table, and which column scopes it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SiblingTable {
    pub entity: &'static str,
    pub table: &'static str,
    pub parent_column: &'static str,
    pub parent: Option<ParentTable>,
}

/// Lists ordered within a board. Boards are external, so no parent check.
pub(crate) const LIST_SIBLINGS: SiblingTable = SiblingTable {
    entity: "list",
    table: "lists",
    parent_column: "board_id",
    parent: None,
};

/// Cards ordered within a list.
pub(crate) const CARD_SIBLINGS: SiblingTable = SiblingTable {
    entity: "card",
    table: "cards",
    parent_column: "list_id",
    parent: Some(ParentTable {
        entity: "list",
        table: "lists",
    }),
};

/// Parent reference and position of one sibling row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub parent_id: Uuid,
    pub position: i64,
}

/// Result of a move request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Row already sat at the requested slot; nothing was written.
    Unchanged,
    Moved { from: Slot, to: Slot },
}

/// Opens a transaction that takes the SQLite write lock up front.
///
/// Concurrent writers on the same database serialize here, which is what
/// keeps two racing shifts from interleaving on one parent.
pub(crate) fn begin_write(conn: &Connection) -> RepoResult<Transaction<'_>> {
    Ok(Transaction::new_unchecked(
        conn,
        TransactionBehavior::Immediate,
    )?)
}

/// Position engine bound to one sibling table.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PositionManager {
    siblings: SiblingTable,
}

impl PositionManager {
    pub(crate) const fn new(siblings: SiblingTable) -> Self {
        Self { siblings }
    }

    /// `max(position) + 1` within `parent_id`, or 1 for an empty parent.
    pub(crate) fn next_position(&self, tx: &Transaction<'_>, parent_id: Uuid) -> RepoResult<i64> {
        let t = &self.siblings;
        let next = tx.query_row(
            &format!(
                "SELECT COALESCE(MAX(position), 0) + 1
                 FROM {}
                 WHERE {} = ?1;",
                t.table, t.parent_column
            ),
            [parent_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(next)
    }

    /// Reads the slot of `id` or fails with `NotFound`.
    pub(crate) fn require_slot(&self, conn: &Connection, id: Uuid) -> RepoResult<Slot> {
        let t = &self.siblings;
        let row: Option<(String, i64)> = conn
            .query_row(
                &format!(
                    "SELECT {}, position
                     FROM {}
                     WHERE id = ?1;",
                    t.parent_column, t.table
                ),
                [id.to_string()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let (parent_text, position) = row.ok_or(RepoError::NotFound {
            entity: t.entity,
            id,
        })?;
        Ok(Slot {
            parent_id: parse_uuid(&parent_text, t.parent_column)?,
            position,
        })
    }

    /// Repositions `id` inside its current parent.
    ///
    /// `target` must lie in `1..=n` where `n` is the parent's child count.
    pub(crate) fn move_within(
        &self,
        tx: &Transaction<'_>,
        id: Uuid,
        target: i64,
    ) -> RepoResult<MoveOutcome> {
        let from = self.require_slot(tx, id)?;
        let count = self.child_count(tx, from.parent_id)?;
        check_target(target, count)?;

        if from.position == target {
            return Ok(MoveOutcome::Unchanged);
        }

        if from.position < target {
            self.shift_between(tx, from.parent_id, from.position + 1, target, -1)?;
        } else {
            self.shift_between(tx, from.parent_id, target, from.position - 1, 1)?;
        }

        let to = Slot {
            parent_id: from.parent_id,
            position: target,
        };
        self.place(tx, id, to)?;
        Ok(MoveOutcome::Moved { from, to })
    }

    /// Moves `id` under `dest_parent_id` at `target`.
    ///
    /// `target` must lie in `1..=n_dest + 1`. A destination equal to the
    /// current parent is handled as [`PositionManager::move_within`].
    pub(crate) fn move_across(
        &self,
        tx: &Transaction<'_>,
        id: Uuid,
        dest_parent_id: Uuid,
        target: i64,
    ) -> RepoResult<MoveOutcome> {
        let from = self.require_slot(tx, id)?;
        if from.parent_id == dest_parent_id {
            return self.move_within(tx, id, target);
        }

        self.ensure_parent_exists(tx, dest_parent_id)?;
        let dest_count = self.child_count(tx, dest_parent_id)?;
        check_target(target, dest_count + 1)?;

        // Source and destination ranges are disjoint; both precede placement.
        self.shift_from(tx, from.parent_id, from.position + 1, -1)?;
        self.shift_from(tx, dest_parent_id, target, 1)?;

        let to = Slot {
            parent_id: dest_parent_id,
            position: target,
        };
        self.place(tx, id, to)?;
        Ok(MoveOutcome::Moved { from, to })
    }

    /// Deletes `id` and closes the gap it leaves.
    ///
    /// Returns the slot the row held before removal.
    pub(crate) fn remove(&self, tx: &Transaction<'_>, id: Uuid) -> RepoResult<Slot> {
        let t = &self.siblings;
        let slot = self.require_slot(tx, id)?;

        tx.execute(
            &format!("DELETE FROM {} WHERE id = ?1;", t.table),
            [id.to_string()],
        )?;
        self.shift_from(tx, slot.parent_id, slot.position + 1, -1)?;
        Ok(slot)
    }

    fn child_count(&self, conn: &Connection, parent_id: Uuid) -> RepoResult<i64> {
        let t = &self.siblings;
        let count = conn.query_row(
            &format!("SELECT COUNT(*) FROM {} WHERE {} = ?1;", t.table, t.parent_column),
            [parent_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn ensure_parent_exists(&self, conn: &Connection, parent_id: Uuid) -> RepoResult<()> {
        let Some(parent) = self.siblings.parent else {
            return Ok(());
        };
        let exists: i64 = conn.query_row(
            &format!(
                "SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1);",
                parent.table
            ),
            [parent_id.to_string()],
            |row| row.get(0),
        )?;
        if exists == 0 {
            return Err(RepoError::NotFound {
                entity: parent.entity,
                id: parent_id,
            });
        }
        Ok(())
    }

    /// Adds `delta` to every sibling with `low <= position <= high`.
    fn shift_between(
        &self,
        conn: &Connection,
        parent_id: Uuid,
        low: i64,
        high: i64,
        delta: i64,
    ) -> RepoResult<usize> {
        let t = &self.siblings;
        let changed = conn.execute(
            &format!(
                "UPDATE {}
                 SET position = position + ?4,
                     updated_at = {NOW_MS_SQL}
                 WHERE {} = ?1
                   AND position >= ?2
                   AND position <= ?3;",
                t.table, t.parent_column
            ),
            params![parent_id.to_string(), low, high, delta],
        )?;
        Ok(changed)
    }

    /// Adds `delta` to every sibling with `position >= low`.
    fn shift_from(
        &self,
        conn: &Connection,
        parent_id: Uuid,
        low: i64,
        delta: i64,
    ) -> RepoResult<usize> {
        let t = &self.siblings;
        let changed = conn.execute(
            &format!(
                "UPDATE {}
                 SET position = position + ?3,
                     updated_at = {NOW_MS_SQL}
                 WHERE {} = ?1
                   AND position >= ?2;",
                t.table, t.parent_column
            ),
            params![parent_id.to_string(), low, delta],
        )?;
        Ok(changed)
    }

    fn place(&self, conn: &Connection, id: Uuid, slot: Slot) -> RepoResult<()> {
        let t = &self.siblings;
        let changed = conn.execute(
            &format!(
                "UPDATE {}
                 SET {} = ?2,
                     position = ?3,
                     updated_at = {NOW_MS_SQL}
                 WHERE id = ?1;",
                t.table, t.parent_column
            ),
            params![id.to_string(), slot.parent_id.to_string(), slot.position],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: t.entity,
                id,
            });
        }
        Ok(())
    }
}

fn check_target(target: i64, max: i64) -> RepoResult<()> {
    if target < 1 || target > max {
        return Err(RepoError::InvalidPosition {
            requested: target,
            max,
        });
    }
    Ok(())
}
