//! Forces the last write of each operation to fail and checks that nothing
//! from the earlier steps of the same transaction survives.

use kanban_core::db::open_db_in_memory;
use kanban_core::{
    CardRepository, ListRepository, NewCard, RepoError, SqliteCardRepository,
    SqliteListRepository,
};
use rusqlite::Connection;
use uuid::Uuid;

fn snapshot(conn: &Connection, table: &str) -> Vec<(String, String, i64)> {
    let parent_column = match table {
        "lists" => "board_id",
        "cards" => "list_id",
        other => panic!("unexpected table {other}"),
    };
    let mut stmt = conn
        .prepare(&format!(
            "SELECT id, {parent_column}, position FROM {table} ORDER BY {parent_column}, position, id;"
        ))
        .unwrap();
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
        .unwrap();
    let mut snapshot = Vec::new();
    for row in rows {
        snapshot.push(row.unwrap());
    }
    snapshot
}

fn fail_position_write_for(conn: &Connection, table: &str, id: Uuid) {
    conn.execute_batch(&format!(
        "CREATE TEMP TRIGGER fail_final_write
         BEFORE UPDATE OF position ON {table}
         WHEN NEW.id = '{id}'
         BEGIN
             SELECT RAISE(ABORT, 'injected failure');
         END;"
    ))
    .unwrap();
}

fn fail_any_position_update(conn: &Connection, table: &str) {
    conn.execute_batch(&format!(
        "CREATE TEMP TRIGGER fail_compaction
         BEFORE UPDATE OF position ON {table}
         BEGIN
             SELECT RAISE(ABORT, 'injected failure');
         END;"
    ))
    .unwrap();
}

#[test]
fn failed_placement_rolls_back_list_shift() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteListRepository::try_new(&conn).unwrap();
    let board_id = Uuid::new_v4();
    let lists: Vec<_> = ["A", "B", "C", "D"]
        .iter()
        .map(|name| repo.create_list(board_id, name).unwrap())
        .collect();
    let before = snapshot(&conn, "lists");

    fail_position_write_for(&conn, "lists", lists[3].id);
    let err = repo.move_list(lists[3].id, 1).unwrap_err();

    assert!(matches!(err, RepoError::Storage(_)));
    assert_eq!(snapshot(&conn, "lists"), before);
}

#[test]
fn failed_placement_rolls_back_cross_list_move() {
    let conn = open_db_in_memory().unwrap();
    let lists = SqliteListRepository::try_new(&conn).unwrap();
    let cards = SqliteCardRepository::try_new(&conn).unwrap();
    let board_id = Uuid::new_v4();
    let source = lists.create_list(board_id, "Source").unwrap();
    let dest = lists.create_list(board_id, "Dest").unwrap();
    let moving = cards.create_card(source.id, &NewCard::new("A")).unwrap();
    cards.create_card(source.id, &NewCard::new("B")).unwrap();
    cards.create_card(dest.id, &NewCard::new("X")).unwrap();
    cards.create_card(dest.id, &NewCard::new("Y")).unwrap();
    let before = snapshot(&conn, "cards");

    fail_position_write_for(&conn, "cards", moving.id);
    let err = cards.move_card_across(moving.id, dest.id, 1).unwrap_err();

    assert!(matches!(err, RepoError::Storage(_)));
    assert_eq!(snapshot(&conn, "cards"), before);
    assert_eq!(cards.get_card(moving.id).unwrap().unwrap().list_id, source.id);
}

#[test]
fn failed_compaction_restores_deleted_list_and_its_cards() {
    let conn = open_db_in_memory().unwrap();
    let lists = SqliteListRepository::try_new(&conn).unwrap();
    let cards = SqliteCardRepository::try_new(&conn).unwrap();
    let board_id = Uuid::new_v4();
    let first = lists.create_list(board_id, "First").unwrap();
    lists.create_list(board_id, "Second").unwrap();
    cards.create_card(first.id, &NewCard::new("A")).unwrap();
    let lists_before = snapshot(&conn, "lists");
    let cards_before = snapshot(&conn, "cards");

    fail_any_position_update(&conn, "lists");
    let err = lists.delete_list(first.id).unwrap_err();

    assert!(matches!(err, RepoError::Storage(_)));
    assert_eq!(snapshot(&conn, "lists"), lists_before);
    assert_eq!(snapshot(&conn, "cards"), cards_before);
}

#[test]
fn failed_compaction_restores_deleted_card() {
    let conn = open_db_in_memory().unwrap();
    let lists = SqliteListRepository::try_new(&conn).unwrap();
    let cards = SqliteCardRepository::try_new(&conn).unwrap();
    let list = lists.create_list(Uuid::new_v4(), "Todo").unwrap();
    let doomed = cards.create_card(list.id, &NewCard::new("A")).unwrap();
    cards.create_card(list.id, &NewCard::new("B")).unwrap();
    cards.create_card(list.id, &NewCard::new("C")).unwrap();
    let before = snapshot(&conn, "cards");

    fail_any_position_update(&conn, "cards");
    let err = cards.delete_card(doomed.id).unwrap_err();

    assert!(matches!(err, RepoError::Storage(_)));
    assert_eq!(snapshot(&conn, "cards"), before);
}

#[test]
fn failed_insert_leaves_no_row_behind() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteListRepository::try_new(&conn).unwrap();
    let board_id = Uuid::new_v4();
    repo.create_list(board_id, "A").unwrap();
    let before = snapshot(&conn, "lists");

    conn.execute_batch(
        "CREATE TEMP TRIGGER fail_insert
         BEFORE INSERT ON lists
         BEGIN
             SELECT RAISE(ABORT, 'injected failure');
         END;",
    )
    .unwrap();
    let err = repo.create_list(board_id, "B").unwrap_err();

    assert!(matches!(err, RepoError::Storage(_)));
    assert_eq!(snapshot(&conn, "lists"), before);

    conn.execute_batch("DROP TRIGGER temp.fail_insert;").unwrap();
    assert_eq!(repo.create_list(board_id, "B").unwrap().position, 2);
}
