//! Writers on separate connections to one database file, one board each.

use kanban_core::db::{open_db, open_db_with_config};
use kanban_core::{CoreConfig, ListService, SqliteListRepository};
use std::path::Path;
use std::thread;
use uuid::Uuid;

const LISTS_PER_BOARD: usize = 12;

/// Appends lists, moves the last one to the front, deletes the fifth.
fn reshuffle_board(path: &Path, board_id: Uuid) -> Vec<String> {
    let conn = open_db(path).unwrap();
    let service = ListService::new(SqliteListRepository::try_new(&conn).unwrap());

    let created: Vec<_> = (0..LISTS_PER_BOARD)
        .map(|index| service.create_list(board_id, format!("L{index}")).unwrap())
        .collect();
    service
        .move_list(created[LISTS_PER_BOARD - 1].id, 1)
        .unwrap();
    service.delete_list(created[4].id).unwrap();

    service
        .lists_for_board(board_id)
        .unwrap()
        .into_iter()
        .map(|list| list.name)
        .collect()
}

#[test]
fn disjoint_boards_do_not_interfere() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kanban.db");
    drop(open_db(&path).unwrap());

    let boards: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
    let handles: Vec<_> = boards
        .iter()
        .map(|board_id| {
            let path = path.clone();
            let board_id = *board_id;
            thread::spawn(move || reshuffle_board(&path, board_id))
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let mut expected = vec![format!("L{}", LISTS_PER_BOARD - 1)];
    expected.extend(
        (0..LISTS_PER_BOARD - 1)
            .filter(|index| *index != 4)
            .map(|index| format!("L{index}")),
    );

    let conn = open_db(&path).unwrap();
    let service = ListService::new(SqliteListRepository::try_new(&conn).unwrap());
    for board_id in boards {
        let lists = service.lists_for_board(board_id).unwrap();
        let names: Vec<_> = lists.iter().map(|list| list.name.clone()).collect();
        let positions: Vec<_> = lists.iter().map(|list| list.position).collect();
        assert_eq!(names, expected);
        assert_eq!(positions, (1..=expected.len() as i64).collect::<Vec<_>>());
    }
}

#[test]
fn configured_connection_shares_the_same_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kanban.db");
    let config = CoreConfig {
        db_path: Some(path.clone()),
        busy_timeout_ms: 1_000,
        ..CoreConfig::default()
    };
    let board_id = Uuid::new_v4();

    let writer = open_db_with_config(&config).unwrap();
    let service = ListService::new(SqliteListRepository::try_new(&writer).unwrap());
    service.create_list(board_id, "A").unwrap();
    service.create_list(board_id, "B").unwrap();

    let reader = open_db(&path).unwrap();
    let reader_service = ListService::new(SqliteListRepository::try_new(&reader).unwrap());
    let names: Vec<_> = reader_service
        .lists_for_board(board_id)
        .unwrap()
        .into_iter()
        .map(|list| list.name)
        .collect();
    assert_eq!(names, vec!["A".to_string(), "B".to_string()]);
}
