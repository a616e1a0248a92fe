//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `kanban_core` linkage and bootstrap without a host service.
//! - Run a short append/move/delete script and print the resulting order.
//!
//! Usage: `kanban_cli [config.json]`. Without a config the script runs
//! against an in-memory database.

use kanban_core::db::open_db_with_config;
use kanban_core::{
    init_logging_from_config, CardService, CoreConfig, ListService, NewCard,
    SqliteCardRepository, SqliteListRepository,
};
use std::error::Error;
use uuid::Uuid;

fn main() -> Result<(), Box<dyn Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => CoreConfig::from_json_str(&std::fs::read_to_string(path)?)?,
        None => CoreConfig::default(),
    };
    init_logging_from_config(&config)?;

    println!("kanban_core version={}", kanban_core::core_version());

    let conn = open_db_with_config(&config)?;
    let lists = ListService::new(SqliteListRepository::try_new(&conn)?);
    let cards = CardService::new(SqliteCardRepository::try_new(&conn)?);

    let board_id = Uuid::new_v4();
    let todo = lists.create_list(board_id, "Todo")?;
    let done = lists.create_list(board_id, "Done")?;
    let doing = lists.create_list(board_id, "Doing")?;
    lists.move_list(doing.id, 2)?;

    let write = cards.create_card(todo.id, &NewCard::new("Write"))?;
    cards.create_card(todo.id, &NewCard::new("Review"))?;
    let ship = cards.create_card(todo.id, &NewCard::new("Ship"))?;
    cards.move_card(write.id, Some(doing.id), 1)?;
    cards.move_card(ship.id, Some(done.id), 1)?;

    for list in lists.lists_for_board(board_id)? {
        let titles: Vec<String> = cards
            .cards_for_list(list.id)?
            .into_iter()
            .map(|card| format!("{}:{}", card.position, card.title))
            .collect();
        println!("{}:{} [{}]", list.position, list.name, titles.join(", "));
    }
    Ok(())
}
