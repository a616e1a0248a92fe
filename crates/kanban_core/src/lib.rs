//! Core domain logic for the kanban backend.
//! Owns list/card ordering: dense 1-based positions kept consistent across
//! append, move and delete.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LoggingError,
};
pub use model::card::{Card, CardId, NewCard, UpdateCardRequest};
pub use model::list::{BoardId, List, ListId, UpdateListRequest};
pub use model::ValidationError;
pub use repo::card_repo::{CardFieldsPatch, CardRepository, SqliteCardRepository};
pub use repo::list_repo::{ListRepository, SqliteListRepository};
pub use repo::position::{MoveOutcome, Slot};
pub use repo::{RepoError, RepoResult};
pub use service::card_service::CardService;
pub use service::list_service::ListService;
pub use service::{ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
