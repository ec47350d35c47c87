//! Core domain logic for CardVault.
//! This crate is the single source of truth for card storage invariants.

pub mod clock;
pub mod db;
pub mod dedup;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod storage;

pub use clock::{Clock, SystemClock};
pub use dedup::matcher::{MatchReason, MatchScore, SignalFields};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::card::{Card, CardDraft, CardId, CardPatch, CardValidationError};
pub use repo::card_repo::{CardRepository, DuplicateMatch, RepoError, RepoResult};
pub use service::card_service::{
    CardFields, CardService, CardServiceError, ImportRejection, ImportSkip, ImportSummary,
};
pub use storage::{
    CardStorage, MemoryCardStorage, SqliteCardStorage, StorageError, StorageResult,
    CARDS_NAMESPACE,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
