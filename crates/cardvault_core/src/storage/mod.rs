//! Durable key-value storage for the card collection.
//!
//! # Responsibility
//! - Define the storage contract consumed by the card repository.
//! - Serialize the full collection as one JSON document per namespace.
//!
//! # Invariants
//! - `save_all` replaces the whole stored collection; there are no
//!   incremental writes.
//! - `load_all` on a namespace that was never written returns an empty list.

use crate::db::DbError;
use crate::model::card::Card;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory;
mod sqlite;

pub use memory::MemoryCardStorage;
pub use sqlite::SqliteCardStorage;

/// Fixed storage namespace holding the card collection.
pub const CARDS_NAMESPACE: &str = "cards";

pub type StorageResult<T> = Result<T, StorageError>;

/// Storage-layer error for reads and writes of the serialized collection.
#[derive(Debug)]
pub enum StorageError {
    Db(DbError),
    Serialization(serde_json::Error),
    /// Backend refused or failed the write for a non-DB reason.
    Unavailable(String),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "card collection serialization failed: {err}"),
            Self::Unavailable(message) => write!(f, "card storage unavailable: {message}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Storage contract for the full card collection.
pub trait CardStorage {
    /// Loads the persisted collection in stored order.
    fn load_all(&self) -> StorageResult<Vec<Card>>;
    /// Replaces the persisted collection with `cards`.
    fn save_all(&mut self, cards: &[Card]) -> StorageResult<()>;
}

pub(crate) fn encode_cards(cards: &[Card]) -> StorageResult<String> {
    Ok(serde_json::to_string(cards)?)
}

pub(crate) fn decode_cards(raw: &str) -> StorageResult<Vec<Card>> {
    Ok(serde_json::from_str(raw)?)
}
