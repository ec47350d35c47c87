//! SQLite key-value storage for the card collection.
//!
//! # Invariants
//! - One row per namespace in `kv_store`; the value is the JSON collection.
//! - Writes run inside an immediate transaction so a concurrent writer
//!   cannot interleave a partial replace.

use super::{decode_cards, encode_cards, CardStorage, StorageResult, CARDS_NAMESPACE};
use crate::db::{open_db, open_db_in_memory};
use crate::model::card::Card;
use log::{debug, error};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::path::Path;
use std::time::Instant;

/// SQLite-backed storage over a migrated connection.
pub struct SqliteCardStorage {
    conn: Connection,
    namespace: String,
}

impl SqliteCardStorage {
    /// Opens (and migrates) a database file using the default namespace.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Ok(Self::from_connection(open_db(path)?))
    }

    /// Opens an in-memory database using the default namespace.
    pub fn open_in_memory() -> StorageResult<Self> {
        Ok(Self::from_connection(open_db_in_memory()?))
    }

    /// Wraps a connection already prepared by [`open_db`].
    pub fn from_connection(conn: Connection) -> Self {
        Self::with_namespace(conn, CARDS_NAMESPACE)
    }

    /// Wraps a prepared connection using a custom namespace key.
    pub fn with_namespace(conn: Connection, namespace: impl Into<String>) -> Self {
        Self {
            conn,
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Borrows the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl CardStorage for SqliteCardStorage {
    fn load_all(&self) -> StorageResult<Vec<Card>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE namespace = ?1;",
                [self.namespace.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        match raw {
            Some(raw) => decode_cards(&raw),
            None => Ok(Vec::new()),
        }
    }

    fn save_all(&mut self, cards: &[Card]) -> StorageResult<()> {
        let started_at = Instant::now();
        let encoded = encode_cards(cards)?;

        let result = replace_value(&mut self.conn, &self.namespace, &encoded);

        match result {
            Ok(()) => {
                debug!(
                    "event=storage_save module=storage status=ok namespace={} cards={} duration_ms={}",
                    self.namespace,
                    cards.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=storage_save module=storage status=error namespace={} duration_ms={} error={}",
                    self.namespace,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err.into())
            }
        }
    }
}

fn replace_value(conn: &mut Connection, namespace: &str, value: &str) -> rusqlite::Result<()> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    tx.execute(
        "INSERT INTO kv_store (namespace, value, updated_at)
         VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
         ON CONFLICT(namespace) DO UPDATE SET
            value = excluded.value,
            updated_at = excluded.updated_at;",
        params![namespace, value],
    )?;
    tx.commit()
}
