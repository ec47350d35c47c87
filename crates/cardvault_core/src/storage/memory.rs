//! In-process storage keeping the serialized collection in memory.

use super::{decode_cards, encode_cards, CardStorage, StorageResult};
use crate::model::card::Card;

/// Memory-backed storage.
///
/// Stores the same JSON document the durable backends write, so encoding
/// errors surface here too.
#[derive(Debug, Clone, Default)]
pub struct MemoryCardStorage {
    snapshot: Option<String>,
    writes: usize,
}

impl MemoryCardStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds storage with an already-persisted collection.
    pub fn with_cards(cards: &[Card]) -> StorageResult<Self> {
        Ok(Self {
            snapshot: Some(encode_cards(cards)?),
            writes: 0,
        })
    }

    /// Raw JSON written by the last successful save.
    pub fn snapshot(&self) -> Option<&str> {
        self.snapshot.as_deref()
    }

    /// Number of successful `save_all` calls.
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl CardStorage for MemoryCardStorage {
    fn load_all(&self) -> StorageResult<Vec<Card>> {
        match self.snapshot.as_deref() {
            Some(raw) => decode_cards(raw),
            None => Ok(Vec::new()),
        }
    }

    fn save_all(&mut self, cards: &[Card]) -> StorageResult<()> {
        self.snapshot = Some(encode_cards(cards)?);
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryCardStorage;
    use crate::model::card::{Card, CardDraft};
    use crate::storage::CardStorage;

    #[test]
    fn unwritten_storage_loads_empty() {
        let storage = MemoryCardStorage::new();
        assert!(storage.load_all().unwrap().is_empty());
        assert!(storage.snapshot().is_none());
    }

    #[test]
    fn save_then_load_preserves_order() {
        let mut storage = MemoryCardStorage::new();
        let cards = vec![
            Card::from_draft(CardDraft::new("b", "Bea"), 2),
            Card::from_draft(CardDraft::new("a", "Al"), 1),
        ];
        storage.save_all(&cards).unwrap();

        assert_eq!(storage.load_all().unwrap(), cards);
        assert_eq!(storage.write_count(), 1);
    }
}
