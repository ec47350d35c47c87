//! Card repository: the canonical in-memory collection mirrored to storage.
//!
//! # Responsibility
//! - Own the ordered card collection (most-recent-first).
//! - Gate inserts behind duplicate detection.
//! - Mirror the full collection to storage after every mutation.
//!
//! # Invariants
//! - `id` is unique across the collection.
//! - `created_at` never changes after insert; `updated_at` strictly
//!   increases on every successful mutation and only then.
//! - New cards are prepended; updates keep their position.
//! - A failed storage write never rolls back in-memory state; the
//!   repository stays dirty until a later write succeeds.
//! - Duplicate detection runs on insert only; `update` can make two stored
//!   cards match and that is not rejected.

use crate::clock::{next_after, Clock, SystemClock};
use crate::dedup::matcher::{find_match, MatchReason, SignalFields};
use crate::model::card::{Card, CardDraft, CardId, CardPatch, CardValidationError};
use crate::storage::{CardStorage, StorageError};
use log::{debug, error, info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for card mutations and loading.
#[derive(Debug)]
pub enum RepoError {
    /// Insert matched an existing card; the collection is unchanged.
    DuplicateRejected { existing: Box<Card> },
    /// Storage read or write failed. On write, in-memory state is kept.
    Persistence(StorageError),
    Validation(CardValidationError),
    /// Insert reused an id already present in the collection.
    IdConflict(CardId),
    /// Persisted collection violates repository invariants.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateRejected { existing } => {
                write!(f, "duplicate of existing card: {}", existing.id)
            }
            Self::Persistence(err) => write!(f, "card persistence failed: {err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::IdConflict(id) => write!(f, "card id already in use: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted card data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persistence(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::DuplicateRejected { .. } | Self::IdConflict(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<CardValidationError> for RepoError {
    fn from(value: CardValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StorageError> for RepoError {
    fn from(value: StorageError) -> Self {
        Self::Persistence(value)
    }
}

/// Stored card judged a duplicate, with the rule that fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateMatch {
    pub existing: Card,
    pub reason: MatchReason,
}

/// Card collection with duplicate gate and persist-on-mutation.
pub struct CardRepository<S: CardStorage> {
    storage: S,
    cards: Vec<Card>,
    clock: Box<dyn Clock + Send>,
    dirty: bool,
}

impl<S: CardStorage> CardRepository<S> {
    /// Loads the persisted collection using the system clock.
    pub fn load(storage: S) -> RepoResult<Self> {
        Self::load_with_clock(storage, Box::new(SystemClock))
    }

    /// Loads the persisted collection with an explicit clock.
    ///
    /// # Errors
    /// - `Persistence` when storage cannot be read or decoded.
    /// - `InvalidData` when stored cards repeat an id or have a blank
    ///   name/id.
    pub fn load_with_clock(storage: S, clock: Box<dyn Clock + Send>) -> RepoResult<Self> {
        let cards = storage.load_all()?;
        check_loaded(&cards)?;
        info!(
            "event=repo_load module=repo status=ok cards={}",
            cards.len()
        );
        Ok(Self {
            storage,
            cards,
            clock,
            dirty: false,
        })
    }

    /// Inserts a new card unless it duplicates a stored one.
    ///
    /// # Errors
    /// - `Validation` for a blank id or name.
    /// - `IdConflict` when `draft.id` is already stored.
    /// - `DuplicateRejected` with the first matching card.
    /// - `Persistence` when the write fails; the card is still in memory.
    pub fn insert(&mut self, draft: CardDraft) -> RepoResult<Card> {
        draft.validate()?;

        if self.position(&draft.id).is_some() {
            warn!(
                "event=card_insert module=repo status=rejected reason=id_conflict card_id={}",
                draft.id
            );
            return Err(RepoError::IdConflict(draft.id));
        }

        if let Some((existing, reason)) = find_match(&SignalFields::from(&draft), &self.cards) {
            info!(
                "event=card_insert module=repo status=rejected reason=duplicate rule={} existing_id={}",
                reason_label(reason),
                existing.id
            );
            return Err(RepoError::DuplicateRejected {
                existing: Box::new(existing.clone()),
            });
        }

        let card = Card::from_draft(draft, self.clock.now_ms());
        self.cards.insert(0, card.clone());
        self.persist("card_insert", &card.id)?;
        Ok(card)
    }

    /// Applies `patch` to the card with `id`.
    ///
    /// Returns `Ok(None)` without touching storage when no card has `id`.
    /// Does not re-run duplicate detection.
    pub fn update(&mut self, id: &str, patch: CardPatch) -> RepoResult<Option<Card>> {
        patch.validate()?;

        let Some(index) = self.position(id) else {
            debug!("event=card_update module=repo status=not_found card_id={id}");
            return Ok(None);
        };

        let now = self.clock.now_ms();
        let card = &mut self.cards[index];
        card.apply(patch);
        card.updated_at = next_after(now, card.updated_at);
        let updated = card.clone();

        self.persist("card_update", id)?;
        Ok(Some(updated))
    }

    /// Removes the card with `id`. Absent ids are a no-op returning `false`.
    pub fn remove(&mut self, id: &str) -> RepoResult<bool> {
        let Some(index) = self.position(id) else {
            debug!("event=card_remove module=repo status=not_found card_id={id}");
            return Ok(false);
        };

        self.cards.remove(index);
        self.persist("card_remove", id)?;
        Ok(true)
    }

    /// Point lookup by id.
    pub fn get(&self, id: &str) -> Option<&Card> {
        self.cards.iter().find(|card| card.id == id)
    }

    /// All cards, most recently inserted first.
    pub fn list(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Case-insensitive substring search over name, company, email, phone
    /// and title.
    ///
    /// An empty or whitespace-only query matches every card. Any other
    /// query is matched verbatim, surrounding spaces included. Results keep
    /// collection order.
    pub fn search(&self, query: &str) -> Vec<Card> {
        if query.trim().is_empty() {
            return self.cards.clone();
        }
        let needle = query.to_lowercase();

        self.cards
            .iter()
            .filter(|card| matches_query(card, &needle))
            .cloned()
            .collect()
    }

    /// Returns the first stored card the candidate duplicates.
    pub fn find_duplicate(&self, candidate: &CardDraft) -> Option<&Card> {
        find_match(&SignalFields::from(candidate), &self.cards).map(|(card, _)| card)
    }

    /// Like [`Self::find_duplicate`], also reporting which rule matched.
    pub fn explain_duplicate(&self, candidate: &CardDraft) -> Option<DuplicateMatch> {
        find_match(&SignalFields::from(candidate), &self.cards).map(|(card, reason)| {
            DuplicateMatch {
                existing: card.clone(),
                reason,
            }
        })
    }

    /// Whether in-memory state holds changes the last write failed to store.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Retries persistence after a failed write. No-op when clean.
    pub fn flush(&mut self) -> RepoResult<()> {
        if !self.dirty {
            return Ok(());
        }
        self.persist("repo_flush", "-")
    }

    /// Borrows the storage collaborator.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Mutably borrows the storage collaborator.
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.cards.iter().position(|card| card.id == id)
    }

    fn persist(&mut self, event: &str, card_id: &str) -> RepoResult<()> {
        match self.storage.save_all(&self.cards) {
            Ok(()) => {
                self.dirty = false;
                info!(
                    "event={} module=repo status=ok card_id={} cards={}",
                    event,
                    card_id,
                    self.cards.len()
                );
                Ok(())
            }
            Err(err) => {
                self.dirty = true;
                error!(
                    "event={} module=repo status=error error_code=persist_failed card_id={} error={}",
                    event, card_id, err
                );
                Err(RepoError::Persistence(err))
            }
        }
    }
}

fn matches_query(card: &Card, needle: &str) -> bool {
    [
        Some(card.name.as_str()),
        card.company.as_deref(),
        card.email.as_deref(),
        card.phone.as_deref(),
        card.title.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|value| value.to_lowercase().contains(needle))
}

fn check_loaded(cards: &[Card]) -> RepoResult<()> {
    let mut seen = HashSet::with_capacity(cards.len());
    for card in cards {
        card.validate().map_err(|err| {
            RepoError::InvalidData(format!("card `{}`: {err}", card.id))
        })?;
        if !seen.insert(card.id.as_str()) {
            return Err(RepoError::InvalidData(format!(
                "card id `{}` appears more than once",
                card.id
            )));
        }
    }
    Ok(())
}

fn reason_label(reason: MatchReason) -> &'static str {
    match reason {
        MatchReason::Majority { .. } => "majority",
        MatchReason::Email => "email",
        MatchReason::Phone => "phone",
    }
}
