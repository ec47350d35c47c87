//! Card domain model.
//!
//! # Responsibility
//! - Define the canonical contact-card record and its insert/update inputs.
//! - Validate caller-supplied identity and display name.
//!
//! # Invariants
//! - `id` is assigned by the caller before insertion and never changes.
//! - `created_at` is set once at insertion; `updated_at >= created_at`.
//! - `name` is never blank for a stored card.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Opaque caller-assigned card identifier.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type CardId = String;

/// Validation failures for card inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardValidationError {
    /// `id` is empty or whitespace-only.
    BlankId,
    /// `name` is empty or whitespace-only.
    BlankName,
}

impl Display for CardValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankId => write!(f, "card id cannot be blank"),
            Self::BlankName => write!(f, "card name cannot be blank"),
        }
    }
}

impl Error for CardValidationError {}

/// Stored contact card.
///
/// Serialized with camelCase keys to stay compatible with collections
/// written by earlier app versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Reference to the scanned card image (local path or upload key).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
    /// Unix epoch milliseconds, set once at insertion.
    pub created_at: i64,
    /// Unix epoch milliseconds, refreshed on every successful mutation.
    pub updated_at: i64,
}

impl Card {
    /// Materializes a draft into a stored card stamped with `now`.
    pub fn from_draft(draft: CardDraft, now: i64) -> Self {
        Self {
            id: draft.id,
            name: draft.name,
            title: draft.title,
            company: draft.company,
            email: draft.email,
            phone: draft.phone,
            website: draft.website,
            address: draft.address,
            notes: draft.notes,
            image_ref: draft.image_ref,
            created_at: now,
            updated_at: now,
        }
    }

    /// Validates persisted or freshly-built card state.
    pub fn validate(&self) -> Result<(), CardValidationError> {
        validate_identity(&self.id, &self.name)
    }

    /// Applies a partial update in place.
    ///
    /// Does not touch `id`, `created_at` or `updated_at`; timestamping is
    /// owned by the repository.
    pub fn apply(&mut self, patch: CardPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        apply_optional(&mut self.title, patch.title);
        apply_optional(&mut self.company, patch.company);
        apply_optional(&mut self.email, patch.email);
        apply_optional(&mut self.phone, patch.phone);
        apply_optional(&mut self.website, patch.website);
        apply_optional(&mut self.address, patch.address);
        apply_optional(&mut self.notes, patch.notes);
        apply_optional(&mut self.image_ref, patch.image_ref);
    }
}

/// Insert candidate built by capture/import flows.
///
/// Callers must generate a globally unique `id` before insertion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDraft {
    pub id: CardId,
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub image_ref: Option<String>,
}

impl CardDraft {
    /// Creates a draft with only the required fields set.
    pub fn new(id: impl Into<CardId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, value: impl Into<String>) -> Self {
        self.title = Some(value.into());
        self
    }

    pub fn with_company(mut self, value: impl Into<String>) -> Self {
        self.company = Some(value.into());
        self
    }

    pub fn with_email(mut self, value: impl Into<String>) -> Self {
        self.email = Some(value.into());
        self
    }

    pub fn with_phone(mut self, value: impl Into<String>) -> Self {
        self.phone = Some(value.into());
        self
    }

    pub fn with_notes(mut self, value: impl Into<String>) -> Self {
        self.notes = Some(value.into());
        self
    }

    pub fn with_image_ref(mut self, value: impl Into<String>) -> Self {
        self.image_ref = Some(value.into());
        self
    }

    /// Validates required draft fields.
    pub fn validate(&self) -> Result<(), CardValidationError> {
        validate_identity(&self.id, &self.name)
    }
}

/// Partial update for a stored card.
///
/// Optional fields use a tri-state: `None` keeps the current value,
/// `Some(None)` clears it, `Some(Some(v))` replaces it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardPatch {
    pub name: Option<String>,
    pub title: Option<Option<String>>,
    pub company: Option<Option<String>>,
    pub email: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub website: Option<Option<String>>,
    pub address: Option<Option<String>>,
    pub notes: Option<Option<String>>,
    pub image_ref: Option<Option<String>>,
}

impl CardPatch {
    /// Validates fields the patch would overwrite.
    pub fn validate(&self) -> Result<(), CardValidationError> {
        match self.name.as_deref() {
            Some(name) if name.trim().is_empty() => Err(CardValidationError::BlankName),
            _ => Ok(()),
        }
    }
}

fn validate_identity(id: &str, name: &str) -> Result<(), CardValidationError> {
    if id.trim().is_empty() {
        return Err(CardValidationError::BlankId);
    }
    if name.trim().is_empty() {
        return Err(CardValidationError::BlankName);
    }
    Ok(())
}

fn apply_optional(slot: &mut Option<String>, change: Option<Option<String>>) {
    if let Some(value) = change {
        *slot = value;
    }
}

#[cfg(test)]
mod tests {
    use super::{Card, CardDraft, CardPatch, CardValidationError};

    #[test]
    fn from_draft_stamps_both_timestamps() {
        let card = Card::from_draft(CardDraft::new("c-1", "Jane Doe"), 1_000);
        assert_eq!(card.created_at, 1_000);
        assert_eq!(card.updated_at, 1_000);
    }

    #[test]
    fn validate_rejects_blank_identity() {
        assert_eq!(
            CardDraft::new("  ", "Jane").validate(),
            Err(CardValidationError::BlankId)
        );
        assert_eq!(
            CardDraft::new("c-1", " \t").validate(),
            Err(CardValidationError::BlankName)
        );
    }

    #[test]
    fn apply_distinguishes_keep_clear_and_set() {
        let draft = CardDraft::new("c-1", "Jane")
            .with_email("jane@acme.com")
            .with_phone("555-0100")
            .with_notes("met at expo");
        let mut card = Card::from_draft(draft, 1);

        card.apply(CardPatch {
            email: Some(None),
            phone: Some(Some("555-0199".to_string())),
            ..CardPatch::default()
        });

        assert_eq!(card.email, None);
        assert_eq!(card.phone.as_deref(), Some("555-0199"));
        assert_eq!(card.notes.as_deref(), Some("met at expo"));
        assert_eq!(card.name, "Jane");
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let card = Card::from_draft(CardDraft::new("c-1", "Jane").with_image_ref("scan.jpg"), 7);
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["imageRef"], "scan.jpg");
        assert_eq!(json["createdAt"], 7);
        assert!(json.get("email").is_none());
    }
}
