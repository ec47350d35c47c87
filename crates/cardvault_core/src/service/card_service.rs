//! Card use-case service.
//!
//! # Responsibility
//! - Turn raw captured/imported field values into card drafts.
//! - Assign stable UUID ids before handing drafts to the repository.
//! - Provide batch import and JSON export of the collection.
//!
//! # Invariants
//! - Inputs are trimmed; blank optional values are stored as `None`.
//! - Import never aborts on a duplicate or invalid entry; it reports them.
//! - Editing a missing card is an error at this layer (`CardNotFound`),
//!   while the repository itself treats it as a no-op.

use crate::model::card::{Card, CardDraft, CardId, CardPatch};
use crate::repo::card_repo::{CardRepository, DuplicateMatch, RepoError, RepoResult};
use crate::storage::CardStorage;
use log::info;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Service error for card use cases.
#[derive(Debug)]
pub enum CardServiceError {
    /// Candidate duplicates an existing card.
    Duplicate { existing_id: CardId },
    /// Target card does not exist.
    CardNotFound(CardId),
    /// Import payload is not a JSON array of card fields.
    InvalidImport(serde_json::Error),
    /// Collection could not be encoded for export.
    Export(serde_json::Error),
    /// Repository-layer failure.
    Repo(RepoError),
}

impl Display for CardServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Duplicate { existing_id } => {
                write!(f, "card already exists: {existing_id}")
            }
            Self::CardNotFound(id) => write!(f, "card not found: {id}"),
            Self::InvalidImport(err) => write!(f, "invalid import payload: {err}"),
            Self::Export(err) => write!(f, "card export failed: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CardServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidImport(err) | Self::Export(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Duplicate { .. } | Self::CardNotFound(_) => None,
        }
    }
}

impl From<RepoError> for CardServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::DuplicateRejected { existing } => Self::Duplicate {
                existing_id: existing.id,
            },
            other => Self::Repo(other),
        }
    }
}

/// Raw field values from the capture screen or an import file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CardFields {
    pub name: String,
    pub title: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub image_ref: Option<String>,
}

impl CardFields {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builds a draft with `id`, trimming values and dropping blanks.
    pub fn to_draft(&self, id: impl Into<CardId>) -> CardDraft {
        CardDraft {
            id: id.into(),
            name: self.name.trim().to_string(),
            title: clean(self.title.as_deref()),
            company: clean(self.company.as_deref()),
            email: clean(self.email.as_deref()),
            phone: clean(self.phone.as_deref()),
            website: clean(self.website.as_deref()),
            address: clean(self.address.as_deref()),
            notes: clean(self.notes.as_deref()),
            image_ref: clean(self.image_ref.as_deref()),
        }
    }
}

/// Why one import entry was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportSkip {
    /// Matched an existing (or earlier imported) card.
    Duplicate { existing_id: CardId },
    /// Entry failed validation.
    Invalid(String),
}

/// Per-entry outcome of a skipped import row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRejection {
    /// Zero-based position in the import batch.
    pub index: usize,
    pub reason: ImportSkip,
}

/// Batch import outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Ids of inserted cards in batch order.
    pub inserted: Vec<CardId>,
    pub rejected: Vec<ImportRejection>,
}

/// Card service facade over a repository.
pub struct CardService<S: CardStorage> {
    repo: CardRepository<S>,
}

impl<S: CardStorage> CardService<S> {
    pub fn new(repo: CardRepository<S>) -> Self {
        Self { repo }
    }

    /// Loads the repository from `storage` and wraps it.
    pub fn open(storage: S) -> RepoResult<Self> {
        Ok(Self::new(CardRepository::load(storage)?))
    }

    pub fn repository(&self) -> &CardRepository<S> {
        &self.repo
    }

    pub fn repository_mut(&mut self) -> &mut CardRepository<S> {
        &mut self.repo
    }

    /// Stores a freshly captured card under a new UUID.
    pub fn capture(&mut self, fields: &CardFields) -> Result<Card, CardServiceError> {
        let draft = fields.to_draft(new_card_id());
        Ok(self.repo.insert(draft)?)
    }

    /// Pre-flight duplicate warning for the capture screen.
    pub fn check_duplicate(&self, fields: &CardFields) -> Option<DuplicateMatch> {
        self.repo.explain_duplicate(&fields.to_draft(CardId::new()))
    }

    /// Inserts each entry, skipping duplicates and invalid entries.
    ///
    /// Entries are checked against cards inserted earlier in the same batch.
    ///
    /// # Errors
    /// Stops at the first persistence failure; earlier entries stay in the
    /// in-memory collection.
    pub fn import(&mut self, entries: &[CardFields]) -> Result<ImportSummary, CardServiceError> {
        let mut summary = ImportSummary::default();

        for (index, fields) in entries.iter().enumerate() {
            match self.repo.insert(fields.to_draft(new_card_id())) {
                Ok(card) => summary.inserted.push(card.id),
                Err(RepoError::DuplicateRejected { existing }) => {
                    summary.rejected.push(ImportRejection {
                        index,
                        reason: ImportSkip::Duplicate {
                            existing_id: existing.id,
                        },
                    });
                }
                Err(RepoError::Validation(err)) => {
                    summary.rejected.push(ImportRejection {
                        index,
                        reason: ImportSkip::Invalid(err.to_string()),
                    });
                }
                Err(other) => return Err(other.into()),
            }
        }

        info!(
            "event=card_import module=service status=ok entries={} inserted={} rejected={}",
            entries.len(),
            summary.inserted.len(),
            summary.rejected.len()
        );
        Ok(summary)
    }

    /// Parses a JSON array of card fields and imports it.
    pub fn import_json(&mut self, raw: &str) -> Result<ImportSummary, CardServiceError> {
        let entries: Vec<CardFields> =
            serde_json::from_str(raw).map_err(CardServiceError::InvalidImport)?;
        self.import(&entries)
    }

    /// Applies a field edit; a missing card is reported as `CardNotFound`.
    pub fn edit(&mut self, id: &str, patch: CardPatch) -> Result<Card, CardServiceError> {
        self.repo
            .update(id, patch)?
            .ok_or_else(|| CardServiceError::CardNotFound(id.to_string()))
    }

    /// Deletes a card; returns whether it existed.
    pub fn delete(&mut self, id: &str) -> Result<bool, CardServiceError> {
        Ok(self.repo.remove(id)?)
    }

    pub fn get(&self, id: &str) -> Option<&Card> {
        self.repo.get(id)
    }

    pub fn search(&self, query: &str) -> Vec<Card> {
        self.repo.search(query)
    }

    pub fn list(&self) -> &[Card] {
        self.repo.list()
    }

    /// Pretty-printed JSON array of the collection in stored order.
    pub fn export_json(&self) -> Result<String, CardServiceError> {
        serde_json::to_string_pretty(self.repo.list()).map_err(CardServiceError::Export)
    }
}

fn new_card_id() -> CardId {
    Uuid::new_v4().to_string()
}

fn clean(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::{clean, CardFields};

    #[test]
    fn clean_drops_blank_values() {
        assert_eq!(clean(Some("  ")), None);
        assert_eq!(clean(None), None);
        assert_eq!(clean(Some(" Acme ")).as_deref(), Some("Acme"));
    }

    #[test]
    fn to_draft_trims_name_and_keeps_id() {
        let fields = CardFields {
            email: Some(" jane@acme.com ".to_string()),
            website: Some(String::new()),
            ..CardFields::new("  Jane Doe ")
        };
        let draft = fields.to_draft("id-1");
        assert_eq!(draft.id, "id-1");
        assert_eq!(draft.name, "Jane Doe");
        assert_eq!(draft.email.as_deref(), Some("jane@acme.com"));
        assert_eq!(draft.website, None);
    }

    #[test]
    fn fields_deserialize_from_partial_camel_case_json() {
        let fields: CardFields =
            serde_json::from_str(r#"{"name":"Jane","imageRef":"scan.jpg"}"#).unwrap();
        assert_eq!(fields.name, "Jane");
        assert_eq!(fields.image_ref.as_deref(), Some("scan.jpg"));
        assert_eq!(fields.email, None);
    }
}
