//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level card functions to Dart via FRB.
//! - Keep error semantics simple: envelopes with `ok` and a message.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Calls are serialized process-wide; each call loads the collection,
//!   runs one use case, and persists before returning.

use cardvault_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Card, CardFields, CardPatch, CardService, CardServiceError, MatchReason, SqliteCardStorage,
};
use log::warn;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

const CARDS_DB_FILE_NAME: &str = "cardvault_cards.sqlite3";
const CARDS_DB_PATH_ENV: &str = "CARDVAULT_DB_PATH";
static CARDS_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static CARDS_CALL_LOCK: Mutex<()> = Mutex::new(());

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Returns an empty string on success and an error message otherwise.
/// Safe to call repeatedly with the same `level + log_dir`.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Sets the card database path before first use.
///
/// Returns an empty string on success. Fails when the path is blank or a
/// different path is already in use for this process.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_cards_db_path(db_path: String) -> String {
    let trimmed = db_path.trim();
    if trimmed.is_empty() {
        return "db_path cannot be empty".to_string();
    }

    let requested = PathBuf::from(trimmed);
    let active = CARDS_DB_PATH.get_or_init(|| requested.clone());
    if *active == requested {
        String::new()
    } else {
        format!(
            "cards DB already configured at `{}`; refusing to switch to `{}`",
            active.display(),
            requested.display()
        )
    }
}

/// Card as shown by list/detail screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardItem {
    pub id: String,
    pub name: String,
    pub title: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub image_ref: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<Card> for CardItem {
    fn from(card: Card) -> Self {
        Self {
            id: card.id,
            name: card.name,
            title: card.title,
            company: card.company,
            email: card.email,
            phone: card.phone,
            website: card.website,
            address: card.address,
            notes: card.notes,
            image_ref: card.image_ref,
            created_at: card.created_at,
            updated_at: card.updated_at,
        }
    }
}

/// Field values entered on the capture or edit screen.
///
/// On update, `None` keeps the stored value and an empty string clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardInput {
    pub name: Option<String>,
    pub title: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub image_ref: Option<String>,
}

impl CardInput {
    fn to_fields(&self) -> CardFields {
        CardFields {
            name: self.name.clone().unwrap_or_default(),
            title: self.title.clone(),
            company: self.company.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            website: self.website.clone(),
            address: self.address.clone(),
            notes: self.notes.clone(),
            image_ref: self.image_ref.clone(),
        }
    }

    fn to_patch(&self) -> CardPatch {
        CardPatch {
            name: self.name.as_ref().map(|value| value.trim().to_string()),
            title: patch_value(&self.title),
            company: patch_value(&self.company),
            email: patch_value(&self.email),
            phone: patch_value(&self.phone),
            website: patch_value(&self.website),
            address: patch_value(&self.address),
            notes: patch_value(&self.notes),
            image_ref: patch_value(&self.image_ref),
        }
    }
}

/// Generic action response envelope for card mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Affected card id on success.
    pub card_id: Option<String>,
    /// Existing card id when a capture was rejected as duplicate.
    pub duplicate_of: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl CardActionResponse {
    fn success(message: impl Into<String>, card_id: String) -> Self {
        Self {
            ok: true,
            card_id: Some(card_id),
            duplicate_of: None,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            card_id: None,
            duplicate_of: None,
            message: message.into(),
        }
    }

    fn duplicate(existing_id: String) -> Self {
        Self {
            ok: false,
            card_id: None,
            message: format!("Card already exists: {existing_id}."),
            duplicate_of: Some(existing_id),
        }
    }
}

/// List response envelope for get/search flows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardListResponse {
    pub items: Vec<CardItem>,
    pub message: String,
}

/// Pre-flight duplicate warning for the capture screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateCheckResponse {
    /// Matching card when one exists.
    pub existing: Option<CardItem>,
    /// `email|phone|majority`, empty when no match or on failure.
    pub rule: String,
    pub message: String,
}

/// Captures a new card.
///
/// Rejected duplicates return `ok=false` with `duplicate_of` set.
#[flutter_rust_bridge::frb(sync)]
pub fn card_capture(input: CardInput) -> CardActionResponse {
    let fields = input.to_fields();
    match with_card_service(|service| service.capture(&fields)) {
        Ok(card) => CardActionResponse::success("Card saved.", card.id),
        Err(ServiceCallError::Service(CardServiceError::Duplicate { existing_id })) => {
            CardActionResponse::duplicate(existing_id)
        }
        Err(err) => CardActionResponse::failure(format!("card_capture failed: {err}")),
    }
}

/// Applies edits from the detail screen.
#[flutter_rust_bridge::frb(sync)]
pub fn card_update(card_id: String, input: CardInput) -> CardActionResponse {
    let patch = input.to_patch();
    match with_card_service(|service| service.edit(card_id.trim(), patch)) {
        Ok(card) => CardActionResponse::success("Card updated.", card.id),
        Err(err) => CardActionResponse::failure(format!("card_update failed: {err}")),
    }
}

/// Deletes a card; deleting an unknown id still succeeds.
#[flutter_rust_bridge::frb(sync)]
pub fn card_delete(card_id: String) -> CardActionResponse {
    let card_id = card_id.trim().to_string();
    match with_card_service(|service| service.delete(&card_id)) {
        Ok(true) => CardActionResponse::success("Card deleted.", card_id),
        Ok(false) => CardActionResponse::success("Card already absent.", card_id),
        Err(err) => CardActionResponse::failure(format!("card_delete failed: {err}")),
    }
}

/// Loads one card by id; `items` is empty when absent.
#[flutter_rust_bridge::frb(sync)]
pub fn card_get(card_id: String) -> CardListResponse {
    let result = with_card_service(|service| {
        Ok::<_, CardServiceError>(service.get(card_id.trim()).cloned())
    });
    match result {
        Ok(Some(card)) => CardListResponse {
            items: vec![card.into()],
            message: "Found 1 card.".to_string(),
        },
        Ok(None) => CardListResponse {
            items: Vec::new(),
            message: "Card not found.".to_string(),
        },
        Err(err) => CardListResponse {
            items: Vec::new(),
            message: format!("card_get failed: {err}"),
        },
    }
}

/// Searches name, company, email, phone and title; blank text lists all.
#[flutter_rust_bridge::frb(sync)]
pub fn card_search(text: String) -> CardListResponse {
    let result =
        with_card_service(|service| Ok::<_, CardServiceError>(service.search(text.as_str())));
    match result {
        Ok(cards) => {
            let items = cards.into_iter().map(CardItem::from).collect::<Vec<_>>();
            let message = if items.is_empty() {
                "No results.".to_string()
            } else {
                format!("Found {} card(s).", items.len())
            };
            CardListResponse { items, message }
        }
        Err(err) => CardListResponse {
            items: Vec::new(),
            message: format!("card_search failed: {err}"),
        },
    }
}

/// Checks whether capture input would be rejected as a duplicate.
#[flutter_rust_bridge::frb(sync)]
pub fn card_check_duplicate(input: CardInput) -> DuplicateCheckResponse {
    let fields = input.to_fields();
    let result =
        with_card_service(|service| Ok::<_, CardServiceError>(service.check_duplicate(&fields)));
    match result {
        Ok(Some(found)) => DuplicateCheckResponse {
            rule: rule_label(found.reason).to_string(),
            existing: Some(found.existing.into()),
            message: "Possible duplicate found.".to_string(),
        },
        Ok(None) => DuplicateCheckResponse {
            existing: None,
            rule: String::new(),
            message: "No duplicate.".to_string(),
        },
        Err(err) => DuplicateCheckResponse {
            existing: None,
            rule: String::new(),
            message: format!("card_check_duplicate failed: {err}"),
        },
    }
}

#[derive(Debug)]
enum ServiceCallError {
    Open(String),
    Service(CardServiceError),
}

impl std::fmt::Display for ServiceCallError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open(message) => write!(f, "{message}"),
            Self::Service(err) => write!(f, "{err}"),
        }
    }
}

fn resolve_cards_db_path() -> PathBuf {
    CARDS_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(CARDS_DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(CARDS_DB_FILE_NAME)
        })
        .clone()
}

fn with_card_service<T>(
    f: impl FnOnce(&mut CardService<SqliteCardStorage>) -> Result<T, CardServiceError>,
) -> Result<T, ServiceCallError> {
    // A poisoned lock only means an earlier call panicked; state lives in
    // the database, so continue.
    let _guard = CARDS_CALL_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    let db_path = resolve_cards_db_path();
    let storage = SqliteCardStorage::open(&db_path)
        .map_err(|err| ServiceCallError::Open(format!("cards DB open failed: {err}")))?;
    let mut service = CardService::open(storage)
        .map_err(|err| ServiceCallError::Open(format!("cards load failed: {err}")))?;

    let result = f(&mut service).map_err(ServiceCallError::Service);
    if service.repository().is_dirty() {
        warn!("event=ffi_call module=ffi status=dirty error_code=persist_failed");
    }
    result
}

fn patch_value(value: &Option<String>) -> Option<Option<String>> {
    value.as_ref().map(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn rule_label(reason: MatchReason) -> &'static str {
    match reason {
        MatchReason::Email => "email",
        MatchReason::Phone => "phone",
        MatchReason::Majority { .. } => "majority",
    }
}

#[cfg(test)]
mod tests {
    use super::{
        card_capture, card_check_duplicate, card_delete, card_get, card_search, card_update,
        configure_cards_db_path, core_version, init_logging, ping, CardInput,
    };
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn configure_rejects_blank_path() {
        assert!(!configure_cards_db_path("  ".to_string()).is_empty());
    }

    #[test]
    fn capture_then_search_and_get_finds_card() {
        let token = unique_token("search");
        let created = card_capture(CardInput {
            name: Some(format!("Search {token}")),
            email: Some(format!("{token}@example.com")),
            ..CardInput::default()
        });
        assert!(created.ok, "{}", created.message);
        let card_id = created.card_id.expect("capture should return card_id");

        let response = card_search(token.to_uppercase());
        assert!(response.items.iter().any(|item| item.id == card_id));

        let loaded = card_get(card_id.clone());
        assert_eq!(loaded.items.len(), 1);
        assert_eq!(loaded.items[0].created_at, loaded.items[0].updated_at);
    }

    #[test]
    fn capture_duplicate_email_returns_duplicate_of() {
        let token = unique_token("dup");
        let first = card_capture(CardInput {
            name: Some(format!("First {token}")),
            email: Some(format!("{token}@example.com")),
            ..CardInput::default()
        });
        assert!(first.ok, "{}", first.message);

        let candidate = CardInput {
            name: Some(format!("Second {token}")),
            email: Some(format!("{}@EXAMPLE.com", token.to_uppercase())),
            ..CardInput::default()
        };
        let check = card_check_duplicate(candidate.clone());
        assert_eq!(check.rule, "email");
        assert_eq!(check.existing.map(|item| item.id), first.card_id.clone());

        let second = card_capture(candidate);
        assert!(!second.ok);
        assert_eq!(second.duplicate_of, first.card_id);
    }

    #[test]
    fn update_and_delete_round_trip() {
        let token = unique_token("edit");
        let created = card_capture(CardInput {
            name: Some(format!("Edit {token}")),
            notes: Some("temporary".to_string()),
            ..CardInput::default()
        });
        let card_id = created.card_id.expect("capture should return card_id");

        let updated = card_update(
            card_id.clone(),
            CardInput {
                title: Some("Director".to_string()),
                notes: Some(String::new()),
                ..CardInput::default()
            },
        );
        assert!(updated.ok, "{}", updated.message);
        let loaded = card_get(card_id.clone());
        assert_eq!(loaded.items[0].title.as_deref(), Some("Director"));
        assert_eq!(loaded.items[0].notes, None);
        assert!(loaded.items[0].updated_at > loaded.items[0].created_at);

        assert!(card_delete(card_id.clone()).ok);
        assert!(card_get(card_id.clone()).items.is_empty());
        assert!(card_delete(card_id.clone()).ok);

        let missing = card_update(card_id, CardInput::default());
        assert!(!missing.ok);
        assert!(missing.message.contains("not found"));
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}{nanos}")
    }
}
