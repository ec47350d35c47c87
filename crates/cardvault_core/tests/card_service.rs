use cardvault_core::{
    Card, CardFields, CardPatch, CardService, CardServiceError, ImportSkip, MatchReason,
    MemoryCardStorage,
};
use uuid::Uuid;

fn service() -> CardService<MemoryCardStorage> {
    CardService::open(MemoryCardStorage::new()).unwrap()
}

fn fields(name: &str) -> CardFields {
    CardFields::new(name)
}

#[test]
fn capture_assigns_uuid_and_cleans_fields() {
    let mut service = service();
    let card = service
        .capture(&CardFields {
            email: Some("  jane@acme.com ".to_string()),
            notes: Some("   ".to_string()),
            ..fields(" Jane Doe ")
        })
        .unwrap();

    assert!(Uuid::parse_str(&card.id).is_ok());
    assert_eq!(card.name, "Jane Doe");
    assert_eq!(card.email.as_deref(), Some("jane@acme.com"));
    assert_eq!(card.notes, None);
    assert_eq!(service.get(&card.id), Some(&card));
}

#[test]
fn capture_duplicate_reports_existing_id() {
    let mut service = service();
    let first = service
        .capture(&CardFields {
            phone: Some("555-0100".to_string()),
            ..fields("Jane Doe")
        })
        .unwrap();

    let err = service
        .capture(&CardFields {
            phone: Some("(555) 0100".to_string()),
            ..fields("Someone")
        })
        .unwrap_err();
    assert!(matches!(err, CardServiceError::Duplicate { existing_id } if existing_id == first.id));
    assert_eq!(service.list().len(), 1);
}

#[test]
fn check_duplicate_explains_match_without_inserting() {
    let mut service = service();
    let first = service
        .capture(&CardFields {
            company: Some("Acme".to_string()),
            ..fields("Jane Doe")
        })
        .unwrap();

    let warning = service
        .check_duplicate(&CardFields {
            company: Some("acme".to_string()),
            ..fields("JANE DOE")
        })
        .unwrap();
    assert_eq!(warning.existing.id, first.id);
    assert!(matches!(warning.reason, MatchReason::Majority { .. }));
    assert_eq!(service.list().len(), 1);

    assert!(service.check_duplicate(&fields("Someone Else")).is_none());
}

#[test]
fn import_skips_duplicates_within_batch_and_invalid_entries() {
    let mut service = service();
    let batch = vec![
        CardFields {
            email: Some("ann@x.io".to_string()),
            ..fields("Ann Lee")
        },
        fields("   "),
        CardFields {
            email: Some("ANN@x.io".to_string()),
            ..fields("Ann L.")
        },
        fields("Bob Stone"),
    ];

    let summary = service.import(&batch).unwrap();
    assert_eq!(summary.inserted.len(), 2);
    assert_eq!(summary.rejected.len(), 2);
    assert_eq!(summary.rejected[0].index, 1);
    assert!(matches!(summary.rejected[0].reason, ImportSkip::Invalid(_)));
    assert_eq!(summary.rejected[1].index, 2);
    assert_eq!(
        summary.rejected[1].reason,
        ImportSkip::Duplicate {
            existing_id: summary.inserted[0].clone()
        }
    );

    // Most recent first: last imported card leads the list.
    assert_eq!(service.list()[0].id, summary.inserted[1]);
}

#[test]
fn import_json_parses_array_and_rejects_garbage() {
    let mut service = service();
    let summary = service
        .import_json(r#"[{"name":"Ann Lee","company":"Globex"},{"name":"Bob Stone"}]"#)
        .unwrap();
    assert_eq!(summary.inserted.len(), 2);
    assert_eq!(service.search("globex").len(), 1);

    let err = service.import_json("{not json").unwrap_err();
    assert!(matches!(err, CardServiceError::InvalidImport(_)));
}

#[test]
fn edit_missing_card_is_not_found_and_delete_reports_presence() {
    let mut service = service();
    let card = service.capture(&fields("Ann Lee")).unwrap();

    let err = service.edit("missing", CardPatch::default()).unwrap_err();
    assert!(matches!(err, CardServiceError::CardNotFound(id) if id == "missing"));

    let edited = service
        .edit(
            &card.id,
            CardPatch {
                website: Some(Some("https://ann.example".to_string())),
                ..CardPatch::default()
            },
        )
        .unwrap();
    assert_eq!(edited.website.as_deref(), Some("https://ann.example"));

    assert!(service.delete(&card.id).unwrap());
    assert!(!service.delete(&card.id).unwrap());
    assert!(service.get(&card.id).is_none());
}

#[test]
fn export_json_lists_collection_in_stored_order() {
    let mut service = service();
    service.capture(&fields("Ann Lee")).unwrap();
    service.capture(&fields("Bob Stone")).unwrap();

    let exported = service.export_json().unwrap();
    let cards: Vec<Card> = serde_json::from_str(&exported).unwrap();
    assert_eq!(cards, service.list());
    assert_eq!(cards[0].name, "Bob Stone");
}
