use cardvault_core::db::open_db_in_memory;
use cardvault_core::{
    Card, CardDraft, CardPatch, CardRepository, CardStorage, SqliteCardStorage, StorageError,
    CARDS_NAMESPACE,
};

#[test]
fn unwritten_database_loads_empty_collection() {
    let storage = SqliteCardStorage::open_in_memory().unwrap();
    assert!(storage.load_all().unwrap().is_empty());
    assert_eq!(storage.namespace(), CARDS_NAMESPACE);
}

#[test]
fn collection_survives_reopen_of_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cards.sqlite3");

    let expected = {
        let storage = SqliteCardStorage::open(&path).unwrap();
        let mut repo = CardRepository::load(storage).unwrap();
        repo.insert(CardDraft::new("a", "Ann Lee").with_email("ann@x.io"))
            .unwrap();
        repo.insert(
            CardDraft::new("b", "Bob Stone")
                .with_phone("555 0100")
                .with_image_ref("scans/b.jpg"),
        )
        .unwrap();
        repo.update(
            "a",
            CardPatch {
                title: Some(Some("Buyer".to_string())),
                ..CardPatch::default()
            },
        )
        .unwrap();
        repo.remove("missing").unwrap();
        repo.list().to_vec()
    };

    let reopened = CardRepository::load(SqliteCardStorage::open(&path).unwrap()).unwrap();
    assert_eq!(reopened.list(), expected.as_slice());
    assert_eq!(reopened.list()[0].id, "b");
    assert_eq!(reopened.get("a").unwrap().title.as_deref(), Some("Buyer"));
}

#[test]
fn save_replaces_whole_collection() {
    let mut storage = SqliteCardStorage::open_in_memory().unwrap();
    let first = vec![
        Card::from_draft(CardDraft::new("a", "Ann Lee"), 1),
        Card::from_draft(CardDraft::new("b", "Bob Stone"), 2),
    ];
    storage.save_all(&first).unwrap();

    let second = vec![Card::from_draft(CardDraft::new("c", "Cy Young"), 3)];
    storage.save_all(&second).unwrap();

    assert_eq!(storage.load_all().unwrap(), second);
    let rows: i64 = storage
        .connection()
        .query_row("SELECT COUNT(*) FROM kv_store;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn namespaces_are_isolated() {
    let conn = open_db_in_memory().unwrap();
    let mut storage = SqliteCardStorage::with_namespace(conn, "cards_archive");
    storage
        .save_all(&[Card::from_draft(CardDraft::new("a", "Ann Lee"), 1)])
        .unwrap();

    let count: i64 = storage
        .connection()
        .query_row(
            "SELECT COUNT(*) FROM kv_store WHERE namespace = ?1;",
            [CARDS_NAMESPACE],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(count, 0);
    assert_eq!(storage.load_all().unwrap().len(), 1);
}

#[test]
fn persisted_json_uses_camel_case_keys() {
    let mut storage = SqliteCardStorage::open_in_memory().unwrap();
    storage
        .save_all(&[Card::from_draft(
            CardDraft::new("a", "Ann Lee").with_image_ref("scan.jpg"),
            42,
        )])
        .unwrap();

    let raw: String = storage
        .connection()
        .query_row(
            "SELECT value FROM kv_store WHERE namespace = ?1;",
            [CARDS_NAMESPACE],
            |row| row.get(0),
        )
        .unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json[0]["imageRef"], "scan.jpg");
    assert_eq!(json[0]["createdAt"], 42);
    assert_eq!(json[0]["updatedAt"], 42);
}

#[test]
fn corrupt_stored_value_is_a_serialization_error() {
    let storage = SqliteCardStorage::open_in_memory().unwrap();
    storage
        .connection()
        .execute(
            "INSERT INTO kv_store (namespace, value, updated_at) VALUES (?1, 'not json', 0);",
            [CARDS_NAMESPACE],
        )
        .unwrap();

    let err = storage.load_all().unwrap_err();
    assert!(matches!(err, StorageError::Serialization(_)));
}
