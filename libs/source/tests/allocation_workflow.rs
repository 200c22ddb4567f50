//! End-to-end allocation against a file source: load, mint, persist, reload.

use prospect_id::IdError;
use prospect_source::{load_registry, FileSource, IdSource};

async fn seeded_source(dir: &tempfile::TempDir, rows: &str) -> FileSource {
    let path = dir.path().join("prospect_ids.txt");
    tokio::fs::write(&path, rows).await.unwrap();
    FileSource::new(path)
}

#[tokio::test]
async fn minted_ids_survive_reload() {
    let dir = tempfile::tempdir().unwrap();
    let source = seeded_source(&dir, "01001001A\n01001001B\n01001003A\n").await;

    let mut registry = load_registry(&source).await.unwrap();

    let new_family = registry.next_new_family_id("01001").unwrap();
    assert_eq!(new_family.to_string(), "01001002A");
    registry.add_id(new_family).unwrap();

    let new_version = registry.next_id_in_family("01001001").unwrap();
    assert_eq!(new_version.to_string(), "01001001C");
    registry.add_id(new_version).unwrap();

    source.write_all(registry.iter()).await.unwrap();

    let reloaded = load_registry(&source).await.unwrap();
    assert_eq!(reloaded, registry);
    assert_eq!(reloaded.next_available_family("01001").unwrap().to_string(), "004");
    assert_eq!(reloaded.next_available_letter("01001002").unwrap().as_char(), 'B');
}

#[tokio::test]
async fn retired_family_is_reused() {
    let dir = tempfile::tempdir().unwrap();
    let source = seeded_source(&dir, "12345001A\n12345002A\n12345002B\n12345003A\n").await;

    let mut registry = load_registry(&source).await.unwrap();
    registry.remove("12345002A").unwrap();
    assert_eq!(registry.next_available_family("12345").unwrap().to_string(), "004");

    registry.remove("12345002B").unwrap();
    assert_eq!(registry.next_available_family("12345").unwrap().to_string(), "002");
    assert!(matches!(
        registry.remove("12345002B"),
        Err(IdError::UnknownIdentifier { .. })
    ));
}

#[tokio::test]
async fn exhausted_family_needs_new_family() {
    let dir = tempfile::tempdir().unwrap();
    let source = seeded_source(&dir, "54321007Y\n54321007Z\n").await;
    assert_eq!(source.fetch().await.unwrap().len(), 2);

    let registry = load_registry(&source).await.unwrap();
    assert!(matches!(
        registry.next_available_letter("54321007"),
        Err(IdError::LetterExhausted { .. })
    ));
    assert_eq!(registry.next_new_family_id("54321").unwrap().to_string(), "54321001A");
}
