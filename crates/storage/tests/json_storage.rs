use std::fs;

use storage::repository::{Storage, StorageError};
use vocab_core::model::GroupId;

#[test]
fn json_storage_serves_bank_and_persists_snapshots() {
    let dir = tempfile::tempdir().unwrap();
    let bank_path = dir.path().join("word_bank.json");
    fs::write(
        &bank_path,
        r#"{
            "Group 1": [
                {"word": "abound", "simple": "be plentiful", "meaning": "exist in large numbers"},
                {"word": "austere", "simple": "strict", "meaning": "severe in manner"},
                {"word": "capricious", "simple": "unpredictable", "meaning": "prone to sudden change"}
            ]
        }"#,
    )
    .unwrap();

    let storage = Storage::json_files(&bank_path, dir.path().join("progress.json"));

    let group = storage.word_bank.get_group(&GroupId::new("Group 1")).unwrap();
    assert_eq!(group.len(), 3);
    assert_eq!(group.find("austere").unwrap().simple, "strict");

    let err = storage
        .word_bank
        .get_group(&GroupId::new("Group 9"))
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound(_)));

    assert!(storage.snapshots.load_snapshot().unwrap().is_none());
    storage.snapshots.save_snapshot("{\"score\": 0}").unwrap();
    assert_eq!(
        storage.snapshots.load_snapshot().unwrap().as_deref(),
        Some("{\"score\": 0}")
    );
}

#[test]
fn malformed_bank_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let bank_path = dir.path().join("word_bank.json");
    fs::write(&bank_path, "[1, 2, 3]").unwrap();

    let storage = Storage::json_files(&bank_path, dir.path().join("progress.json"));
    let err = storage.word_bank.load_bank().unwrap_err();
    assert!(matches!(err, StorageError::Serialization(_)));
}
