use std::fs;
use std::sync::Arc;

use kico_progress_lib::db::{FsStorage, MemoryStorage};
use kico_progress_lib::services::instruction_service::InstructionService;
use tempfile::tempdir;

#[tokio::test]
async fn test_mark_seen_persists_flag() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("instructions_seen.json");
    let service = InstructionService::new(Arc::new(FsStorage), &path);

    assert!(!service.is_seen("memory-game").await);
    assert!(!path.exists());

    assert!(service.mark_seen("memory-game").await.unwrap());
    assert!(service.is_seen("memory-game").await);
    assert!(!service.is_seen("odd-word-out").await);

    // Marking again reports nothing new.
    assert!(!service.mark_seen("memory-game").await.unwrap());

    let stored: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(stored, serde_json::json!({ "memory-game": true }));
}

#[tokio::test]
async fn test_screen_ids_are_trimmed() {
    let dir = tempdir().unwrap();
    let service = InstructionService::new(
        Arc::new(FsStorage),
        dir.path().join("instructions_seen.json"),
    );

    service.mark_seen("  listening ").await.unwrap();
    assert!(service.is_seen("listening").await);
    assert!(service.is_seen(" listening").await);
}

#[tokio::test]
async fn test_blank_screen_id_is_rejected() {
    let dir = tempdir().unwrap();
    let service = InstructionService::new(
        Arc::new(FsStorage),
        dir.path().join("instructions_seen.json"),
    );

    assert!(service.mark_seen("   ").await.is_err());
}

#[tokio::test]
async fn test_existing_flags_are_read_loosely() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("instructions_seen.json");
    fs::write(&path, r#"{"a": true, "b": false, "c": 1, "d": ""}"#).unwrap();
    let service = InstructionService::new(Arc::new(FsStorage), &path);

    assert!(service.is_seen("a").await);
    assert!(!service.is_seen("b").await);
    assert!(service.is_seen("c").await);
    assert!(!service.is_seen("d").await);

    // Marking an entry that was explicitly false flips it.
    assert!(service.mark_seen("b").await.unwrap());
    assert!(service.is_seen("b").await);
}

#[tokio::test]
async fn test_corrupt_flags_read_as_unseen_and_are_repaired() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("instructions_seen.json");
    fs::write(&path, "{broken").unwrap();
    let service = InstructionService::new(Arc::new(FsStorage), &path);

    assert!(!service.is_seen("intro").await);
    assert!(service.mark_seen("intro").await.unwrap());
    assert!(service.is_seen("intro").await);
}

#[tokio::test]
async fn test_unreadable_storage_reads_as_unseen() {
    let storage = Arc::new(MemoryStorage::new());
    storage.insert("/data/instructions_seen.json", r#"{"intro": true}"#);
    storage.set_fail_reads(true);
    let service = InstructionService::new(storage.clone(), "/data/instructions_seen.json");

    assert!(!service.is_seen("intro").await);

    storage.set_fail_reads(false);
    assert!(service.is_seen("intro").await);
}
