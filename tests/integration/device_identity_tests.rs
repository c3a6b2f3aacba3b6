use std::fs;
use std::path::Path;
use std::sync::Arc;

use kico_progress_lib::db::{FsStorage, MemoryStorage};
use kico_progress_lib::models::device::DeviceRecord;
use kico_progress_lib::services::device_service::DeviceIdentityService;
use kico_progress_lib::utils::time::ManualClock;
use tempfile::tempdir;

const NOW: i64 = 1_748_772_000_000;

fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(NOW))
}

#[tokio::test]
async fn test_device_id_is_stable_across_calls_and_restarts() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("device_id.json");

    let service = DeviceIdentityService::new(Arc::new(FsStorage), &path, clock());
    let first = service.get_device_id().await;
    assert!(!first.is_empty());
    assert_eq!(service.get_device_id().await, first);

    let stored: DeviceRecord = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(stored.id, first);

    let restarted = DeviceIdentityService::new(Arc::new(FsStorage), &path, clock());
    assert_eq!(restarted.get_device_id().await, first);
}

#[tokio::test]
async fn test_generated_id_embeds_creation_time() {
    let dir = tempdir().unwrap();
    let service = DeviceIdentityService::new(
        Arc::new(FsStorage),
        dir.path().join("device_id.json"),
        clock(),
    );

    let id = service.get_device_id().await;
    let prefix = id.split('-').next().unwrap();
    assert_eq!(i64::from_str_radix(prefix, 16).unwrap(), NOW);
}

#[tokio::test]
async fn test_existing_record_is_reused() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("device_id.json");
    fs::write(&path, r#"{"id":"tablet-kitchen"}"#).unwrap();

    let service = DeviceIdentityService::new(Arc::new(FsStorage), &path, clock());
    assert_eq!(service.get_device_id().await, "tablet-kitchen");
}

#[tokio::test]
async fn test_whitespace_id_is_kept() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("device_id.json");
    fs::write(&path, r#"{"id":"  "}"#).unwrap();

    let service = DeviceIdentityService::new(Arc::new(FsStorage), &path, clock());
    assert_eq!(service.get_device_id().await, "  ");
    assert_eq!(fs::read_to_string(&path).unwrap(), r#"{"id":"  "}"#);
}

#[tokio::test]
async fn test_corrupt_record_is_replaced() {
    for garbage in ["not json", "[]", r#"{"id":""}"#, r#"{"id":42}"#, ""] {
        let dir = tempdir().unwrap();
        let path = dir.path().join("device_id.json");
        fs::write(&path, garbage).unwrap();

        let service = DeviceIdentityService::new(Arc::new(FsStorage), &path, clock());
        let id = service.get_device_id().await;
        assert!(!id.is_empty(), "no id generated for {garbage:?}");

        let stored: DeviceRecord =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(stored.id, id);
        assert_eq!(service.get_device_id().await, id);
    }
}

#[tokio::test]
async fn test_unwritable_storage_still_yields_an_id() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set_fail_writes(true);
    let service = DeviceIdentityService::new(storage.clone(), "/data/device_id.json", clock());

    let first = service.get_device_id().await;
    assert!(!first.is_empty());
    assert!(storage.get(Path::new("/data/device_id.json")).is_none());

    // Nothing persisted, so the next call has to mint a new id.
    let second = service.get_device_id().await;
    assert_ne!(first, second);
}

#[tokio::test]
async fn test_unreadable_storage_regenerates() {
    let storage = Arc::new(MemoryStorage::new());
    storage.insert("/data/device_id.json", r#"{"id":"old"}"#);
    storage.set_fail_reads(true);
    let service = DeviceIdentityService::new(storage.clone(), "/data/device_id.json", clock());

    let id = service.get_device_id().await;
    assert_ne!(id, "old");

    storage.set_fail_reads(false);
    assert_eq!(service.get_device_id().await, id);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_first_concurrent_callers_agree() {
    let dir = tempdir().unwrap();
    let service = Arc::new(DeviceIdentityService::new(
        Arc::new(FsStorage),
        dir.path().join("device_id.json"),
        clock(),
    ));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.get_device_id().await })
        })
        .collect();

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap());
    }
    ids.dedup();
    assert_eq!(ids.len(), 1);
}
