use std::path::PathBuf;
use std::sync::Arc;

use rand::Rng;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::db::repositories::device_repository::DeviceRepository;
use crate::db::{DocumentLoad, TextStorage};
use crate::models::device::DeviceRecord;
use crate::utils::time::Clock;

/// Stable per-installation identifier, generated lazily and never replaced
/// while a valid record exists.
pub struct DeviceIdentityService {
    repository: DeviceRepository,
    clock: Arc<dyn Clock>,
    lock: Mutex<()>,
}

impl DeviceIdentityService {
    pub fn new(storage: Arc<dyn TextStorage>, path: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository: DeviceRepository::new(storage, path),
            clock,
            lock: Mutex::new(()),
        }
    }

    /// Never fails. Unreadable or corrupt records are replaced with a fresh
    /// id; if that id cannot be written it is still returned.
    pub async fn get_device_id(&self) -> String {
        let _guard = self.lock.lock().await;

        match self.repository.load().await {
            Ok(DocumentLoad::Loaded(record)) => return record.id,
            Ok(DocumentLoad::Missing) => {
                info!(target: "app::device", "no device id yet, generating one");
            }
            Ok(DocumentLoad::Corrupt { reason }) => {
                warn!(target: "app::device", %reason, "device id record corrupt, regenerating");
            }
            Err(err) => {
                warn!(target: "app::device", error = %err, "device id record unreadable, regenerating");
            }
        }

        let record = DeviceRecord {
            id: generate_device_id(self.clock.now_millis()),
        };
        if let Err(err) = self.repository.save(&record).await {
            warn!(
                target: "app::device",
                path = %self.repository.path().display(),
                error = %err,
                "failed to persist device id"
            );
        }
        record.id
    }
}

/// `{millis_hex}-{8 hex}-{8 hex}`.
pub fn generate_device_id(now_millis: i64) -> String {
    let mut rng = rand::thread_rng();
    let first: u32 = rng.gen();
    let second: u32 = rng.gen();
    format!("{:x}-{first:08x}-{second:08x}", now_millis.max(0))
}
