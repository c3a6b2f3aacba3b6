use std::path::PathBuf;
use std::sync::Arc;

use crate::db::{DocumentFile, DocumentLoad, TextStorage};
use crate::error::AppResult;
use crate::models::device::DeviceRecord;

pub struct DeviceRepository {
    file: DocumentFile<DeviceRecord>,
}

impl DeviceRepository {
    pub fn new(storage: Arc<dyn TextStorage>, path: impl Into<PathBuf>) -> Self {
        Self {
            file: DocumentFile::new(storage, path),
        }
    }

    /// A record with an empty id counts as corrupt.
    pub async fn load(&self) -> AppResult<DocumentLoad<DeviceRecord>> {
        Ok(match self.file.load().await? {
            DocumentLoad::Loaded(record) if !record.is_valid() => DocumentLoad::Corrupt {
                reason: "device id is empty".to_string(),
            },
            other => other,
        })
    }

    pub async fn save(&self, record: &DeviceRecord) -> AppResult<()> {
        self.file.save(record).await
    }

    pub fn path(&self) -> &std::path::Path {
        self.file.path()
    }
}
