use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::error::{AppError, AppResult};

/// Whole-file text primitives the document stores are built on.
#[async_trait]
pub trait TextStorage: Send + Sync {
    async fn exists(&self, path: &Path) -> AppResult<bool>;

    /// Raw bytes; decoding is left to the caller so undecodable content can
    /// be treated as corruption rather than an I/O failure.
    async fn read_bytes(&self, path: &Path) -> AppResult<Vec<u8>>;

    /// Replaces the file content. A completed write is visible to the next read.
    async fn write_text(&self, path: &Path, content: &str) -> AppResult<()>;
}

/// Storage on the app-private filesystem.
///
/// Writes go to a sibling `.tmp` file which is then renamed over the target,
/// so readers observe either the previous or the new document.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsStorage;

impl FsStorage {
    fn temp_path(path: &Path) -> PathBuf {
        let mut name = path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        path.with_file_name(name)
    }
}

#[async_trait]
impl TextStorage for FsStorage {
    async fn exists(&self, path: &Path) -> AppResult<bool> {
        fs::try_exists(path)
            .await
            .map_err(|err| AppError::storage(path, err))
    }

    async fn read_bytes(&self, path: &Path) -> AppResult<Vec<u8>> {
        fs::read(path)
            .await
            .map_err(|err| AppError::storage(path, err))
    }

    async fn write_text(&self, path: &Path, content: &str) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|err| AppError::storage(parent, err))?;
            }
        }

        let temp = Self::temp_path(path);
        fs::write(&temp, content)
            .await
            .map_err(|err| AppError::storage(&temp, err))?;
        fs::rename(&temp, path)
            .await
            .map_err(|err| AppError::storage(path, err))?;

        debug!(target: "app::storage", path = %path.display(), bytes = content.len(), "document written");
        Ok(())
    }
}

/// In-process storage, used for previews and tests. Writes can be made to
/// fail on demand to exercise error paths.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: Mutex<HashMap<PathBuf, Vec<u8>>>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) {
        if let Ok(mut files) = self.files.lock() {
            files.insert(path.into(), content.into());
        }
    }

    pub fn get(&self, path: &Path) -> Option<String> {
        self.files
            .lock()
            .ok()
            .and_then(|files| files.get(path).cloned())
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl TextStorage for MemoryStorage {
    async fn exists(&self, path: &Path) -> AppResult<bool> {
        let files = self
            .files
            .lock()
            .map_err(|_| AppError::storage(path, "storage lock poisoned"))?;
        Ok(files.contains_key(path))
    }

    async fn read_bytes(&self, path: &Path) -> AppResult<Vec<u8>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::storage(path, "simulated read failure"));
        }
        let files = self
            .files
            .lock()
            .map_err(|_| AppError::storage(path, "storage lock poisoned"))?;
        files
            .get(path)
            .cloned()
            .ok_or_else(|| AppError::storage(path, "no such document"))
    }

    async fn write_text(&self, path: &Path, content: &str) -> AppResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::storage(path, "simulated write failure"));
        }
        let mut files = self
            .files
            .lock()
            .map_err(|_| AppError::storage(path, "storage lock poisoned"))?;
        files.insert(path.to_path_buf(), content.as_bytes().to_vec());
        Ok(())
    }
}
