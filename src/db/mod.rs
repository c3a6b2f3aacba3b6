use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::AppResult;

pub mod repositories;
pub mod storage;

pub use storage::{FsStorage, MemoryStorage, TextStorage};

/// Outcome of reading a persisted document.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentLoad<T> {
    Loaded(T),
    Missing,
    Corrupt { reason: String },
}

impl<T: Default> DocumentLoad<T> {
    /// Missing and corrupt documents both become the empty default.
    pub fn or_default(self, path: &Path) -> T {
        match self {
            DocumentLoad::Loaded(document) => document,
            DocumentLoad::Missing => T::default(),
            DocumentLoad::Corrupt { reason } => {
                warn!(
                    target: "app::storage",
                    path = %path.display(),
                    %reason,
                    "discarding corrupt document"
                );
                T::default()
            }
        }
    }
}

impl<T> DocumentLoad<T> {
    pub fn is_corrupt(&self) -> bool {
        matches!(self, DocumentLoad::Corrupt { .. })
    }
}

/// Decodes raw document bytes. Invalid UTF-8, blank content, invalid JSON, a
/// non-object root or a shape mismatch are all reported as corruption.
pub fn parse_document<T: DeserializeOwned>(raw: &[u8]) -> DocumentLoad<T> {
    let raw = match std::str::from_utf8(raw) {
        Ok(text) => text,
        Err(err) => {
            return DocumentLoad::Corrupt {
                reason: format!("not valid utf-8: {err}"),
            }
        }
    };
    if raw.trim().is_empty() {
        return DocumentLoad::Corrupt {
            reason: "empty document".to_string(),
        };
    }

    let value: JsonValue = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(err) => {
            return DocumentLoad::Corrupt {
                reason: format!("invalid json: {err}"),
            }
        }
    };

    if !value.is_object() {
        return DocumentLoad::Corrupt {
            reason: "document root is not an object".to_string(),
        };
    }

    match serde_json::from_value(value) {
        Ok(document) => DocumentLoad::Loaded(document),
        Err(err) => DocumentLoad::Corrupt {
            reason: format!("unexpected shape: {err}"),
        },
    }
}

/// A single JSON document that is always read and rewritten whole.
///
/// Mutations go through [`DocumentFile::update`], which holds the file's
/// write lock across load, modify and save so concurrent writers in this
/// process are serialized. Reads take no lock.
pub struct DocumentFile<T> {
    storage: Arc<dyn TextStorage>,
    path: PathBuf,
    write_lock: Mutex<()>,
    _document: PhantomData<fn() -> T>,
}

impl<T> DocumentFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(storage: Arc<dyn TextStorage>, path: impl Into<PathBuf>) -> Self {
        Self {
            storage,
            path: path.into(),
            write_lock: Mutex::new(()),
            _document: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> AppResult<DocumentLoad<T>> {
        if !self.storage.exists(&self.path).await? {
            return Ok(DocumentLoad::Missing);
        }
        let raw = self.storage.read_bytes(&self.path).await?;
        Ok(parse_document(&raw))
    }

    pub async fn save(&self, document: &T) -> AppResult<()> {
        let raw = serde_json::to_string(document)?;
        self.storage.write_text(&self.path, &raw).await
    }
}

impl<T> DocumentFile<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub async fn load_or_default(&self) -> AppResult<T> {
        Ok(self.load().await?.or_default(&self.path))
    }

    /// Load, apply `mutate`, persist, all under the write lock.
    pub async fn update<R, F>(&self, mutate: F) -> AppResult<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        let _guard = self.write_lock.lock().await;
        let mut document = self.load_or_default().await?;
        let outcome = mutate(&mut document);
        self.save(&document).await?;
        debug!(target: "app::storage", path = %self.path.display(), "document updated");
        Ok(outcome)
    }

    /// Like [`DocumentFile::update`] but skips the write when `mutate`
    /// reports that nothing changed.
    pub async fn update_if<R, F>(&self, mutate: F) -> AppResult<R>
    where
        F: FnOnce(&mut T) -> (R, bool),
    {
        let _guard = self.write_lock.lock().await;
        let mut document = self.load_or_default().await?;
        let (outcome, changed) = mutate(&mut document);
        if changed {
            self.save(&document).await?;
        }
        Ok(outcome)
    }
}
