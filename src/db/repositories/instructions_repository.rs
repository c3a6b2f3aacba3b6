use std::path::PathBuf;
use std::sync::Arc;

use crate::db::{DocumentFile, DocumentLoad, TextStorage};
use crate::error::AppResult;
use crate::models::instructions::InstructionFlags;

pub struct InstructionsRepository {
    file: DocumentFile<InstructionFlags>,
}

impl InstructionsRepository {
    pub fn new(storage: Arc<dyn TextStorage>, path: impl Into<PathBuf>) -> Self {
        Self {
            file: DocumentFile::new(storage, path),
        }
    }

    pub async fn load(&self) -> AppResult<DocumentLoad<InstructionFlags>> {
        self.file.load().await
    }

    /// Returns whether the flag was newly set.
    pub async fn mark_seen(&self, screen_id: &str) -> AppResult<bool> {
        self.file
            .update_if(|flags| {
                let newly_seen = !flags.is_seen(screen_id);
                flags.mark_seen(screen_id);
                (newly_seen, newly_seen)
            })
            .await
    }
}
