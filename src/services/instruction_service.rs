use std::path::PathBuf;
use std::sync::Arc;

use tracing::warn;

use crate::db::repositories::instructions_repository::InstructionsRepository;
use crate::db::{DocumentLoad, TextStorage};
use crate::error::{AppError, AppResult};

/// Remembers which screens have already shown their tutorial overlay.
pub struct InstructionService {
    repository: InstructionsRepository,
}

impl InstructionService {
    pub fn new(storage: Arc<dyn TextStorage>, path: impl Into<PathBuf>) -> Self {
        Self {
            repository: InstructionsRepository::new(storage, path),
        }
    }

    /// False whenever the flags cannot be read.
    pub async fn is_seen(&self, screen_id: &str) -> bool {
        match self.repository.load().await {
            Ok(DocumentLoad::Loaded(flags)) => flags.is_seen(screen_id.trim()),
            Ok(DocumentLoad::Missing) => false,
            Ok(DocumentLoad::Corrupt { reason }) => {
                warn!(target: "app::instructions", %reason, "instruction flags corrupt");
                false
            }
            Err(err) => {
                warn!(target: "app::instructions", error = %err, "instruction flags unreadable");
                false
            }
        }
    }

    pub async fn mark_seen(&self, screen_id: &str) -> AppResult<bool> {
        let screen_id = screen_id.trim();
        if screen_id.is_empty() {
            return Err(AppError::validation("screen id cannot be empty"));
        }
        self.repository.mark_seen(screen_id).await
    }
}
