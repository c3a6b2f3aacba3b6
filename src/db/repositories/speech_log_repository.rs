use std::path::PathBuf;
use std::sync::Arc;

use crate::db::{DocumentFile, TextStorage};
use crate::error::AppResult;
use crate::models::speech::{SpeechAttempt, SpeechLogDocument};

pub struct SpeechLogRepository {
    file: DocumentFile<SpeechLogDocument>,
}

impl SpeechLogRepository {
    pub fn new(storage: Arc<dyn TextStorage>, path: impl Into<PathBuf>) -> Self {
        Self {
            file: DocumentFile::new(storage, path),
        }
    }

    pub async fn append<F>(&self, build: F) -> AppResult<SpeechAttempt>
    where
        F: FnOnce() -> SpeechAttempt,
    {
        self.file
            .update(move |document| {
                let attempt = build();
                document.attempts.push(attempt.clone());
                attempt
            })
            .await
    }

    pub async fn list_for_device(&self, device_id: &str) -> AppResult<Vec<SpeechAttempt>> {
        let document = self.file.load_or_default().await?;
        Ok(document
            .attempts
            .into_iter()
            .filter(|attempt| attempt.device_id == device_id)
            .collect())
    }
}
