use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::db::{DocumentFile, DocumentLoad, TextStorage};
use crate::error::AppResult;
use crate::models::progress::{
    advance_session, average_percent, ActivityResult, DailyProgress, ProgressDocument,
};
use crate::utils::time::DayZone;

pub struct ProgressRepository {
    file: DocumentFile<ProgressDocument>,
}

impl ProgressRepository {
    pub fn new(storage: Arc<dyn TextStorage>, path: impl Into<PathBuf>) -> Self {
        Self {
            file: DocumentFile::new(storage, path),
        }
    }

    pub async fn load(&self) -> AppResult<DocumentLoad<ProgressDocument>> {
        self.file.load().await
    }

    pub async fn load_document(&self) -> AppResult<ProgressDocument> {
        self.file.load_or_default().await
    }

    /// Appends the result produced by `build` and folds it into the rolling
    /// session. `build` runs inside the write window so timestamps follow
    /// append order.
    pub async fn append<F>(&self, window_ms: i64, build: F) -> AppResult<ActivityResult>
    where
        F: FnOnce() -> ActivityResult,
    {
        self.file
            .update(move |document| {
                let result = build();
                document.current_session = Some(advance_session(
                    document.current_session,
                    result.normalized_percent(),
                    result.timestamp,
                    window_ms,
                ));
                document.results.push(result.clone());
                result
            })
            .await
    }

    /// Flips `synced` on every matching record that is not yet synced and
    /// returns how many changed.
    pub async fn mark_synced<P>(&self, predicate: P) -> AppResult<usize>
    where
        P: Fn(&ActivityResult) -> bool,
    {
        self.file
            .update_if(|document| {
                let mut flipped = 0;
                for result in document.results.iter_mut() {
                    if !result.synced && predicate(&*result) {
                        result.synced = true;
                        flipped += 1;
                    }
                }
                (flipped, flipped > 0)
            })
            .await
    }
}

pub fn completed_for_device<'a>(
    document: &'a ProgressDocument,
    device_id: &'a str,
) -> impl Iterator<Item = &'a ActivityResult> + 'a {
    document
        .results
        .iter()
        .filter(move |result| result.device_id == device_id && result.completed)
}

pub fn overall_percent(document: &ProgressDocument, device_id: &str) -> i64 {
    average_percent(completed_for_device(document, device_id).map(ActivityResult::normalized_percent))
}

/// Per-day averages, newest day first. Days without completed results are
/// absent rather than zero.
pub fn daily_history(
    document: &ProgressDocument,
    device_id: &str,
    zone: DayZone,
) -> Vec<DailyProgress> {
    let mut grouped: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for result in completed_for_device(document, device_id) {
        grouped
            .entry(zone.date_key(result.timestamp))
            .or_default()
            .push(result.normalized_percent());
    }

    grouped
        .into_iter()
        .rev()
        .map(|(date, percents)| DailyProgress {
            date,
            percent: average_percent(percents),
        })
        .collect()
}

pub fn unsynced_for_device(document: &ProgressDocument, device_id: &str) -> Vec<ActivityResult> {
    document
        .results
        .iter()
        .filter(|result| result.device_id == device_id && !result.synced)
        .cloned()
        .collect()
}
