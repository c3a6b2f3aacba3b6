use std::sync::Arc;

use tracing::{debug, info};

use crate::db::repositories::progress_repository::{
    daily_history, overall_percent, unsynced_for_device, ProgressRepository,
};
use crate::db::TextStorage;
use crate::error::AppResult;
use crate::models::progress::{
    finite_or_zero, ActivityResult, ActivityResultInput, DailyProgress,
};
use crate::models::settings::StoreSettings;
use crate::services::device_service::DeviceIdentityService;
use crate::services::progress_events::{ProgressListeners, ProgressSubscription};
use crate::utils::time::{Clock, DayZone};

/// Append-only activity log with a rolling session score and per-day
/// history views.
///
/// The rolling session is kept once per store, not per device: one store
/// serves one learner on one installation.
pub struct ProgressService {
    repository: ProgressRepository,
    devices: Arc<DeviceIdentityService>,
    clock: Arc<dyn Clock>,
    listeners: ProgressListeners,
    window_ms: i64,
    zone: DayZone,
}

impl ProgressService {
    pub fn new(
        storage: Arc<dyn TextStorage>,
        settings: &StoreSettings,
        devices: Arc<DeviceIdentityService>,
        clock: Arc<dyn Clock>,
    ) -> AppResult<Self> {
        settings.validate()?;
        Ok(Self {
            repository: ProgressRepository::new(storage, settings.progress_path()),
            devices,
            clock,
            listeners: ProgressListeners::new(),
            window_ms: settings.session_window_ms(),
            zone: settings.day_zone()?,
        })
    }

    /// Records a finished activity, persists the log, then notifies
    /// subscribers with the device id.
    pub async fn add_result(&self, input: ActivityResultInput) -> AppResult<ActivityResult> {
        let device_id = self.devices.get_device_id().await;
        let clock = Arc::clone(&self.clock);
        let owner = device_id.clone();

        let result = self
            .repository
            .append(self.window_ms, move || ActivityResult {
                device_id: owner,
                activity_id: input.activity_id,
                category: input.category,
                score: finite_or_zero(input.score),
                max_score: finite_or_zero(input.max_score),
                completed: input.completed,
                timestamp: clock.now_millis(),
                synced: false,
            })
            .await?;

        info!(
            target: "app::progress",
            activity_id = %result.activity_id,
            category = %result.category,
            percent = result.normalized_percent(),
            completed = result.completed,
            "activity result recorded"
        );

        self.listeners.emit(&device_id);
        Ok(result)
    }

    /// Rounded average of the rolling session, or 0 once it has expired.
    /// Expiry here is read-only; the stored session is reset by the next
    /// [`ProgressService::add_result`].
    pub async fn get_current_24h_progress(&self) -> AppResult<i64> {
        let document = self.repository.load_document().await?;
        let now = self.clock.now_millis();
        Ok(match document.current_session {
            Some(session) if !session.is_expired(now, self.window_ms) => session.average(),
            _ => 0,
        })
    }

    pub async fn get_overall_percent(&self, device_id: Option<&str>) -> AppResult<i64> {
        let device_id = self.resolve_device(device_id).await;
        let document = self.repository.load_document().await?;
        Ok(overall_percent(&document, &device_id))
    }

    pub async fn get_daily_history(&self, device_id: Option<&str>) -> AppResult<Vec<DailyProgress>> {
        let device_id = self.resolve_device(device_id).await;
        let document = self.repository.load_document().await?;
        let history = daily_history(&document, &device_id, self.zone);
        debug!(target: "app::progress", days = history.len(), "daily history computed");
        Ok(history)
    }

    pub async fn get_today_percent(&self, device_id: Option<&str>) -> AppResult<i64> {
        let today = self.zone.date_key(self.clock.now_millis());
        let history = self.get_daily_history(device_id).await?;
        Ok(history
            .into_iter()
            .find(|entry| entry.date == today)
            .map_or(0, |entry| entry.percent))
    }

    pub async fn get_unsynced(&self, device_id: Option<&str>) -> AppResult<Vec<ActivityResult>> {
        let device_id = self.resolve_device(device_id).await;
        let document = self.repository.load_document().await?;
        Ok(unsynced_for_device(&document, &device_id))
    }

    /// Marks every matching record as synced; returns how many were newly
    /// marked. Already-synced records are never touched.
    pub async fn mark_synced<P>(&self, predicate: P) -> AppResult<usize>
    where
        P: Fn(&ActivityResult) -> bool,
    {
        let flipped = self.repository.mark_synced(predicate).await?;
        info!(target: "app::progress", flipped, "results marked as synced");
        Ok(flipped)
    }

    pub fn subscribe_progress<F>(&self, listener: F) -> ProgressSubscription
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.listeners.subscribe(listener)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    async fn resolve_device(&self, device_id: Option<&str>) -> String {
        match device_id {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => self.devices.get_device_id().await,
        }
    }
}
