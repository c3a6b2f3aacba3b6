use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::db::repositories::speech_log_repository::SpeechLogRepository;
use crate::db::TextStorage;
use crate::error::AppResult;
use crate::models::progress::round_percent;
use crate::models::speech::{SpeechAttempt, SpeechAttemptInput};
use crate::services::device_service::DeviceIdentityService;
use crate::utils::time::Clock;

/// Log of recognised utterances from the speaking games.
pub struct SpeechLogService {
    repository: SpeechLogRepository,
    devices: Arc<DeviceIdentityService>,
    clock: Arc<dyn Clock>,
}

impl SpeechLogService {
    pub fn new(
        storage: Arc<dyn TextStorage>,
        path: impl Into<PathBuf>,
        devices: Arc<DeviceIdentityService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository: SpeechLogRepository::new(storage, path),
            devices,
            clock,
        }
    }

    pub async fn add_attempt(&self, input: SpeechAttemptInput) -> AppResult<SpeechAttempt> {
        let device_id = self.devices.get_device_id().await;
        let clock = Arc::clone(&self.clock);

        let attempt = self
            .repository
            .append(move || SpeechAttempt {
                device_id,
                activity_id: input.activity_id,
                text: input.text,
                success: input.success,
                timestamp: clock.now_millis(),
            })
            .await?;

        debug!(
            target: "app::speech",
            activity_id = %attempt.activity_id,
            success = attempt.success,
            "speech attempt logged"
        );
        Ok(attempt)
    }

    pub async fn get_attempts(&self, device_id: Option<&str>) -> AppResult<Vec<SpeechAttempt>> {
        let device_id = match device_id {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => self.devices.get_device_id().await,
        };
        self.repository.list_for_device(&device_id).await
    }

    /// Rounded share of successful attempts, optionally for one activity.
    pub async fn success_rate(
        &self,
        device_id: Option<&str>,
        activity_id: Option<&str>,
    ) -> AppResult<i64> {
        let attempts = self.get_attempts(device_id).await?;
        let (total, successes) = attempts
            .iter()
            .filter(|attempt| activity_id.map_or(true, |id| attempt.activity_id == id))
            .fold((0_u64, 0_u64), |(total, successes), attempt| {
                (total + 1, successes + u64::from(attempt.success))
            });

        if total == 0 {
            return Ok(0);
        }
        Ok(round_percent(successes as f64 / total as f64 * 100.0))
    }
}
