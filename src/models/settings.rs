use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::utils::time::{DayZone, HOUR_MS};

const DEFAULT_PROGRESS_FILE: &str = "progress.json";
const DEFAULT_DEVICE_FILE: &str = "device_id.json";
const DEFAULT_SPEECH_LOG_FILE: &str = "speech_log.json";
const DEFAULT_INSTRUCTIONS_FILE: &str = "instructions_seen.json";
const DEFAULT_SESSION_WINDOW_HOURS: u32 = 24;

/// Where the stores keep their documents and how they bucket time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreSettings {
    pub data_dir: PathBuf,
    pub progress_file: String,
    pub device_file: String,
    pub speech_log_file: String,
    pub instructions_file: String,
    pub session_window_hours: u32,
    /// IANA zone name used for daily history; the device zone when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            progress_file: DEFAULT_PROGRESS_FILE.to_string(),
            device_file: DEFAULT_DEVICE_FILE.to_string(),
            speech_log_file: DEFAULT_SPEECH_LOG_FILE.to_string(),
            instructions_file: DEFAULT_INSTRUCTIONS_FILE.to_string(),
            session_window_hours: DEFAULT_SESSION_WINDOW_HOURS,
            timezone: None,
        }
    }
}

impl StoreSettings {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Reads a JSON settings file. Missing or unreadable files fall back to
    /// defaults rooted at `fallback_data_dir`.
    pub fn load_or_default(path: &Path, fallback_data_dir: impl Into<PathBuf>) -> Self {
        let fallback = Self::new(fallback_data_dir);
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(target: "app::settings", path = %path.display(), "no settings file, using defaults");
                return fallback;
            }
            Err(err) => {
                warn!(target: "app::settings", path = %path.display(), error = %err, "failed to read settings file");
                return fallback;
            }
        };

        match serde_json::from_str::<StoreSettings>(&raw) {
            Ok(settings) => match settings.validate() {
                Ok(()) => settings,
                Err(err) => {
                    warn!(target: "app::settings", error = %err, "invalid settings file, using defaults");
                    fallback
                }
            },
            Err(err) => {
                warn!(target: "app::settings", path = %path.display(), error = %err, "corrupt settings file, using defaults");
                fallback
            }
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.session_window_hours == 0 {
            return Err(AppError::validation("session window must be at least one hour"));
        }
        for name in [
            &self.progress_file,
            &self.device_file,
            &self.speech_log_file,
            &self.instructions_file,
        ] {
            if name.trim().is_empty() {
                return Err(AppError::validation("document file names cannot be empty"));
            }
        }
        self.day_zone().map(|_| ())
    }

    pub fn session_window_ms(&self) -> i64 {
        i64::from(self.session_window_hours) * HOUR_MS
    }

    pub fn day_zone(&self) -> AppResult<DayZone> {
        DayZone::parse(self.timezone.as_deref()).map_err(AppError::validation)
    }

    pub fn progress_path(&self) -> PathBuf {
        self.data_dir.join(&self.progress_file)
    }

    pub fn device_path(&self) -> PathBuf {
        self.data_dir.join(&self.device_file)
    }

    pub fn speech_log_path(&self) -> PathBuf {
        self.data_dir.join(&self.speech_log_file)
    }

    pub fn instructions_path(&self) -> PathBuf {
        self.data_dir.join(&self.instructions_file)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}
