pub mod instructions;
pub mod progress;
pub mod speech;

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{error, info, warn};

use crate::db::{FsStorage, TextStorage};
use crate::error::{AppError, AppResult};
use crate::models::settings::StoreSettings;
use crate::services::device_service::DeviceIdentityService;
use crate::services::instruction_service::InstructionService;
use crate::services::progress_service::ProgressService;
use crate::services::speech_log_service::SpeechLogService;
use crate::utils::time::{Clock, SystemClock};

/// Services shared by every screen, all rooted at one data directory.
#[derive(Clone)]
pub struct AppState {
    settings: Arc<StoreSettings>,
    device_service: Arc<DeviceIdentityService>,
    progress_service: Arc<ProgressService>,
    speech_log_service: Arc<SpeechLogService>,
    instruction_service: Arc<InstructionService>,
}

impl AppState {
    pub fn new(settings: StoreSettings) -> AppResult<Self> {
        Self::with_storage(settings, Arc::new(FsStorage), Arc::new(SystemClock))
    }

    pub fn with_storage(
        settings: StoreSettings,
        storage: Arc<dyn TextStorage>,
        clock: Arc<dyn Clock>,
    ) -> AppResult<Self> {
        settings.validate()?;
        info!(data_dir = %settings.data_dir.display(), "initializing progress stores");

        let device_service = Arc::new(DeviceIdentityService::new(
            Arc::clone(&storage),
            settings.device_path(),
            Arc::clone(&clock),
        ));
        let progress_service = Arc::new(ProgressService::new(
            Arc::clone(&storage),
            &settings,
            Arc::clone(&device_service),
            Arc::clone(&clock),
        )?);
        let speech_log_service = Arc::new(SpeechLogService::new(
            Arc::clone(&storage),
            settings.speech_log_path(),
            Arc::clone(&device_service),
            clock,
        ));
        let instruction_service = Arc::new(InstructionService::new(
            storage,
            settings.instructions_path(),
        ));

        Ok(Self {
            settings: Arc::new(settings),
            device_service,
            progress_service,
            speech_log_service,
            instruction_service,
        })
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    pub fn device(&self) -> Arc<DeviceIdentityService> {
        Arc::clone(&self.device_service)
    }

    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress_service)
    }

    pub fn speech_log(&self) -> Arc<SpeechLogService> {
        Arc::clone(&self.speech_log_service)
    }

    pub fn instructions(&self) -> Arc<InstructionService> {
        Arc::clone(&self.instruction_service)
    }
}

pub type CommandResult<T> = Result<T, CommandError>;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<JsonValue>,
}

impl CommandError {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Option<JsonValue>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details,
        }
    }
}

impl From<AppError> for CommandError {
    fn from(error: AppError) -> Self {
        match error {
            AppError::Validation {
                message, details, ..
            } => CommandError::new("VALIDATION_ERROR", message, details),
            AppError::Storage { path, message } => {
                error!(target: "app::command", %path, %message, "storage error in command");
                CommandError::new(
                    "STORAGE_ERROR",
                    "progress could not be saved on this device",
                    Some(serde_json::json!({ "path": path })),
                )
            }
            AppError::Io(error) => {
                error!(target: "app::command", error = %error, "io error in command");
                CommandError::new("STORAGE_ERROR", "file system read or write failed", None)
            }
            AppError::Serialization(error) => {
                error!(target: "app::command", error = %error, "serialization error in command");
                CommandError::new("UNKNOWN", "serialization failed", None)
            }
            AppError::Other(message) => {
                warn!(target: "app::command", %message, "unexpected error in command");
                CommandError::new("UNKNOWN", message, None)
            }
        }
    }
}
