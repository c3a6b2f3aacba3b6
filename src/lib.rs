//! On-device data core of the Kico language-learning app: the activity
//! progress log, the installation's device id, the speech attempt log and
//! the tutorial flags, each kept as one JSON document in the app data
//! directory.

pub mod commands;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

use crate::commands::AppState;
use crate::error::AppResult;
use crate::models::settings::StoreSettings;

/// Starts logging under the data directory and wires up the stores.
pub fn bootstrap(settings: StoreSettings) -> AppResult<AppState> {
    std::fs::create_dir_all(&settings.data_dir)?;
    crate::utils::logger::init_logging(&settings.log_dir())?;
    AppState::new(settings)
}
