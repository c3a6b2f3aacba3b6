use std::collections::HashSet;

use serde_json::Value as JsonValue;

use crate::commands::{AppState, CommandResult};
use crate::error::AppError;
use crate::models::progress::{ActivityResult, ActivityResultInput, DailyProgress};

/// Accepts the loosely typed payload a finished screen submits.
pub async fn progress_add_result(
    state: &AppState,
    payload: JsonValue,
) -> CommandResult<ActivityResult> {
    let input: ActivityResultInput = serde_json::from_value(payload).map_err(|err| {
        AppError::validation_with_details(
            "invalid activity result",
            serde_json::json!({ "reason": err.to_string() }),
        )
    })?;
    Ok(state.progress().add_result(input).await?)
}

pub async fn progress_current_24h(state: &AppState) -> CommandResult<i64> {
    Ok(state.progress().get_current_24h_progress().await?)
}

pub async fn progress_overall_percent(
    state: &AppState,
    device_id: Option<String>,
) -> CommandResult<i64> {
    Ok(state
        .progress()
        .get_overall_percent(device_id.as_deref())
        .await?)
}

pub async fn progress_daily_history(
    state: &AppState,
    device_id: Option<String>,
) -> CommandResult<Vec<DailyProgress>> {
    Ok(state
        .progress()
        .get_daily_history(device_id.as_deref())
        .await?)
}

pub async fn progress_today_percent(
    state: &AppState,
    device_id: Option<String>,
) -> CommandResult<i64> {
    Ok(state
        .progress()
        .get_today_percent(device_id.as_deref())
        .await?)
}

pub async fn progress_unsynced(
    state: &AppState,
    device_id: Option<String>,
) -> CommandResult<Vec<ActivityResult>> {
    Ok(state.progress().get_unsynced(device_id.as_deref()).await?)
}

/// Marks the device's records with the given timestamps as uploaded.
pub async fn progress_mark_synced(
    state: &AppState,
    device_id: Option<String>,
    timestamps: Vec<i64>,
) -> CommandResult<usize> {
    let device_id = match device_id.filter(|id| !id.is_empty()) {
        Some(id) => id,
        None => state.device().get_device_id().await,
    };
    let timestamps: HashSet<i64> = timestamps.into_iter().collect();

    Ok(state
        .progress()
        .mark_synced(|result| {
            result.device_id == device_id && timestamps.contains(&result.timestamp)
        })
        .await?)
}

pub async fn device_get_id(state: &AppState) -> CommandResult<String> {
    Ok(state.device().get_device_id().await)
}
