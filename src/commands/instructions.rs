use crate::commands::{AppState, CommandResult};

pub async fn instructions_check_seen(state: &AppState, screen_id: String) -> CommandResult<bool> {
    Ok(state.instructions().is_seen(&screen_id).await)
}

pub async fn instructions_mark_seen(state: &AppState, screen_id: String) -> CommandResult<bool> {
    Ok(state.instructions().mark_seen(&screen_id).await?)
}
