use crate::commands::{AppState, CommandResult};
use crate::models::speech::{SpeechAttempt, SpeechAttemptInput};

pub async fn speech_add_attempt(
    state: &AppState,
    activity_id: String,
    text: String,
    success: bool,
) -> CommandResult<SpeechAttempt> {
    let input = SpeechAttemptInput::new(activity_id, text, success);
    Ok(state.speech_log().add_attempt(input).await?)
}

pub async fn speech_get_attempts(
    state: &AppState,
    device_id: Option<String>,
) -> CommandResult<Vec<SpeechAttempt>> {
    Ok(state.speech_log().get_attempts(device_id.as_deref()).await?)
}

pub async fn speech_success_rate(
    state: &AppState,
    activity_id: Option<String>,
) -> CommandResult<i64> {
    Ok(state
        .speech_log()
        .success_rate(None, activity_id.as_deref())
        .await?)
}
