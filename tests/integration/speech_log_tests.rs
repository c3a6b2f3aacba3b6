use std::sync::Arc;

use kico_progress_lib::commands::AppState;
use kico_progress_lib::db::FsStorage;
use kico_progress_lib::models::settings::StoreSettings;
use kico_progress_lib::models::speech::SpeechAttemptInput;
use kico_progress_lib::utils::time::ManualClock;
use tempfile::{tempdir, TempDir};

fn setup() -> (AppState, Arc<ManualClock>, TempDir) {
    let dir = tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(1_748_772_000_000));
    let state = AppState::with_storage(
        StoreSettings::new(dir.path()),
        Arc::new(FsStorage),
        clock.clone(),
    )
    .unwrap();
    (state, clock, dir)
}

#[tokio::test]
async fn test_attempts_are_logged_in_order_with_device_and_time() {
    let (state, clock, _dir) = setup();
    let speech = state.speech_log();
    let device_id = state.device().get_device_id().await;

    speech
        .add_attempt(SpeechAttemptInput::new("animals", "gato", true))
        .await
        .unwrap();
    clock.advance(5_000);
    speech
        .add_attempt(SpeechAttemptInput::new("animals", "pato", false))
        .await
        .unwrap();

    let attempts = speech.get_attempts(None).await.unwrap();
    assert_eq!(attempts.len(), 2);
    assert_eq!(attempts[0].text, "gato");
    assert_eq!(attempts[1].text, "pato");
    assert!(attempts.iter().all(|attempt| attempt.device_id == device_id));
    assert_eq!(attempts[1].timestamp - attempts[0].timestamp, 5_000);

    assert!(speech.get_attempts(Some("other")).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_success_rate_per_activity() {
    let (state, _clock, _dir) = setup();
    let speech = state.speech_log();

    assert_eq!(speech.success_rate(None, None).await.unwrap(), 0);

    for (activity, success) in [
        ("colors", true),
        ("colors", true),
        ("colors", false),
        ("numbers", false),
    ] {
        speech
            .add_attempt(SpeechAttemptInput::new(activity, "x", success))
            .await
            .unwrap();
    }

    assert_eq!(speech.success_rate(None, Some("colors")).await.unwrap(), 67);
    assert_eq!(speech.success_rate(None, Some("numbers")).await.unwrap(), 0);
    assert_eq!(speech.success_rate(None, None).await.unwrap(), 50);
    assert_eq!(speech.success_rate(None, Some("missing")).await.unwrap(), 0);
}

#[tokio::test]
async fn test_speech_log_does_not_touch_progress() {
    let (state, _clock, _dir) = setup();

    state
        .speech_log()
        .add_attempt(SpeechAttemptInput::new("colors", "rojo", true))
        .await
        .unwrap();

    assert!(state.settings().speech_log_path().exists());
    assert!(!state.settings().progress_path().exists());
    assert_eq!(state.progress().get_overall_percent(None).await.unwrap(), 0);
}
