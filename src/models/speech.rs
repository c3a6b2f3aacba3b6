use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SpeechAttempt {
    pub device_id: String,
    pub activity_id: String,
    pub text: String,
    pub success: bool,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SpeechAttemptInput {
    pub activity_id: String,
    pub text: String,
    pub success: bool,
}

impl SpeechAttemptInput {
    pub fn new(activity_id: impl Into<String>, text: impl Into<String>, success: bool) -> Self {
        Self {
            activity_id: activity_id.into(),
            text: text.into(),
            success,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SpeechLogDocument {
    pub attempts: Vec<SpeechAttempt>,
}
