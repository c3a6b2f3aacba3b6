use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ActivityCategory {
    Practice,
    Game,
}

impl ActivityCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityCategory::Practice => "practice",
            ActivityCategory::Game => "game",
        }
    }
}

impl fmt::Display for ActivityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ActivityCategory {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "practice" => Ok(ActivityCategory::Practice),
            "game" => Ok(ActivityCategory::Game),
            other => Err(format!("unsupported activity category: {other}")),
        }
    }
}

/// One finished activity, as appended to the progress log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityResult {
    pub device_id: String,
    pub activity_id: String,
    pub category: ActivityCategory,
    pub score: f64,
    pub max_score: f64,
    pub completed: bool,
    pub timestamp: i64,
    #[serde(default)]
    pub synced: bool,
}

impl ActivityResult {
    pub fn normalized_percent(&self) -> f64 {
        normalized_percent(self.score, self.max_score)
    }
}

/// Caller-supplied part of an [`ActivityResult`]. Device id, timestamp and the
/// sync flag are always assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityResultInput {
    pub activity_id: String,
    pub category: ActivityCategory,
    pub score: f64,
    pub max_score: f64,
    #[serde(default, deserialize_with = "deserialize_truthy")]
    pub completed: bool,
}

impl ActivityResultInput {
    pub fn new(
        activity_id: impl Into<String>,
        category: ActivityCategory,
        score: f64,
        max_score: f64,
        completed: bool,
    ) -> Self {
        Self {
            activity_id: activity_id.into(),
            category,
            score,
            max_score,
            completed,
        }
    }
}

/// Rolling aggregate of normalized percents since the last reset.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CurrentSession {
    pub sum_percent: f64,
    pub count: u64,
    pub last_updated_at: i64,
}

impl CurrentSession {
    pub fn start(percent: f64, timestamp: i64) -> Self {
        Self {
            sum_percent: percent,
            count: 1,
            last_updated_at: timestamp,
        }
    }

    pub fn is_expired(&self, now: i64, window_ms: i64) -> bool {
        now - self.last_updated_at >= window_ms
    }

    pub fn average(&self) -> i64 {
        if self.count == 0 {
            return 0;
        }
        round_percent(self.sum_percent / self.count as f64)
    }
}

/// Fold a new result into the rolling session. The previous session is
/// replaced when `window_ms` or more has passed since its last contribution.
pub fn advance_session(
    previous: Option<CurrentSession>,
    percent: f64,
    timestamp: i64,
    window_ms: i64,
) -> CurrentSession {
    let percent = finite_or_zero(percent);
    match previous {
        Some(session) if !session.is_expired(timestamp, window_ms) => {
            let sum_percent = session.sum_percent + percent;
            if !sum_percent.is_finite() {
                return CurrentSession::start(percent, timestamp);
            }
            CurrentSession {
                sum_percent,
                count: session.count + 1,
                last_updated_at: timestamp,
            }
        }
        _ => CurrentSession::start(percent, timestamp),
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressDocument {
    pub results: Vec<ActivityResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_session: Option<CurrentSession>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DailyProgress {
    pub date: String,
    pub percent: i64,
}

/// `score / max_score * 100`, or 0 when `max_score` is not positive or the
/// quotient is not finite. The result always serializes as a JSON number.
pub fn normalized_percent(score: f64, max_score: f64) -> f64 {
    if max_score > 0.0 {
        finite_or_zero(score / max_score * 100.0)
    } else {
        0.0
    }
}

pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Round half up, so `-2.5` becomes `-2` and `2.5` becomes `3`.
pub fn round_percent(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    (value + 0.5).floor() as i64
}

pub fn average_percent<I>(percents: I) -> i64
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = percents
        .into_iter()
        .fold((0.0_f64, 0_u64), |(sum, count), value| (sum + value, count + 1));
    if count == 0 {
        0
    } else {
        round_percent(sum / count as f64)
    }
}

/// Accepts booleans, numbers, strings and null the way a loosely typed UI
/// would hand them over: zero, NaN, the empty string and null are false.
fn deserialize_truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = JsonValue::deserialize(deserializer)?;
    Ok(is_truthy(&value))
}

pub(crate) fn is_truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(flag) => *flag,
        JsonValue::Number(number) => number.as_f64().map_or(false, |n| n != 0.0 && !n.is_nan()),
        JsonValue::String(text) => !text.is_empty(),
        JsonValue::Array(_) | JsonValue::Object(_) => true,
    }
}
