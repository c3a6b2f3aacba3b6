use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Local, TimeZone, Utc};
use chrono_tz::Tz;

pub const HOUR_MS: i64 = 60 * 60 * 1000;
pub const DAY_MS: i64 = 24 * HOUR_MS;

/// Source of epoch-millisecond timestamps for everything the stores write.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start_millis: i64) -> Self {
        Self {
            now: AtomicI64::new(start_millis),
        }
    }

    pub fn set(&self, millis: i64) {
        self.now.store(millis, Ordering::SeqCst);
    }

    pub fn advance(&self, millis: i64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Zone used to bucket timestamps into calendar days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DayZone {
    #[default]
    Local,
    Named(Tz),
}

impl DayZone {
    pub fn parse(name: Option<&str>) -> Result<Self, String> {
        match name.map(str::trim).filter(|value| !value.is_empty()) {
            None => Ok(DayZone::Local),
            Some(value) => value
                .parse::<Tz>()
                .map(DayZone::Named)
                .map_err(|err| format!("unknown timezone {value}: {err}")),
        }
    }

    /// `YYYY-MM-DD` of the calendar day containing `timestamp_ms` in this zone.
    pub fn date_key(&self, timestamp_ms: i64) -> String {
        let Some(utc) = DateTime::<Utc>::from_timestamp_millis(timestamp_ms) else {
            return String::from("1970-01-01");
        };
        match self {
            DayZone::Local => Local
                .from_utc_datetime(&utc.naive_utc())
                .format("%Y-%m-%d")
                .to_string(),
            DayZone::Named(tz) => tz
                .from_utc_datetime(&utc.naive_utc())
                .format("%Y-%m-%d")
                .to_string(),
        }
    }
}
