use chrono::Utc;

use crate::utils::constants::DEFAULT_SAFETY_MARGIN_SECS;

/// Source of "now" for staleness decisions, in milliseconds since epoch.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        now_ms()
    }
}

pub fn get_token_safety_margin_seconds(safety_margin_seconds: Option<u64>) -> u64 {
    safety_margin_seconds.unwrap_or(DEFAULT_SAFETY_MARGIN_SECS)
}

pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
