//! Rate-limit telemetry read from GitHub response headers.
//!
//! GitHub reports the state of the primary rate limit on every REST response
//! through the `x-ratelimit-*` headers. The values are only logged; nothing in
//! this crate throttles based on them.

use chrono::{DateTime, Local};
use http::HeaderMap;

#[cfg(test)]
#[path = "rate_limit_tests.rs"]
mod tests;

pub const REMAINING_HEADER: &str = "x-ratelimit-remaining";
pub const LIMIT_HEADER: &str = "x-ratelimit-limit";
pub const RESET_HEADER: &str = "x-ratelimit-reset";

/// Snapshot of the rate-limit headers of a single response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RateLimitStatus {
    /// Requests left in the current window, verbatim from the header.
    pub remaining: Option<String>,
    /// Size of the current window, verbatim from the header.
    pub limit: Option<String>,
    /// When the window resets, in local time.
    pub reset: Option<DateTime<Local>>,
}

impl RateLimitStatus {
    /// Reads the rate-limit headers of a response.
    ///
    /// Missing headers are `None`. A reset header that is not a number (GitHub
    /// sends epoch seconds) is treated as missing.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let text = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.trim().to_string())
        };

        Self {
            remaining: text(REMAINING_HEADER),
            limit: text(LIMIT_HEADER),
            reset: text(RESET_HEADER).and_then(|v| reset_to_local(&v)),
        }
    }
}

/// Converts an epoch-seconds reset value to local time.
pub fn reset_to_local(value: &str) -> Option<DateTime<Local>> {
    let seconds = value.trim().parse::<f64>().ok()?;
    if !seconds.is_finite() {
        return None;
    }
    DateTime::from_timestamp(seconds.trunc() as i64, 0).map(|utc| utc.with_timezone(&Local))
}
