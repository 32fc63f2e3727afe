//! Time arithmetic for shift durations and token expiry
//!
//! All timestamps in the system are UTC; the Ledger stores RFC 3339
//! strings, which chrono's serde support round-trips directly.

use chrono::{DateTime, Duration, Utc};

/// Current wall-clock time.
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// `t + minutes`, saturating on overflow.
///
/// `Duration::minutes` itself panics past roughly 2^53 minutes, so
/// the conversion goes through `try_minutes` and saturates in the
/// direction of the offset.
pub fn add_minutes(t: DateTime<Utc>, minutes: i64) -> DateTime<Utc> {
    Duration::try_minutes(minutes)
        .and_then(|d| t.checked_add_signed(d))
        .unwrap_or(if minutes >= 0 {
            DateTime::<Utc>::MAX_UTC
        } else {
            DateTime::<Utc>::MIN_UTC
        })
}

/// The end a shift or attendance record is entitled to.
///
/// A missing or non-positive duration credits zero minutes, so the
/// record closes at its own start time.
pub fn expected_end(start: DateTime<Utc>, minutes: Option<i64>) -> DateTime<Utc> {
    match minutes {
        Some(m) if m > 0 => add_minutes(start, m),
        _ => start,
    }
}

/// Expiry timestamp for a freshly issued clock-out token.
pub fn token_expiry(issued_at: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    Duration::try_days(days)
        .and_then(|d| issued_at.checked_add_signed(d))
        .unwrap_or(if days >= 0 {
            DateTime::<Utc>::MAX_UTC
        } else {
            DateTime::<Utc>::MIN_UTC
        })
}
