//! Engine operation outcomes, serialized directly in API responses

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use timeclerk_util::RecordId;

/// Result of a check-in
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckInOutcome {
    /// Attendance mode: log created already closed with a fixed credit
    AttendanceRecorded {
        log_id: RecordId,
        activity_name: String,
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
        minutes_credited: i64,
    },
    /// Shift mode: new open log
    ShiftStarted {
        log_id: RecordId,
        activity_name: String,
        auto_close_minutes: Option<i64>,
    },
    /// Shift mode: the member already has an open shift, nothing created
    AlreadyOpen {
        log_id: RecordId,
        open_since: Option<DateTime<Utc>>,
    },
}

/// Result of a kiosk sign-out by member number
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SignOutOutcome {
    SignedOut {
        log_id: RecordId,
        started_at: Option<DateTime<Utc>>,
        ended_at: DateTime<Utc>,
    },
    NoOpenShift,
}

/// Result of redeeming a clock-out token
///
/// Invalid, expired, and already-used tokens are indistinguishable to
/// the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TokenCloseOutcome {
    ClockedOut { log_id: RecordId },
    InvalidOrExpired,
}

/// Summary of one auto-close sweep run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutoCloseReport {
    pub checked: u64,
    pub auto_closed: u64,
    pub skipped_not_due_yet: u64,
    pub skipped_bad_data: u64,
    pub errors: u64,
}

/// Summary of one reminder sweep run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReminderReport {
    pub checked: u64,
    pub sent: u64,
    pub skipped: u64,
}
