//! Domain model and Ledger record mapping

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use timeclerk_config::{ActivityFields, LogFields, MemberFields};
use timeclerk_ledger::Record;
use timeclerk_util::{normalize_phone, RecordId, Result, TimeclerkError};

/// Lifecycle behavior of an activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityMode {
    /// Requires explicit clock-out (manual, token or auto-close)
    Shift,
    /// Credits a fixed duration at check-in, closed immediately
    Attendance,
}

impl ActivityMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shift" => Some(ActivityMode::Shift),
            "attendance" => Some(ActivityMode::Attendance),
            _ => None,
        }
    }
}

/// A named category of trackable work or attendance (read-only here)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: RecordId,
    pub name: String,
    /// Raw mode value as stored; resolved on demand so a listing can
    /// still show a misconfigured activity.
    pub mode: Option<String>,
    pub auto_close_minutes: Option<i64>,
    pub active: bool,
}

impl Activity {
    pub fn from_record(record: &Record, fields: &ActivityFields) -> Self {
        Self {
            id: record.id.clone(),
            name: record
                .str_field(&fields.name)
                .unwrap_or("Activity")
                .to_string(),
            mode: record.str_field(&fields.mode).map(str::to_string),
            auto_close_minutes: record.i64_field(&fields.auto_close_minutes),
            active: record.bool_field(&fields.active),
        }
    }

    /// The activity's mode, required for check-in.
    ///
    /// Missing mode is an admin configuration problem
    /// (`InvalidActivityConfig`); an unrecognized value is
    /// `UnsupportedMode`. Both name the activity.
    pub fn resolved_mode(&self) -> Result<ActivityMode> {
        match &self.mode {
            None => Err(TimeclerkError::InvalidActivityConfig(format!(
                "activity '{}' has no mode configured",
                self.name
            ))),
            Some(raw) => ActivityMode::parse(raw).ok_or_else(|| {
                TimeclerkError::UnsupportedMode(format!(
                    "activity '{}' has mode '{}'",
                    self.name, raw
                ))
            }),
        }
    }
}

/// A member record (read-only here; owned by an external system)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: RecordId,
    pub number: Option<String>,
    pub name: Option<String>,
    /// Phone normalized to E.164, or absent if unusable
    pub phone: Option<String>,
}

impl Member {
    pub fn from_record(record: &Record, fields: &MemberFields) -> Self {
        let number = record
            .str_field(&fields.number)
            .map(str::to_string)
            .or_else(|| record.i64_field(&fields.number).map(|n| n.to_string()));
        Self {
            id: record.id.clone(),
            number,
            name: record.str_field(&fields.name).map(str::to_string),
            phone: record
                .str_field(&fields.phone)
                .and_then(normalize_phone),
        }
    }
}

/// Typed view of one shift/attendance log record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftLog {
    pub id: RecordId,
    pub member_id: Option<RecordId>,
    pub member_number: Option<i64>,
    pub activity_id: Option<RecordId>,
    pub start_time: Option<DateTime<Utc>>,
    /// Absent means the shift is open
    pub end_time: Option<DateTime<Utc>>,
    pub auto_close_minutes: Option<i64>,
    pub clock_out_token: Option<String>,
    pub reminder_sent_at: Option<DateTime<Utc>>,
}

impl ShiftLog {
    pub fn from_record(record: &Record, fields: &LogFields) -> Self {
        Self {
            id: record.id.clone(),
            member_id: record.link_field(&fields.member_link),
            member_number: record.i64_field(&fields.member_number),
            activity_id: record.link_field(&fields.activity_link),
            start_time: record.time_field(&fields.start_time),
            end_time: record.time_field(&fields.end_time),
            auto_close_minutes: record.i64_field(&fields.auto_close_minutes),
            clock_out_token: record
                .str_field(&fields.clock_out_token)
                .map(str::to_string),
            reminder_sent_at: record.time_field(&fields.reminder_sent_at),
        }
    }

    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use timeclerk_ledger::FieldsBuilder;

    #[test]
    fn mode_parsing_is_case_insensitive() {
        assert_eq!(ActivityMode::parse("Shift"), Some(ActivityMode::Shift));
        assert_eq!(ActivityMode::parse("ATTENDANCE"), Some(ActivityMode::Attendance));
        assert_eq!(ActivityMode::parse(" shift "), Some(ActivityMode::Shift));
        assert_eq!(ActivityMode::parse("meeting"), None);
    }

    #[test]
    fn missing_mode_vs_unsupported_mode() {
        let fields = ActivityFields::default();
        let rec = Record::new("recA", FieldsBuilder::new().str("Name", "Trail Work").build());
        let activity = Activity::from_record(&rec, &fields);
        assert!(matches!(
            activity.resolved_mode(),
            Err(TimeclerkError::InvalidActivityConfig(_))
        ));

        let rec = Record::new(
            "recB",
            FieldsBuilder::new()
                .str("Name", "Potluck")
                .str("Mode", "Banquet")
                .build(),
        );
        let activity = Activity::from_record(&rec, &fields);
        assert!(matches!(
            activity.resolved_mode(),
            Err(TimeclerkError::UnsupportedMode(_))
        ));
    }

    #[test]
    fn member_phone_is_normalized() {
        let fields = MemberFields::default();
        let rec = Record::new(
            "recM",
            FieldsBuilder::new()
                .str("Member #", "42")
                .str("Full Name", "Pat Jones")
                .str("Phone Number", "(555) 123-4567")
                .build(),
        );
        let member = Member::from_record(&rec, &fields);
        assert_eq!(member.phone.as_deref(), Some("+15551234567"));
    }

    #[test]
    fn shift_log_openness() {
        let fields = LogFields::default();
        let rec = Record::new(
            "recL",
            FieldsBuilder::new()
                .num("MemNum", 42)
                .time("StartTime", Utc::now())
                .build(),
        );
        let log = ShiftLog::from_record(&rec, &fields);
        assert!(log.is_open());
        assert_eq!(log.member_number, Some(42));
    }
}
