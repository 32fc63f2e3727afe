//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Ledger connection and schema mapping
    pub ledger: RawLedgerConfig,

    /// SMS gateway settings
    pub notify: RawNotifyConfig,

    /// Lifecycle behavior knobs
    #[serde(default)]
    pub behavior: RawBehaviorConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: RawServerConfig,
}

/// Ledger (external record store) settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawLedgerConfig {
    /// API base URL (default: the hosted Airtable-compatible endpoint)
    pub api_url: Option<String>,

    /// Base (workspace) identifier
    pub base_id: String,

    /// Request timeout in seconds
    pub timeout_seconds: Option<u64>,

    /// Table names
    pub tables: TableNames,

    /// Field names, one canonical mapping per table.
    /// Records missing a mapped field fail loudly; there is no
    /// runtime probing of alternate names.
    #[serde(default)]
    pub fields: FieldMap,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TableNames {
    pub members: String,
    pub activities: String,
    pub logs: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FieldMap {
    #[serde(default)]
    pub members: MemberFields,
    #[serde(default)]
    pub activities: ActivityFields,
    #[serde(default)]
    pub logs: LogFields,
}

impl Default for FieldMap {
    fn default() -> Self {
        Self {
            members: MemberFields::default(),
            activities: ActivityFields::default(),
            logs: LogFields::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MemberFields {
    pub number: String,
    pub name: String,
    pub phone: String,
    pub membership_type: String,
}

impl Default for MemberFields {
    fn default() -> Self {
        Self {
            number: "Member #".into(),
            name: "Full Name".into(),
            phone: "Phone Number".into(),
            membership_type: "Membership Type".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ActivityFields {
    pub name: String,
    pub mode: String,
    pub active: String,
    pub auto_close_minutes: String,
}

impl Default for ActivityFields {
    fn default() -> Self {
        Self {
            name: "Name".into(),
            mode: "Mode".into(),
            active: "Active?".into(),
            auto_close_minutes: "AutoCloseMinutes".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogFields {
    pub member_link: String,
    pub member_number: String,
    pub activity_link: String,
    pub start_time: String,
    pub end_time: String,
    pub auto_close_minutes: String,
    pub clock_out_token: String,
    pub clock_out_token_expires: String,
    pub reminder_sent_at: String,
    pub auto_closed: String,
    pub auto_closed_at: String,
    pub auto_close_reason: String,
}

impl Default for LogFields {
    fn default() -> Self {
        Self {
            member_link: "Member".into(),
            member_number: "MemNum".into(),
            activity_link: "Activity".into(),
            start_time: "StartTime".into(),
            end_time: "EndTime".into(),
            auto_close_minutes: "AutoCloseMaxMinutes".into(),
            clock_out_token: "ClockOutToken".into(),
            clock_out_token_expires: "ClockOutTokenExpires".into(),
            reminder_sent_at: "ReminderSentAt".into(),
            auto_closed: "AutoClosed?".into(),
            auto_closed_at: "AutoClosedAt".into(),
            auto_close_reason: "AutoCloseReason".into(),
        }
    }
}

/// SMS gateway settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawNotifyConfig {
    /// Gateway API base URL
    pub api_url: Option<String>,

    /// Gateway account identifier
    pub account_sid: String,

    /// Sender phone number (E.164)
    pub from_number: String,

    /// Request timeout in seconds
    pub timeout_seconds: Option<u64>,
}

/// Lifecycle behavior knobs
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RawBehaviorConfig {
    /// Remind about open shifts older than this many minutes
    pub remind_after_minutes: i64,

    /// Clock-out token validity in days
    pub token_expires_days: i64,

    /// Base URL for clock-out links sent in reminders
    pub clock_out_link_base: String,

    /// Membership categories allowed to check in
    pub allowed_membership_types: Vec<String>,

    /// Cap on member name-search results
    pub max_member_search_results: usize,
}

impl Default for RawBehaviorConfig {
    fn default() -> Self {
        Self {
            remind_after_minutes: 120,
            token_expires_days: 7,
            clock_out_link_base: "https://kiosk.example.org/api/clock-out".into(),
            allowed_membership_types: vec![
                "AM".into(),
                "AME".into(),
                "LM".into(),
                "DW".into(),
            ],
            max_member_search_results: 8,
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RawServerConfig {
    /// Bind address
    pub bind: String,
}

impl Default for RawServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".into(),
        }
    }
}
