//! Validated configuration ready for use by the service

use crate::schema::{
    FieldMap, RawBehaviorConfig, RawConfig, RawLedgerConfig, RawNotifyConfig, RawServerConfig,
    TableNames,
};
use std::time::Duration;

pub const DEFAULT_LEDGER_API_URL: &str = "https://api.airtable.com/v0";
pub const DEFAULT_NOTIFY_API_URL: &str = "https://api.twilio.com/2010-04-01";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Validated configuration (after `validate_config`)
#[derive(Debug, Clone)]
pub struct Config {
    pub ledger: LedgerConfig,
    pub notify: NotifyConfig,
    pub behavior: BehaviorConfig,
    pub server: ServerConfig,
}

impl Config {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        Self {
            ledger: LedgerConfig::from_raw(raw.ledger),
            notify: NotifyConfig::from_raw(raw.notify),
            behavior: BehaviorConfig::from_raw(raw.behavior),
            server: ServerConfig::from_raw(raw.server),
        }
    }
}

/// Ledger connection plus the canonical schema mapping
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    pub api_url: String,
    pub base_id: String,
    pub timeout: Duration,
    pub tables: TableNames,
    pub fields: FieldMap,
}

impl LedgerConfig {
    fn from_raw(raw: RawLedgerConfig) -> Self {
        Self {
            api_url: raw
                .api_url
                .unwrap_or_else(|| DEFAULT_LEDGER_API_URL.to_string()),
            base_id: raw.base_id,
            timeout: raw
                .timeout_seconds
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TIMEOUT),
            tables: raw.tables,
            fields: raw.fields,
        }
    }
}

/// SMS gateway connection
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    pub api_url: String,
    pub account_sid: String,
    pub from_number: String,
    pub timeout: Duration,
}

impl NotifyConfig {
    fn from_raw(raw: RawNotifyConfig) -> Self {
        Self {
            api_url: raw
                .api_url
                .unwrap_or_else(|| DEFAULT_NOTIFY_API_URL.to_string()),
            account_sid: raw.account_sid,
            from_number: raw.from_number,
            timeout: raw
                .timeout_seconds
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TIMEOUT),
        }
    }
}

/// Lifecycle behavior knobs
#[derive(Debug, Clone)]
pub struct BehaviorConfig {
    pub remind_after_minutes: i64,
    pub token_expires_days: i64,
    pub clock_out_link_base: String,
    pub allowed_membership_types: Vec<String>,
    pub max_member_search_results: usize,
}

impl BehaviorConfig {
    fn from_raw(raw: RawBehaviorConfig) -> Self {
        Self {
            remind_after_minutes: raw.remind_after_minutes,
            token_expires_days: raw.token_expires_days,
            clock_out_link_base: raw.clock_out_link_base,
            allowed_membership_types: raw.allowed_membership_types,
            max_member_search_results: raw.max_member_search_results,
        }
    }

    /// The clock-out URL embedded in reminder messages.
    pub fn clock_out_link(&self, token: &str) -> String {
        format!("{}?token={}", self.clock_out_link_base, token)
    }
}

/// HTTP server settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

impl ServerConfig {
    fn from_raw(raw: RawServerConfig) -> Self {
        Self { bind: raw.bind }
    }
}
