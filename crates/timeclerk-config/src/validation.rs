//! Configuration validation

use crate::schema::RawConfig;
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Ledger config: {0}")]
    LedgerError(String),

    #[error("Notify config: {0}")]
    NotifyError(String),

    #[error("Behavior config: {0}")]
    BehaviorError(String),

    #[error("Server config: {0}")]
    ServerError(String),
}

/// Validate a raw configuration
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if config.ledger.base_id.trim().is_empty() {
        errors.push(ValidationError::LedgerError("base_id cannot be empty".into()));
    }

    for (name, value) in [
        ("tables.members", &config.ledger.tables.members),
        ("tables.activities", &config.ledger.tables.activities),
        ("tables.logs", &config.ledger.tables.logs),
    ] {
        if value.trim().is_empty() {
            errors.push(ValidationError::LedgerError(format!(
                "{} cannot be empty",
                name
            )));
        }
    }

    let f = &config.ledger.fields;
    for (name, value) in [
        ("fields.members.number", &f.members.number),
        ("fields.members.name", &f.members.name),
        ("fields.members.phone", &f.members.phone),
        ("fields.members.membership_type", &f.members.membership_type),
        ("fields.activities.name", &f.activities.name),
        ("fields.activities.mode", &f.activities.mode),
        ("fields.activities.active", &f.activities.active),
        (
            "fields.activities.auto_close_minutes",
            &f.activities.auto_close_minutes,
        ),
        ("fields.logs.member_link", &f.logs.member_link),
        ("fields.logs.member_number", &f.logs.member_number),
        ("fields.logs.activity_link", &f.logs.activity_link),
        ("fields.logs.start_time", &f.logs.start_time),
        ("fields.logs.end_time", &f.logs.end_time),
        ("fields.logs.auto_close_minutes", &f.logs.auto_close_minutes),
        ("fields.logs.clock_out_token", &f.logs.clock_out_token),
        (
            "fields.logs.clock_out_token_expires",
            &f.logs.clock_out_token_expires,
        ),
        ("fields.logs.reminder_sent_at", &f.logs.reminder_sent_at),
    ] {
        if value.trim().is_empty() {
            errors.push(ValidationError::LedgerError(format!(
                "{} cannot be empty",
                name
            )));
        }
    }

    if config.notify.account_sid.trim().is_empty() {
        errors.push(ValidationError::NotifyError(
            "account_sid cannot be empty".into(),
        ));
    }
    if !config.notify.from_number.starts_with('+') {
        errors.push(ValidationError::NotifyError(
            "from_number must be E.164 (start with '+')".into(),
        ));
    }

    if config.behavior.remind_after_minutes <= 0 {
        errors.push(ValidationError::BehaviorError(
            "remind_after_minutes must be positive".into(),
        ));
    }
    if config.behavior.token_expires_days <= 0 {
        errors.push(ValidationError::BehaviorError(
            "token_expires_days must be positive".into(),
        ));
    }
    if config.behavior.allowed_membership_types.is_empty() {
        errors.push(ValidationError::BehaviorError(
            "allowed_membership_types cannot be empty".into(),
        ));
    }
    if config.behavior.max_member_search_results == 0 {
        errors.push(ValidationError::BehaviorError(
            "max_member_search_results must be at least 1".into(),
        ));
    }

    if config.server.bind.trim().is_empty() {
        errors.push(ValidationError::ServerError("bind cannot be empty".into()));
    }

    errors
}
