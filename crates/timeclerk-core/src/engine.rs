//! The shift lifecycle engine
//!
//! All state lives in the Ledger; the engine is stateless apart from
//! per-member serialization of shift-opening operations. Check-in for
//! a shift is check-then-create, so concurrent kiosk submissions for
//! the same member must not interleave between the open-shift query
//! and the create. A per-member async lock closes that window within
//! one process; running multiple instances needs an external lease.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Duration;
use timeclerk_config::{BehaviorConfig, Config, LedgerConfig};
use timeclerk_ledger::{FieldsBuilder, Filter, Ledger, ListQuery, SortDir};
use timeclerk_notify::{reminder_body, Notifier};
use timeclerk_util::{
    clock_out_token, expected_end, now, token_expiry, MemberNumber, RecordId, Result,
    TimeclerkError,
};
use tracing::{info, warn};

use crate::lookup::{ActivityCatalog, MemberDirectory};
use crate::model::{ActivityMode, ShiftLog};
use crate::outcome::{
    AutoCloseReport, CheckInOutcome, ReminderReport, SignOutOutcome, TokenCloseOutcome,
};

/// Reason recorded on logs closed by the auto-close sweep
pub const AUTO_CLOSE_REASON_MAX_DURATION: &str = "MaxDuration";

pub struct ShiftEngine {
    ledger: Arc<dyn Ledger>,
    notifier: Arc<dyn Notifier>,
    config: LedgerConfig,
    behavior: BehaviorConfig,
    catalog: ActivityCatalog,
    directory: MemberDirectory,
    member_locks: Mutex<HashMap<i64, Arc<tokio::sync::Mutex<()>>>>,
}

impl ShiftEngine {
    pub fn new(ledger: Arc<dyn Ledger>, notifier: Arc<dyn Notifier>, config: &Config) -> Self {
        let catalog = ActivityCatalog::new(ledger.clone(), config.ledger.clone());
        let directory = MemberDirectory::new(
            ledger.clone(),
            config.ledger.clone(),
            config.behavior.allowed_membership_types.clone(),
            config.behavior.max_member_search_results,
        );
        Self {
            ledger,
            notifier,
            config: config.ledger.clone(),
            behavior: config.behavior.clone(),
            catalog,
            directory,
            member_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn catalog(&self) -> &ActivityCatalog {
        &self.catalog
    }

    pub fn directory(&self) -> &MemberDirectory {
        &self.directory
    }

    /// The per-member lock serializing open-shift check-then-create.
    ///
    /// Keyed by the canonical numeric value so spellings that differ
    /// only in leading zeros share one lock, matching the numeric
    /// open-shift query. Locks are never evicted; the member
    /// population is small and bounded.
    fn member_lock(&self, member_number: &MemberNumber) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.member_locks.lock().unwrap_or_else(|e| e.into_inner());
        locks
            .entry(member_number.as_i64())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// The member's open shift, if any. Openness is end-time emptiness.
    async fn find_open_shift(&self, member_number: &MemberNumber) -> Result<Option<ShiftLog>> {
        let fields = &self.config.fields.logs;
        let query = ListQuery::new()
            .filter(Filter::and([
                Filter::eq_num(&fields.member_number, member_number.as_i64()),
                Filter::is_empty(&fields.end_time),
            ]))
            .max_records(1)
            .sort(&fields.start_time, SortDir::Desc);
        let records = self.ledger.list(&self.config.tables.logs, query).await?;
        Ok(records.first().map(|r| ShiftLog::from_record(r, fields)))
    }

    /// Kiosk check-in: member number plus chosen activity.
    ///
    /// The kiosk also sends the member's record id from its earlier
    /// lookup; when present it must agree with the number, so a stale
    /// kiosk screen cannot log hours against the wrong member.
    ///
    /// Attendance activities credit a fixed block immediately; shift
    /// activities open a log carrying a fresh clock-out token.
    pub async fn check_in(
        &self,
        member_id: Option<&RecordId>,
        member_number: &MemberNumber,
        activity_id: &RecordId,
    ) -> Result<CheckInOutcome> {
        let member = self.directory.resolve_eligible(member_number).await?;
        if let Some(id) = member_id {
            if *id != member.id {
                return Err(TimeclerkError::invalid_input(
                    "member_id does not match member_number",
                ));
            }
        }
        let activity = self.catalog.resolve(activity_id).await?;
        if !activity.active {
            return Err(TimeclerkError::invalid_input(format!(
                "activity '{}' is not currently offered",
                activity.name
            )));
        }

        match activity.resolved_mode()? {
            ActivityMode::Attendance => {
                // No configured duration credits zero minutes; the
                // log still records that the member showed up.
                let minutes = activity.auto_close_minutes.filter(|m| *m > 0);
                let started_at = now();
                let ended_at = expected_end(started_at, minutes);
                let log_fields = &self.config.fields.logs;
                let record = self
                    .ledger
                    .create(
                        &self.config.tables.logs,
                        FieldsBuilder::new()
                            .link(&log_fields.member_link, &member.id)
                            .num(&log_fields.member_number, member_number.as_i64())
                            .link(&log_fields.activity_link, &activity.id)
                            .time(&log_fields.start_time, started_at)
                            .time(&log_fields.end_time, ended_at)
                            .build(),
                    )
                    .await?;
                info!(
                    member = member_number.as_str(),
                    activity = %activity.name,
                    log = %record.id,
                    minutes = minutes.unwrap_or(0),
                    "attendance recorded"
                );
                Ok(CheckInOutcome::AttendanceRecorded {
                    log_id: record.id,
                    activity_name: activity.name,
                    started_at,
                    ended_at,
                    minutes_credited: minutes.unwrap_or(0),
                })
            }
            ActivityMode::Shift => {
                let lock = self.member_lock(member_number);
                let _guard = lock.lock().await;

                if let Some(open) = self.find_open_shift(member_number).await? {
                    info!(
                        member = member_number.as_str(),
                        log = %open.id,
                        "check-in found an open shift"
                    );
                    return Ok(CheckInOutcome::AlreadyOpen {
                        log_id: open.id,
                        open_since: open.start_time,
                    });
                }

                let started_at = now();
                let token = clock_out_token();
                let expires = token_expiry(started_at, self.behavior.token_expires_days);
                let log_fields = &self.config.fields.logs;
                let mut builder = FieldsBuilder::new()
                    .link(&log_fields.member_link, &member.id)
                    .num(&log_fields.member_number, member_number.as_i64())
                    .link(&log_fields.activity_link, &activity.id)
                    .time(&log_fields.start_time, started_at)
                    .str(&log_fields.clock_out_token, token)
                    .time(&log_fields.clock_out_token_expires, expires);
                // The sweep reads the cap off the log itself, so a
                // later edit to the activity never retroactively
                // reshapes shifts already underway.
                if let Some(m) = activity.auto_close_minutes.filter(|m| *m > 0) {
                    builder = builder.num(&log_fields.auto_close_minutes, m);
                }
                let record = self
                    .ledger
                    .create(&self.config.tables.logs, builder.build())
                    .await?;
                info!(
                    member = member_number.as_str(),
                    activity = %activity.name,
                    log = %record.id,
                    "shift started"
                );
                Ok(CheckInOutcome::ShiftStarted {
                    log_id: record.id,
                    activity_name: activity.name,
                    auto_close_minutes: activity.auto_close_minutes.filter(|m| *m > 0),
                })
            }
        }
    }

    /// Redeem a clock-out token from a reminder link.
    ///
    /// One query carries the full validity predicate: token match,
    /// still open, not expired. A token on an already-closed log
    /// fails the emptiness clause, which is what makes tokens
    /// one-shot.
    pub async fn close_by_token(&self, token: &str) -> Result<TokenCloseOutcome> {
        let token = token.trim();
        if token.is_empty() {
            return Ok(TokenCloseOutcome::InvalidOrExpired);
        }

        let fields = &self.config.fields.logs;
        let query = ListQuery::new()
            .filter(Filter::and([
                Filter::eq_str(&fields.clock_out_token, token),
                Filter::is_empty(&fields.end_time),
                Filter::AfterNow(fields.clock_out_token_expires.clone()),
            ]))
            .max_records(1);
        let records = self.ledger.list(&self.config.tables.logs, query).await?;
        let record = match records.into_iter().next() {
            Some(r) => r,
            None => return Ok(TokenCloseOutcome::InvalidOrExpired),
        };

        let ended_at = now();
        let patched = self
            .ledger
            .patch(
                &self.config.tables.logs,
                &record.id,
                FieldsBuilder::new().time(&fields.end_time, ended_at).build(),
            )
            .await?;
        info!(log = %patched.id, "shift clocked out by token");
        Ok(TokenCloseOutcome::ClockedOut { log_id: patched.id })
    }

    /// Kiosk sign-out by member number.
    ///
    /// No eligibility gate: a member whose membership lapsed
    /// mid-shift can still close it. An unknown number simply has no
    /// open shift.
    pub async fn close_by_member_number(
        &self,
        member_number: &MemberNumber,
    ) -> Result<SignOutOutcome> {
        let lock = self.member_lock(member_number);
        let _guard = lock.lock().await;

        let open = match self.find_open_shift(member_number).await? {
            Some(log) => log,
            None => return Ok(SignOutOutcome::NoOpenShift),
        };

        let fields = &self.config.fields.logs;
        let ended_at = now();
        self.ledger
            .patch(
                &self.config.tables.logs,
                &open.id,
                FieldsBuilder::new().time(&fields.end_time, ended_at).build(),
            )
            .await?;
        info!(
            member = member_number.as_str(),
            log = %open.id,
            "shift signed out"
        );
        Ok(SignOutOutcome::SignedOut {
            log_id: open.id,
            started_at: open.start_time,
            ended_at,
        })
    }

    /// Close open shifts that have run past their activity's cap.
    ///
    /// The end time written is the expected end (start plus cap), not
    /// the sweep time, so a delayed sweep never inflates credited
    /// hours. One bad record never stops the rest of the sweep.
    pub async fn sweep_auto_close(&self) -> Result<AutoCloseReport> {
        let fields = &self.config.fields.logs;
        let query = ListQuery::new().filter(Filter::and([
            Filter::is_empty(&fields.end_time),
            Filter::not_empty(&fields.auto_close_minutes),
            Filter::not_empty(&fields.start_time),
        ]));
        let records = self.ledger.list(&self.config.tables.logs, query).await?;

        let mut report = AutoCloseReport::default();
        let sweep_time = now();
        for record in &records {
            report.checked += 1;
            let log = ShiftLog::from_record(record, fields);

            let (start, minutes) = match (log.start_time, log.auto_close_minutes) {
                (Some(s), Some(m)) if m > 0 => (s, m),
                _ => {
                    warn!(log = %log.id, "auto-close skipping log with unusable fields");
                    report.skipped_bad_data += 1;
                    continue;
                }
            };

            // A cap too large to express as a time offset is bad data,
            // not a pending shift; it must never abort the batch.
            let ends_at = match Duration::try_minutes(minutes)
                .and_then(|d| start.checked_add_signed(d))
            {
                Some(t) => t,
                None => {
                    warn!(log = %log.id, minutes, "auto-close skipping log with absurd duration");
                    report.skipped_bad_data += 1;
                    continue;
                }
            };
            if ends_at > sweep_time {
                report.skipped_not_due_yet += 1;
                continue;
            }

            let patch = FieldsBuilder::new()
                .time(&fields.end_time, ends_at)
                .bool(&fields.auto_closed, true)
                .time(&fields.auto_closed_at, sweep_time)
                .str(&fields.auto_close_reason, AUTO_CLOSE_REASON_MAX_DURATION)
                .build();
            match self.ledger.patch(&self.config.tables.logs, &log.id, patch).await {
                Ok(_) => {
                    info!(log = %log.id, end = %ends_at, "shift auto-closed");
                    report.auto_closed += 1;
                }
                Err(err) => {
                    warn!(log = %log.id, error = %err, "auto-close patch failed");
                    report.errors += 1;
                }
            }
        }
        Ok(report)
    }

    /// Text members whose shifts have been open past the reminder
    /// threshold and have not been reminded yet.
    ///
    /// `reminder_sent_at` is stamped only after a successful send, so
    /// a failed send leaves the log eligible for the next sweep and a
    /// failed stamp risks a duplicate text rather than a lost one.
    pub async fn sweep_reminders(&self) -> Result<ReminderReport> {
        let fields = &self.config.fields.logs;
        let query = ListQuery::new().filter(Filter::and([
            Filter::is_empty(&fields.end_time),
            Filter::is_empty(&fields.reminder_sent_at),
            Filter::BeforeNowMinus {
                field: fields.start_time.clone(),
                minutes: self.behavior.remind_after_minutes,
            },
        ]));
        let records = self.ledger.list(&self.config.tables.logs, query).await?;

        let mut report = ReminderReport::default();
        for record in &records {
            report.checked += 1;
            let log = ShiftLog::from_record(record, fields);

            let (member_number, token) = match (log.member_number, log.clock_out_token.as_deref()) {
                (Some(n), Some(t)) if !t.is_empty() => (n, t),
                _ => {
                    warn!(log = %log.id, "reminder skipping log without number or token");
                    report.skipped += 1;
                    continue;
                }
            };

            let member = match self.directory.resolve_by_number(member_number).await {
                Ok(Some(m)) => m,
                Ok(None) => {
                    warn!(log = %log.id, member = member_number, "reminder found no member");
                    report.skipped += 1;
                    continue;
                }
                Err(err) => {
                    warn!(log = %log.id, error = %err, "reminder member lookup failed");
                    report.skipped += 1;
                    continue;
                }
            };
            let phone = match &member.phone {
                Some(p) => p.clone(),
                None => {
                    warn!(log = %log.id, member = member_number, "reminder member has no usable phone");
                    report.skipped += 1;
                    continue;
                }
            };

            let body = reminder_body(
                member.name.as_deref().unwrap_or("volunteer"),
                &self.behavior.clock_out_link(token),
            );
            if let Err(err) = self.notifier.send(&phone, &body).await {
                warn!(log = %log.id, error = %err, "reminder send failed");
                report.skipped += 1;
                continue;
            }

            let stamp = FieldsBuilder::new()
                .time(&fields.reminder_sent_at, now())
                .build();
            if let Err(err) = self.ledger.patch(&self.config.tables.logs, &log.id, stamp).await {
                warn!(log = %log.id, error = %err, "reminder sent but stamp failed");
            }
            info!(log = %log.id, member = member_number, "reminder sent");
            report.sent += 1;
        }
        Ok(report)
    }
}
