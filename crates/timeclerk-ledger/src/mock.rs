//! In-memory mock Ledger for testing
//!
//! Evaluates [`Filter`] predicates against stored records, including
//! the relative-time predicates, driven by an injectable clock so
//! tests control "now".

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use timeclerk_util::{RecordId, Result, TimeclerkError};

use crate::{Fields, Filter, FilterValue, Ledger, ListQuery, Record, SortDir};

/// Mock Ledger for unit/integration testing
pub struct MockLedger {
    tables: Mutex<HashMap<String, Vec<Record>>>,
    next_id: AtomicU64,
    now: Mutex<DateTime<Utc>>,

    /// Total Ledger calls issued (validation-ordering assertions)
    calls: AtomicU64,

    /// Configure create calls to fail
    pub fail_create: Mutex<bool>,

    /// Configure patch calls to fail
    pub fail_patch: Mutex<bool>,
}

impl MockLedger {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            tables: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            now: Mutex::new(now),
            calls: AtomicU64::new(0),
            fail_create: Mutex::new(false),
            fail_patch: Mutex::new(false),
        }
    }

    /// Advance or rewind the mock clock used by relative-time filters.
    pub fn set_now(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }

    /// Seed a record directly (test setup, not counted as a call).
    pub fn insert(&self, table: &str, fields: Fields) -> RecordId {
        let id = RecordId::new(format!("rec{:06}", self.next_id.fetch_add(1, Ordering::SeqCst)));
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .push(Record::new(id.clone(), fields));
        id
    }

    /// Snapshot of a table's records.
    pub fn records(&self, table: &str) -> Vec<Record> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    /// Find a record by id across one table.
    pub fn find(&self, table: &str, id: &RecordId) -> Option<Record> {
        self.records(table).into_iter().find(|r| &r.id == id)
    }

    /// Number of Ledger calls issued so far.
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    fn matches(&self, filter: &Filter, record: &Record, now: DateTime<Utc>) -> bool {
        match filter {
            Filter::Eq(field, value) => match value {
                FilterValue::Str(s) => record
                    .str_field(field)
                    .map(|v| v == s)
                    .unwrap_or(false),
                FilterValue::Num(n) => record.i64_field(field) == Some(*n),
                FilterValue::Bool(b) => record.bool_field(field) == *b,
            },
            Filter::IsEmpty(field) => record.is_empty_field(field),
            Filter::NotEmpty(field) => !record.is_empty_field(field),
            Filter::Contains { field, needle } => record
                .str_field(field)
                .map(|v| v.to_lowercase().contains(&needle.to_lowercase()))
                .unwrap_or(false),
            Filter::BeforeNowMinus { field, minutes } => record
                .time_field(field)
                .map(|t| t < now - chrono::Duration::minutes(*minutes))
                .unwrap_or(false),
            Filter::AfterNow(field) => record
                .time_field(field)
                .map(|t| t > now)
                .unwrap_or(false),
            Filter::And(parts) => parts.iter().all(|f| self.matches(f, record, now)),
            Filter::Or(parts) => parts.iter().any(|f| self.matches(f, record, now)),
        }
    }
}

#[async_trait]
impl Ledger for MockLedger {
    async fn list(&self, table: &str, query: ListQuery) -> Result<Vec<Record>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = *self.now.lock().unwrap();
        let mut rows = self.records(table);

        if let Some(filter) = &query.filter {
            rows.retain(|r| self.matches(filter, r, now));
        }

        if let Some((field, dir)) = &query.sort {
            rows.sort_by(|a, b| {
                let ka = a.str_field(field).unwrap_or_default().to_string();
                let kb = b.str_field(field).unwrap_or_default().to_string();
                match dir {
                    SortDir::Asc => ka.cmp(&kb),
                    SortDir::Desc => kb.cmp(&ka),
                }
            });
        }

        if let Some(max) = query.max_records {
            rows.truncate(max as usize);
        }

        Ok(rows)
    }

    async fn get(&self, table: &str, id: &RecordId) -> Result<Record> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.find(table, id)
            .ok_or_else(|| TimeclerkError::not_found("Ledger record not found"))
    }

    async fn create(&self, table: &str, fields: Fields) -> Result<Record> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_create.lock().unwrap() {
            return Err(TimeclerkError::upstream(Some(500), "mock create failure"));
        }

        let id = RecordId::new(format!("rec{:06}", self.next_id.fetch_add(1, Ordering::SeqCst)));
        let record = Record::new(id, fields);
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    async fn patch(&self, table: &str, id: &RecordId, fields: Fields) -> Result<Record> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if *self.fail_patch.lock().unwrap() {
            return Err(TimeclerkError::upstream(Some(500), "mock patch failure"));
        }

        let mut tables = self.tables.lock().unwrap();
        let rows = tables
            .get_mut(table)
            .ok_or_else(|| TimeclerkError::not_found("Ledger record not found"))?;
        let record = rows
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| TimeclerkError::not_found("Ledger record not found"))?;

        for (k, v) in fields {
            record.fields.insert(k, v);
        }
        Ok(record.clone())
    }
}
