//! Ledger trait definitions

use async_trait::async_trait;
use timeclerk_util::{RecordId, Result};

use crate::{Fields, Filter, Record};

/// Sort direction for list queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDir::Asc => "asc",
            SortDir::Desc => "desc",
        }
    }
}

/// Parameters for a list query
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub filter: Option<Filter>,
    pub max_records: Option<u32>,
    pub sort: Option<(String, SortDir)>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn max_records(mut self, n: u32) -> Self {
        self.max_records = Some(n);
        self
    }

    pub fn sort(mut self, field: impl Into<String>, dir: SortDir) -> Self {
        self.sort = Some((field.into(), dir));
        self
    }
}

/// The record-store capability the lifecycle engine consumes
#[async_trait]
pub trait Ledger: Send + Sync {
    /// List records matching a query.
    async fn list(&self, table: &str, query: ListQuery) -> Result<Vec<Record>>;

    /// Fetch one record by id.
    async fn get(&self, table: &str, id: &RecordId) -> Result<Record>;

    /// Create a record, returning it with its assigned id.
    async fn create(&self, table: &str, fields: Fields) -> Result<Record>;

    /// Patch fields on an existing record.
    async fn patch(&self, table: &str, id: &RecordId, fields: Fields) -> Result<Record>;
}
