//! Ledger record representation and typed field access

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use timeclerk_util::RecordId;

/// A bag of field values keyed by field name
pub type Fields = serde_json::Map<String, Value>;

/// One record as stored in the Ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    #[serde(default)]
    pub fields: Fields,
}

impl Record {
    pub fn new(id: impl Into<RecordId>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// String value of a field, if present and non-empty.
    pub fn str_field(&self, name: &str) -> Option<&str> {
        match self.fields.get(name) {
            Some(Value::String(s)) if !s.is_empty() => Some(s),
            _ => None,
        }
    }

    /// Integer value of a field. The store sometimes hands numeric
    /// columns back as strings (lookups/rollups), so both are accepted.
    pub fn i64_field(&self, name: &str) -> Option<i64> {
        match self.fields.get(name) {
            Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok().map(|f| f.trunc() as i64),
            _ => None,
        }
    }

    /// Checkbox value; absent means unchecked.
    pub fn bool_field(&self, name: &str) -> bool {
        matches!(self.fields.get(name), Some(Value::Bool(true)))
    }

    /// RFC 3339 timestamp value of a field.
    pub fn time_field(&self, name: &str) -> Option<DateTime<Utc>> {
        self.str_field(name)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Linked-record field: the first linked id, if any.
    pub fn link_field(&self, name: &str) -> Option<RecordId> {
        match self.fields.get(name) {
            Some(Value::Array(items)) => items
                .first()
                .and_then(|v| v.as_str())
                .map(RecordId::from),
            Some(Value::String(s)) if !s.is_empty() => Some(RecordId::from(s.as_str())),
            _ => None,
        }
    }

    /// True when the field is absent, null or the empty string.
    pub fn is_empty_field(&self, name: &str) -> bool {
        match self.fields.get(name) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.is_empty(),
            Some(Value::Array(items)) => items.is_empty(),
            _ => false,
        }
    }
}

/// Builder for create/patch field sets
#[derive(Debug, Default, Clone)]
pub struct FieldsBuilder(Fields);

impl FieldsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn str(mut self, name: &str, value: impl Into<String>) -> Self {
        self.0.insert(name.to_string(), Value::String(value.into()));
        self
    }

    pub fn num(mut self, name: &str, value: i64) -> Self {
        self.0.insert(name.to_string(), Value::from(value));
        self
    }

    pub fn bool(mut self, name: &str, value: bool) -> Self {
        self.0.insert(name.to_string(), Value::Bool(value));
        self
    }

    pub fn time(mut self, name: &str, value: DateTime<Utc>) -> Self {
        self.0.insert(
            name.to_string(),
            Value::String(value.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)),
        );
        self
    }

    /// Linked-record field (the store wants an array of record ids).
    pub fn link(mut self, name: &str, id: &RecordId) -> Self {
        self.0.insert(
            name.to_string(),
            Value::Array(vec![Value::String(id.as_str().to_string())]),
        );
        self
    }

    pub fn build(self) -> Fields {
        self.0
    }
}
