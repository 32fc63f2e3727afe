//! Strongly-typed identifiers for timeclerk

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::TimeclerkError;

/// Opaque record identifier assigned by the Ledger
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A validated kiosk member number (1-4 digits).
///
/// Parsing is the only way to construct one, so every value in the
/// system has already passed input validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberNumber {
    raw: String,
    value: i64,
}

impl MemberNumber {
    /// Parse a member number from kiosk/QR input.
    ///
    /// Accepts only 1-4 ASCII digits (leading zeros preserved).
    pub fn parse(input: &str) -> Result<Self, TimeclerkError> {
        let trimmed = input.trim();
        let ok = !trimmed.is_empty()
            && trimmed.len() <= 4
            && trimmed.bytes().all(|b| b.is_ascii_digit());
        if !ok {
            return Err(TimeclerkError::invalid_input(
                "member number must be 1-4 digits",
            ));
        }
        let value = trimmed.parse::<i64>().map_err(|_| {
            TimeclerkError::invalid_input("member number must be numeric")
        })?;
        Ok(Self {
            raw: trimmed.to_string(),
            value,
        })
    }

    /// The digits exactly as entered (for string-match lookups).
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Numeric value (for numeric-field lookups).
    pub fn as_i64(&self) -> i64 {
        self.value
    }
}

impl fmt::Display for MemberNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_id_equality() {
        let a = RecordId::new("recAAA");
        let b = RecordId::new("recAAA");
        let c = RecordId::new("recBBB");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn member_number_accepts_one_to_four_digits() {
        for input in ["1", "42", "999", "1234", " 77 "] {
            let n = MemberNumber::parse(input).unwrap();
            assert_eq!(n.as_str(), input.trim());
        }
    }

    #[test]
    fn member_number_rejects_bad_input() {
        for input in ["", "12345", "12a", "-1", "1.5", "one", "①"] {
            assert!(
                MemberNumber::parse(input).is_err(),
                "expected {:?} to be rejected",
                input
            );
        }
    }

    #[test]
    fn member_number_preserves_leading_zeros() {
        let n = MemberNumber::parse("0042").unwrap();
        assert_eq!(n.as_str(), "0042");
        assert_eq!(n.as_i64(), 42);
    }

    #[test]
    fn member_number_round_trips_serde() {
        let n = MemberNumber::parse("123").unwrap();
        let json = serde_json::to_string(&n).unwrap();
        let parsed: MemberNumber = serde_json::from_str(&json).unwrap();
        assert_eq!(n, parsed);
    }
}
