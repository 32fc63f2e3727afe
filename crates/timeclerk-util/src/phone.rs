//! Phone number normalization
//!
//! The Ledger stores member phone numbers in whatever format a human
//! typed; the SMS gateway wants E.164. US numbers only.

/// Normalize a stored phone number to E.164.
///
/// Rules:
/// - 10 digits => `+1` prefix
/// - 11 digits starting with `1` => `+` prefix
/// - anything else => no usable phone
pub fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    match digits.len() {
        10 => Some(format!("+1{}", digits)),
        11 if digits.starts_with('1') => Some(format!("+{}", digits)),
        _ => None,
    }
}
