//! Shared utilities for timeclerk
//!
//! This crate provides:
//! - ID types (RecordId, MemberNumber)
//! - Error types
//! - Time arithmetic for shift durations and token expiry
//! - Clock-out token generation
//! - Phone number normalization

mod error;
mod ids;
mod phone;
mod time;
mod token;

pub use error::*;
pub use ids::*;
pub use phone::*;
pub use time::*;
pub use token::*;
