//! Core domain logic for timeclerk
//!
//! This crate holds everything with real behavior:
//! - The domain model (Member, Activity, ShiftLog) and its mapping
//!   to/from Ledger records
//! - Activity lookup and the member eligibility filter
//! - The shift lifecycle engine: check-in, manual close (token and
//!   member number), the auto-close sweep and the reminder sweep

mod engine;
mod lookup;
mod model;
mod outcome;

pub use engine::*;
pub use lookup::*;
pub use model::*;
pub use outcome::*;
