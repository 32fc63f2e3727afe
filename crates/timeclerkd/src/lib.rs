//! timeclerkd - volunteer time-tracking kiosk backend
//!
//! Library surface so integration tests can build the router against
//! mock Ledger and Notifier implementations.

mod error;
mod routes;
mod state;

pub use error::ApiError;
pub use routes::router;
pub use state::AppState;
