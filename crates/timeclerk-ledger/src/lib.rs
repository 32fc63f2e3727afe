//! Typed client for the external tabular record store (the Ledger)
//!
//! The Ledger is treated as a transactional-ish record API:
//! list-with-filter, get-by-id, create, patch. Query predicates are
//! built with the typed [`Filter`] algebra and rendered to the
//! store's formula language only at the client boundary, so no
//! member-supplied string is ever interpolated into a query.

mod client;
mod filter;
mod mock;
mod record;
mod traits;

pub use client::*;
pub use filter::*;
pub use mock::*;
pub use record::*;
pub use traits::*;
