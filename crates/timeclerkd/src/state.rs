//! Shared request-handler state

use std::sync::Arc;

use timeclerk_config::Config;
use timeclerk_core::ShiftEngine;
use timeclerk_ledger::Ledger;
use timeclerk_notify::Notifier;

pub struct AppState {
    pub engine: ShiftEngine,
    /// Shared secret gating the sweep endpoints
    pub sweep_key: String,
}

impl AppState {
    pub fn new(
        ledger: Arc<dyn Ledger>,
        notifier: Arc<dyn Notifier>,
        config: &Config,
        sweep_key: impl Into<String>,
    ) -> Self {
        Self {
            engine: ShiftEngine::new(ledger, notifier, config),
            sweep_key: sweep_key.into(),
        }
    }
}
