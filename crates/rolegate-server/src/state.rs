//! Shared application state for the `rolegate` server.
//!
//! Holds nothing mutable. Every request re-derives what it needs from the
//! role store, so instances can be scaled horizontally.

use rolegate_core::BootstrapService;

/// Shared application state passed to all HTTP handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The admin bootstrap policy.
    pub bootstrap: BootstrapService,
}
