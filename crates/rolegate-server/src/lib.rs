//! `rolegate` HTTP server.
//!
//! Serves the first-admin bootstrap endpoint at `/v1/assign-first-admin`,
//! backed by a role store and a remote identity provider.

pub mod config;
pub mod cors;
pub mod error;
pub mod identity;
pub mod routes;
pub mod state;
