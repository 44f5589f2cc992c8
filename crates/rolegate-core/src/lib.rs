//! Core library for `rolegate`.
//!
//! Decides who may hold the administrator role. A fresh deployment has no
//! administrators; the first authenticated caller may appoint exactly
//! themselves. From the moment any administrator exists, self-appointment is
//! closed and only existing administrators can grant the role.
//!
//! The policy never caches whether an administrator exists. Every call
//! re-reads the count from the [`RoleStore`](rolegate_storage::RoleStore), so
//! any number of stateless instances can run side by side.

pub mod error;
pub mod identity;
pub mod request;
pub mod service;

pub use error::{BootstrapError, IdentityError};
pub use identity::{IdentityProvider, StaticIdentityProvider};
pub use request::{BootstrapRequest, BootstrapResponse, bearer_token};
pub use service::{AssignOutcome, BootstrapService};
