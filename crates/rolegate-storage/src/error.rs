//! Storage error types.
//!
//! Every error variant carries enough context to diagnose the problem
//! without a debugger. None of them include credentials or connection
//! strings.

/// Errors that can occur during role store operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Failed to open or migrate the backing store.
    #[error("failed to open role store: {reason}")]
    Open { reason: String },

    /// Failed to read grants from the store.
    #[error("failed to read role grants: {reason}")]
    Read { reason: String },

    /// Failed to write a grant to the store.
    #[error("failed to write role grant for '{subject}': {reason}")]
    Write { subject: String, reason: String },

    /// A role name read from or passed to the store is not recognised.
    #[error("invalid role '{name}'")]
    InvalidRole { name: String },
}
