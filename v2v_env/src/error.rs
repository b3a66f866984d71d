//! Error types for the V2V environment boundary.

use thiserror::Error;

/// Errors that can occur at the environment boundary.
///
/// Note that none of these reach the collision-risk core: a feed that fails
/// to decode simply contributes no peer records, and the core's contract is
/// graceful degradation, never a fault.
#[derive(Debug, Error)]
pub enum EnvError {
    /// Fleet feed payload could not be decoded
    #[error("Feed decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// A record carried a structurally unusable value
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

impl EnvError {
    /// Creates an invalid-record error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidRecord(msg.into())
    }
}
