//! Error types for wppq-core

use thiserror::Error;

/// Core error type for queue and phone operations
///
/// A semantic no-op is not an error; see [`crate::Outcome`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Caller does not own the phone or entry
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Referenced phone or entry does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Operation requires the phone to be online
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    /// Invalid input (missing number, duplicate number, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// A concurrent write changed the queue underneath an update
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The persistence collaborator failed
    #[error("Storage error: {0}")]
    Collaborator(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn precondition_failed(msg: impl Into<String>) -> Self {
        Self::PreconditionFailed(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn collaborator(msg: impl Into<String>) -> Self {
        Self::Collaborator(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Message safe to show to an end user.
    ///
    /// Never contains identifiers or storage details. Validation and
    /// configuration messages describe the caller's own input and are passed
    /// through.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized(_) => "You do not have permission to do this".to_string(),
            Self::NotFound(_) => "The requested phone or queue entry was not found".to_string(),
            Self::PreconditionFailed(_) => "The phone is not online".to_string(),
            Self::Validation(msg) | Self::Config(msg) => msg.clone(),
            Self::Conflict(_) => {
                "The queue changed while it was being updated, please try again".to_string()
            }
            Self::Collaborator(_) => "Storage is unavailable, please try again".to_string(),
        }
    }

    /// Process exit code for this error.
    ///
    /// - 1: validation or configuration
    /// - 2: storage failure
    /// - 3: not found
    /// - 4: unauthorized
    /// - 5: precondition failed or conflict
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) | Self::Config(_) => 1,
            Self::Collaborator(_) => 2,
            Self::NotFound(_) => 3,
            Self::Unauthorized(_) => 4,
            Self::PreconditionFailed(_) | Self::Conflict(_) => 5,
        }
    }
}

/// Result type alias for wppq-core operations
pub type Result<T> = std::result::Result<T, Error>;
