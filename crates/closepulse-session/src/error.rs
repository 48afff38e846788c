//! Error types for the session layer

use std::io;
use thiserror::Error;

/// Result type alias for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Message shown for anything nobody anticipated
pub const UNEXPECTED_MESSAGE: &str = "An unexpected error occurred";

/// Broad category of a [`SessionError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Required input missing; the user corrects it
    Validation,
    /// Credential mismatch; the user retries
    Authentication,
    /// Stored session unreadable; healed locally
    Persistence,
    /// Anything else
    Unexpected,
}

/// Errors that can occur during session operations
#[derive(Error, Debug)]
pub enum SessionError {
    /// Email or password empty
    #[error("Missing credentials")]
    MissingCredentials,

    /// Email empty on password reset
    #[error("Missing email address")]
    MissingEmail,

    /// Credential pair not accepted
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Stored session exists but does not parse into a complete session
    #[error("Stored session under '{key}' is corrupt: {reason}")]
    CorruptSession {
        /// Storage key
        key: String,
        /// Why it was rejected
        reason: String,
    },

    /// Key-value store failed
    #[error("Session storage error: {message}")]
    Storage {
        /// Error message
        message: String,
    },

    /// A login is already running
    #[error("Login already in progress")]
    LoginInProgress,

    /// Restore has not finished yet
    #[error("Session restore in progress")]
    RestoreInProgress,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Catch-all
    #[error("Unexpected error: {message}")]
    Unexpected {
        /// Error message
        message: String,
    },
}

impl SessionError {
    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create a corrupt-session error
    pub fn corrupt(key: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::CorruptSession {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an unexpected error
    pub fn unexpected(message: impl std::fmt::Display) -> Self {
        Self::Unexpected {
            message: message.to_string(),
        }
    }

    /// Category of this error
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingCredentials | Self::MissingEmail => ErrorKind::Validation,
            Self::InvalidCredentials => ErrorKind::Authentication,
            Self::CorruptSession { .. } | Self::Storage { .. } => ErrorKind::Persistence,
            Self::LoginInProgress
            | Self::RestoreInProgress
            | Self::Io(_)
            | Self::Json(_)
            | Self::Unexpected { .. } => ErrorKind::Unexpected,
        }
    }

    /// Message suitable for display to the user
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::MissingCredentials => "Please enter both email and password",
            Self::MissingEmail => "Please enter your email address",
            Self::InvalidCredentials => "Invalid email or password",
            Self::LoginInProgress => "A sign-in attempt is already in progress",
            Self::RestoreInProgress => "Your session is still loading, please wait",
            Self::CorruptSession { .. }
            | Self::Storage { .. }
            | Self::Io(_)
            | Self::Json(_)
            | Self::Unexpected { .. } => UNEXPECTED_MESSAGE,
        }
    }
}

impl From<SessionError> for closepulse_core::Error {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::MissingCredentials => Self::validation("credentials", "missing credentials"),
            SessionError::MissingEmail => Self::validation("email", "missing email"),
            SessionError::InvalidCredentials => {
                Self::Authentication("invalid credentials".to_string())
            }
            SessionError::CorruptSession { key, reason } => Self::Persistence {
                key,
                message: reason,
            },
            SessionError::Io(e) => Self::Io(e),
            SessionError::Json(e) => Self::Serialization(e),
            other => Self::Unexpected(other.to_string()),
        }
    }
}
