//! Error types for stickynotes.
//!
//! This module defines all error types used throughout the stickynotes crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

use crate::host::WindowId;

/// The main error type for stickynotes operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Store Errors ===
    /// No record exists for the requested note.
    #[error("note not found: {id}")]
    NoteNotFound {
        /// Identifier of the missing note.
        id: String,
    },

    /// A record file could not be parsed.
    #[error("malformed note record at {path}: {source}")]
    MalformedRecord {
        /// Path to the offending file.
        path: PathBuf,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// A note identifier is not usable as a storage key.
    #[error("invalid note id '{id}': {reason}")]
    InvalidNoteId {
        /// The rejected identifier.
        id: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Surface Errors ===
    /// A command arrived from a window the orchestrator does not track.
    #[error("command '{command}' from unknown window {window}")]
    UnknownSender {
        /// The window that sent the command.
        window: WindowId,
        /// The command channel name.
        command: &'static str,
    },

    /// A surface sent a command outside its capability set.
    #[error("command '{command}' not permitted for {surface} surface: {reason}")]
    Forbidden {
        /// The command channel name.
        command: &'static str,
        /// Kind of surface that sent it.
        surface: &'static str,
        /// Why it was refused.
        reason: String,
    },

    /// The window host failed to carry out an operation.
    #[error("window host error: {0}")]
    Host(String),

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for stickynotes operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a note-not-found error.
    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NoteNotFound { id: id.into() }
    }

    /// Create a new host error.
    #[must_use]
    pub fn host(message: impl Into<String>) -> Self {
        Self::Host(message.into())
    }

    /// Create a forbidden-command error.
    #[must_use]
    pub fn forbidden(
        command: &'static str,
        surface: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::Forbidden {
            command,
            surface,
            reason: reason.into(),
        }
    }

    /// Check if this error means a record was missing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NoteNotFound { .. })
    }

    /// Check if this error was caused by a surface overstepping its contract.
    #[must_use]
    pub fn is_rejected_command(&self) -> bool {
        matches!(self, Self::Forbidden { .. } | Self::UnknownSender { .. })
    }
}
