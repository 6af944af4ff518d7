//! Centralized error handling for NovaScribe
//!
//! This module provides a unified error type that covers all error scenarios
//! in the editor core: storage, workspace I/O, configuration, and the
//! external collaborators (text polishing, clipboard, conversion, export).

use log::warn;
use std::fmt;
use std::io;
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Custom Result Type Alias
// ─────────────────────────────────────────────────────────────────────────────

/// A specialized `Result` type for the editor core.
pub type Result<T> = std::result::Result<T, Error>;

/// The centralized error type for the editor core.
#[derive(Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────
    // I/O Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Generic I/O error wrapper
    Io(io::Error),

    /// A workspace read or write failed
    Workspace { path: String, source: io::Error },

    /// A path tried to leave the workspace root (`..`, absolute paths)
    InvalidPath(String),

    /// The user dismissed a picker or revoked a permission
    Cancelled,

    // ─────────────────────────────────────────────────────────────────────────
    // Storage & Configuration Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Failed to load a stored value
    StorageLoad {
        key: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to persist a value
    StorageSave {
        key: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to save configuration file
    ConfigSave {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to parse stored JSON
    Parse {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Platform data/config directory not found or inaccessible
    DataDirNotFound,

    // ─────────────────────────────────────────────────────────────────────────
    // Collaborator Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// An external service (text polishing, conversion, PDF) failed
    Collaborator { service: &'static str, message: String },

    /// The system clipboard could not be accessed
    Clipboard(String),

    // ─────────────────────────────────────────────────────────────────────────
    // Application Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Generic application error with a message
    Application(String),
}

impl Error {
    /// Create a collaborator failure for the named service.
    pub fn collaborator(service: &'static str, message: impl Into<String>) -> Self {
        Error::Collaborator {
            service,
            message: message.into(),
        }
    }

    /// Whether this error is a user-initiated cancellation.
    ///
    /// Cancellations are recovered silently; everything else gets a notice.
    pub fn is_cancellation(&self) -> bool {
        match self {
            Error::Cancelled => true,
            Error::Workspace { source, .. } => {
                matches!(source.kind(), io::ErrorKind::Interrupted)
            }
            _ => false,
        }
    }
}

// Implement From traits for convenient error conversion
impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Parse {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<arboard::Error> for Error {
    fn from(err: arboard::Error) -> Self {
        Error::Clipboard(err.to_string())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Display trait implementation for user-friendly error messages
// ─────────────────────────────────────────────────────────────────────────────
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // I/O Errors
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::Workspace { path, source } => {
                write!(f, "Workspace error at '{}': {}", path, source)
            }
            Error::InvalidPath(path) => write!(f, "Path '{}' is outside the workspace", path),
            Error::Cancelled => write!(f, "Operation cancelled"),

            // Storage & Configuration Errors
            Error::StorageLoad { key, source } => {
                write!(f, "Failed to load '{}' from storage: {}", key, source)
            }
            Error::StorageSave { key, source } => {
                write!(f, "Failed to save '{}' to storage: {}", key, source)
            }
            Error::ConfigSave { path, source } => {
                write!(
                    f,
                    "Failed to save configuration to '{}': {}",
                    path.display(),
                    source
                )
            }
            Error::Parse { message, .. } => write!(f, "Invalid stored data: {}", message),
            Error::DataDirNotFound => write!(f, "Data directory not found"),

            // Collaborator Errors
            Error::Collaborator { service, message } => {
                write!(f, "{} failed: {}", service, message)
            }
            Error::Clipboard(msg) => write!(f, "Clipboard error: {}", msg),

            // Application Errors
            Error::Application(msg) => write!(f, "{}", msg),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// std::error::Error trait implementation for error chaining
// ─────────────────────────────────────────────────────────────────────────────
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Workspace { source, .. } => Some(source),
            Error::StorageLoad { source, .. } => Some(source.as_ref()),
            Error::StorageSave { source, .. } => Some(source.as_ref()),
            Error::ConfigSave { source, .. } => Some(source.as_ref()),
            Error::Parse { source, .. } => source
                .as_ref()
                .map(|s| s.as_ref() as &(dyn std::error::Error + 'static)),
            Error::InvalidPath(_)
            | Error::Cancelled
            | Error::DataDirNotFound
            | Error::Collaborator { .. }
            | Error::Clipboard(_)
            | Error::Application(_) => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Graceful Degradation Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for Result to support graceful degradation.
pub trait ResultExt<T> {
    /// If the result is an error, log it at warning level and return the provided default.
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T;
}

impl<T> ResultExt<T> for Result<T> {
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                warn!("{}: {}. Using default.", context, err);
                default
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
