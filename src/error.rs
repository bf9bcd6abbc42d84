//! Error types and Result aliases for mosaicsh

use std::fmt;
use std::path::PathBuf;

/// Result type alias for mosaicsh operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for mosaicsh
#[derive(Debug)]
pub enum Error {
    // === PTY-related errors ===
    /// Failed to allocate a pseudo-terminal pair
    PtyCreationFailed {
        command: String,
        reason: String,
    },

    /// Failed to open the slave side of the pseudo-terminal
    PtySlaveOpenFailed {
        path: PathBuf,
        reason: String,
    },

    /// Failed to spawn the child process
    CommandSpawnFailed {
        command: String,
        reason: String,
    },

    /// Failed to clone the pseudo-terminal master reader
    PtyReaderCloneFailed {
        reason: String,
    },

    /// Failed to send a signal to a process
    SignalSendFailed {
        signal: String,
        reason: String,
    },

    // === History errors ===
    /// No exchange with this identifier in the store
    ExchangeNotFound {
        id: String,
    },

    /// The exchange was already finalized
    ExchangeAlreadyCompleted {
        id: String,
    },

    // === Filesystem collaborator errors ===
    /// Failed to list a directory
    DirectoryListFailed {
        path: PathBuf,
        reason: String,
    },

    // === Configuration errors ===
    /// Failed to load configuration file
    ConfigLoadFailed {
        path: PathBuf,
        reason: String,
    },

    /// Failed to save configuration file
    ConfigSaveFailed {
        path: PathBuf,
        reason: String,
    },

    /// Configuration validation failed
    ConfigValidationFailed {
        field: String,
        reason: String,
    },

    /// Failed to serialize configuration
    ConfigSerializationFailed {
        format: String,
        reason: String,
    },

    /// Failed to parse configuration
    ConfigParseFailed {
        format: String,
        reason: String,
    },

    // === I/O and serialization errors ===
    /// I/O errors
    Io(std::io::Error),

    /// Serialization errors
    Serde(serde_json::Error),

    // === Generic fallback (use sparingly) ===
    /// Generic errors
    Other(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // PTY errors
            Error::PtyCreationFailed { command, reason } => {
                write!(f, "Failed to create PTY for command '{}': {}", command, reason)
            }
            Error::PtySlaveOpenFailed { path, reason } => {
                write!(f, "Failed to open PTY slave '{}': {}", path.display(), reason)
            }
            Error::CommandSpawnFailed { command, reason } => {
                write!(f, "Failed to spawn command '{}': {}", command, reason)
            }
            Error::PtyReaderCloneFailed { reason } => {
                write!(f, "Failed to clone PTY reader: {}", reason)
            }
            Error::SignalSendFailed { signal, reason } => {
                write!(f, "Failed to send signal '{}': {}", signal, reason)
            }

            // History errors
            Error::ExchangeNotFound { id } => {
                write!(f, "Exchange '{}' not found", id)
            }
            Error::ExchangeAlreadyCompleted { id } => {
                write!(f, "Exchange '{}' has already completed", id)
            }

            // Filesystem errors
            Error::DirectoryListFailed { path, reason } => {
                write!(f, "Failed to list directory '{}': {}", path.display(), reason)
            }

            // Configuration errors
            Error::ConfigLoadFailed { path, reason } => {
                write!(f, "Failed to load config from '{}': {}", path.display(), reason)
            }
            Error::ConfigSaveFailed { path, reason } => {
                write!(f, "Failed to save config to '{}': {}", path.display(), reason)
            }
            Error::ConfigValidationFailed { field, reason } => {
                write!(f, "Configuration validation failed for '{}': {}", field, reason)
            }
            Error::ConfigSerializationFailed { format, reason } => {
                write!(f, "Failed to serialize config as {}: {}", format, reason)
            }
            Error::ConfigParseFailed { format, reason } => {
                write!(f, "Failed to parse {} config: {}", format, reason)
            }

            // I/O and serialization errors
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::Serde(err) => write!(f, "Serialization error: {}", err),

            // Generic fallback
            Error::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Serde(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serde(err)
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}
