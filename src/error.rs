//! Error types for the filesystem adapter
//!
//! Hard failures are reported through [`AdapterError`]. Expected, recoverable
//! conditions (a missing file, a rejected chmod) never become errors: the
//! adapter turns them into `false` / `None` at the operation boundary.

use crate::node::NodeKind;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, AdapterError>;

/// Errors produced by the adapter and its driver
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The root directory is missing, could not be created, or is unreadable.
    ///
    /// Terminal: once the ready gate fails, every later call reports the
    /// same reason.
    #[error("Initialization failed: {0}")]
    Initialization(String),

    /// A symbolic link was met while the link policy disallows links
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// A stream operation was handed a source that cannot be read
    #[error("Source stream is not readable: {0}")]
    NotReadable(String),

    /// No permission bits are configured for this visibility label
    #[error("Unknown visibility '{label}' for {kind}")]
    UnknownVisibility {
        /// Node kind the lookup was made for
        kind: NodeKind,
        /// Label that has no mapping
        label: String,
    },

    /// Driver-level failure with path context
    #[error("Filesystem error: {0}")]
    FileSystem(String),

    /// Raw I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AdapterError {
    /// Check whether this error came from the ready gate
    #[must_use]
    pub const fn is_initialization(&self) -> bool {
        matches!(self, Self::Initialization(_))
    }

    /// Check whether this error reports a disallowed link
    #[must_use]
    pub const fn is_not_supported(&self) -> bool {
        matches!(self, Self::NotSupported(_))
    }
}
