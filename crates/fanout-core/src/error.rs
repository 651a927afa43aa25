//! Error types for fanout-core

use std::path::PathBuf;

/// Result type for fanout-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in fanout-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Share target is absent from the shared tree
    #[error("{path} does not exist in the shared directory")]
    NotFound { path: String },

    /// No client directory exists for the named client
    #[error("'{client}' client does not exist")]
    UnknownClient { client: String },

    /// Target is already covered by an existing subscription
    #[error("{path} is already shared with {client}{}", via_module(.covered_by))]
    AlreadyShared {
        path: String,
        client: String,
        covered_by: Option<String>,
    },

    /// Target names one of the synchronizer's own artifacts
    #[error("{path} is reserved by fanout and cannot be shared")]
    ReservedPath { path: String },

    /// The persisted subscription log could not be parsed
    #[error("Subscription log at {path} is malformed: {message}")]
    LogCorrupt { path: PathBuf, message: String },

    /// The workspace config file could not be parsed
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// The workspace config parsed but holds unusable values
    #[error("Invalid config: {message}")]
    InvalidConfig { message: String },

    /// Filesystem error from fanout-fs
    #[error(transparent)]
    Fs(#[from] fanout_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Errors caused by the request itself rather than by the environment.
    ///
    /// These are reported to the caller as-is and never retried.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. }
                | Self::UnknownClient { .. }
                | Self::AlreadyShared { .. }
                | Self::ReservedPath { .. }
                | Self::Fs(fanout_fs::Error::InvalidPath { .. })
        )
    }
}

fn via_module(covered_by: &Option<String>) -> String {
    match covered_by {
        Some(module) => format!(" via module {module}"),
        None => String::new(),
    }
}
