//! Error types for ecofile
//!
//! Provides typed errors with context propagation for every failure an
//! ecosystem file can produce: I/O, syntax, and semantic resolution.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for ecosystem file operations
#[derive(Error, Debug)]
pub enum EcofileError {
    /// File system errors, tagged with the offending path
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON syntax errors
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// TOML syntax errors
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// File extension does not map to a supported format
    #[error("cannot determine format of {} (expected .json or .toml)", path.display())]
    UnknownFormat { path: PathBuf },

    /// A requested environment profile is not declared by the app
    #[error("app '{app}' declares no env_{profile} section")]
    UnknownProfile { app: String, profile: String },

    /// A requested app name does not exist in the file
    #[error("no app named '{0}' in ecosystem file")]
    UnknownApp(String),

    /// A field value that parses as data but cannot be interpreted
    #[error("invalid {kind} value '{value}': {reason}")]
    InvalidValue {
        kind: &'static str,
        value: String,
        reason: String,
    },
}

/// Result type alias for ecosystem file operations
pub type Result<T> = std::result::Result<T, EcofileError>;
