//! Ecosystem file loading
//!
//! Reads a file once at startup and parses it into the typed model.
//! JSON is the native shape of the artifact; TOML is accepted for
//! hand-written configs.

use std::path::Path;

use crate::errors::{EcofileError, Result};
use crate::schema::EcosystemFile;

/// Supported on-disk formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Toml,
}

impl FileFormat {
    /// Determine format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(FileFormat::Json),
            Some("toml") => Ok(FileFormat::Toml),
            _ => Err(EcofileError::UnknownFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Load and parse an ecosystem file from disk
pub fn load_path(path: &Path) -> Result<EcosystemFile> {
    let format = FileFormat::from_path(path)?;
    let contents = std::fs::read_to_string(path).map_err(|source| EcofileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_str(&contents, format)
}

/// Parse ecosystem file contents in the given format
pub fn parse_str(contents: &str, format: FileFormat) -> Result<EcosystemFile> {
    match format {
        FileFormat::Json => Ok(serde_json::from_str(contents)?),
        FileFormat::Toml => Ok(toml::from_str(contents)?),
    }
}
