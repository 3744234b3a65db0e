//! ecofile - ecosystem file toolkit
//!
//! Parses, validates and inspects the configuration files a Node-style
//! process supervisor consumes: application descriptors (launch command,
//! instance topology, restart/backoff policy, log paths, per-environment
//! variables) and per-target deployment descriptors.
//!
//! # Architecture
//!
//! - `schema` + `loader`: the typed model and its JSON/TOML input formats
//! - `validate`: severity-tagged findings over a parsed file
//! - `resolve` + `policy` + `plan`: pure interpretation of what the file
//!   asks an external supervisor to do, without doing any of it

pub mod errors;
pub mod loader;
pub mod plan;
pub mod policy;
pub mod resolve;
pub mod schema;
pub mod validate;

pub mod cli;

// Re-export commonly used types
pub use errors::{EcofileError, Result};
pub use loader::{load_path, parse_str, FileFormat};
pub use plan::LaunchPlan;
pub use policy::{RestartPolicy, RestartVerdict};
pub use schema::{AppConfig, DeployTarget, EcosystemFile};
pub use validate::{Report, Validator, ValidatorConfig};
