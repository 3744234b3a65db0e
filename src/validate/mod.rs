//! Ecosystem file validation
//!
//! Checks the parsed file for missing required fields, incoherent
//! declarations and likely typos, producing a severity-tagged report.

pub mod types;
pub mod validator;

pub use types::{Issue, Report, Severity};
pub use validator::{Validator, ValidatorConfig};
