//! Application descriptor schema
//!
//! Field names mirror the configuration file consumed by the external
//! supervisor: launch command, instance topology, restart/backoff policy,
//! log paths and per-environment variable overlays.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::{EcofileError, Result};

/// Environment variable map as written in the file
pub type EnvMap = BTreeMap<String, EnvValue>;

/// Prefix that marks a per-environment overlay key (`env_production`, ...)
pub const ENV_PROFILE_PREFIX: &str = "env_";

/// One application entry in the ecosystem file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Process name, unique within the file
    pub name: String,

    /// Script or binary the supervisor launches
    pub script: String,

    /// Arguments passed to the script (single string or list)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<CommandArgs>,

    /// Interpreter override; inferred from the script extension when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<String>,

    /// Working directory for the launched process
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,

    /// Instance count: a number, or "max" for one per CPU
    #[serde(default)]
    pub instances: Instances,

    /// Execution mode requested from the supervisor
    #[serde(default)]
    pub exec_mode: ExecMode,

    /// Whether the supervisor should watch files and reload on change
    #[serde(default)]
    pub watch: bool,

    /// Memory ceiling above which the supervisor restarts the process
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_memory_restart: Option<MemoryLimit>,

    /// Restart the process when it exits
    #[serde(default = "default_true")]
    pub autorestart: bool,

    /// Give up after this many consecutive unstable restarts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_restarts: Option<u32>,

    /// Minimum uptime for a run to count as stable (ms or "5s" style)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_uptime: Option<UptimeField>,

    /// Fixed delay in milliseconds before each restart
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restart_delay: Option<u64>,

    /// Starting delay in milliseconds for exponential restart backoff
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp_backoff_restart_delay: Option<u64>,

    /// File receiving the process stderr
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_file: Option<String>,

    /// File receiving the process stdout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_file: Option<String>,

    /// Timestamp format the supervisor prefixes log lines with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_date_format: Option<String>,

    /// Share one log file across instances instead of per-instance files
    #[serde(default)]
    pub merge_logs: bool,

    /// Base environment applied to every launch
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: EnvMap,

    /// Everything else, including `env_<profile>` overlays. Kept rather than
    /// dropped so validation can flag misspelled fields.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

fn default_true() -> bool {
    true
}

impl AppConfig {
    /// Names of the environment profiles declared via `env_<name>` keys
    pub fn profile_names(&self) -> Vec<&str> {
        self.extra
            .keys()
            .filter_map(|k| k.strip_prefix(ENV_PROFILE_PREFIX))
            .filter(|rest| !rest.is_empty())
            .collect()
    }

    /// Parse the overlay map for one profile, if declared
    pub fn profile(&self, name: &str) -> Option<Result<EnvMap>> {
        let key = format!("{}{}", ENV_PROFILE_PREFIX, name);
        let value = self.extra.get(&key)?;
        Some(
            serde_json::from_value::<EnvMap>(value.clone()).map_err(|e| {
                EcofileError::InvalidValue {
                    kind: "environment overlay",
                    value: key,
                    reason: e.to_string(),
                }
            }),
        )
    }

    /// Keys in the file that are neither schema fields nor `env_` overlays
    pub fn unknown_keys(&self) -> Vec<&str> {
        self.extra
            .keys()
            .filter(|k| {
                k.strip_prefix(ENV_PROFILE_PREFIX)
                    .map_or(true, |rest| rest.is_empty())
            })
            .map(String::as_str)
            .collect()
    }
}

/// Instance count declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Instances {
    /// Literal count; 0 and negatives are CPU-relative
    Count(i64),
    /// Keyword form, only "max" is meaningful
    Keyword(String),
}

impl Default for Instances {
    fn default() -> Self {
        Instances::Count(1)
    }
}

/// Execution mode the supervisor is asked to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecMode {
    /// One independent OS process per instance
    Fork,
    /// Instances share a listening socket
    #[serde(alias = "cluster_mode")]
    Cluster,
}

impl Default for ExecMode {
    fn default() -> Self {
        ExecMode::Fork
    }
}

impl ExecMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecMode::Fork => "fork",
            ExecMode::Cluster => "cluster",
        }
    }
}

/// Script arguments: single space-separated string or explicit list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandArgs {
    Line(String),
    List(Vec<String>),
}

impl CommandArgs {
    /// Argument vector as the supervisor would pass it
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            CommandArgs::Line(s) => s.split_whitespace().map(str::to_string).collect(),
            CommandArgs::List(v) => v.clone(),
        }
    }
}

/// Memory ceiling: raw byte count or human form like "300M"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MemoryLimit {
    Bytes(u64),
    Human(String),
}

impl MemoryLimit {
    /// Resolve to bytes. Accepts K/M/G suffixes, case-insensitive.
    pub fn as_bytes(&self) -> Result<u64> {
        match self {
            MemoryLimit::Bytes(n) => Ok(*n),
            MemoryLimit::Human(s) => parse_memory(s).ok_or_else(|| EcofileError::InvalidValue {
                kind: "memory limit",
                value: s.clone(),
                reason: "expected a number with optional K, M or G suffix".to_string(),
            }),
        }
    }
}

fn parse_memory(s: &str) -> Option<u64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let (digits, unit) = match s.find(|c: char| !c.is_ascii_digit()) {
        Some(pos) if pos > 0 => (&s[..pos], s[pos..].trim()),
        None => (s, ""),
        Some(_) => return None,
    };
    let n: u64 = digits.parse().ok()?;
    let factor = match unit.to_ascii_uppercase().as_str() {
        "" | "B" => 1,
        "K" | "KB" => 1024,
        "M" | "MB" => 1024 * 1024,
        "G" | "GB" => 1024 * 1024 * 1024,
        _ => return None,
    };
    n.checked_mul(factor)
}

/// Minimum-uptime declaration: milliseconds or "5s" style
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UptimeField {
    Millis(u64),
    Human(String),
}

impl UptimeField {
    /// Resolve to milliseconds. Accepts ms/s/m/h suffixes.
    pub fn as_millis(&self) -> Result<u64> {
        match self {
            UptimeField::Millis(n) => Ok(*n),
            UptimeField::Human(s) => parse_uptime(s).ok_or_else(|| EcofileError::InvalidValue {
                kind: "uptime",
                value: s.clone(),
                reason: "expected milliseconds or a number with ms, s, m or h suffix".to_string(),
            }),
        }
    }
}

fn parse_uptime(s: &str) -> Option<u64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let (digits, unit) = match s.find(|c: char| !c.is_ascii_digit()) {
        Some(pos) if pos > 0 => (&s[..pos], s[pos..].trim()),
        None => (s, ""),
        Some(_) => return None,
    };
    let n: u64 = digits.parse().ok()?;
    let factor = match unit {
        "" | "ms" => 1,
        "s" => 1_000,
        "m" => 60_000,
        "h" => 3_600_000,
        _ => return None,
    };
    n.checked_mul(factor)
}

/// Environment variable value as written in the file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnvValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl EnvValue {
    /// String form a child process environment would receive
    pub fn render(&self) -> String {
        match self {
            EnvValue::Str(s) => s.clone(),
            EnvValue::Int(n) => n.to_string(),
            EnvValue::Float(f) => f.to_string(),
            EnvValue::Bool(b) => b.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal(extra_json: &str) -> AppConfig {
        let json = format!(r#"{{"name": "web", "script": "server.js"{}}}"#, extra_json);
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_minimal_app_defaults() {
        let app = minimal("");
        assert_eq!(app.instances, Instances::Count(1));
        assert_eq!(app.exec_mode, ExecMode::Fork);
        assert!(app.autorestart);
        assert!(!app.watch);
        assert!(!app.merge_logs);
        assert!(app.env.is_empty());
    }

    #[test]
    fn test_instances_max_keyword() {
        let app = minimal(r#", "instances": "max""#);
        assert_eq!(app.instances, Instances::Keyword("max".to_string()));
    }

    #[test]
    fn test_exec_mode_cluster_alias() {
        let app = minimal(r#", "exec_mode": "cluster_mode""#);
        assert_eq!(app.exec_mode, ExecMode::Cluster);
    }

    #[test]
    fn test_profile_names_and_unknown_keys() {
        let app = minimal(
            r#", "env_production": {"NODE_ENV": "production"}, "max_memory": "300M""#,
        );
        assert_eq!(app.profile_names(), vec!["production"]);
        assert_eq!(app.unknown_keys(), vec!["max_memory"]);
    }

    #[test]
    fn test_profile_parses_overlay() {
        let app = minimal(r#", "env_production": {"NODE_ENV": "production", "PORT": 80}"#);
        let overlay = app.profile("production").unwrap().unwrap();
        assert_eq!(overlay["NODE_ENV"], EnvValue::Str("production".to_string()));
        assert_eq!(overlay["PORT"], EnvValue::Int(80));
    }

    #[test]
    fn test_profile_rejects_non_table() {
        let app = minimal(r#", "env_production": "oops""#);
        assert!(app.profile("production").unwrap().is_err());
    }

    #[test]
    fn test_command_args_line_splits() {
        let args = CommandArgs::Line("--port 8080 --quiet".to_string());
        assert_eq!(args.to_vec(), vec!["--port", "8080", "--quiet"]);
    }

    #[test]
    fn test_memory_limit_parsing() {
        assert_eq!(
            MemoryLimit::Human("300M".to_string()).as_bytes().unwrap(),
            300 * 1024 * 1024
        );
        assert_eq!(
            MemoryLimit::Human("1G".to_string()).as_bytes().unwrap(),
            1024 * 1024 * 1024
        );
        assert_eq!(MemoryLimit::Bytes(4096).as_bytes().unwrap(), 4096);
        assert!(MemoryLimit::Human("300X".to_string()).as_bytes().is_err());
        assert!(MemoryLimit::Human("".to_string()).as_bytes().is_err());
    }

    #[test]
    fn test_uptime_parsing() {
        assert_eq!(UptimeField::Human("5s".to_string()).as_millis().unwrap(), 5_000);
        assert_eq!(UptimeField::Human("2m".to_string()).as_millis().unwrap(), 120_000);
        assert_eq!(UptimeField::Millis(1500).as_millis().unwrap(), 1500);
        assert!(UptimeField::Human("5 days".to_string()).as_millis().is_err());
    }

    #[test]
    fn test_env_value_render() {
        assert_eq!(EnvValue::Str("a".to_string()).render(), "a");
        assert_eq!(EnvValue::Int(8080).render(), "8080");
        assert_eq!(EnvValue::Bool(true).render(), "true");
    }
}
