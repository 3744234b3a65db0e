//! Typed model of the ecosystem file
//!
//! An ecosystem file declares a set of applications for an external process
//! supervisor plus optional deployment targets. The model is loaded once and
//! never mutated afterwards.

pub mod app;
pub mod deploy;

pub use app::{
    AppConfig, CommandArgs, EnvMap, EnvValue, ExecMode, Instances, MemoryLimit, UptimeField,
};
pub use deploy::{DeployTarget, HostList};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root of an ecosystem file: applications plus named deploy targets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EcosystemFile {
    /// Application descriptors, in declaration order
    pub apps: Vec<AppConfig>,

    /// Deployment targets keyed by environment name (e.g. "production")
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub deploy: BTreeMap<String, DeployTarget>,
}

impl EcosystemFile {
    /// Look up an app by name
    pub fn app(&self, name: &str) -> Option<&AppConfig> {
        self.apps.iter().find(|a| a.name == name)
    }
}
