//! Deployment target schema
//!
//! A deploy target tells the external tool where to push the code: remote
//! user and hosts, git source, remote path and lifecycle hook commands.
//! Nothing in this crate executes them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::app::EnvMap;

/// One named deployment target (e.g. `deploy.production`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployTarget {
    /// SSH user on the target hosts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// Target host or hosts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<HostList>,

    /// Git ref to deploy, e.g. "origin/main"
    #[serde(default, rename = "ref", skip_serializing_if = "Option::is_none")]
    pub git_ref: Option<String>,

    /// Git repository URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,

    /// Destination path on the target hosts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Command run on the target before the first clone
    #[serde(default, rename = "pre-setup", skip_serializing_if = "Option::is_none")]
    pub pre_setup: Option<String>,

    /// Command run on the target after the first clone
    #[serde(default, rename = "post-setup", skip_serializing_if = "Option::is_none")]
    pub post_setup: Option<String>,

    /// Command run locally before pushing
    #[serde(
        default,
        rename = "pre-deploy-local",
        skip_serializing_if = "Option::is_none"
    )]
    pub pre_deploy_local: Option<String>,

    /// Command run on the target after each deploy
    #[serde(default, rename = "post-deploy", skip_serializing_if = "Option::is_none")]
    pub post_deploy: Option<String>,

    /// Environment overlay the tool exports while running hooks
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: EnvMap,
}

impl DeployTarget {
    /// Declared lifecycle hooks as (name, command) pairs
    pub fn hooks(&self) -> Vec<(&'static str, &str)> {
        [
            ("pre-setup", &self.pre_setup),
            ("post-setup", &self.post_setup),
            ("pre-deploy-local", &self.pre_deploy_local),
            ("post-deploy", &self.post_deploy),
        ]
        .into_iter()
        .filter_map(|(name, cmd)| cmd.as_deref().map(|c| (name, c)))
        .collect()
    }
}

/// Host declaration: single name or list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HostList {
    One(String),
    Many(Vec<String>),
}

impl HostList {
    /// Flattened host names
    pub fn hosts(&self) -> Vec<&str> {
        match self {
            HostList::One(h) => vec![h.as_str()],
            HostList::Many(hs) => hs.iter().map(String::as_str).collect(),
        }
    }
}
