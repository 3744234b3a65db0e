//! Dry-run expansion of an ecosystem file
//!
//! Expands the declared topology into the flat list of instances an
//! external supervisor would realize. The plan is inert data: argv, cwd,
//! environment and log destinations per instance. Nothing is spawned.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::errors::Result;
use crate::resolve::{expand_path, instance_count, resolved_env};
use crate::schema::{AppConfig, EcosystemFile, ExecMode};

/// Instance index variable the Node ecosystem conventionally reads
pub const INSTANCE_VAR: &str = "NODE_APP_INSTANCE";

/// App name variable a Node supervisor conventionally exports
pub const NAME_VAR: &str = "name";

/// The full launch plan for one ecosystem file
#[derive(Debug, Clone, Serialize)]
pub struct LaunchPlan {
    pub instances: Vec<InstanceSpec>,
}

/// One process the supervisor would launch
#[derive(Debug, Clone, Serialize)]
pub struct InstanceSpec {
    /// Owning app name
    pub app: String,
    /// Zero-based index within the app
    pub instance_id: usize,
    pub exec_mode: ExecMode,
    /// Full command line: interpreter, script, then arguments
    pub argv: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_file: Option<PathBuf>,
}

impl LaunchPlan {
    /// Expand every app in the file, overlaying the given env profile
    pub fn build(file: &EcosystemFile, profile: Option<&str>) -> Result<Self> {
        let mut instances = Vec::new();
        for app in &file.apps {
            expand_app(app, profile, &mut instances)?;
        }
        Ok(Self { instances })
    }

    /// Instances belonging to one app
    pub fn for_app(&self, name: &str) -> Vec<&InstanceSpec> {
        self.instances.iter().filter(|i| i.app == name).collect()
    }
}

fn expand_app(
    app: &AppConfig,
    profile: Option<&str>,
    out: &mut Vec<InstanceSpec>,
) -> Result<()> {
    let count = instance_count(&app.instances)?;
    let base_env = resolved_env(app, profile)?;
    let argv = build_argv(app);
    let cwd = app.cwd.as_deref().map(expand_path);
    // Per-instance log files unless the app merges them
    let split_logs = count > 1 && !app.merge_logs;

    for id in 0..count {
        let mut env = base_env.clone();
        env.insert(INSTANCE_VAR.to_string(), id.to_string());
        env.insert(NAME_VAR.to_string(), app.name.clone());

        out.push(InstanceSpec {
            app: app.name.clone(),
            instance_id: id,
            exec_mode: app.exec_mode,
            argv: argv.clone(),
            cwd: cwd.clone(),
            env,
            out_file: log_path(app.out_file.as_deref(), id, split_logs),
            error_file: log_path(app.error_file.as_deref(), id, split_logs),
        });
    }
    Ok(())
}

/// Command line as the supervisor would assemble it. A missing interpreter
/// falls back to `node` for Node script extensions, otherwise the script is
/// executed directly.
fn build_argv(app: &AppConfig) -> Vec<String> {
    let mut argv = Vec::new();
    match &app.interpreter {
        Some(interp) if interp != "none" => argv.push(interp.clone()),
        Some(_) => {}
        None => {
            if matches!(
                app.script.rsplit('.').next(),
                Some("js") | Some("mjs") | Some("cjs")
            ) {
                argv.push("node".to_string());
            }
        }
    }
    argv.push(app.script.clone());
    if let Some(args) = &app.args {
        argv.extend(args.to_vec());
    }
    argv
}

/// Suffix a log path with the instance id when logs are split
fn log_path(declared: Option<&str>, id: usize, split: bool) -> Option<PathBuf> {
    let declared = declared?;
    let expanded = expand_path(declared);
    if !split {
        return Some(expanded);
    }
    let path = match (expanded.file_stem(), expanded.extension()) {
        (Some(stem), Some(ext)) => expanded.with_file_name(format!(
            "{}-{}.{}",
            stem.to_string_lossy(),
            id,
            ext.to_string_lossy()
        )),
        _ => PathBuf::from(format!("{}-{}", expanded.display(), id)),
    };
    Some(path)
}
