//! Validation pipeline implementation
//!
//! Runs every check against a parsed file and collects findings. Checks are
//! deliberately independent so one broken app does not mask another.

use std::collections::BTreeMap;

use crate::schema::{AppConfig, DeployTarget, EcosystemFile, ExecMode, Instances};
use crate::validate::types::{Issue, Report};

/// Validator configuration
#[derive(Debug, Clone, Default)]
pub struct ValidatorConfig {
    /// Treat unknown app keys as errors instead of warnings
    pub strict: bool,

    /// Profile the caller intends to launch with; flagged when undeclared
    pub profile: Option<String>,
}

/// Ecosystem file validator
pub struct Validator {
    config: ValidatorConfig,
}

impl Validator {
    /// Create a validator with default configuration
    pub fn new() -> Self {
        Self::with_config(ValidatorConfig::default())
    }

    /// Create a validator with custom configuration
    pub fn with_config(config: ValidatorConfig) -> Self {
        Self { config }
    }

    /// Run all checks against a parsed file
    pub fn validate(&self, file: &EcosystemFile) -> Report {
        let mut report = Report::new();

        if file.apps.is_empty() {
            report.push(Issue::error("apps", "at least one app is required"));
        }

        self.check_unique_names(file, &mut report);

        for (idx, app) in file.apps.iter().enumerate() {
            let loc = format!("apps[{}]", idx);
            self.check_required_fields(app, &loc, &mut report);
            self.check_topology(app, &loc, &mut report);
            self.check_limits(app, &loc, &mut report);
            self.check_restart_policy(app, &loc, &mut report);
            self.check_env(app, &loc, &mut report);
            self.check_unknown_keys(app, &loc, &mut report);
        }

        self.check_log_collisions(file, &mut report);

        for (name, target) in &file.deploy {
            self.check_deploy_target(name, target, &mut report);
        }

        report
    }

    fn check_unique_names(&self, file: &EcosystemFile, report: &mut Report) {
        let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
        for (idx, app) in file.apps.iter().enumerate() {
            if let Some(first) = seen.insert(app.name.as_str(), idx) {
                report.push(Issue::error(
                    format!("apps[{}].name", idx),
                    format!("duplicate app name '{}' (first used by apps[{}])", app.name, first),
                ));
            }
        }
    }

    fn check_required_fields(&self, app: &AppConfig, loc: &str, report: &mut Report) {
        if app.name.trim().is_empty() {
            report.push(Issue::error(format!("{}.name", loc), "name is required"));
        }
        if app.script.trim().is_empty() {
            report.push(Issue::error(format!("{}.script", loc), "script is required"));
        }
    }

    fn check_topology(&self, app: &AppConfig, loc: &str, report: &mut Report) {
        match &app.instances {
            Instances::Keyword(word) if word != "max" => {
                report.push(Issue::error(
                    format!("{}.instances", loc),
                    format!("'{}' is not a valid count (use a number or \"max\")", word),
                ));
            }
            Instances::Count(n) if *n > 1 && app.exec_mode == ExecMode::Fork => {
                report.push(Issue::warning(
                    format!("{}.exec_mode", loc),
                    format!(
                        "{} instances in fork mode run without a shared socket; \
                         cluster mode is the usual intent",
                        n
                    ),
                ));
            }
            Instances::Count(1) if app.exec_mode == ExecMode::Cluster => {
                report.push(Issue::warning(
                    format!("{}.exec_mode", loc),
                    "cluster mode with a single instance has no effect",
                ));
            }
            _ => {}
        }
    }

    fn check_limits(&self, app: &AppConfig, loc: &str, report: &mut Report) {
        if let Some(limit) = &app.max_memory_restart {
            if let Err(e) = limit.as_bytes() {
                report.push(Issue::error(format!("{}.max_memory_restart", loc), e.to_string()));
            }
        }
        if let Some(uptime) = &app.min_uptime {
            if let Err(e) = uptime.as_millis() {
                report.push(Issue::error(format!("{}.min_uptime", loc), e.to_string()));
            }
        }
    }

    fn check_restart_policy(&self, app: &AppConfig, loc: &str, report: &mut Report) {
        if app.restart_delay.is_some() && app.exp_backoff_restart_delay.is_some() {
            report.push(Issue::warning(
                loc,
                "restart_delay is ignored when exp_backoff_restart_delay is set",
            ));
        }
        if app.max_restarts == Some(0) && app.autorestart {
            report.push(Issue::warning(
                format!("{}.max_restarts", loc),
                "max_restarts of 0 disables autorestart after the first crash",
            ));
        }
        if app.exp_backoff_restart_delay == Some(0) {
            report.push(Issue::error(
                format!("{}.exp_backoff_restart_delay", loc),
                "backoff base must be greater than 0",
            ));
        }
    }

    fn check_env(&self, app: &AppConfig, loc: &str, report: &mut Report) {
        check_env_keys(app.env.keys().map(String::as_str), &format!("{}.env", loc), report);

        for profile in app.profile_names() {
            let ploc = format!("{}.env_{}", loc, profile);
            match app.profile(profile) {
                Some(Ok(overlay)) => {
                    check_env_keys(overlay.keys().map(String::as_str), &ploc, report);
                }
                Some(Err(e)) => report.push(Issue::error(ploc, e.to_string())),
                None => unreachable!("profile_names only returns declared profiles"),
            }
        }

        if let Some(wanted) = &self.config.profile {
            if !app.profile_names().contains(&wanted.as_str()) {
                report.push(Issue::warning(
                    loc,
                    format!("no env_{} section; base env will be used unchanged", wanted),
                ));
            }
        }
    }

    fn check_unknown_keys(&self, app: &AppConfig, loc: &str, report: &mut Report) {
        for key in app.unknown_keys() {
            let issue = format!("unknown field '{}'", key);
            if self.config.strict {
                report.push(Issue::error(format!("{}.{}", loc, key), issue));
            } else {
                report.push(Issue::warning(format!("{}.{}", loc, key), issue));
            }
        }
    }

    fn check_log_collisions(&self, file: &EcosystemFile, report: &mut Report) {
        let mut owners: BTreeMap<&str, &str> = BTreeMap::new();
        for app in &file.apps {
            for path in [app.out_file.as_deref(), app.error_file.as_deref()]
                .into_iter()
                .flatten()
            {
                if let Some(other) = owners.insert(path, app.name.as_str()) {
                    if other != app.name {
                        report.push(Issue::warning(
                            format!("apps.{}", app.name),
                            format!("log file '{}' is also written by app '{}'", path, other),
                        ));
                    }
                }
            }
        }
    }

    fn check_deploy_target(&self, name: &str, target: &DeployTarget, report: &mut Report) {
        let loc = format!("deploy.{}", name);

        match &target.host {
            None => report.push(Issue::error(format!("{}.host", loc), "host is required")),
            Some(hosts) if hosts.hosts().iter().all(|h| h.trim().is_empty()) => {
                report.push(Issue::error(format!("{}.host", loc), "host list is empty"));
            }
            Some(_) => {}
        }

        for (field, value) in [
            ("repo", &target.repo),
            ("path", &target.path),
            ("ref", &target.git_ref),
        ] {
            if value.as_deref().map_or(true, |v| v.trim().is_empty()) {
                report.push(Issue::error(
                    format!("{}.{}", loc, field),
                    format!("{} is required for deployment", field),
                ));
            }
        }

        if target.user.is_none() {
            report.push(Issue::warning(
                format!("{}.user", loc),
                "no user set; the deploy tool will use the local username",
            ));
        }

        for (hook, command) in target.hooks() {
            if command.trim().is_empty() {
                report.push(Issue::warning(
                    format!("{}.{}", loc, hook),
                    "hook command is blank",
                ));
            }
        }

        check_env_keys(
            target.env.keys().map(String::as_str),
            &format!("{}.env", loc),
            report,
        );
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

/// Environment keys must be usable in a child process environment
fn check_env_keys<'a>(keys: impl Iterator<Item = &'a str>, loc: &str, report: &mut Report) {
    for key in keys {
        if key.is_empty() {
            report.push(Issue::error(loc, "empty environment variable name"));
        } else if key.contains('=') {
            report.push(Issue::error(
                loc,
                format!("environment variable name '{}' contains '='", key),
            ));
        }
    }
}
