//! Resolution of declared values into concrete ones
//!
//! Pure functions that turn what the file declares (profiles, "max"
//! instances, "~" paths) into the concrete values an external supervisor
//! would act on. Nothing here touches a process.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::errors::{EcofileError, Result};
use crate::schema::{AppConfig, Instances};

/// Resolve the environment one launch of `app` would receive.
///
/// The base `env` map is applied first, then the `env_<profile>` overlay
/// when a profile is requested. Requesting an undeclared profile is an
/// error rather than a silent no-op.
pub fn resolved_env(app: &AppConfig, profile: Option<&str>) -> Result<BTreeMap<String, String>> {
    let mut env: BTreeMap<String, String> = app
        .env
        .iter()
        .map(|(k, v)| (k.clone(), v.render()))
        .collect();

    if let Some(name) = profile {
        let overlay = app
            .profile(name)
            .ok_or_else(|| EcofileError::UnknownProfile {
                app: app.name.clone(),
                profile: name.to_string(),
            })??;
        for (k, v) in &overlay {
            env.insert(k.clone(), v.render());
        }
    }

    Ok(env)
}

/// Realize a declared instance count against the machine CPU count.
///
/// "max" and 0 mean one instance per CPU; a negative count means that many
/// fewer than the CPU count, floored at one.
pub fn instance_count(instances: &Instances) -> Result<usize> {
    instance_count_with_cpus(instances, num_cpus::get())
}

fn instance_count_with_cpus(instances: &Instances, cpus: usize) -> Result<usize> {
    match instances {
        Instances::Keyword(word) if word == "max" => Ok(cpus.max(1)),
        Instances::Keyword(word) => Err(EcofileError::InvalidValue {
            kind: "instance count",
            value: word.clone(),
            reason: "only \"max\" or a number is accepted".to_string(),
        }),
        Instances::Count(0) => Ok(cpus.max(1)),
        Instances::Count(n) if *n < 0 => Ok((cpus as i64 + n).max(1) as usize),
        Instances::Count(n) => Ok(*n as usize),
    }
}

/// Expand a leading tilde against the user's home directory
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::EnvValue;

    fn app(json: &str) -> AppConfig {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_resolved_env_base_only() {
        let app = app(r#"{"name": "web", "script": "s.js", "env": {"PORT": 3000}}"#);
        let env = resolved_env(&app, None).unwrap();
        assert_eq!(env["PORT"], "3000");
    }

    #[test]
    fn test_resolved_env_overlay_wins() {
        let app = app(
            r#"{"name": "web", "script": "s.js",
                "env": {"PORT": 3000, "DEBUG": "1"},
                "env_production": {"PORT": 80, "NODE_ENV": "production"}}"#,
        );
        let env = resolved_env(&app, Some("production")).unwrap();
        assert_eq!(env["PORT"], "80");
        assert_eq!(env["NODE_ENV"], "production");
        assert_eq!(env["DEBUG"], "1");
    }

    #[test]
    fn test_resolved_env_unknown_profile() {
        let app = app(r#"{"name": "web", "script": "s.js"}"#);
        let err = resolved_env(&app, Some("staging")).unwrap_err();
        assert!(matches!(err, EcofileError::UnknownProfile { .. }));
    }

    #[test]
    fn test_instance_count_literal() {
        assert_eq!(
            instance_count_with_cpus(&Instances::Count(4), 8).unwrap(),
            4
        );
    }

    #[test]
    fn test_instance_count_max_and_zero() {
        assert_eq!(
            instance_count_with_cpus(&Instances::Keyword("max".to_string()), 8).unwrap(),
            8
        );
        assert_eq!(instance_count_with_cpus(&Instances::Count(0), 8).unwrap(), 8);
    }

    #[test]
    fn test_instance_count_negative_is_cpu_relative() {
        assert_eq!(
            instance_count_with_cpus(&Instances::Count(-2), 8).unwrap(),
            6
        );
        // Floors at one even when the subtraction goes past zero
        assert_eq!(
            instance_count_with_cpus(&Instances::Count(-16), 8).unwrap(),
            1
        );
    }

    #[test]
    fn test_instance_count_bad_keyword() {
        let err =
            instance_count_with_cpus(&Instances::Keyword("all".to_string()), 8).unwrap_err();
        assert!(err.to_string().contains("all"));
    }

    #[test]
    fn test_expand_path_tilde() {
        let expanded = expand_path("~/logs/app.log");
        assert!(!expanded.to_string_lossy().starts_with('~'));
    }

    #[test]
    fn test_expand_path_absolute_untouched() {
        assert_eq!(
            expand_path("/var/log/app.log"),
            PathBuf::from("/var/log/app.log")
        );
    }

    #[test]
    fn test_env_value_types_render_in_map() {
        let app = app(
            r#"{"name": "web", "script": "s.js",
                "env": {"A": "x", "B": 1, "C": true}}"#,
        );
        assert_eq!(app.env["C"], EnvValue::Bool(true));
        let env = resolved_env(&app, None).unwrap();
        assert_eq!(env["B"], "1");
        assert_eq!(env["C"], "true");
    }
}
