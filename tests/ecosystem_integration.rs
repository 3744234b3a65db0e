//! Integration tests for ecofile
//!
//! Drives the full flow against a realistic ecosystem file for a clustered
//! Node web server: parse, validate, resolve and expand into a launch plan.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use ecofile::policy::BACKOFF_CAP_MS;
use ecofile::{
    load_path, parse_str, EcofileError, FileFormat, LaunchPlan, RestartPolicy, RestartVerdict,
    Validator, ValidatorConfig,
};

const WEB_SERVER: &str = r#"{
    "apps": [{
        "name": "web-server",
        "script": "./bin/www",
        "instances": 4,
        "exec_mode": "cluster",
        "watch": false,
        "max_memory_restart": "300M",
        "min_uptime": "5s",
        "max_restarts": 10,
        "exp_backoff_restart_delay": 100,
        "error_file": "./logs/err.log",
        "out_file": "./logs/out.log",
        "env": {"NODE_ENV": "development", "PORT": 3000},
        "env_production": {"NODE_ENV": "production", "PORT": 8080}
    }],
    "deploy": {
        "production": {
            "user": "deploy",
            "host": ["203.0.113.10", "203.0.113.11"],
            "ref": "origin/main",
            "repo": "git@example.com:acme/web-server.git",
            "path": "/var/www/web-server",
            "post-deploy": "npm install && npm run reload"
        }
    }
}"#;

#[test]
fn test_full_file_parses_and_validates_clean() {
    let eco = parse_str(WEB_SERVER, FileFormat::Json).unwrap();
    assert_eq!(eco.apps.len(), 1);
    assert_eq!(eco.deploy.len(), 1);

    let report = Validator::new().validate(&eco);
    assert!(report.is_ok(), "unexpected issues: {:?}", report.issues);
    assert_eq!(report.warning_count(), 0);
}

#[test]
fn test_validation_with_intended_profile() {
    let eco = parse_str(WEB_SERVER, FileFormat::Json).unwrap();
    let validator = Validator::with_config(ValidatorConfig {
        strict: true,
        profile: Some("production".to_string()),
    });
    assert!(validator.validate(&eco).is_ok());
}

#[test]
fn test_plan_expands_cluster_topology() {
    let eco = parse_str(WEB_SERVER, FileFormat::Json).unwrap();
    let plan = LaunchPlan::build(&eco, None).unwrap();

    assert_eq!(plan.instances.len(), 4);
    for (i, spec) in plan.instances.iter().enumerate() {
        assert_eq!(spec.app, "web-server");
        assert_eq!(spec.instance_id, i);
        assert_eq!(spec.argv, vec!["./bin/www".to_string()]);
        assert_eq!(spec.env["NODE_ENV"], "development");
        assert_eq!(spec.env["PORT"], "3000");
        assert_eq!(spec.env["NODE_APP_INSTANCE"], i.to_string());
        assert_eq!(spec.env["name"], "web-server");
        // Instances get their own log files
        assert_eq!(
            spec.out_file.as_ref().unwrap(),
            &PathBuf::from(format!("./logs/out-{}.log", i))
        );
    }
}

#[test]
fn test_plan_with_production_profile() {
    let eco = parse_str(WEB_SERVER, FileFormat::Json).unwrap();
    let plan = LaunchPlan::build(&eco, Some("production")).unwrap();
    assert!(plan
        .instances
        .iter()
        .all(|s| s.env["NODE_ENV"] == "production" && s.env["PORT"] == "8080"));
}

#[test]
fn test_plan_rejects_unknown_profile() {
    let eco = parse_str(WEB_SERVER, FileFormat::Json).unwrap();
    let err = LaunchPlan::build(&eco, Some("staging")).unwrap_err();
    assert!(matches!(err, EcofileError::UnknownProfile { .. }));
}

#[test]
fn test_restart_policy_from_file() {
    let eco = parse_str(WEB_SERVER, FileFormat::Json).unwrap();
    let policy = RestartPolicy::from_app(&eco.apps[0]).unwrap();

    assert_eq!(policy.min_uptime_ms, 5_000);
    assert_eq!(policy.max_restarts, Some(10));

    // Crash loop: backoff doubles from 100ms and caps
    assert_eq!(
        policy.delay_before_restart(0),
        Duration::from_millis(100)
    );
    assert_eq!(
        policy.delay_before_restart(4),
        Duration::from_millis(1_600)
    );
    assert_eq!(
        policy.delay_before_restart(30),
        Duration::from_millis(BACKOFF_CAP_MS)
    );

    // Budget exhausted after ten consecutive unstable runs
    assert_eq!(
        policy.verdict(10, Duration::from_millis(50)),
        RestartVerdict::LimitReached { max_restarts: 10 }
    );
    // A long stable run resets the count
    assert!(matches!(
        policy.verdict(10, Duration::from_secs(3600)),
        RestartVerdict::Restart { .. }
    ));
}

#[test]
fn test_deploy_target_round_trip() {
    let eco = parse_str(WEB_SERVER, FileFormat::Json).unwrap();
    let target = &eco.deploy["production"];
    assert_eq!(target.user.as_deref(), Some("deploy"));
    assert_eq!(
        target.host.as_ref().unwrap().hosts(),
        vec!["203.0.113.10", "203.0.113.11"]
    );
    assert_eq!(target.hooks().len(), 1);
    assert_eq!(target.hooks()[0].0, "post-deploy");
}

#[test]
fn test_toml_file_from_disk() {
    let toml = r#"
        [[apps]]
        name = "worker"
        script = "worker.js"
        instances = 2
        exec_mode = "cluster"
        max_memory_restart = "256M"

        [apps.env]
        QUEUE = "jobs"
    "#;
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .unwrap();
    file.write_all(toml.as_bytes()).unwrap();

    let eco = load_path(file.path()).unwrap();
    let report = Validator::new().validate(&eco);
    assert!(report.is_ok(), "unexpected issues: {:?}", report.issues);

    let plan = LaunchPlan::build(&eco, None).unwrap();
    assert_eq!(plan.instances.len(), 2);
    assert_eq!(plan.instances[0].argv, vec!["node", "worker.js"]);
    assert_eq!(plan.instances[0].env["QUEUE"], "jobs");
}

#[test]
fn test_typo_in_field_name_is_caught() {
    // "exec_modes" is not a schema field; lenient mode warns, strict errors
    let contents = r#"{"apps": [{"name": "web", "script": "s.js", "exec_modes": "cluster"}]}"#;
    let eco = parse_str(contents, FileFormat::Json).unwrap();

    let lenient = Validator::new().validate(&eco);
    assert!(lenient.is_ok());
    assert_eq!(lenient.warning_count(), 1);

    let strict = Validator::with_config(ValidatorConfig {
        strict: true,
        profile: None,
    })
    .validate(&eco);
    assert!(!strict.is_ok());
}

#[test]
fn test_broken_file_reports_all_errors() {
    let contents = r#"{
        "apps": [
            {"name": "", "script": "", "instances": "plenty"},
            {"name": "web", "script": "s.js", "max_memory_restart": "10Q"}
        ],
        "deploy": {"production": {"host": ""}}
    }"#;
    let eco = parse_str(contents, FileFormat::Json).unwrap();
    let report = Validator::new().validate(&eco);

    // Independent checks keep reporting past the first broken app
    assert!(report.error_count() >= 5);
    assert!(report
        .issues
        .iter()
        .any(|i| i.location == "deploy.production.host"));
}
