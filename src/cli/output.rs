//! Terminal rendering of reports, plans and targets

use colored::Colorize;
use std::collections::BTreeMap;

use crate::cli::args::Verbosity;
use crate::plan::LaunchPlan;
use crate::policy::RestartPolicy;
use crate::schema::{DeployTarget, EcosystemFile};
use crate::validate::{Report, Severity};

/// Print a validation report with a summary line
pub fn print_report(report: &Report, verbosity: Verbosity) {
    for issue in &report.issues {
        let tag = match issue.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
        };
        println!("{}: {}: {}", tag, issue.location.cyan(), issue.message);
    }

    if !verbosity.show_headers() {
        return;
    }
    if report.is_ok() && report.warning_count() == 0 {
        println!("{} configuration is valid", "✓".green());
    } else if report.is_ok() {
        println!(
            "{} configuration is valid ({} warning(s))",
            "✓".green(),
            report.warning_count()
        );
    } else {
        println!(
            "{} {} error(s), {} warning(s)",
            "✗".red(),
            report.error_count(),
            report.warning_count()
        );
    }
}

/// Print the expanded launch plan, grouped by app
pub fn print_plan(plan: &LaunchPlan, verbosity: Verbosity) {
    let mut by_app: BTreeMap<&str, Vec<&crate::plan::InstanceSpec>> = BTreeMap::new();
    for spec in &plan.instances {
        by_app.entry(spec.app.as_str()).or_default().push(spec);
    }

    for (app, specs) in by_app {
        let first = specs[0];
        println!(
            "{} {} instance(s), {} mode: {}",
            app.bold(),
            specs.len(),
            first.exec_mode.as_str(),
            first.argv.join(" ")
        );
        if !verbosity.show_detail() {
            continue;
        }
        for spec in specs {
            println!("  {} {}", "instance".dimmed(), spec.instance_id);
            if let Some(cwd) = &spec.cwd {
                println!("    cwd: {}", cwd.display());
            }
            for (k, v) in &spec.env {
                println!("    env: {}={}", k, v);
            }
            if let Some(out) = &spec.out_file {
                println!("    stdout: {}", out.display());
            }
            if let Some(err) = &spec.error_file {
                println!("    stderr: {}", err.display());
            }
        }
    }
}

/// Print each app's restart policy and the first steps of its backoff curve
pub fn print_policies(file: &EcosystemFile, verbosity: Verbosity) {
    if !verbosity.show_detail() {
        return;
    }
    for app in &file.apps {
        let policy = match RestartPolicy::from_app(app) {
            Ok(p) => p,
            // Bad fields are the validator's job to report
            Err(_) => continue,
        };
        if !policy.autorestart {
            println!("{} restarts: {}", app.name.bold(), "disabled".dimmed());
            continue;
        }
        let delays: Vec<String> = (0..4)
            .map(|n| format!("{}ms", policy.delay_before_restart(n).as_millis()))
            .collect();
        let budget = policy
            .max_restarts
            .map(|m| format!("up to {} unstable restarts", m))
            .unwrap_or_else(|| "unlimited restarts".to_string());
        println!(
            "{} restarts: {} (delays {}, ..; stable after {}ms)",
            app.name.bold(),
            budget,
            delays.join(", "),
            policy.min_uptime_ms
        );
    }
}

/// Print one resolved environment map
pub fn print_env(env: &BTreeMap<String, String>) {
    for (k, v) in env {
        println!("{}={}", k.bold(), v);
    }
}

/// Print deployment targets and their hooks
pub fn print_targets(targets: &BTreeMap<String, DeployTarget>, verbosity: Verbosity) {
    if targets.is_empty() {
        println!("no deploy targets declared");
        return;
    }
    for (name, target) in targets {
        let hosts = target
            .host
            .as_ref()
            .map(|h| h.hosts().join(", "))
            .unwrap_or_else(|| "(no host)".to_string());
        println!(
            "{} {}@{} {} {}",
            name.bold(),
            target.user.as_deref().unwrap_or("-"),
            hosts,
            target.git_ref.as_deref().unwrap_or("-").dimmed(),
            target.path.as_deref().unwrap_or("-")
        );
        if verbosity.show_detail() {
            for (hook, command) in target.hooks() {
                println!("  {}: {}", hook.cyan(), command);
            }
        }
    }
}
