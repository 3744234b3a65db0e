//! ecofile - Main CLI Entry Point

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

use ecofile::cli::{output, Args, Commands};
use ecofile::resolve::resolved_env;
use ecofile::{load_path, EcofileError, LaunchPlan, Validator, ValidatorConfig};

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run(args: &Args) -> Result<ExitCode> {
    let verbosity = args.verbosity();

    match &args.command {
        Commands::Check {
            file,
            profile,
            strict,
            json,
        } => {
            let eco = load_path(file)?;
            let validator = Validator::with_config(ValidatorConfig {
                strict: *strict,
                profile: profile.clone(),
            });
            let report = validator.validate(&eco);
            if *json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                output::print_report(&report, verbosity);
            }
            Ok(if report.is_ok() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }

        Commands::Show {
            file,
            profile,
            json,
        } => {
            let eco = load_path(file)?;
            let plan = LaunchPlan::build(&eco, profile.as_deref())?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                output::print_plan(&plan, verbosity);
                output::print_policies(&eco, verbosity);
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Env { file, app, profile } => {
            let eco = load_path(file)?;
            let entry = eco
                .app(app)
                .ok_or_else(|| EcofileError::UnknownApp(app.clone()))?;
            let env = resolved_env(entry, profile.as_deref())?;
            output::print_env(&env);
            Ok(ExitCode::SUCCESS)
        }

        Commands::Targets { file, json } => {
            let eco = load_path(file)?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&eco.deploy)?);
            } else {
                output::print_targets(&eco.deploy, verbosity);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
