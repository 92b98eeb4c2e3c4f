use {anyhow::Result, clap::Subcommand};

use servicegenius_config::{
    ServiceGeniusConfig, find_config_file,
    validate::{self, Severity},
};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Validate the loaded configuration and report errors/warnings.
    Check,
}

pub fn handle_config(action: ConfigAction, config: &ServiceGeniusConfig) -> Result<()> {
    match action {
        ConfigAction::Check => check(config),
    }
}

/// ANSI color codes.
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn check(config: &ServiceGeniusConfig) -> Result<()> {
    if let Some(path) = find_config_file() {
        eprintln!("Checking {} (with environment overrides)\n", path.display());
    } else {
        eprintln!("No config file found; checking defaults and environment.\n");
    }

    let result = validate::validate(config);
    for d in &result.diagnostics {
        let color = match d.severity {
            Severity::Error => RED,
            Severity::Warning => YELLOW,
        };
        if d.path.is_empty() {
            eprintln!("  {BOLD}{color}{}{RESET} {}", d.severity, d.message);
        } else {
            eprintln!("  {BOLD}{color}{}{RESET} {}: {}", d.severity, d.path, d.message);
        }
    }

    let errors = result.count(Severity::Error);
    let warnings = result.count(Severity::Warning);

    if !result.diagnostics.is_empty() {
        eprintln!();
    }

    if errors == 0 && warnings == 0 {
        eprintln!("No issues found.");
    } else {
        eprintln!("{errors} error(s), {warnings} warning(s)");
    }

    if result.has_errors() {
        std::process::exit(1);
    }

    Ok(())
}
