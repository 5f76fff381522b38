use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use courier_config::{
    LoadedConfig,
    validate::{self, Severity, ValidationResult},
};

use crate::Cli;

/// ANSI color codes.
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

const DEFAULT_INIT_PATH: &str = "courier.toml";

pub fn check(cli: &Cli) -> Result<()> {
    let (loaded, result) = diagnose(cli)?;

    if let Some(ref path) = loaded.path {
        eprintln!("Checking {}\n", path.display());
    } else {
        eprintln!("No config file found; checking defaults and environment.\n");
    }

    for d in &result.diagnostics {
        let (color, label) = match d.severity {
            Severity::Error => (RED, "error"),
            Severity::Warning => (YELLOW, "warning"),
            Severity::Info => (CYAN, "info"),
        };

        if d.path.is_empty() {
            eprintln!("  {BOLD}{color}{label}{RESET} {}", d.message);
        } else {
            eprintln!("  {BOLD}{color}{label}{RESET} {}: {}", d.path, d.message);
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

    if errors > 0 {
        anyhow::bail!("configuration has {errors} error(s)");
    }
    Ok(())
}

/// Load the effective config and collect file-level and value-level
/// diagnostics for it.
fn diagnose(cli: &Cli) -> Result<(LoadedConfig, ValidationResult)> {
    let mut loaded = courier_config::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut loaded.config);

    let mut result = ValidationResult::default();
    if let Some(path) = loaded.path.as_deref().filter(|p| is_toml(p)) {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let raw = courier_config::env_subst::substitute_env(&raw);
        result
            .diagnostics
            .extend(validate::validate_toml_str(&raw).diagnostics);
    }
    result
        .diagnostics
        .extend(validate::check_config(&loaded.config).diagnostics);
    Ok((loaded, result))
}

fn is_toml(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "toml")
}

pub fn init(path: Option<&Path>) -> Result<()> {
    let path = path.map_or_else(|| PathBuf::from(DEFAULT_INIT_PATH), Path::to_path_buf);
    let template = courier_config::default_config_template();

    if courier_config::write_new_config(&path, &template)? {
        eprintln!("Wrote {}", path.display());
        eprintln!("Fill in the tokens and channel ids, then run `courier check`.");
    } else {
        eprintln!("{} already exists; left untouched.", path.display());
    }
    Ok(())
}
