//! Config Command
//!
//! Manage docdrift configuration.
//!
//! Usage:
//!   docdrift config show [-f toml|json|yaml]
//!   docdrift config path
//!   docdrift config init [-g] [--force]

use std::path::Path;

use crate::cli::ui::Output;
use crate::config::{ConfigLoader, ENV_PREFIX};
use crate::types::Result;

/// Show the merged effective configuration
pub fn show(config_path: Option<&Path>, format: &str) -> Result<()> {
    let config = ConfigLoader::load_with(config_path)?;
    let rendered = match format {
        "json" => serde_json::to_string_pretty(&config)?,
        "yaml" => serde_yaml::to_string(&config)?,
        _ => ConfigLoader::to_toml(&config)?,
    };
    println!("{}", rendered);
    Ok(())
}

/// Show configuration file paths
pub fn path() -> Result<()> {
    let out = Output::new();
    out.section("Configuration paths");

    match ConfigLoader::global_config_path() {
        Some(global) => out.detail("Global", format_path(&global)),
        None => out.detail("Global", "(not available)"),
    }
    out.detail("Project", format_path(&ConfigLoader::project_config_path()));
    out.detail("Env", format!("{}<SECTION>__<KEY>", ENV_PREFIX));
    Ok(())
}

fn format_path(path: &Path) -> String {
    let marker = if path.exists() { "✓" } else { "✗" };
    format!("{} {}", marker, path.display())
}

/// Initialize configuration
pub fn init(global: bool, force: bool) -> Result<()> {
    let path = if global {
        ConfigLoader::init_global(force)?
    } else {
        ConfigLoader::init_project(Path::new("."), force)?
    };
    Output::new().success(&format!("Configuration ready: {}", path.display()));
    Ok(())
}
