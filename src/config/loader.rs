//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/docdrift/config.toml)
//! 3. Project config (.docdrift/config.toml)
//! 4. Explicit `--config` file
//! 5. Environment variables (DOCDRIFT_* prefix, `__` separates sections)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{DriftError, Result};

/// Environment prefix, e.g. `DOCDRIFT_ENGINE__MODEL` -> `engine.model`
pub const ENV_PREFIX: &str = "DOCDRIFT_";

/// Project data directory
pub const PROJECT_DIR: &str = ".docdrift";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        Self::load_with(None)
    }

    /// Same as `load`, with an explicit file merged above the project config
    pub fn load_with(explicit: Option<&Path>) -> Result<Config> {
        let global = Self::global_config_path();
        Self::load_layers(
            global.as_deref(),
            &Self::project_config_path(),
            explicit,
            ENV_PREFIX,
        )
    }

    fn load_layers(
        global: Option<&Path>,
        project: &Path,
        explicit: Option<&Path>,
        env_prefix: &str,
    ) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = global
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(global_path));
        }

        if project.exists() {
            debug!("Loading project config from: {}", project.display());
            figment = figment.merge(Toml::file(project));
        }

        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(DriftError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            debug!("Loading config from: {}", path.display());
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed(env_prefix).split("__").lowercase(true));

        let config: Config = figment
            .extract()
            .map_err(|e| DriftError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/docdrift/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join("docdrift"))
    }

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    /// Get path to project config file
    pub fn project_config_path() -> PathBuf {
        Path::new(PROJECT_DIR).join("config.toml")
    }

    // =========================================================================
    // Rendering & Initialization
    // =========================================================================

    /// Effective configuration as TOML
    pub fn to_toml(config: &Config) -> Result<String> {
        toml::to_string_pretty(config).map_err(|e| DriftError::Config(e.to_string()))
    }

    /// Write a default project config under `dir`
    pub fn init_project(dir: &Path, force: bool) -> Result<PathBuf> {
        let project_dir = dir.join(PROJECT_DIR);
        fs::create_dir_all(&project_dir).map_err(|e| DriftError::io(&project_dir, e))?;
        Self::write_default(&project_dir.join("config.toml"), force)
    }

    /// Write a default global config
    pub fn init_global(force: bool) -> Result<PathBuf> {
        let global_dir = Self::global_dir().ok_or_else(|| {
            DriftError::Config("Cannot determine global config directory".to_string())
        })?;
        fs::create_dir_all(&global_dir).map_err(|e| DriftError::io(&global_dir, e))?;
        Self::write_default(&global_dir.join("config.toml"), force)
    }

    fn write_default(path: &Path, force: bool) -> Result<PathBuf> {
        if path.exists() && !force {
            info!("Config exists: {}", path.display());
            return Ok(path.to_path_buf());
        }
        fs::write(path, Self::default_config_text()).map_err(|e| DriftError::io(path, e))?;
        info!("Created config: {}", path.display());
        Ok(path.to_path_buf())
    }

    /// Default config content (TOML)
    fn default_config_text() -> String {
        r#"# docdrift configuration
# Environment variables override this file, e.g. DOCDRIFT_ENGINE__MODEL.

version = "1.0"

[paths]
source_root = "source-code"
project_docs_root = "project-docs"
component_docs_root = "component-docs"
# organization_docs_root = "org-docs"
# display_root = "."

[engine]
endpoint = "https://api.anthropic.com/v1/messages"
model = "claude-sonnet-4-20250514"
max_tokens = 8192
timeout_secs = 300
# The key is read from this variable and never stored here.
api_key_env = "ANTHROPIC_API_KEY"

[retry]
max_retries = 3
min_delay_ms = 500
max_delay_secs = 30

[prompt]
# template_path = "prompts/drift.md"

[aggregation]
exclude = []
check_references = true
"#
        .to_string()
    }
}
