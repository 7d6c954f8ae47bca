//! Configuration Management
//!
//! Unified configuration system with hierarchical resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/docdrift/config.toml)
//! 3. Project config (.docdrift/config.toml)
//! 4. Explicit `--config` file
//! 5. Environment variables (DOCDRIFT_*)
//! 6. CLI arguments (highest priority)

mod loader;
mod types;

pub use loader::{ConfigLoader, ENV_PREFIX, PROJECT_DIR};
pub use types::*;
