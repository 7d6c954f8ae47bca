//! CLI Common Utilities
//!
//! Shared configuration loading for CLI commands: config layers first, then
//! the command line flags on top.

use std::path::{Path, PathBuf};

use crate::ai::prompt::{PromptTemplate, load_drift_template};
use crate::config::{Config, ConfigLoader};
use crate::pipeline::RunConfig;
use crate::types::Result;

/// Input flags shared by `analyze`, `prompt` and `validate`
#[derive(Debug, Clone, Default)]
pub struct InputOverrides {
    pub source: Option<PathBuf>,
    pub project_docs: Option<PathBuf>,
    pub component_docs: Option<PathBuf>,
    pub org_docs: Option<PathBuf>,
    pub display_root: Option<PathBuf>,
    pub template: Option<PathBuf>,
    pub exclude: Vec<String>,
    pub no_reference_check: bool,
}

impl InputOverrides {
    /// CLI flags win over every config layer. Excludes are appended.
    pub fn apply(&self, config: &mut Config) {
        let paths = &mut config.paths;
        if let Some(source) = &self.source {
            paths.source_root = source.clone();
        }
        if let Some(project) = &self.project_docs {
            paths.project_docs_root = project.clone();
        }
        if let Some(component) = &self.component_docs {
            paths.component_docs_root = component.clone();
        }
        if let Some(org) = &self.org_docs {
            paths.organization_docs_root = Some(org.clone());
        }
        if let Some(display) = &self.display_root {
            paths.display_root = Some(display.clone());
        }
        if let Some(template) = &self.template {
            config.prompt.template_path = Some(template.clone());
        }
        config.aggregation.exclude.extend(self.exclude.iter().cloned());
        if self.no_reference_check {
            config.aggregation.check_references = false;
        }
    }
}

/// Command execution context
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Fully resolved configuration
    pub config: Config,
}

impl CommandContext {
    /// Load config layers, apply CLI overrides, validate the result
    pub fn load(config_path: Option<&Path>, overrides: &InputOverrides) -> Result<Self> {
        let mut config = ConfigLoader::load_with(config_path)?;
        overrides.apply(&mut config);
        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn run_config(&self) -> RunConfig {
        RunConfig::from_config(&self.config)
    }

    /// Configured template, or the built-in one
    pub fn template(&self) -> Result<PromptTemplate> {
        load_drift_template(self.config.prompt.template_path.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DriftError;

    #[test]
    fn test_overrides_win() {
        let mut config = Config::default();
        config.aggregation.exclude = vec!["**/target/**".to_string()];

        let overrides = InputOverrides {
            source: Some(PathBuf::from("services")),
            org_docs: Some(PathBuf::from("standards")),
            exclude: vec!["**/*.lock".to_string()],
            no_reference_check: true,
            ..InputOverrides::default()
        };
        overrides.apply(&mut config);

        assert_eq!(config.paths.source_root, PathBuf::from("services"));
        assert_eq!(config.paths.project_docs_root, PathBuf::from("project-docs"));
        assert_eq!(
            config.paths.organization_docs_root,
            Some(PathBuf::from("standards"))
        );
        assert_eq!(config.aggregation.exclude.len(), 2);
        assert!(!config.aggregation.check_references);
    }

    #[test]
    fn test_context_rejects_bad_override() {
        let mut config = Config::default();
        InputOverrides {
            exclude: vec!["[".to_string()],
            ..InputOverrides::default()
        }
        .apply(&mut config);
        assert!(matches!(
            CommandContext::from_config(config),
            Err(DriftError::Config(_))
        ));
    }

    #[test]
    fn test_context_template_defaults_to_builtin() {
        let ctx = CommandContext::from_config(Config::default()).unwrap();
        assert!(ctx.template().unwrap().origin().is_none());
        assert_eq!(ctx.run_config().source_root, PathBuf::from("source-code"));
    }
}
