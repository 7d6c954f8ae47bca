//! Drift analysis prompt assembly
//!
//! Organization documentation policy: when the template carries
//! `{{ORGANIZATION_DOCUMENTATION}}` and no organization docs are supplied, the
//! marker renders as an empty string. Supplying organization docs to a template
//! without that marker is an error, since the docs would otherwise be dropped
//! from the prompt without notice.

use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

use super::template::PromptTemplate;
use crate::constants::prompt::{
    COMPONENT_DOCUMENTATION, ORGANIZATION_DOCUMENTATION, PROJECT_DOCUMENTATION, REQUIRED_MARKERS,
    SOURCE_FILES,
};
use crate::types::{DriftError, Result};

const BUILTIN_TEMPLATE: &str = include_str!("../../../templates/drift_analysis.md");

/// Aggregated inputs for one drift analysis prompt
#[derive(Debug, Clone, Copy)]
pub struct DriftPromptInputs<'a> {
    pub source_files: &'a str,
    pub project_documentation: &'a str,
    pub component_documentation: &'a str,
    pub organization_documentation: Option<&'a str>,
}

/// Load the drift template from `path`, or the built-in one when `None`.
/// Missing required markers are reported here, at startup.
pub fn load_drift_template(path: Option<&Path>) -> Result<PromptTemplate> {
    let template = match path {
        Some(path) => {
            info!("Loading prompt template from {}", path.display());
            PromptTemplate::load(path)?
        }
        None => PromptTemplate::parse(BUILTIN_TEMPLATE)?,
    };
    template.require_markers(&REQUIRED_MARKERS)?;
    Ok(template)
}

/// Build the final request text
pub fn assemble(template: &PromptTemplate, inputs: &DriftPromptInputs<'_>) -> Result<String> {
    let mut values = BTreeMap::new();
    values.insert(SOURCE_FILES, inputs.source_files);
    values.insert(PROJECT_DOCUMENTATION, inputs.project_documentation);
    values.insert(COMPONENT_DOCUMENTATION, inputs.component_documentation);

    match (
        inputs.organization_documentation,
        template.has_marker(ORGANIZATION_DOCUMENTATION),
    ) {
        (Some(org), true) => {
            values.insert(ORGANIZATION_DOCUMENTATION, org);
        }
        (None, true) => {
            debug!("No organization documentation supplied; placeholder left empty");
            values.insert(ORGANIZATION_DOCUMENTATION, "");
        }
        (Some(_), false) => {
            return Err(DriftError::Template(format!(
                "Organization documentation was supplied but the template has no {{{{{}}}}} placeholder",
                ORGANIZATION_DOCUMENTATION
            )));
        }
        (None, false) => {}
    }

    let prompt = template.render(&values)?;
    debug!(bytes = prompt.len(), "Assembled drift prompt");
    Ok(prompt)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(org: Option<&str>) -> DriftPromptInputs<'_> {
        DriftPromptInputs {
            source_files: "<source_files>\n</source_files>",
            project_documentation: "PROJECT",
            component_documentation: "COMPONENT",
            organization_documentation: org,
        }
    }

    #[test]
    fn test_builtin_template_is_valid() {
        let template = load_drift_template(None).unwrap();
        for marker in REQUIRED_MARKERS {
            assert!(template.has_marker(marker));
        }
        assert!(template.has_marker(ORGANIZATION_DOCUMENTATION));
    }

    #[test]
    fn test_builtin_template_renders_without_markers() {
        let template = load_drift_template(None).unwrap();
        let prompt = assemble(&template, &inputs(Some("ORG"))).unwrap();
        for marker in REQUIRED_MARKERS
            .iter()
            .chain(std::iter::once(&ORGANIZATION_DOCUMENTATION))
        {
            assert!(!prompt.contains(&format!("{{{{{}}}}}", marker)));
        }
        assert!(prompt.contains("PROJECT"));
        assert!(prompt.contains("COMPONENT"));
        assert!(prompt.contains("ORG"));
    }

    #[test]
    fn test_absent_org_docs_render_empty() {
        let template = PromptTemplate::parse(
            "[{{ORGANIZATION_DOCUMENTATION}}]{{PROJECT_DOCUMENTATION}}|{{COMPONENT_DOCUMENTATION}}|{{SOURCE_FILES}}",
        )
        .unwrap();
        let prompt = assemble(&template, &inputs(None)).unwrap();
        assert_eq!(prompt, "[]PROJECT|COMPONENT|<source_files>\n</source_files>");
    }

    #[test]
    fn test_org_docs_without_marker_rejected() {
        let template = PromptTemplate::parse(
            "{{PROJECT_DOCUMENTATION}}{{COMPONENT_DOCUMENTATION}}{{SOURCE_FILES}}",
        )
        .unwrap();
        assert!(assemble(&template, &inputs(None)).is_ok());
        assert!(matches!(
            assemble(&template, &inputs(Some("ORG"))),
            Err(DriftError::Template(_))
        ));
    }

    #[test]
    fn test_assembly_is_pure() {
        let template = load_drift_template(None).unwrap();
        let a = assemble(&template, &inputs(Some("ORG"))).unwrap();
        let b = assemble(&template, &inputs(Some("ORG"))).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_custom_template_missing_required_marker() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("prompt.md");
        std::fs::write(&path, "{{SOURCE_FILES}} {{PROJECT_DOCUMENTATION}}").unwrap();

        let err = load_drift_template(Some(&path)).unwrap_err();
        assert!(matches!(err, DriftError::Template(_)));
        assert!(err.to_string().contains(COMPONENT_DOCUMENTATION));
    }
}
