//! Prompt templates with named `{{NAME}}` markers
//!
//! A template is parsed once into literal and marker segments. Rendering is a
//! single pass over those segments with an explicit name→value map, so values
//! are inserted verbatim and never re-scanned: the result does not depend on
//! substitution order and a value that happens to contain `{{X}}` is not
//! expanded again.

use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::types::{DriftError, Result};

/// `{{NAME}}` where NAME is an upper-case identifier. Anything else,
/// including JSON braces and `{{ lower }}`, stays literal.
static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{([A-Z][A-Z0-9_]*)\}\}").expect("marker pattern is a valid regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Marker(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    segments: Vec<Segment>,
    origin: Option<PathBuf>,
}

impl PromptTemplate {
    /// Parse template text. Each marker may appear at most once.
    pub fn parse(text: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut seen = BTreeSet::new();
        let mut cursor = 0;

        for caps in MARKER.captures_iter(text) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if whole.start() > cursor {
                segments.push(Segment::Literal(text[cursor..whole.start()].to_string()));
            }
            let name = name.as_str().to_string();
            if !seen.insert(name.clone()) {
                return Err(DriftError::Template(format!(
                    "Placeholder {{{{{}}}}} appears more than once",
                    name
                )));
            }
            segments.push(Segment::Marker(name));
            cursor = whole.end();
        }
        if cursor < text.len() {
            segments.push(Segment::Literal(text[cursor..].to_string()));
        }

        Ok(Self {
            segments,
            origin: None,
        })
    }

    /// Load and parse a template file
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            DriftError::Template(format!("Cannot read template {}: {}", path.display(), e))
        })?;
        let mut template = Self::parse(&text)?;
        template.origin = Some(path.to_path_buf());
        Ok(template)
    }

    /// File the template was loaded from, if any
    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    /// Marker names in template order
    pub fn markers(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Marker(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    pub fn has_marker(&self, name: &str) -> bool {
        self.markers().any(|m| m == name)
    }

    /// Fail unless every listed marker is present
    pub fn require_markers(&self, names: &[&str]) -> Result<()> {
        let missing: Vec<&str> = names
            .iter()
            .copied()
            .filter(|name| !self.has_marker(name))
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        Err(DriftError::Template(format!(
            "Template{} is missing required placeholder(s): {}",
            self.origin
                .as_ref()
                .map(|p| format!(" {}", p.display()))
                .unwrap_or_default(),
            missing.join(", ")
        )))
    }

    /// Substitute every marker. A marker without a value is an error;
    /// values for names the template does not use are ignored.
    pub fn render(&self, values: &BTreeMap<&str, &str>) -> Result<String> {
        let capacity = self
            .segments
            .iter()
            .map(|s| match s {
                Segment::Literal(text) => text.len(),
                Segment::Marker(name) => values.get(name.as_str()).map_or(0, |v| v.len()),
            })
            .sum();
        let mut out = String::with_capacity(capacity);

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Marker(name) => {
                    let value = values.get(name.as_str()).ok_or_else(|| {
                        DriftError::Template(format!("No value for placeholder {{{{{}}}}}", name))
                    })?;
                    out.push_str(value);
                }
            }
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values<'a>(pairs: &[(&'a str, &'a str)]) -> BTreeMap<&'a str, &'a str> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_render_simple() {
        let template = PromptTemplate::parse("SRC:{{SOURCE}} DOC:{{DOC}}").unwrap();
        let out = template
            .render(&values(&[("SOURCE", "foo"), ("DOC", "bar")]))
            .unwrap();
        assert_eq!(out, "SRC:foo DOC:bar");
        assert!(!out.contains("{{"));
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let template = PromptTemplate::parse("A={{A}} B={{B}}").unwrap();
        let out = template
            .render(&values(&[("A", "{{B}}"), ("B", "b")]))
            .unwrap();
        assert_eq!(out, "A={{B}} B=b");
    }

    #[test]
    fn test_non_marker_braces_stay_literal() {
        let text = "{\"summary\": {{\"nested\": 1}}} {{ lower }} {{lower}} {{SOURCE}}";
        let template = PromptTemplate::parse(text).unwrap();
        assert_eq!(template.markers().collect::<Vec<_>>(), vec!["SOURCE"]);

        let out = template.render(&values(&[("SOURCE", "x")])).unwrap();
        assert_eq!(out, "{\"summary\": {{\"nested\": 1}}} {{ lower }} {{lower}} x");
    }

    #[test]
    fn test_missing_value_is_error() {
        let template = PromptTemplate::parse("{{SOURCE}} {{DOC}}").unwrap();
        let result = template.render(&values(&[("SOURCE", "x")]));
        assert!(matches!(result, Err(DriftError::Template(msg)) if msg.contains("{{DOC}}")));
    }

    #[test]
    fn test_extra_values_ignored() {
        let template = PromptTemplate::parse("only {{SOURCE}}").unwrap();
        let out = template
            .render(&values(&[("SOURCE", "x"), ("UNUSED", "y")]))
            .unwrap();
        assert_eq!(out, "only x");
    }

    #[test]
    fn test_duplicate_marker_rejected() {
        let result = PromptTemplate::parse("{{SOURCE}} and again {{SOURCE}}");
        assert!(matches!(result, Err(DriftError::Template(_))));
    }

    #[test]
    fn test_require_markers() {
        let template = PromptTemplate::parse("{{SOURCE_FILES}}").unwrap();
        assert!(template.require_markers(&["SOURCE_FILES"]).is_ok());
        let err = template
            .require_markers(&["SOURCE_FILES", "PROJECT_DOCUMENTATION"])
            .unwrap_err();
        assert!(err.to_string().contains("PROJECT_DOCUMENTATION"));
    }

    #[test]
    fn test_load_missing_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let result = PromptTemplate::load(&temp.path().join("prompt.md"));
        assert!(matches!(result, Err(DriftError::Template(_))));
    }

    #[test]
    fn test_load_records_origin() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("prompt.md");
        std::fs::write(&path, "Review {{SOURCE_FILES}}").unwrap();

        let template = PromptTemplate::load(&path).unwrap();
        assert_eq!(template.origin(), Some(path.as_path()));
        assert!(template.has_marker("SOURCE_FILES"));
    }

    #[test]
    fn test_template_without_markers() {
        let template = PromptTemplate::parse("plain text").unwrap();
        assert_eq!(template.render(&BTreeMap::new()).unwrap(), "plain text");
    }
}
