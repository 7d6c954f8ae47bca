//! Drift report types
//!
//! The structured answer the reasoning engine must produce. Field names on the
//! wire are camelCase; enum values use the capitalised spelling with lowercase
//! aliases accepted on input.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Enumerations
// =============================================================================

/// How badly a finding affects users of the documentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    #[serde(alias = "critical", alias = "CRITICAL")]
    Critical,
    #[serde(alias = "major", alias = "MAJOR")]
    Major,
    #[serde(alias = "minor", alias = "MINOR")]
    Minor,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Critical => write!(f, "Critical"),
            Severity::Major => write!(f, "Major"),
            Severity::Minor => write!(f, "Minor"),
        }
    }
}

/// Nature of the mismatch between code and documentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DriftType {
    #[serde(alias = "incorrect")]
    Incorrect,
    #[serde(alias = "outdated")]
    Outdated,
    #[serde(alias = "missing")]
    Missing,
    #[serde(alias = "conflicting")]
    Conflicting,
}

impl fmt::Display for DriftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriftType::Incorrect => write!(f, "Incorrect"),
            DriftType::Outdated => write!(f, "Outdated"),
            DriftType::Missing => write!(f, "Missing"),
            DriftType::Conflicting => write!(f, "Conflicting"),
        }
    }
}

/// Scope at which a piece of documentation applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DocumentationLevel {
    #[serde(alias = "organization")]
    Organization,
    #[serde(alias = "project")]
    Project,
    #[serde(alias = "component")]
    Component,
    #[serde(rename = "API", alias = "Api", alias = "api")]
    Api,
    #[serde(alias = "inline")]
    Inline,
}

impl DocumentationLevel {
    pub const ALL: [DocumentationLevel; 5] = [
        DocumentationLevel::Organization,
        DocumentationLevel::Project,
        DocumentationLevel::Component,
        DocumentationLevel::Api,
        DocumentationLevel::Inline,
    ];
}

impl fmt::Display for DocumentationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentationLevel::Organization => write!(f, "Organization"),
            DocumentationLevel::Project => write!(f, "Project"),
            DocumentationLevel::Component => write!(f, "Component"),
            DocumentationLevel::Api => write!(f, "API"),
            DocumentationLevel::Inline => write!(f, "Inline"),
        }
    }
}

/// Impact area of a finding. Open-ended: unknown categories are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ImpactCategory {
    Functional,
    Maintainability,
    Security,
    Performance,
    Compliance,
    Usability,
    Other(String),
}

impl From<String> for ImpactCategory {
    fn from(value: String) -> Self {
        match value.to_lowercase().as_str() {
            "functional" => Self::Functional,
            "maintainability" => Self::Maintainability,
            "security" => Self::Security,
            "performance" => Self::Performance,
            "compliance" => Self::Compliance,
            "usability" => Self::Usability,
            _ => Self::Other(value),
        }
    }
}

impl From<ImpactCategory> for String {
    fn from(value: ImpactCategory) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ImpactCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Functional => write!(f, "Functional"),
            Self::Maintainability => write!(f, "Maintainability"),
            Self::Security => write!(f, "Security"),
            Self::Performance => write!(f, "Performance"),
            Self::Compliance => write!(f, "Compliance"),
            Self::Usability => write!(f, "Usability"),
            Self::Other(name) => write!(f, "{}", name),
        }
    }
}

// =============================================================================
// Finding
// =============================================================================

/// Inclusive 1-based line span inside `SourceLocation::file_name`.
/// Either bound may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<u32>,
}

impl LineRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }
}

impl fmt::Display for LineRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.start, self.end) {
            (Some(start), Some(end)) if start == end => write!(f, "L{}", start),
            (Some(start), Some(end)) => write!(f, "L{}-{}", start, end),
            (Some(start), None) => write!(f, "L{}-", start),
            (None, Some(end)) => write!(f, "L-{}", end),
            (None, None) => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceLocation {
    pub file_name: String,
    #[serde(default)]
    pub entity_name: Option<String>,
    #[serde(default)]
    pub entity_type: Option<String>,
    /// Absent when the finding is not line-anchored (whole file or service)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_range: Option<LineRange>,
}

/// Documentation excerpts that disagree with the code; `descriptions[i]`
/// comes from `levels[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictingDocumentation {
    #[serde(default)]
    pub levels: Vec<DocumentationLevel>,
    #[serde(default)]
    pub descriptions: Vec<String>,
}

impl ConflictingDocumentation {
    /// Pairs of (level, excerpt), truncated to the shorter side
    pub fn pairs(&self) -> impl Iterator<Item = (DocumentationLevel, &str)> {
        self.levels
            .iter()
            .copied()
            .zip(self.descriptions.iter().map(String::as_str))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftFinding {
    pub id: String,
    pub severity: Severity,
    #[serde(rename = "type")]
    pub drift_type: DriftType,
    pub documentation_level: DocumentationLevel,
    pub impact_category: ImpactCategory,
    pub location: SourceLocation,
    #[serde(default)]
    pub conflicting_documentation: ConflictingDocumentation,
    pub recommended_action: String,
    #[serde(default)]
    pub related_documents: Vec<String>,
}

// =============================================================================
// Report
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftSummary {
    pub total_issues: u32,
    pub critical_issues: u32,
    pub major_issues: u32,
    pub minor_issues: u32,
    #[serde(default)]
    pub languages_analyzed: Vec<String>,
    #[serde(default)]
    pub documentation_levels_covered: Vec<DocumentationLevel>,
}

/// Engine verdict for one run. Immutable once validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriftReport {
    pub summary: DriftSummary,
    /// Required even when empty: a missing array is not "no drift"
    pub results: Vec<DriftFinding>,
}

impl DriftReport {
    /// Number of findings with the given severity
    pub fn count_by_severity(&self, severity: Severity) -> usize {
        self.results.iter().filter(|f| f.severity == severity).count()
    }

    pub fn is_clean(&self) -> bool {
        self.results.is_empty()
    }

    /// Findings ordered Critical → Minor, stable within a severity
    pub fn sorted_by_severity(&self) -> Vec<&DriftFinding> {
        let mut findings: Vec<&DriftFinding> = self.results.iter().collect();
        findings.sort_by_key(|f| f.severity);
        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn finding_json() -> serde_json::Value {
        json!({
            "id": "DRIFT-001",
            "severity": "Critical",
            "type": "Incorrect",
            "documentationLevel": "API",
            "impactCategory": "Security",
            "location": {
                "fileName": "/order-service/OrderService.java",
                "entityName": "createOrder",
                "entityType": "method",
                "lineRange": {"start": 10, "end": 24}
            },
            "conflictingDocumentation": {
                "levels": ["Project", "Component"],
                "descriptions": ["Orders require auth", "Orders are public"]
            },
            "recommendedAction": "Add authentication check",
            "relatedDocuments": ["/project-docs/api.md"]
        })
    }

    #[test]
    fn test_finding_wire_format() {
        let finding: DriftFinding = serde_json::from_value(finding_json()).unwrap();
        assert_eq!(finding.severity, Severity::Critical);
        assert_eq!(finding.drift_type, DriftType::Incorrect);
        assert_eq!(finding.documentation_level, DocumentationLevel::Api);
        assert_eq!(finding.impact_category, ImpactCategory::Security);
        assert_eq!(
            finding.location.line_range,
            Some(LineRange::new(10, 24))
        );

        let back = serde_json::to_value(&finding).unwrap();
        assert_eq!(back["documentationLevel"], "API");
        assert_eq!(back["type"], "Incorrect");
        assert_eq!(back["location"]["fileName"], "/order-service/OrderService.java");
    }

    #[test]
    fn test_lowercase_aliases() {
        let mut value = finding_json();
        value["severity"] = json!("minor");
        value["type"] = json!("outdated");
        value["documentationLevel"] = json!("inline");
        let finding: DriftFinding = serde_json::from_value(value).unwrap();
        assert_eq!(finding.severity, Severity::Minor);
        assert_eq!(finding.drift_type, DriftType::Outdated);
        assert_eq!(finding.documentation_level, DocumentationLevel::Inline);
    }

    #[test]
    fn test_unknown_severity_rejected() {
        let mut value = finding_json();
        value["severity"] = json!("Catastrophic");
        assert!(serde_json::from_value::<DriftFinding>(value).is_err());
    }

    #[test]
    fn test_impact_category_open_ended() {
        let known: ImpactCategory = serde_json::from_value(json!("maintainability")).unwrap();
        assert_eq!(known, ImpactCategory::Maintainability);

        let other: ImpactCategory = serde_json::from_value(json!("Observability")).unwrap();
        assert_eq!(other, ImpactCategory::Other("Observability".to_string()));
        assert_eq!(serde_json::to_value(&other).unwrap(), json!("Observability"));
    }

    #[test]
    fn test_line_range_optional() {
        let mut value = finding_json();
        value["location"] = json!({"fileName": "/payment-service/main.go"});
        let finding: DriftFinding = serde_json::from_value(value).unwrap();
        assert!(finding.location.line_range.is_none());
        let back = serde_json::to_value(&finding).unwrap();
        assert!(back["location"].get("lineRange").is_none());
    }

    #[test]
    fn test_sorted_by_severity() {
        let mut minor: DriftFinding = serde_json::from_value(finding_json()).unwrap();
        minor.id = "m".to_string();
        minor.severity = Severity::Minor;
        let critical: DriftFinding = serde_json::from_value(finding_json()).unwrap();

        let report = DriftReport {
            summary: DriftSummary::default(),
            results: vec![minor, critical],
        };
        let sorted = report.sorted_by_severity();
        assert_eq!(sorted[0].severity, Severity::Critical);
        assert_eq!(sorted[1].severity, Severity::Minor);
        assert_eq!(report.count_by_severity(Severity::Minor), 1);
    }
}
