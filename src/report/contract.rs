//! Drift result contract
//!
//! Turns the engine's raw answer into a `DriftReport` and rejects answers that
//! break the report's invariants. Every violation found is reported at once so
//! a bad answer can be diagnosed from a single run.

use std::collections::{BTreeSet, HashMap};
use tracing::{debug, instrument, warn};

use crate::ai::validation::extract_json_object;
use crate::types::{
    ContractError, ContractViolation, DriftFinding, DriftReport, Result, Severity, ViolationKind,
};

/// Parse and validate an engine answer
#[instrument(skip_all, fields(answer_bytes = text.len()))]
pub fn parse_report(text: &str, validator: &ContractValidator) -> Result<DriftReport> {
    let value = extract_json_object(text)?;
    let report: DriftReport = serde_json::from_value(value).map_err(|e| {
        ContractError::single(ContractViolation::new(ViolationKind::Schema, e.to_string()))
    })?;
    validator.validate(&report)?;
    debug!(findings = report.results.len(), "Drift report accepted");
    Ok(report)
}

/// Invariant checks over a deserialized report
#[derive(Debug, Clone, Default)]
pub struct ContractValidator {
    /// Display paths of every aggregated file; `None` skips reference checks
    known_paths: Option<BTreeSet<String>>,
}

impl ContractValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require every finding to point at one of these files
    pub fn with_known_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_paths = Some(paths.into_iter().map(Into::into).collect());
        self
    }

    pub fn validate(&self, report: &DriftReport) -> std::result::Result<(), ContractError> {
        let mut violations = Vec::new();

        self.check_summary(report, &mut violations);
        self.check_unique_ids(report, &mut violations);
        for (index, finding) in report.results.iter().enumerate() {
            self.check_finding(index, finding, &mut violations);
        }

        if violations.is_empty() {
            Ok(())
        } else {
            warn!(count = violations.len(), "Drift report violates the result contract");
            Err(ContractError { violations })
        }
    }

    /// True when `reference` names one of the known files. A missing leading
    /// `/`, a leading `./` or a bare trailing path suffix is tolerated.
    pub fn references_known(&self, reference: &str) -> bool {
        let Some(known) = &self.known_paths else {
            return true;
        };
        let Some(wanted) = normalize_reference(reference) else {
            return false;
        };
        known.contains(&wanted) || known.iter().any(|path| path.ends_with(&wanted))
    }

    fn check_summary(&self, report: &DriftReport, violations: &mut Vec<ContractViolation>) {
        let summary = &report.summary;
        let severity_sum =
            summary.critical_issues as u64 + summary.major_issues as u64 + summary.minor_issues as u64;

        if summary.total_issues as u64 != severity_sum {
            violations.push(
                ContractViolation::new(
                    ViolationKind::Consistency,
                    "totalIssues does not equal criticalIssues + majorIssues + minorIssues",
                )
                .at("summary.totalIssues")
                .with_comparison(severity_sum, summary.total_issues),
            );
        }

        if summary.total_issues as usize != report.results.len() {
            violations.push(
                ContractViolation::new(
                    ViolationKind::Consistency,
                    "totalIssues does not equal the number of results",
                )
                .at("summary.totalIssues")
                .with_comparison(report.results.len(), summary.total_issues),
            );
        }

        for (severity, field, declared) in [
            (Severity::Critical, "summary.criticalIssues", summary.critical_issues),
            (Severity::Major, "summary.majorIssues", summary.major_issues),
            (Severity::Minor, "summary.minorIssues", summary.minor_issues),
        ] {
            let actual = report.count_by_severity(severity);
            if declared as usize != actual {
                violations.push(
                    ContractViolation::new(
                        ViolationKind::Consistency,
                        format!("count disagrees with the {} findings in results", severity),
                    )
                    .at(field)
                    .with_comparison(actual, declared),
                );
            }
        }
    }

    fn check_unique_ids(&self, report: &DriftReport, violations: &mut Vec<ContractViolation>) {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for (index, finding) in report.results.iter().enumerate() {
            if let Some(first) = seen.insert(finding.id.as_str(), index) {
                violations.push(
                    ContractViolation::new(
                        ViolationKind::Duplicate,
                        format!("id {:?} already used by results[{}]", finding.id, first),
                    )
                    .at(format!("results[{}].id", index)),
                );
            }
        }
    }

    fn check_finding(
        &self,
        index: usize,
        finding: &DriftFinding,
        violations: &mut Vec<ContractViolation>,
    ) {
        if let Some(range) = finding.location.line_range
            && let (Some(start), Some(end)) = (range.start, range.end)
            && start > end
        {
            violations.push(
                ContractViolation::new(ViolationKind::Range, "start is after end")
                    .at(format!("results[{}].location.lineRange", index))
                    .with_comparison(format!("start <= {}", end), start),
            );
        }

        let docs = &finding.conflicting_documentation;
        if !docs.descriptions.is_empty() && docs.levels.is_empty() {
            violations.push(
                ContractViolation::new(
                    ViolationKind::Alignment,
                    "descriptions given without the levels they come from",
                )
                .at(format!("results[{}].conflictingDocumentation.levels", index)),
            );
        } else if docs.levels.len() != docs.descriptions.len() {
            violations.push(
                ContractViolation::new(
                    ViolationKind::Alignment,
                    "levels and descriptions must be order-aligned",
                )
                .at(format!("results[{}].conflictingDocumentation", index))
                .with_comparison(
                    format!("{} descriptions", docs.levels.len()),
                    docs.descriptions.len(),
                ),
            );
        }

        if self.known_paths.is_some() {
            let referenced = std::iter::once(finding.location.file_name.as_str())
                .chain(finding.related_documents.iter().map(String::as_str))
                .any(|reference| self.references_known(reference));
            if !referenced {
                violations.push(
                    ContractViolation::new(
                        ViolationKind::UnknownReference,
                        "finding does not reference any analysed file",
                    )
                    .at(format!("results[{}].location.fileName", index))
                    .with_comparison("a path from the aggregated input", &finding.location.file_name),
                );
            }
        }
    }
}

/// `./a/b`, `a/b` and `/a/b` all become `/a/b`; blank references match nothing
fn normalize_reference(reference: &str) -> Option<String> {
    let trimmed = reference.trim().trim_start_matches("./").trim_start_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    Some(format!("/{}", trimmed.replace('\\', "/")))
}
