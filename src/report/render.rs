use console::style;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::pipeline::DriftRun;
use crate::types::{DriftError, DriftFinding, DriftReport, LineRange, Result, Severity};

/// Output format for saved reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(format!(
                "Invalid format '{}'. Valid values: text, json, yaml",
                s
            )),
        }
    }
}

pub struct Reporter;

impl Reporter {
    pub fn to_json(run: &DriftRun) -> Result<String> {
        Ok(serde_json::to_string_pretty(run)?)
    }

    pub fn to_yaml(run: &DriftRun) -> Result<String> {
        Ok(serde_yaml::to_string(run)?)
    }

    /// Plain text rendering, no terminal styling
    pub fn to_text(run: &DriftRun) -> String {
        let mut out = String::new();
        let summary = &run.report.summary;
        out.push_str(&format!(
            "Drift report {} ({} via {})\n",
            run.run_id, run.model, run.provider
        ));
        out.push_str(&format!(
            "Issues: {} (critical {}, major {}, minor {})\n",
            summary.total_issues, summary.critical_issues, summary.major_issues, summary.minor_issues
        ));
        for finding in run.report.sorted_by_severity() {
            out.push('\n');
            out.push_str(&finding_headline(finding));
            out.push('\n');
            for (level, excerpt) in finding.conflicting_documentation.pairs() {
                out.push_str(&format!("  {}: \"{}\"\n", level, excerpt));
            }
            out.push_str(&format!("  → {}\n", finding.recommended_action));
        }
        out
    }

    pub fn write(run: &DriftRun, path: &Path, format: ReportFormat) -> Result<()> {
        let body = match format {
            ReportFormat::Text => Self::to_text(run),
            ReportFormat::Json => Self::to_json(run)?,
            ReportFormat::Yaml => Self::to_yaml(run)?,
        };
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| DriftError::io(parent, e))?;
        }
        fs::write(path, body).map_err(|e| DriftError::io(path, e))
    }

    pub fn print_summary(run: &DriftRun) {
        let report = &run.report;
        println!("{}", style("Documentation Drift Report").bold());
        println!("══════════════════════════════════════");
        println!();
        println!("Run:       {}", run.run_id);
        println!("Model:     {} ({})", run.model, run.provider);
        println!(
            "Inputs:    {} source file(s), {} document(s)",
            run.source_files, run.document_files
        );
        if !run.languages.is_empty() {
            println!("Languages: {}", run.languages.join(", "));
        }
        println!(
            "Tokens:    {} in / {} out",
            run.usage.input_tokens, run.usage.output_tokens
        );
        println!();

        Self::print_report(report);

        println!("══════════════════════════════════════");
        let critical = report.summary.critical_issues;
        if report.is_clean() {
            println!("Result: {}", style("NO DRIFT ✓").green());
        } else if critical > 0 {
            println!(
                "Result: {} ({} issue(s), {} critical)",
                style("DRIFT").red().bold(),
                report.summary.total_issues,
                critical
            );
        } else {
            println!(
                "Result: {} ({} issue(s))",
                style("DRIFT").yellow(),
                report.summary.total_issues
            );
        }
    }

    /// Findings of a report, most severe first
    pub fn print_report(report: &DriftReport) {
        if report.is_clean() {
            println!("No drift found.");
            println!();
            return;
        }

        println!("Findings ({}):", report.results.len());
        println!();

        for finding in report.sorted_by_severity() {
            let icon = match finding.severity {
                Severity::Critical => style("✗").red(),
                Severity::Major => style("⚠").yellow(),
                Severity::Minor => style("ℹ").blue(),
            };
            println!("{} {}", icon, finding_headline(finding));

            for (level, excerpt) in finding.conflicting_documentation.pairs() {
                println!("  {} {}", style(format!("{}:", level)).dim(), excerpt);
            }
            if !finding.related_documents.is_empty() {
                println!(
                    "  {} {}",
                    style("see:").dim(),
                    finding.related_documents.join(", ")
                );
            }
            println!("  → {}", finding.recommended_action);
            println!();
        }
    }
}

fn finding_headline(finding: &DriftFinding) -> String {
    let mut location = finding.location.file_name.clone();
    if let Some(entity) = &finding.location.entity_name {
        location.push_str(&format!(" ({})", entity));
    }
    if let Some(range) = finding.location.line_range
        && range != LineRange::default()
    {
        location.push_str(&format!(" {}", range));
    }
    format!(
        "[{}] {} {} drift at {} level ({}): {}",
        finding.id,
        finding.severity.to_string().to_uppercase(),
        finding.drift_type,
        finding.documentation_level,
        finding.impact_category,
        location
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::TokenUsage;
    use crate::types::{
        ConflictingDocumentation, DocumentationLevel, DriftSummary, DriftType, ImpactCategory,
        LineRange, SourceLocation,
    };
    use chrono::Utc;
    use tempfile::TempDir;
    use uuid::Uuid;

    fn sample_run() -> DriftRun {
        let finding = DriftFinding {
            id: "DRIFT-001".to_string(),
            severity: Severity::Critical,
            drift_type: DriftType::Incorrect,
            documentation_level: DocumentationLevel::Api,
            impact_category: ImpactCategory::Security,
            location: SourceLocation {
                file_name: "/order-service/OrderController.java".to_string(),
                entity_name: Some("createOrder".to_string()),
                entity_type: Some("method".to_string()),
                line_range: Some(LineRange::new(12, 30)),
            },
            conflicting_documentation: ConflictingDocumentation {
                levels: vec![DocumentationLevel::Project],
                descriptions: vec!["All endpoints require authentication".to_string()],
            },
            recommended_action: "Add the authentication filter".to_string(),
            related_documents: vec!["/api.md".to_string()],
        };
        DriftRun {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            provider: "anthropic".to_string(),
            model: "test-model".to_string(),
            prompt_digest: "abc".to_string(),
            usage: TokenUsage::default(),
            elapsed_ms: 5,
            languages: vec!["Java".to_string()],
            source_files: 1,
            document_files: 1,
            report: DriftReport {
                summary: DriftSummary {
                    total_issues: 1,
                    critical_issues: 1,
                    major_issues: 0,
                    minor_issues: 0,
                    languages_analyzed: vec!["Java".to_string()],
                    documentation_levels_covered: vec![DocumentationLevel::Project],
                },
                results: vec![finding],
            },
        }
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("JSON".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        assert_eq!("yml".parse::<ReportFormat>().unwrap(), ReportFormat::Yaml);
        assert!("xml".parse::<ReportFormat>().is_err());
    }

    #[test]
    fn test_json_keeps_wire_names() {
        let json: serde_json::Value =
            serde_json::from_str(&Reporter::to_json(&sample_run()).unwrap()).unwrap();
        let finding = &json["report"]["results"][0];
        assert_eq!(finding["documentationLevel"], "API");
        assert_eq!(finding["location"]["lineRange"]["start"], 12);
        assert_eq!(json["report"]["summary"]["criticalIssues"], 1);
    }

    #[test]
    fn test_text_lists_findings() {
        let text = Reporter::to_text(&sample_run());
        assert!(text.contains("[DRIFT-001] CRITICAL Incorrect drift at API level (Security)"));
        assert!(text.contains("/order-service/OrderController.java (createOrder) L12-30"));
        assert!(text.contains("Project: \"All endpoints require authentication\""));
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("reports/drift.yaml");
        Reporter::write(&sample_run(), &path, ReportFormat::Yaml).unwrap();
        let yaml = fs::read_to_string(&path).unwrap();
        assert!(yaml.contains("promptDigest: abc"));
    }
}
