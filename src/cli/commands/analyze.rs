//! Analyze Command
//!
//! Full drift analysis: aggregate, ask the engine, validate, report.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::ai::provider::{AnthropicClient, SharedEngine};
use crate::ai::retry::{RetryPolicy, RetryingEngine};
use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, InputOverrides};
use crate::pipeline::DriftPipeline;
use crate::report::{ReportFormat, Reporter};
use crate::types::{DriftError, Result};

#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    pub inputs: InputOverrides,
    pub model: Option<String>,
    pub output: Option<PathBuf>,
    pub format: ReportFormat,
    /// Save the engine's answer verbatim, before validation
    pub raw_output: Option<PathBuf>,
    pub no_retry: bool,
}

/// Returns true when the engine reported drift
pub async fn run(config_path: Option<&Path>, options: AnalyzeOptions) -> Result<bool> {
    let out = Output::new();
    let mut ctx = CommandContext::load(config_path, &options.inputs)?;
    if let Some(model) = &options.model {
        ctx.config.engine.model = model.clone();
    }
    let ctx = CommandContext::from_config(ctx.config)?;

    let template = ctx.template()?;
    let client = AnthropicClient::new(ctx.config.engine.resolve()?)?;
    let policy = if options.no_retry {
        RetryPolicy::disabled()
    } else {
        ctx.config.retry.policy()
    };
    let engine: SharedEngine = Arc::new(RetryingEngine::new(client, policy));

    let run_config = ctx.run_config();
    out.section("Drift analysis");
    out.detail("Source", run_config.source_root.display());
    out.detail("Project docs", run_config.project_docs_root.display());
    out.detail("Component docs", run_config.component_docs_root.display());
    if let Some(org) = &run_config.organization_docs_root {
        out.detail("Organization docs", org.display());
    }
    out.detail("Model", &ctx.config.engine.model);

    let pipeline = DriftPipeline::new(run_config, engine, template);
    let started = Instant::now();
    let exchange = pipeline.query().await?;

    if !exchange.prepared.has_source() {
        out.warning("No source files found; only documentation was analysed");
    }

    if let Some(raw_path) = &options.raw_output {
        fs::write(raw_path, &exchange.response.text).map_err(|e| DriftError::io(raw_path, e))?;
        out.info(&format!("Engine answer saved to {}", raw_path.display()));
    }

    let run = pipeline.conclude(exchange, started)?;

    match &options.output {
        Some(path) => {
            Reporter::write(&run, path, options.format)?;
            Reporter::print_summary(&run);
            out.success(&format!("Report saved to {}", path.display()));
        }
        None => match options.format {
            ReportFormat::Text => Reporter::print_summary(&run),
            ReportFormat::Json => println!("{}", Reporter::to_json(&run)?),
            ReportFormat::Yaml => print!("{}", Reporter::to_yaml(&run)?),
        },
    }

    Ok(!run.report.is_clean())
}
