//! Drift detection pipeline
//!
//! ```text
//! source root ─┐
//! project docs ┼─ concurrent walks ─▶ assemble ─▶ engine ─▶ contract ─▶ DriftRun
//! component ───┤   (blocking pool)
//! org docs ────┘
//! ```
//!
//! All inputs come from an explicit [`RunConfig`]; nothing is read from
//! process-wide state once the run starts. Any failure aborts the run.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::ai::prompt::{DriftPromptInputs, PromptTemplate, assemble};
use crate::ai::provider::{EngineResponse, SharedEngine, TokenUsage};
use crate::bundle::{
    AggregatedDocuments, DocumentAggregator, SourceBundle, SourceBundleBuilder, TreeWalker,
};
use crate::config::Config;
use crate::report::{ContractValidator, parse_report};
use crate::types::{DriftReport, Result};

// =============================================================================
// Run Configuration
// =============================================================================

/// Inputs of one run, fixed before the first walk starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub source_root: PathBuf,
    pub project_docs_root: PathBuf,
    pub component_docs_root: PathBuf,
    pub organization_docs_root: Option<PathBuf>,
    pub display_root: Option<PathBuf>,
    pub exclude: Vec<String>,
    /// Reject findings that point at no aggregated file
    pub check_references: bool,
}

impl RunConfig {
    pub fn new(
        source_root: impl Into<PathBuf>,
        project_docs_root: impl Into<PathBuf>,
        component_docs_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source_root: source_root.into(),
            project_docs_root: project_docs_root.into(),
            component_docs_root: component_docs_root.into(),
            organization_docs_root: None,
            display_root: None,
            exclude: Vec::new(),
            check_references: true,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            source_root: config.paths.source_root.clone(),
            project_docs_root: config.paths.project_docs_root.clone(),
            component_docs_root: config.paths.component_docs_root.clone(),
            organization_docs_root: config.paths.organization_docs_root.clone(),
            display_root: config.paths.display_root.clone(),
            exclude: config.aggregation.exclude.clone(),
            check_references: config.aggregation.check_references,
        }
    }

    pub fn with_organization_docs(mut self, root: impl Into<PathBuf>) -> Self {
        self.organization_docs_root = Some(root.into());
        self
    }

    fn walker(&self) -> Result<TreeWalker> {
        let walker = TreeWalker::new().with_exclude(&self.exclude)?;
        Ok(match &self.display_root {
            Some(display) => walker.with_display_root(display),
            None => walker,
        })
    }
}

// =============================================================================
// Results
// =============================================================================

/// Assembled request text and what went into it
#[derive(Debug, Clone)]
pub struct PreparedPrompt {
    pub text: String,
    /// SHA-256 of `text`, lowercase hex
    pub digest: String,
    /// Display paths of every aggregated file
    pub known_paths: BTreeSet<String>,
    pub languages: Vec<String>,
    pub source_files: usize,
    pub document_files: usize,
}

impl PreparedPrompt {
    pub fn has_source(&self) -> bool {
        self.source_files > 0
    }
}

/// Prompt plus the engine's raw answer, before contract validation
#[derive(Debug, Clone)]
pub struct EngineExchange {
    pub prepared: PreparedPrompt,
    pub response: EngineResponse,
}

/// Validated report plus run metadata
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftRun {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub provider: String,
    pub model: String,
    pub prompt_digest: String,
    pub usage: TokenUsage,
    pub elapsed_ms: u64,
    pub languages: Vec<String>,
    pub source_files: usize,
    pub document_files: usize,
    pub report: DriftReport,
}

// =============================================================================
// Pipeline
// =============================================================================

pub struct DriftPipeline {
    config: RunConfig,
    engine: SharedEngine,
    template: PromptTemplate,
}

impl DriftPipeline {
    pub fn new(config: RunConfig, engine: SharedEngine, template: PromptTemplate) -> Self {
        Self {
            config,
            engine,
            template,
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Walk and assemble without contacting the engine
    pub async fn prepare(&self) -> Result<PreparedPrompt> {
        prepare_prompt(&self.config, &self.template).await
    }

    /// Prepare and send; the answer is not validated yet
    #[instrument(skip(self), fields(engine = self.engine.name(), model = self.engine.model()))]
    pub async fn query(&self) -> Result<EngineExchange> {
        let prepared = self.prepare().await?;
        info!(
            prompt_bytes = prepared.text.len(),
            digest = %prepared.digest,
            "Sending drift analysis request"
        );
        let response = self.engine.complete(&prepared.text).await?;
        Ok(EngineExchange { prepared, response })
    }

    /// Validate an engine answer against the contract
    pub fn conclude(&self, exchange: EngineExchange, started: Instant) -> Result<DriftRun> {
        let EngineExchange { prepared, response } = exchange;

        let validator = if self.config.check_references {
            ContractValidator::new().with_known_paths(prepared.known_paths.iter().cloned())
        } else {
            ContractValidator::new()
        };
        let report = parse_report(&response.text, &validator)?;

        info!(
            findings = report.results.len(),
            critical = report.summary.critical_issues,
            "Drift analysis complete"
        );

        Ok(DriftRun {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            provider: response.metadata.provider,
            model: response.metadata.model,
            prompt_digest: prepared.digest,
            usage: response.usage,
            elapsed_ms: started.elapsed().as_millis() as u64,
            languages: prepared.languages,
            source_files: prepared.source_files,
            document_files: prepared.document_files,
            report,
        })
    }

    /// Full run: walks, one engine call, contract validation
    pub async fn run(&self) -> Result<DriftRun> {
        let started = Instant::now();
        let exchange = self.query().await?;
        self.conclude(exchange, started)
    }
}

/// Every walked root of one run
struct WalkedInputs {
    source: SourceBundle,
    project: AggregatedDocuments,
    component: AggregatedDocuments,
    organization: Option<AggregatedDocuments>,
}

impl WalkedInputs {
    fn documents(&self) -> impl Iterator<Item = &AggregatedDocuments> {
        [Some(&self.project), Some(&self.component), self.organization.as_ref()]
            .into_iter()
            .flatten()
    }

    fn known_paths(&self) -> BTreeSet<String> {
        let mut paths: BTreeSet<String> = self.source.paths().into_iter().collect();
        for docs in self.documents() {
            paths.extend(docs.paths.iter().cloned());
        }
        paths
    }
}

/// Walk every root concurrently on the blocking pool
async fn walk_inputs(config: &RunConfig) -> Result<WalkedInputs> {
    let walker = config.walker()?;

    let source = spawn_walk(&walker, &config.source_root, |walker, root| {
        SourceBundleBuilder::new(walker).build(root)
    });
    let project = spawn_walk(&walker, &config.project_docs_root, collect_docs);
    let component = spawn_walk(&walker, &config.component_docs_root, collect_docs);
    let organization = config
        .organization_docs_root
        .as_ref()
        .map(|root| spawn_walk(&walker, root, collect_docs));

    let (source, project, component, organization) = tokio::try_join!(
        join_walk(source),
        join_walk(project),
        join_walk(component),
        join_optional(organization),
    )?;

    Ok(WalkedInputs {
        source,
        project,
        component,
        organization,
    })
}

/// Walk every root concurrently and assemble the prompt
#[instrument(skip_all, fields(source = %config.source_root.display()))]
pub async fn prepare_prompt(config: &RunConfig, template: &PromptTemplate) -> Result<PreparedPrompt> {
    let inputs = walk_inputs(config).await?;

    if inputs.source.is_empty() {
        warn!(
            "No source files under {}; analysing documentation only",
            config.source_root.display()
        );
    }

    let source_text = inputs.source.render();
    let text = assemble(
        template,
        &DriftPromptInputs {
            source_files: &source_text,
            project_documentation: &inputs.project.text,
            component_documentation: &inputs.component.text,
            organization_documentation: inputs.organization.as_ref().map(|docs| docs.text.as_str()),
        },
    )?;

    Ok(PreparedPrompt {
        digest: sha256_hex(&text),
        text,
        known_paths: inputs.known_paths(),
        languages: inputs.source.languages(),
        source_files: inputs.source.file_count(),
        document_files: inputs.documents().map(|docs| docs.paths.len()).sum(),
    })
}

/// Display paths of every file a run would aggregate
pub async fn collect_known_paths(config: &RunConfig) -> Result<BTreeSet<String>> {
    Ok(walk_inputs(config).await?.known_paths())
}

fn collect_docs(walker: TreeWalker, root: &Path) -> Result<AggregatedDocuments> {
    DocumentAggregator::new(walker).collect(root)
}

fn spawn_walk<T, F>(walker: &TreeWalker, root: &Path, walk: F) -> JoinHandle<Result<T>>
where
    T: Send + 'static,
    F: FnOnce(TreeWalker, &Path) -> Result<T> + Send + 'static,
{
    let walker = walker.clone();
    let root = root.to_path_buf();
    tokio::task::spawn_blocking(move || walk(walker, &root))
}

async fn join_walk<T>(handle: JoinHandle<Result<T>>) -> Result<T> {
    handle.await?
}

async fn join_optional<T>(handle: Option<JoinHandle<Result<T>>>) -> Result<Option<T>> {
    match handle {
        Some(handle) => handle.await?.map(Some),
        None => Ok(None),
    }
}

fn sha256_hex(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
