//! Prompt Command
//!
//! Assembles the analysis prompt without contacting the engine. Useful for
//! reviewing exactly what would be sent.

use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, InputOverrides};
use crate::pipeline::prepare_prompt;
use crate::types::{DriftError, Result};

pub async fn run(
    config_path: Option<&Path>,
    inputs: &InputOverrides,
    output: Option<PathBuf>,
) -> Result<()> {
    let ctx = CommandContext::load(config_path, inputs)?;
    let template = ctx.template()?;
    let prepared = prepare_prompt(&ctx.run_config(), &template).await?;

    match output {
        Some(path) => {
            fs::write(&path, &prepared.text).map_err(|e| DriftError::io(&path, e))?;
            let out = Output::new();
            out.success(&format!("Prompt written to {}", path.display()));
            out.detail("Bytes", prepared.text.len());
            out.detail("Source files", prepared.source_files);
            out.detail("Documents", prepared.document_files);
            out.detail("SHA-256", &prepared.digest);
        }
        None => print!("{}", prepared.text),
    }

    Ok(())
}
