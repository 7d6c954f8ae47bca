//! Validate Command
//!
//! Checks a saved engine answer against the drift result contract. File
//! references are checked against the configured input trees unless
//! `--no-reference-check` is given.

use std::fs;
use std::path::Path;

use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, InputOverrides};
use crate::pipeline::collect_known_paths;
use crate::report::{ContractValidator, Reporter, parse_report};
use crate::types::{DriftError, Result};

pub async fn run(config_path: Option<&Path>, answer: &Path, inputs: &InputOverrides) -> Result<()> {
    let ctx = CommandContext::load(config_path, inputs)?;
    let text = fs::read_to_string(answer).map_err(|e| DriftError::io(answer, e))?;

    let validator = if ctx.config.aggregation.check_references {
        ContractValidator::new().with_known_paths(collect_known_paths(&ctx.run_config()).await?)
    } else {
        ContractValidator::new()
    };

    let report = parse_report(&text, &validator)?;
    Reporter::print_report(&report);
    Output::new().success(&format!(
        "{} satisfies the drift result contract ({} finding(s))",
        answer.display(),
        report.results.len()
    ));
    Ok(())
}
