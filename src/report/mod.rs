//! Drift report handling
//!
//! - `contract`: turns engine output into a validated `DriftReport`
//! - `render`: console, JSON and YAML output of a finished run

mod contract;
mod render;

pub use contract::{ContractValidator, parse_report};
pub use render::{ReportFormat, Reporter};
