//! Prompt assembly
//!
//! Turns aggregated bundles into the single request text sent to the engine.

mod drift;
mod template;

pub use drift::{DriftPromptInputs, assemble, load_drift_template};
pub use template::PromptTemplate;
