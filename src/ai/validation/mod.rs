//! Engine answer validation
//!
//! Recovers the JSON object from free-form engine output. Schema and
//! consistency checks on the recovered object live in `report::contract`.

mod json_extract;

pub use json_extract::{ExtractionSource, JsonExtractor, extract_json_object};
