pub mod error;
pub mod report;

pub use error::{
    AnalysisError, ContractError, ContractViolation, DriftError, ErrorCategory, ErrorClass,
    Result, ViolationKind,
};
pub use report::*;
