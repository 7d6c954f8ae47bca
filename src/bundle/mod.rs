//! Source and documentation aggregation
//!
//! Turns directory trees into the text bundles embedded in the analysis
//! prompt. Every walk is deterministic and all-or-nothing: a file that cannot
//! be read fails the walk instead of disappearing from the prompt.

pub mod documents;
pub mod language;
pub mod source;
pub mod tree;

pub use documents::{AggregatedDocuments, DocumentAggregator};
pub use language::detect_language;
pub use source::{SourceBundle, SourceBundleBuilder};
pub use tree::{DirNode, FileEntry, FileTree, TreeWalker};
