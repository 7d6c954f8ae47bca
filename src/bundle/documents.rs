//! Documentation aggregation
//!
//! Concatenates every file of a documentation tree into one text blob, each
//! file introduced by a `File: <path>` header.

use std::path::Path;
use tracing::{info, instrument};

use super::tree::{FileTree, TreeWalker};
use crate::types::Result;

/// Aggregated documentation for one root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedDocuments {
    pub text: String,
    /// Relative paths of every aggregated file, in output order
    pub paths: Vec<String>,
}

impl AggregatedDocuments {
    pub fn from_tree(tree: &FileTree) -> Self {
        let files = tree.files();
        let mut text = String::new();
        let mut paths = Vec::with_capacity(files.len());

        for file in files {
            text.push_str("\n\n---\nFile: ");
            text.push_str(&file.relative_path);
            text.push_str("\n---\n");
            text.push_str(&file.content);
            paths.push(file.relative_path.clone());
        }

        Self { text, paths }
    }
}

pub struct DocumentAggregator {
    walker: TreeWalker,
}

impl DocumentAggregator {
    pub fn new(walker: TreeWalker) -> Self {
        Self { walker }
    }

    /// Aggregated text of every file under `root`
    pub fn aggregate(&self, root: &Path) -> Result<String> {
        self.collect(root).map(|docs| docs.text)
    }

    /// Aggregated text plus the list of files it was built from
    #[instrument(skip(self), fields(root = %root.display()))]
    pub fn collect(&self, root: &Path) -> Result<AggregatedDocuments> {
        let tree = self.walker.walk(root)?;
        let docs = AggregatedDocuments::from_tree(&tree);
        info!(
            "Aggregated {} documentation file(s), {} bytes",
            docs.paths.len(),
            docs.text.len()
        );
        Ok(docs)
    }
}

impl Default for DocumentAggregator {
    fn default() -> Self {
        Self::new(TreeWalker::new())
    }
}
