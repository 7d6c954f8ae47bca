//! Source bundle
//!
//! Renders a source tree as one `<source_files>` container holding a
//! `<file name="...">` block per file. The directory structure stays an
//! explicit tree until rendering, so the container is emitted exactly once no
//! matter how deep the tree is.

use std::collections::BTreeSet;
use std::path::Path;
use tracing::{info, instrument, warn};

use super::language::detect_language;
use super::tree::{FileEntry, FileTree, TreeWalker};
use crate::constants::bundle::{CONTENT_INDENT, FILE_INDENT, SOURCE_CLOSE, SOURCE_OPEN};
use crate::types::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBundle {
    tree: FileTree,
}

impl SourceBundle {
    pub fn from_tree(tree: FileTree) -> Self {
        Self { tree }
    }

    /// Serialize to the tagged text embedded in the prompt
    pub fn render(&self) -> String {
        let blocks: Vec<String> = self.tree.files().into_iter().map(render_block).collect();
        if blocks.is_empty() {
            return format!("{}\n{}", SOURCE_OPEN, SOURCE_CLOSE);
        }
        format!("{}\n{}\n{}", SOURCE_OPEN, blocks.join("\n"), SOURCE_CLOSE)
    }

    /// No files at all; callers treat this as "no source", not as an error
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn file_count(&self) -> usize {
        self.tree.len()
    }

    pub fn paths(&self) -> Vec<String> {
        self.tree.relative_paths()
    }

    /// Languages detected from file extensions, sorted
    pub fn languages(&self) -> Vec<String> {
        self.tree
            .files()
            .into_iter()
            .filter_map(|f| detect_language(&f.relative_path))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(String::from)
            .collect()
    }

    pub fn tree(&self) -> &FileTree {
        &self.tree
    }
}

fn render_block(file: &FileEntry) -> String {
    format!(
        "{indent}<file name=\"{name}\">\n{content_indent}{content}\n{indent}</file>",
        indent = FILE_INDENT,
        name = file.relative_path,
        content_indent = CONTENT_INDENT,
        content = file.content,
    )
}

pub struct SourceBundleBuilder {
    walker: TreeWalker,
}

impl SourceBundleBuilder {
    pub fn new(walker: TreeWalker) -> Self {
        Self { walker }
    }

    #[instrument(skip(self), fields(root = %root.display()))]
    pub fn build(&self, root: &Path) -> Result<SourceBundle> {
        let bundle = SourceBundle::from_tree(self.walker.walk(root)?);
        if bundle.is_empty() {
            warn!("Source root contains no files");
        } else {
            info!(
                "Bundled {} source file(s) ({})",
                bundle.file_count(),
                bundle.languages().join(", ")
            );
        }
        Ok(bundle)
    }
}

impl Default for SourceBundleBuilder {
    fn default() -> Self {
        Self::new(TreeWalker::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_single_file_bundle() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "x.go", "package main");

        let bundle = SourceBundleBuilder::default().build(temp.path()).unwrap();
        assert_eq!(
            bundle.render(),
            "<source_files>\n    <file name=\"/x.go\">\n        package main\n    </file>\n</source_files>"
        );
        assert_eq!(bundle.languages(), vec!["Go"]);
    }

    #[test]
    fn test_empty_root() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("empty")).unwrap();

        let bundle = SourceBundleBuilder::default().build(temp.path()).unwrap();
        assert!(bundle.is_empty());
        assert_eq!(bundle.render(), "<source_files>\n</source_files>");
    }

    #[test]
    fn test_nested_services_share_one_container() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "order-service/OrderService.java", "class OrderService {}");
        write(temp.path(), "order-service/util/OrderUtils.java", "class OrderUtils {}");
        write(temp.path(), "payment-service/main.go", "package main");
        write(temp.path(), "README.txt", "services");

        let rendered = SourceBundleBuilder::default()
            .build(temp.path())
            .unwrap()
            .render();

        assert_eq!(rendered.matches(SOURCE_OPEN).count(), 1);
        assert_eq!(rendered.matches(SOURCE_CLOSE).count(), 1);
        assert!(rendered.starts_with(SOURCE_OPEN));
        assert!(rendered.ends_with(SOURCE_CLOSE));

        let order: Vec<usize> = [
            "/README.txt",
            "/order-service/OrderService.java",
            "/order-service/util/OrderUtils.java",
            "/payment-service/main.go",
        ]
        .iter()
        .map(|p| rendered.find(&format!("<file name=\"{}\">", p)).unwrap())
        .collect();
        assert!(order.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_languages_are_deduplicated() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a/A.java", "");
        write(temp.path(), "b/B.java", "");
        write(temp.path(), "c/app.py", "");

        let bundle = SourceBundleBuilder::default().build(temp.path()).unwrap();
        assert_eq!(bundle.languages(), vec!["Java", "Python"]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_single_container_at_any_depth(
            paths in prop::collection::btree_set(
                prop::collection::vec("[a-z]{1,5}", 2..5),
                1..10,
            )
        ) {
            let temp = TempDir::new().unwrap();
            for parts in &paths {
                write(temp.path(), &format!("{}.rs", parts.join("/")), "fn main() {}");
            }

            let builder = SourceBundleBuilder::default();
            let first = builder.build(temp.path()).unwrap().render();
            let second = builder.build(temp.path()).unwrap().render();

            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.matches(SOURCE_OPEN).count(), 1);
            prop_assert_eq!(first.matches(SOURCE_CLOSE).count(), 1);
            prop_assert_eq!(first.matches("<file name=").count(), paths.len());
        }
    }
}
