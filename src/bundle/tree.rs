//! Deterministic directory walking
//!
//! Reads a directory root into an explicit tree of file entries. Both
//! aggregators render from this tree, so visitation order is defined once:
//! a directory's own files (by name), then each subdirectory (by name),
//! recursively.

use glob::Pattern;
use ignore::WalkBuilder;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::types::{DriftError, Result};

/// A regular file read from the walked tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Path relative to the display root, `/`-prefixed and `/`-separated
    pub relative_path: String,
    /// Absolute (canonical) path on disk
    pub path: PathBuf,
    pub content: String,
}

impl FileEntry {
    pub fn file_name(&self) -> &str {
        self.relative_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.relative_path)
    }
}

/// One directory level: files sorted by name, subdirectories by name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirNode {
    pub files: Vec<FileEntry>,
    pub dirs: BTreeMap<String, DirNode>,
}

impl DirNode {
    fn insert(&mut self, dirs: &[String], file: FileEntry) {
        match dirs.split_first() {
            None => self.files.push(file),
            Some((head, rest)) => self
                .dirs
                .entry(head.clone())
                .or_default()
                .insert(rest, file),
        }
    }

    fn sort(&mut self) {
        self.files
            .sort_by(|a, b| a.file_name().cmp(b.file_name()));
        for dir in self.dirs.values_mut() {
            dir.sort();
        }
    }

    /// Own files first, then each subdirectory depth-first
    fn collect<'a>(&'a self, out: &mut Vec<&'a FileEntry>) {
        out.extend(self.files.iter());
        for dir in self.dirs.values() {
            dir.collect(out);
        }
    }

    pub fn file_count(&self) -> usize {
        self.files.len() + self.dirs.values().map(DirNode::file_count).sum::<usize>()
    }
}

/// Result of walking one root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTree {
    root: PathBuf,
    top: DirNode,
}

impl FileTree {
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn top(&self) -> &DirNode {
        &self.top
    }

    /// All files in depth-first order
    pub fn files(&self) -> Vec<&FileEntry> {
        let mut out = Vec::with_capacity(self.len());
        self.top.collect(&mut out);
        out
    }

    pub fn relative_paths(&self) -> Vec<String> {
        self.files()
            .into_iter()
            .map(|f| f.relative_path.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.top.file_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Walks a root into a [`FileTree`]
///
/// Every regular file is read in full; the first listing or read failure
/// aborts the walk. Hidden files and ignore files get no special treatment.
/// Symlinks are not followed.
#[derive(Debug, Clone, Default)]
pub struct TreeWalker {
    display_root: Option<PathBuf>,
    exclude: Vec<Pattern>,
}

impl TreeWalker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Strip this prefix instead of the walked root when rendering paths
    pub fn with_display_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.display_root = Some(root.into());
        self
    }

    /// Skip paths (relative to the walked root) matching any glob
    pub fn with_exclude(mut self, patterns: &[String]) -> Result<Self> {
        self.exclude = patterns
            .iter()
            .map(|p| {
                Pattern::new(p).map_err(|e| {
                    DriftError::Config(format!("Invalid exclude pattern '{}': {}", p, e))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(self)
    }

    #[instrument(skip(self), fields(root = %root.display()))]
    pub fn walk(&self, root: &Path) -> Result<FileTree> {
        let root = fs::canonicalize(root).map_err(|e| DriftError::io(root, e))?;
        if !root.is_dir() {
            return Err(DriftError::Walk {
                root,
                message: "not a directory".to_string(),
            });
        }

        let display_root = match &self.display_root {
            Some(display) => fs::canonicalize(display).map_err(|e| DriftError::io(display, e))?,
            None => root.clone(),
        };
        if !root.starts_with(&display_root) {
            return Err(DriftError::Config(format!(
                "Display root {} does not contain {}",
                display_root.display(),
                root.display()
            )));
        }

        let exclude = Arc::new(self.exclude.clone());
        let filter_root = root.clone();
        let walker = WalkBuilder::new(&root)
            .standard_filters(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                let Ok(relative) = entry.path().strip_prefix(&filter_root) else {
                    return true;
                };
                let relative = to_slash_path(relative);
                relative.is_empty() || !exclude.iter().any(|p| p.matches(&relative))
            })
            .build();

        let mut top = DirNode::default();
        for entry in walker {
            let entry = entry.map_err(|e| DriftError::Walk {
                root: root.clone(),
                message: e.to_string(),
            })?;

            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let path = entry.path();
            let content = fs::read_to_string(path).map_err(|e| DriftError::io(path, e))?;

            let parent_dirs: Vec<String> = path
                .parent()
                .and_then(|p| p.strip_prefix(&root).ok())
                .map(normal_components)
                .unwrap_or_default();

            let display_path = path
                .strip_prefix(&display_root)
                .map(|p| format!("/{}", to_slash_path(p)))
                .unwrap_or_else(|_| path.to_string_lossy().to_string());

            debug!(path = %display_path, bytes = content.len(), "Read file");
            top.insert(
                &parent_dirs,
                FileEntry {
                    relative_path: display_path,
                    path: path.to_path_buf(),
                    content,
                },
            );
        }

        top.sort();
        Ok(FileTree { root, top })
    }
}

fn normal_components(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().to_string()),
            _ => None,
        })
        .collect()
}

fn to_slash_path(path: &Path) -> String {
    normal_components(path).join("/")
}
