//! Markdown file discovery.

use std::path::{Path, PathBuf};

use crate::error::BuildError;
use crate::source::ContentSource;

/// How far below the root to look for files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    /// Direct children of the root only
    Shallow,
    /// Every descendant, without limit
    Recursive,
}

/// A Markdown source discovered under a collection root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    /// Full path as understood by the content source
    pub path: PathBuf,

    /// Path relative to the collection root
    pub relative_path: PathBuf,
}

/// The Markdown files found under one root.
///
/// Only paths are held; reading happens later through the content source.
/// A collection can be iterated as many times as needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    root: PathBuf,
    entries: Vec<SourceEntry>,
}

impl Collection {
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SourceEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a SourceEntry;
    type IntoIter = std::slice::Iter<'a, SourceEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Collect the Markdown files under `root`.
///
/// Returns `Ok(None)` when the root does not exist, which callers treat as
/// "nothing to build" rather than a failure.
pub fn collect_markdown(
    source: &dyn ContentSource,
    root: &Path,
    depth: Depth,
) -> Result<Option<Collection>, BuildError> {
    if !source.is_dir(root) {
        return Ok(None);
    }

    let files = source
        .list_files(root, depth == Depth::Recursive)
        .map_err(|e| BuildError::ReadError(format!("{}: {}", root.display(), e)))?;

    let entries = files
        .into_iter()
        .filter(|path| is_markdown(path))
        .map(|path| {
            let relative_path = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
            SourceEntry {
                path,
                relative_path,
            }
        })
        .collect();

    Ok(Some(Collection {
        root: root.to_path_buf(),
        entries,
    }))
}

/// Whether a file name carries the Markdown extension, ignoring case.
pub fn is_markdown(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.to_lowercase().ends_with(".md"))
        .unwrap_or(false)
}
