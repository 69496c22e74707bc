//! Access to Markdown content, on disk or in memory.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use walkdir::WalkDir;

/// Read-only view of a content tree.
///
/// Builders only ever read sources through this trait, so the whole
/// pipeline can run against an in-memory fixture.
pub trait ContentSource {
    /// Whether `path` exists and is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Regular files under `root`, sorted by path.
    ///
    /// When `recursive` is false only direct children are listed.
    fn list_files(&self, root: &Path, recursive: bool) -> io::Result<Vec<PathBuf>>;

    /// Read a file as UTF-8 text.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Last modification time of a file.
    fn modified(&self, path: &Path) -> io::Result<SystemTime>;
}

/// Content read from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSource;

impl ContentSource for FsSource {
    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_files(&self, root: &Path, recursive: bool) -> io::Result<Vec<PathBuf>> {
        let walker = WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .min_depth(1)
            .max_depth(if recursive { usize::MAX } else { 1 });

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(io::Error::from)?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn modified(&self, path: &Path) -> io::Result<SystemTime> {
        fs::metadata(path)?.modified()
    }
}

/// A file held by [`MemorySource`].
#[derive(Debug, Clone)]
struct MemoryFile {
    contents: String,
    modified: SystemTime,
}

/// In-memory content tree.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: BTreeMap<PathBuf, MemoryFile>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with the given contents and modification time.
    pub fn insert(
        &mut self,
        path: impl Into<PathBuf>,
        contents: impl Into<String>,
        modified: SystemTime,
    ) -> &mut Self {
        self.files.insert(
            path.into(),
            MemoryFile {
                contents: contents.into(),
                modified,
            },
        );
        self
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{} not found", path.display()),
    )
}

impl ContentSource for MemorySource {
    fn is_dir(&self, path: &Path) -> bool {
        self.files
            .keys()
            .any(|file| file != path && file.starts_with(path))
    }

    fn list_files(&self, root: &Path, recursive: bool) -> io::Result<Vec<PathBuf>> {
        Ok(self
            .files
            .keys()
            .filter(|file| *file != root && file.starts_with(root))
            .filter(|file| recursive || file.parent() == Some(root))
            .cloned()
            .collect())
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files
            .get(path)
            .map(|f| f.contents.clone())
            .ok_or_else(|| not_found(path))
    }

    fn modified(&self, path: &Path) -> io::Result<SystemTime> {
        self.files
            .get(path)
            .map(|f| f.modified)
            .ok_or_else(|| not_found(path))
    }
}
