//! Writing pages and copying asset trees.

use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::BuildError;

/// Write a page, creating parent directories as needed.
pub fn write_page(path: &Path, html: &str) -> Result<(), BuildError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| BuildError::WriteError(format!("{}: {}", parent.display(), e)))?;
    }
    fs::write(path, html).map_err(|e| BuildError::WriteError(format!("{}: {}", path.display(), e)))
}

/// Copy every file under `from` into `to`, keeping relative paths.
///
/// Existing files at the destination are overwritten. Returns the number of
/// files copied.
pub fn copy_tree(from: &Path, to: &Path) -> Result<usize, BuildError> {
    if !from.is_dir() {
        return Err(BuildError::AssetsError(format!(
            "Asset directory not found: {}",
            from.display()
        )));
    }

    let mut copied = 0;
    for entry in WalkDir::new(from).follow_links(true) {
        let entry = entry.map_err(|e| BuildError::AssetsError(e.to_string()))?;
        let relative = entry.path().strip_prefix(from).unwrap_or(entry.path());
        let target = to.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
                .map_err(|e| BuildError::AssetsError(format!("{}: {}", target.display(), e)))?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| {
                    BuildError::AssetsError(format!("{}: {}", parent.display(), e))
                })?;
            }
            fs::copy(entry.path(), &target)
                .map_err(|e| BuildError::AssetsError(format!("{}: {}", target.display(), e)))?;
            copied += 1;
        }
    }

    tracing::debug!(
        "Copied {} asset files from {} to {}",
        copied,
        from.display(),
        to.display()
    );
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn copies_nested_tree() {
        let temp = tempdir().unwrap();
        let from = temp.path().join("frontend/public");
        let to = temp.path().join("site");
        fs::create_dir_all(from.join("js")).unwrap();
        fs::write(from.join("index.html"), "<html></html>").unwrap();
        fs::write(from.join("js/app.js"), "console.log(1)").unwrap();

        let copied = copy_tree(&from, &to).unwrap();

        assert_eq!(copied, 2);
        assert_eq!(fs::read_to_string(to.join("js/app.js")).unwrap(), "console.log(1)");
        assert!(to.join("index.html").is_file());
    }

    #[test]
    fn copy_overwrites_existing_files() {
        let temp = tempdir().unwrap();
        let from = temp.path().join("from");
        let to = temp.path().join("to");
        fs::create_dir_all(&from).unwrap();
        fs::create_dir_all(&to).unwrap();
        fs::write(from.join("a.txt"), "new").unwrap();
        fs::write(to.join("a.txt"), "old").unwrap();

        copy_tree(&from, &to).unwrap();

        assert_eq!(fs::read_to_string(to.join("a.txt")).unwrap(), "new");
    }

    #[test]
    fn missing_asset_directory_is_an_error() {
        let temp = tempdir().unwrap();

        let result = copy_tree(&temp.path().join("nope"), &temp.path().join("out"));

        assert!(matches!(result, Err(BuildError::AssetsError(_))));
    }

    #[test]
    fn write_page_creates_parents() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("docs/guide/a.html");

        write_page(&path, "<p>A</p>").unwrap();

        assert_eq!(fs::read_to_string(path).unwrap(), "<p>A</p>");
    }
}
