//! Content file discovery by filesystem walking.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ContentError;

/// Location of a content file found by the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ContentRef {
    /// Absolute file path.
    pub file_path: PathBuf,
    /// Path relative to the content directory, `/`-separated.
    pub relative_path: String,
}

/// Walk `content_dir` and collect every `.md` and `.mdx` file.
///
/// Hidden files and directories are skipped. Results are sorted by relative
/// path. A missing content directory yields an empty list.
pub(crate) fn scan(content_dir: &Path) -> Result<Vec<ContentRef>, ContentError> {
    let mut refs = Vec::new();
    if content_dir.is_dir() {
        scan_directory(content_dir, "", &mut refs)?;
    }
    refs.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    Ok(refs)
}

fn scan_directory(dir: &Path, prefix: &str, refs: &mut Vec<ContentRef>) -> Result<(), ContentError> {
    let entries = fs::read_dir(dir).map_err(|e| ContentError::io(dir, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| ContentError::io(dir, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }

        let path = entry.path();
        let relative = if prefix.is_empty() {
            name
        } else {
            format!("{prefix}/{name}")
        };

        let is_dir = entry
            .file_type()
            .map_err(|e| ContentError::io(&path, e))?
            .is_dir();
        if is_dir {
            scan_directory(&path, &relative, refs)?;
        } else if is_content_file(&path) {
            refs.push(ContentRef {
                file_path: path,
                relative_path: relative,
            });
        }
    }

    Ok(())
}

fn is_content_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("mdx"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn relative_paths(refs: &[ContentRef]) -> Vec<&str> {
        refs.iter().map(|r| r.relative_path.as_str()).collect()
    }

    #[test]
    fn test_scan_collects_markdown_recursively() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("blog/release")).unwrap();
        fs::write(dir.path().join("about.md"), "# About").unwrap();
        fs::write(dir.path().join("blog/release/2022-11-11-v18.mdx"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let refs = scan(dir.path()).unwrap();

        assert_eq!(
            relative_paths(&refs),
            vec!["about.md", "blog/release/2022-11-11-v18.mdx"]
        );
        assert_eq!(refs[0].file_path, dir.path().join("about.md"));
    }

    #[test]
    fn test_scan_skips_hidden_entries() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(".drafts")).unwrap();
        fs::write(dir.path().join(".drafts/wip.md"), "").unwrap();
        fs::write(dir.path().join(".hidden.md"), "").unwrap();
        fs::write(dir.path().join("visible.md"), "").unwrap();

        let refs = scan(dir.path()).unwrap();

        assert_eq!(relative_paths(&refs), vec!["visible.md"]);
    }

    #[test]
    fn test_scan_missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        let refs = scan(&dir.path().join("missing")).unwrap();
        assert!(refs.is_empty());
    }
}
