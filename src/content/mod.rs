//! The content-resolution engine.
//!
//! This module family turns a content tree into an output tree:
//!
//! - **meta**: parse `Tag: value` document headers
//! - **template**: resolve templates by walking parent directories
//! - **page**: merge variable scopes into a rendered-ready page
//! - **aggregate**: fold `_`-prefixed directories into ordered lists
//! - **walker**: depth-first traversal driving all of the above
//! - **output**: mirror files and write rendered pages
//!
//! # Build Flow
//!
//! ```text
//! walk_dir()
//!     │
//!     ├── aggregate()  ──► marker subdirectories become list variables
//!     ├── build_page() ──► documents render through their template
//!     ├── copy_file()  ──► everything else mirrors verbatim
//!     └── walk_dir()   ──► ordinary subdirectories recurse
//! ```

pub mod aggregate;
pub mod error;
pub mod meta;
pub mod output;
pub mod page;
pub mod template;
pub mod walker;

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Prefix character marking an aggregation directory.
pub const MARKER: char = '_';

/// File name holding directory-local template variables. Merged into the
/// scope of every document at or below its directory; never copied to output.
pub const VARS_FILE: &str = "vars.toml";

/// How a directory participates in the walk. A pure function of its basename;
/// the walk root is a position, not a name, so it has no variant here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirKind {
    /// Mirrored to output and recursed into.
    Ordinary,
    /// Aggregated into a list variable named by the stripped basename.
    Marker(String),
    /// Skipped entirely.
    Hidden,
}

/// Classify a directory by its basename.
///
/// A bare `_` would aggregate into a nameless list, so it is treated as
/// hidden rather than as a marker.
pub fn classify(basename: &str) -> DirKind {
    if basename.starts_with('.') || basename == "_" {
        return DirKind::Hidden;
    }
    match basename.strip_prefix(MARKER) {
        Some(stripped) => DirKind::Marker(stripped.to_string()),
        None => DirKind::Ordinary,
    }
}

/// Whether a file is a renderable document.
pub fn is_document(name: &str) -> bool {
    Path::new(name).extension().is_some_and(|ext| ext == "md")
}

/// A directory entry with its name decoded, ready for deterministic ordering.
#[derive(Debug)]
pub(crate) struct Entry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
}

/// Read a directory's entries sorted lexicographically by name.
///
/// Enumeration order is part of the build contract (aggregated lists and
/// sibling traversal must be reproducible), so the filesystem's order is
/// never used directly.
pub(crate) fn read_dir_sorted(dir: &Path) -> Result<Vec<Entry>> {
    let mut entries = Vec::new();
    let iter =
        fs::read_dir(dir).with_context(|| format!("failed to read directory `{}`", dir.display()))?;

    for entry in iter {
        let entry = entry.with_context(|| format!("failed to read directory `{}`", dir.display()))?;
        let file_type = entry
            .file_type()
            .with_context(|| format!("failed to stat `{}`", entry.path().display()))?;
        // symlinked directories are walked like real ones
        let is_dir = if file_type.is_symlink() {
            entry.path().is_dir()
        } else {
            file_type.is_dir()
        };
        entries.push(Entry {
            name: entry.file_name().to_string_lossy().into_owned(),
            path: entry.path(),
            is_dir,
        });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_ordinary() {
        assert_eq!(classify("posts"), DirKind::Ordinary);
        assert_eq!(classify("a_b"), DirKind::Ordinary);
    }

    #[test]
    fn test_classify_marker_strips_prefix() {
        assert_eq!(classify("_lists"), DirKind::Marker("lists".into()));
        assert_eq!(classify("_a"), DirKind::Marker("a".into()));
    }

    #[test]
    fn test_classify_double_marker_strips_one() {
        assert_eq!(classify("__x"), DirKind::Marker("_x".into()));
    }

    #[test]
    fn test_classify_hidden() {
        assert_eq!(classify(".git"), DirKind::Hidden);
        assert_eq!(classify(".hidden"), DirKind::Hidden);
        // a bare marker has no name to aggregate under
        assert_eq!(classify("_"), DirKind::Hidden);
    }

    #[test]
    fn test_is_document() {
        assert!(is_document("page.md"));
        assert!(!is_document("page.html"));
        assert!(!is_document("default.jinja"));
        assert!(!is_document("md"));
    }

    #[test]
    fn test_read_dir_sorted_is_lexicographic() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["zeta.md", "alpha.md", "mid.md"] {
            fs::write(tmp.path().join(name), "").unwrap();
        }
        fs::create_dir(tmp.path().join("beta")).unwrap();

        let names: Vec<_> = read_dir_sorted(tmp.path())
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["alpha.md", "beta", "mid.md", "zeta.md"]);
    }
}
