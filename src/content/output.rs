//! Output tree writer.
//!
//! Maps walker-provided output-relative paths to disk: rendered pages have
//! their Markdown extension replaced by the configured output extension,
//! everything else is mirrored verbatim. The writer remembers every path it
//! touches so the build can remove stale output afterwards; repeated builds
//! of the same content tree produce byte-identical output with no leftovers.

use crate::content::error::BuildError;
use anyhow::{Result, bail};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug)]
pub struct OutputWriter {
    root: PathBuf,
    output_ext: String,
    written: BTreeSet<PathBuf>,
}

impl OutputWriter {
    pub fn new(root: impl Into<PathBuf>, output_ext: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            output_ext: output_ext.into(),
            written: BTreeSet::new(),
        }
    }

    /// Number of files written or copied so far.
    pub fn written_count(&self) -> usize {
        self.written.len()
    }

    /// Map a page's output-relative source path to its output file name
    /// (`sub/page.md` → `sub/page.html`).
    pub fn page_path(&self, rel: &Path) -> PathBuf {
        if rel.extension().is_some_and(|ext| ext == "md") {
            rel.with_extension(&self.output_ext)
        } else {
            rel.to_path_buf()
        }
    }

    /// Write a rendered page at the mapped output path, overwriting any
    /// existing file.
    pub fn write_page(&mut self, rel: &Path, contents: &[u8]) -> Result<PathBuf> {
        let rel = self.page_path(rel);
        let dest = self.root.join(&rel);
        self.prepare_parent(&dest)?;

        if let Err(source) = fs::write(&dest, contents) {
            bail!(BuildError::OutputWrite { path: dest, source });
        }
        self.written.insert(rel.clone());
        Ok(rel)
    }

    /// Mirror a non-document file verbatim at the output-relative path.
    pub fn copy_file(&mut self, rel: &Path, src: &Path) -> Result<()> {
        let dest = self.root.join(rel);
        self.prepare_parent(&dest)?;

        if let Err(source) = fs::copy(src, &dest) {
            bail!(BuildError::OutputWrite { path: dest, source });
        }
        self.written.insert(rel.to_path_buf());
        Ok(())
    }

    fn prepare_parent(&self, dest: &Path) -> Result<()> {
        if let Some(parent) = dest.parent()
            && let Err(source) = fs::create_dir_all(parent)
        {
            bail!(BuildError::OutputWrite {
                path: parent.to_path_buf(),
                source,
            });
        }
        Ok(())
    }

    /// Snapshot of files currently present under the output root, as
    /// output-relative paths. Taken before a build to find stale files after.
    pub fn existing_files(&self) -> BTreeSet<PathBuf> {
        WalkDir::new(&self.root)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                entry
                    .path()
                    .strip_prefix(&self.root)
                    .ok()
                    .map(Path::to_path_buf)
            })
            .collect()
    }

    /// Remove files that existed before the build but were not rewritten,
    /// pruning directories this leaves empty. Returns how many files were
    /// removed.
    pub fn remove_stale(&self, before: &BTreeSet<PathBuf>) -> Result<usize> {
        let mut removed = 0;
        for rel in before.difference(&self.written) {
            let path = self.root.join(rel);
            if let Err(source) = fs::remove_file(&path) {
                bail!(BuildError::OutputWrite { path, source });
            }
            removed += 1;

            let mut dir = path.parent();
            while let Some(current) = dir {
                if current == self.root || !is_empty_dir(current) {
                    break;
                }
                if fs::remove_dir(current).is_err() {
                    break;
                }
                dir = current.parent();
            }
        }
        Ok(removed)
    }
}

fn is_empty_dir(dir: &Path) -> bool {
    fs::read_dir(dir)
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false)
}

// ============================================================================
// Tests
// ============================================================================
