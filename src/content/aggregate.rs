//! Marker-directory aggregation.
//!
//! A directory whose basename starts with `_` is not mirrored to output.
//! Its direct `.md` children are built into pages and exposed on the
//! enclosing directory's namespace as an ordered list named after the
//! directory with the marker stripped: documents in `_lists/` become the
//! `lists` variable of their parent's pages.
//!
//! Everything else inside a marker directory behaves like ordinary content,
//! except that its output path uses the stripped component, so no output
//! path ever contains a marker-prefixed name.

use crate::content::page::{Page, PageValue};
use crate::content::walker::Walker;
use crate::content::{DirKind, classify, is_document, read_dir_sorted};
use anyhow::Result;
use std::path::Path;

impl Walker<'_> {
    /// Aggregate a marker directory into an ordered list of pages.
    ///
    /// `out_rel` is the output-relative path with the marker already
    /// stripped from the final component. List entries are lexicographic by
    /// filename and are never written to output; static files are copied
    /// under `out_rel`, and ordinary subdirectories recurse under it.
    pub(crate) fn aggregate(
        &mut self,
        dir: &Path,
        out_rel: &Path,
        inherited: &Page,
    ) -> Result<Vec<Page>> {
        let entries = read_dir_sorted(dir)?;
        let scope = self.dir_scope(dir, inherited)?;

        // Nested marker directories aggregate first; their lists are visible
        // to this marker directory's own entries.
        let mut doc_scope = scope.clone();
        for entry in entries.iter().filter(|e| e.is_dir) {
            if let DirKind::Marker(name) = classify(&entry.name) {
                let list = self.aggregate(&entry.path, &out_rel.join(&name), &scope)?;
                doc_scope.insert(name, PageValue::List(list));
            }
        }

        let mut items = Vec::new();
        for entry in entries.iter().filter(|e| !e.is_dir) {
            if entry.name.starts_with('.') {
                continue;
            }
            if is_document(&entry.name) {
                let rel = entry
                    .path
                    .strip_prefix(&self.config.build.content)
                    .unwrap_or(&entry.path)
                    .to_path_buf();
                if let Some(built) =
                    self.builder
                        .build(&mut self.resolver, &entry.path, &rel, &doc_scope)?
                {
                    self.stats.aggregated += 1;
                    items.push(built.page);
                } else {
                    self.stats.skipped += 1;
                }
            } else if self.is_copyable(&entry.name) {
                self.copy_file(&entry.path, &out_rel.join(&entry.name))?;
            }
        }

        // Ordinary subdirectories of a marker directory are walked normally,
        // their output living under the stripped component.
        for entry in entries.iter().filter(|e| e.is_dir) {
            if classify(&entry.name) == DirKind::Ordinary {
                self.walk_dir(&entry.path, &out_rel.join(&entry.name), &scope, false)?;
            }
        }

        Ok(items)
    }
}

// ============================================================================
// Tests
// ============================================================================
