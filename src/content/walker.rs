//! Content tree traversal.
//!
//! Depth-first walk of the content tree. Within each directory, marker
//! subdirectories are aggregated first so their lists are ready before any
//! of the directory's own documents render; then documents render; then
//! ordinary subdirectories recurse. No directory is visited twice, and
//! enumeration is lexicographic everywhere; the filesystem's own order is
//! never part of the result.

use crate::config::SiteConfig;
use crate::content::output::OutputWriter;
use crate::content::page::{Page, PageBuilder, PageValue};
use crate::content::template::TemplateResolver;
use crate::content::{DirKind, VARS_FILE, classify, is_document, read_dir_sorted};
use crate::log;
use crate::render::engine::Engine;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Counters reported after a build.
#[derive(Debug, Default)]
pub struct BuildStats {
    pub pages: usize,
    pub copied: usize,
    pub aggregated: usize,
    pub skipped: usize,
}

/// Drives the depth-first traversal.
pub struct Walker<'a> {
    pub(crate) config: &'a SiteConfig,
    pub(crate) builder: PageBuilder<'a>,
    pub(crate) resolver: TemplateResolver,
    pub(crate) writer: OutputWriter,
    pub(crate) stats: BuildStats,
}

impl<'a> Walker<'a> {
    pub fn new(config: &'a SiteConfig, engine: &'a Engine) -> Self {
        Self {
            config,
            builder: PageBuilder { config, engine },
            resolver: TemplateResolver::new(
                &config.build.content,
                config.build.template_ext.clone(),
            ),
            writer: OutputWriter::new(&config.build.output, config.build.output_ext.clone()),
            stats: BuildStats::default(),
        }
    }

    /// Walk the whole content tree. Returns the writer (which knows every
    /// path it wrote, for stale-output cleanup) and the build counters.
    pub fn run(mut self) -> Result<(OutputWriter, BuildStats)> {
        let root = self.config.build.content.clone();

        // Global variables form the outermost scope, in sorted key order so
        // the namespace is reproducible.
        let mut scope = Page::default();
        let mut keys: Vec<_> = self.config.vars.keys().cloned().collect();
        keys.sort();
        for key in keys {
            let value = self.config.vars[&key].clone();
            scope.insert(key, PageValue::Config(value));
        }

        self.walk_dir(&root, Path::new(""), &scope, true)?;
        Ok((self.writer, self.stats))
    }

    /// Process one directory: aggregate markers, render documents, copy
    /// other files, recurse into ordinary subdirectories.
    pub(crate) fn walk_dir(
        &mut self,
        dir: &Path,
        out_rel: &Path,
        inherited: &Page,
        is_root: bool,
    ) -> Result<()> {
        let entries = read_dir_sorted(dir)?;
        let scope = self.dir_scope(dir, inherited)?;

        // Marker subdirectories aggregate before anything here renders.
        // Their lists join the scope of this directory's own documents, but
        // do not propagate into subdirectories.
        let mut doc_scope = scope.clone();
        for entry in entries.iter().filter(|e| e.is_dir) {
            if let DirKind::Marker(name) = classify(&entry.name) {
                let list = self.aggregate(&entry.path, &out_rel.join(&name), &scope)?;
                doc_scope.insert(name, PageValue::List(list));
            }
        }

        for entry in entries.iter().filter(|e| !e.is_dir) {
            if entry.name.starts_with('.') {
                continue;
            }
            if is_document(&entry.name) {
                self.render_document(&entry.path, out_rel, &doc_scope)?;
            } else if self.is_copyable(&entry.name) {
                self.copy_file(&entry.path, &out_rel.join(&entry.name))?;
            }
        }

        for entry in entries.iter().filter(|e| e.is_dir) {
            if classify(&entry.name) != DirKind::Ordinary {
                continue;
            }
            // the configured root subdirectory maps onto the output root
            // instead of a like-named subdirectory
            let remap = is_root
                && self.config.build.root_subdir.as_deref() == Some(entry.name.as_str());
            let child_out = if remap {
                out_rel.to_path_buf()
            } else {
                out_rel.join(&entry.name)
            };
            self.walk_dir(&entry.path, &child_out, &scope, false)?;
        }

        Ok(())
    }

    /// Merge this directory's `vars.toml` (if any) over the inherited scope.
    pub(crate) fn dir_scope(&self, dir: &Path, inherited: &Page) -> Result<Page> {
        let vars_path = dir.join(VARS_FILE);
        if !vars_path.is_file() {
            return Ok(inherited.clone());
        }

        let text = fs::read_to_string(&vars_path)
            .with_context(|| format!("failed to read `{}`", vars_path.display()))?;
        let table: toml::Table = toml::from_str(&text)
            .with_context(|| format!("failed to parse `{}`", vars_path.display()))?;

        let mut scope = inherited.clone();
        for (key, value) in table {
            scope.insert(key, PageValue::Config(value));
        }
        Ok(scope)
    }

    /// Build, render, and write one document.
    pub(crate) fn render_document(
        &mut self,
        source: &Path,
        out_rel: &Path,
        scope: &Page,
    ) -> Result<()> {
        let rel = source
            .strip_prefix(&self.config.build.content)
            .unwrap_or(source)
            .to_path_buf();

        let Some(built) = self.builder.build(&mut self.resolver, source, &rel, scope)? else {
            self.stats.skipped += 1;
            log!("content"; "skip {}", rel.display());
            return Ok(());
        };

        let html = self
            .builder
            .engine
            .render_template(&built.template, &built.page)
            .with_context(|| format!("while rendering `{}`", rel.display()))?;

        let file_name = source.file_name().unwrap_or_default();
        self.writer
            .write_page(&out_rel.join(file_name), html.as_bytes())?;
        self.stats.pages += 1;
        log!("content"; "{}", rel.display());
        Ok(())
    }

    pub(crate) fn copy_file(&mut self, source: &Path, out_rel: &Path) -> Result<()> {
        self.writer.copy_file(out_rel, source)?;
        self.stats.copied += 1;
        Ok(())
    }

    /// Whether a non-document file mirrors to output. Hidden files, template
    /// files, and directory-local variable files stay out of the output tree.
    pub(crate) fn is_copyable(&self, name: &str) -> bool {
        let ext = Path::new(name).extension().and_then(|e| e.to_str());
        !name.starts_with('.')
            && name != VARS_FILE
            && ext != Some(self.config.build.template_ext.as_str())
    }
}

// ============================================================================
// Tests
// ============================================================================
