//! Hierarchical template resolution.
//!
//! Templates are not collected in a central directory: a document's template
//! is the nearest file of the requested name, searching the document's own
//! directory first and then each parent up to the content root. A directory
//! thus inherits its ancestors' templates unless it supplies its own.

use crate::content::error::BuildError;
use anyhow::{Context, Result, bail};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A resolved template: where it was found and what it contains.
#[derive(Debug)]
pub struct TemplateRef {
    /// Qualified file name that was searched for (extension included).
    pub name: String,
    /// Full path of the file that satisfied the search.
    pub path: PathBuf,
    /// Directory the file was found in.
    pub dir: PathBuf,
    /// Template source text.
    pub source: String,
}

/// Finds templates by walking from a starting directory up to the content
/// root. Resolution depends only on the hierarchy and the requested name, so
/// results are memoized; repeated lookups return the same [`TemplateRef`].
#[derive(Debug)]
pub struct TemplateResolver {
    root: PathBuf,
    template_ext: String,
    cache: HashMap<(PathBuf, String), Arc<TemplateRef>>,
}

impl TemplateResolver {
    pub fn new(root: impl Into<PathBuf>, template_ext: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            template_ext: template_ext.into(),
            cache: HashMap::new(),
        }
    }

    /// Qualify a requested name with the template extension when it has none
    /// (`awesome` → `awesome.jinja`).
    fn qualify(&self, name: &str) -> String {
        if Path::new(name).extension().is_some() {
            name.to_string()
        } else {
            format!("{name}.{}", self.template_ext)
        }
    }

    /// Resolve `name` starting at `start`, searching upward to the content
    /// root. Exactly one candidate file name is probed per level.
    pub fn resolve(&mut self, start: &Path, name: &str) -> Result<Arc<TemplateRef>> {
        let name = self.qualify(name);
        let key = (start.to_path_buf(), name.clone());
        if let Some(template) = self.cache.get(&key) {
            return Ok(template.clone());
        }

        let mut dir = start;
        loop {
            let candidate = dir.join(&name);
            if candidate.is_file() {
                let source = fs::read_to_string(&candidate).with_context(|| {
                    format!("failed to read template `{}`", candidate.display())
                })?;
                let template = Arc::new(TemplateRef {
                    name,
                    dir: dir.to_path_buf(),
                    path: candidate,
                    source,
                });
                self.cache.insert(key, template.clone());
                return Ok(template);
            }

            if dir == self.root {
                break;
            }
            dir = match dir.parent() {
                Some(parent) => parent,
                None => break,
            };
        }

        bail!(BuildError::TemplateNotFound {
            name,
            start: start.to_path_buf(),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
