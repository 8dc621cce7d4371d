//! Page model and builder.
//!
//! A [`Page`] is the rendered-ready record for one document: an ordered
//! key/value namespace combining global variables, directory-local
//! variables, aggregated lists, the document's own metadata, and the
//! system-populated fields (`content`, `filename`, `htmlfile`). Pages are
//! built once, handed to the template engine, and never mutated afterwards.

use crate::config::SiteConfig;
use crate::content::meta;
use crate::content::template::{TemplateRef, TemplateResolver};
use crate::render::{engine::Engine, markdown};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// One value in a page namespace.
#[derive(Debug, Clone)]
pub enum PageValue {
    /// Metadata tag value or rendered content.
    Text(String),
    /// Parsed `date` tag, serialized as `YYYY-MM-DD`.
    Date(NaiveDate),
    /// Global or directory-local configuration variable.
    Config(toml::Value),
    /// Aggregated list installed by a marker directory.
    List(Vec<Page>),
}

/// Ordered key/value namespace for one document.
///
/// Entries keep insertion order; inserting an existing key replaces its
/// value in place. Templates see this as the `page` variable.
#[derive(Debug, Clone, Default)]
pub struct Page {
    entries: Vec<(String, PageValue)>,
}

impl Page {
    pub fn insert(&mut self, key: impl Into<String>, value: PageValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&PageValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Convenience accessor for text-valued entries.
    #[allow(unused)]
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some(PageValue::Text(value)) => Some(value),
            _ => None,
        }
    }

    #[allow(unused)]
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    #[allow(unused)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[allow(unused)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Page {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Serialize for PageValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PageValue::Text(value) => serializer.serialize_str(value),
            PageValue::Date(date) => {
                serializer.serialize_str(&date.format("%Y-%m-%d").to_string())
            }
            PageValue::Config(value) => value.serialize(serializer),
            PageValue::List(pages) => {
                let mut seq = serializer.serialize_seq(Some(pages.len()))?;
                for page in pages {
                    seq.serialize_element(page)?;
                }
                seq.end()
            }
        }
    }
}

/// A built document: its namespace and the template that will frame it.
#[derive(Debug)]
pub struct BuiltPage {
    pub page: Page,
    pub template: Arc<TemplateRef>,
}

/// Builds a [`Page`] from a document on disk: metadata parse, template
/// resolution, scope merge, body conversion.
#[derive(Debug)]
pub struct PageBuilder<'a> {
    pub config: &'a SiteConfig,
    pub engine: &'a Engine,
}

impl PageBuilder<'_> {
    /// Build the page for `source`. `rel` is its content-root-relative path;
    /// `scope` carries the lower-priority variables (globals, directory-local
    /// variables, aggregated lists) already merged in order.
    ///
    /// Returns `None` for documents that opt out (`skip` tag or no header).
    pub fn build(
        &self,
        resolver: &mut TemplateResolver,
        source: &Path,
        rel: &Path,
        scope: &Page,
    ) -> Result<Option<BuiltPage>> {
        let text = fs::read_to_string(source)
            .with_context(|| format!("failed to read document `{}`", source.display()))?;

        let Some(doc) = meta::parse(&text, source, self.config.build.date_from_filename)? else {
            return Ok(None);
        };

        let dir = source.parent().unwrap_or(Path::new(""));
        let requested = doc
            .meta
            .template()
            .unwrap_or(&self.config.build.default_template);
        let template = resolver
            .resolve(dir, requested)
            .with_context(|| format!("in document `{}`", source.display()))?;

        // Scope merge, lowest priority first: the incoming scope, then the
        // document's metadata, then the system-populated fields.
        let mut page = scope.clone();
        for (key, value) in doc.meta.iter() {
            if key == "date" {
                continue; // replaced by its parsed form below
            }
            page.insert(key, PageValue::Text(value.to_string()));
        }
        if let Some(date) = doc.date {
            page.insert("date", PageValue::Date(date));
        }

        let filename = rel.to_string_lossy().replace('\\', "/");
        let htmlfile = Path::new(&filename)
            .with_extension(&self.config.build.output_ext)
            .to_string_lossy()
            .replace('\\', "/");
        page.insert("filename", PageValue::Text(filename.clone()));
        page.insert("htmlfile", PageValue::Text(htmlfile));

        // Body: optional template pass first (so Markdown source can use
        // template expressions), then Markdown conversion.
        let body = if self.config.build.markdown_templating {
            self.engine.render_body(&filename, doc.body, &page)?
        } else {
            doc.body.to_string()
        };
        page.insert("content", PageValue::Text(markdown::to_html(&body)));

        Ok(Some(BuiltPage { page, template }))
    }
}

// ============================================================================
// Tests
// ============================================================================
