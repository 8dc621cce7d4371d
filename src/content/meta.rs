//! Document header parsing.
//!
//! A document opens with a contiguous block of `Tag: value` lines:
//!
//! ```text
//! Title: Hello
//! Template: post
//! Date: 2016-06-22
//!
//! Body text starts here.
//! ```
//!
//! Scanning stops at the first blank line or first line that is not a header
//! line; everything from that point on is body text. Tag names are
//! case-folded to lower case, values are taken verbatim (trimmed). The only
//! value that receives further parsing is `date`.

use crate::content::error::BuildError;
use crate::utils::date;
use anyhow::{Result, bail};
use chrono::NaiveDate;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

/// One header line: a tag starting with an ASCII letter, a colon, a value.
static HEADER_LINE: OnceLock<Regex> = OnceLock::new();

fn header_line() -> &'static Regex {
    HEADER_LINE.get_or_init(|| Regex::new(r"^([A-Za-z][^:]*):(.*)$").unwrap())
}

/// Ordered tag/value mapping parsed from a document header.
///
/// Keys are lower-cased; insertion order is header order; re-inserting a key
/// replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    entries: Vec<(String, String)>,
}

impl Metadata {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn insert(&mut self, key: String, value: String) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[allow(unused)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn title(&self) -> Option<&str> {
        self.get("title")
    }

    pub fn template(&self) -> Option<&str> {
        self.get("template")
    }

    /// Whether the document opts out of the build entirely.
    pub fn skip(&self) -> bool {
        self.get("skip").is_some_and(truthy)
    }
}

fn truthy(value: &str) -> bool {
    !(value.is_empty() || value == "0" || value.eq_ignore_ascii_case("false"))
}

/// Split a document into its header mapping and body text.
///
/// The body starts at the first blank or non-header line, inclusive.
pub fn parse_header(text: &str) -> (Metadata, &str) {
    let mut meta = Metadata::default();
    let mut body_start = 0;

    for line in text.split_inclusive('\n') {
        let stripped = line.trim_end_matches(['\n', '\r']);
        let Some(caps) = header_line().captures(stripped) else {
            break;
        };

        let tag = caps[1].trim().to_lowercase();
        let value = caps[2].trim().to_string();
        meta.insert(tag, value);
        body_start += line.len();
    }

    (meta, &text[body_start..])
}

/// A parsed document, ready for page building.
#[derive(Debug)]
pub struct ParsedDoc<'a> {
    pub meta: Metadata,
    pub date: Option<NaiveDate>,
    pub body: &'a str,
}

/// Parse a document's text into a [`ParsedDoc`].
///
/// Returns `None` when the document opts out: a truthy `skip` tag, or no
/// header at all. Otherwise a missing `title` is fatal, as is an explicit
/// `date` value that does not parse. When `infer_date` is set and no `date`
/// tag is present, the file stem is tried as a date; failure just leaves the
/// document dateless.
pub fn parse<'a>(text: &'a str, path: &Path, infer_date: bool) -> Result<Option<ParsedDoc<'a>>> {
    let (meta, body) = parse_header(text);
    if meta.is_empty() || meta.skip() {
        return Ok(None);
    }

    if meta.title().is_none() {
        bail!(BuildError::MissingTitle {
            path: path.to_path_buf(),
        });
    }

    let date = match meta.get("date") {
        Some(value) => match date::parse_date(value) {
            Some(parsed) => Some(parsed),
            None => bail!(BuildError::InvalidDate {
                path: path.to_path_buf(),
                value: value.to_string(),
            }),
        },
        None if infer_date => path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(date::date_from_stem),
        None => None,
    };

    Ok(Some(ParsedDoc { meta, date, body }))
}

// ============================================================================
// Tests
// ============================================================================
