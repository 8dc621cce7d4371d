//! `[build]` section configuration.
//!
//! Paths, template defaults, and rendering switches.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[build]` section in canopy.toml - build pipeline configuration.
///
/// # Example
/// ```toml
/// [build]
/// content = "content"           # Source directory
/// output = "output"             # Output directory
/// default_template = "default.jinja"
/// root_subdir = "top"           # Files in content/top/ land at the output root
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Project root directory (usually set via CLI `--root`).
    #[serde(default = "defaults::build::root")]
    #[educe(Default = defaults::build::root())]
    pub root: Option<PathBuf>,

    /// Content source directory (Markdown files, templates, static files).
    #[serde(default = "defaults::build::content")]
    #[educe(Default = defaults::build::content())]
    pub content: PathBuf,

    /// Build output directory.
    #[serde(default = "defaults::build::output")]
    #[educe(Default = defaults::build::output())]
    pub output: PathBuf,

    /// Name of a content subdirectory whose files map to the output root
    /// instead of a like-named subdirectory.
    #[serde(default = "defaults::build::root_subdir")]
    #[educe(Default = defaults::build::root_subdir())]
    pub root_subdir: Option<String>,

    /// Template used when a document has no `template` tag.
    #[serde(default = "defaults::build::default_template")]
    #[educe(Default = defaults::build::default_template())]
    pub default_template: String,

    /// Extension identifying template files. Appended to `template` tag
    /// values that carry no extension; such files are never copied to output.
    #[serde(default = "defaults::build::template_ext")]
    #[educe(Default = defaults::build::template_ext())]
    pub template_ext: String,

    /// Extension replacing `.md` on rendered output files.
    #[serde(default = "defaults::build::output_ext")]
    #[educe(Default = defaults::build::output_ext())]
    pub output_ext: String,

    /// Run document bodies through the template engine before Markdown
    /// conversion, so Markdown sources can use template expressions.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub markdown_templating: bool,

    /// When a document has no `date` tag, try to parse its file stem as a
    /// date (`2016-06-22.md`). Failure leaves the page dateless.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub date_from_filename: bool,
}
