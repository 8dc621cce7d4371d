//! Site configuration management for `canopy.toml`.
//!
//! # Sections
//!
//! | Section   | Purpose                                            |
//! |-----------|----------------------------------------------------|
//! | `[build]` | Paths, template defaults, rendering switches       |
//! | `[serve]` | Preview server (interface, port)                   |
//! | `[vars]`  | Global template variables, exposed on every page   |
//!
//! # Example
//!
//! ```toml
//! [build]
//! content = "content"
//! output = "output"
//! default_template = "default.jinja"
//!
//! [serve]
//! port = 8000
//!
//! [vars]
//! site_name = "My Site"
//! ```
//!
//! The config file is optional: when `canopy.toml` is absent every field
//! takes its default. A present but malformed file is a fatal error.

mod build;
pub mod defaults;
mod error;
mod serve;

pub use build::BuildConfig;
pub use error::ConfigError;
pub use serve::ServeConfig;

use crate::cli::{Cli, Commands};
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

/// Root configuration structure representing canopy.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// CLI arguments reference
    #[serde(skip)]
    pub cli: Option<&'static Cli>,

    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Preview server settings
    #[serde(default)]
    pub serve: ServeConfig,

    /// Global template variables, merged into every page namespace
    #[serde(default)]
    pub vars: HashMap<String, toml::Value>,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.build.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.build.root = Some(path.to_path_buf())
    }

    /// Get CLI arguments reference
    pub fn get_cli(&self) -> &'static Cli {
        self.cli.unwrap()
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &'static Cli) {
        self.cli = Some(cli);

        let root = cli
            .root
            .as_ref()
            .cloned()
            .unwrap_or_else(|| self.get_root().to_owned());

        self.set_root(&root);
        self.update_path_with_root(&root);

        if let Commands::Serve { interface, port } = &cli.command {
            Self::update_option(&mut self.serve.interface, interface.as_ref());
            Self::update_option(&mut self.serve.port, port.as_ref());
        }
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Update all paths relative to root directory and normalize to absolute paths
    fn update_path_with_root(&mut self, root: &Path) {
        let cli = self.get_cli();

        // Apply CLI overrides first
        Self::update_option(&mut self.build.content, cli.content.as_ref());
        Self::update_option(&mut self.build.output, cli.output.as_ref());

        // Normalize root to absolute path
        let root = Self::normalize_path(root);
        self.set_root(&root);

        // Normalize config path
        self.config_path = Self::normalize_path(&root.join(&cli.config));

        // Normalize all directory paths
        self.build.content = Self::normalize_path(&root.join(&self.build.content));
        self.build.output = Self::normalize_path(&root.join(&self.build.output));
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            // For non-existent paths, manually make them absolute
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate configuration for the current command
    pub fn validate(&self) -> Result<()> {
        if !self.build.content.is_dir() {
            bail!(ConfigError::Validation(format!(
                "[build.content] is not a directory: {}",
                self.build.content.display()
            )));
        }

        if self.build.default_template.is_empty() {
            bail!(ConfigError::Validation(
                "[build.default_template] must not be empty".into()
            ));
        }

        if self.build.output_ext.is_empty() || self.build.output_ext.starts_with('.') {
            bail!(ConfigError::Validation(
                "[build.output_ext] must be a bare extension like `html`".into()
            ));
        }

        if let Some(subdir) = &self.build.root_subdir
            && (subdir.is_empty() || subdir.contains('/') || subdir.contains('\\'))
        {
            bail!(ConfigError::Validation(
                "[build.root_subdir] must be a single directory name".into()
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_minimal() {
        let config = SiteConfig::from_str("").unwrap();

        assert_eq!(config.build.content, PathBuf::from("content"));
        assert_eq!(config.build.output, PathBuf::from("output"));
        assert_eq!(config.build.default_template, "default.jinja");
        assert_eq!(config.serve.port, 8000);
        assert!(config.vars.is_empty());
    }

    #[test]
    fn test_from_str_invalid_toml() {
        let invalid_config = r#"
            [build
            content = "content"
        "#;
        let result = SiteConfig::from_str(invalid_config);

        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_top_level_field_rejection() {
        let config = r#"
            [unknown_section]
            field = "value"
        "#;
        let result = SiteConfig::from_str(config);
        assert!(result.is_err());
    }

    #[test]
    fn test_vars_table() {
        let config = r#"
            [vars]
            site_name = "My Site"
            year = 2026
            nav = ["home", "about"]
        "#;
        let config = SiteConfig::from_str(config).unwrap();

        assert_eq!(
            config.vars.get("site_name").and_then(|v| v.as_str()),
            Some("My Site")
        );
        assert_eq!(
            config.vars.get("year").and_then(|v| v.as_integer()),
            Some(2026)
        );
        let nav: Vec<&str> = config
            .vars
            .get("nav")
            .and_then(|v| v.as_array())
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert_eq!(nav, vec!["home", "about"]);
    }

    #[test]
    fn test_vars_nested_table() {
        let config = r#"
            [vars.social]
            fediverse = "@user@example.com"
        "#;
        let config = SiteConfig::from_str(config).unwrap();

        let social = config.vars.get("social").and_then(|v| v.as_table());
        assert_eq!(
            social.and_then(|t| t.get("fediverse")).and_then(|v| v.as_str()),
            Some("@user@example.com")
        );
    }

    #[test]
    fn test_get_root_default() {
        let config = SiteConfig::default();
        assert_eq!(config.get_root(), Path::new("./"));
    }

    #[test]
    fn test_set_root() {
        let mut config = SiteConfig::default();
        config.set_root(Path::new("/custom/path"));
        assert_eq!(config.get_root(), Path::new("/custom/path"));
    }

    #[test]
    fn test_validate_missing_content_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = SiteConfig::default();
        config.build.content = tmp.path().join("no-such-dir");

        let err = config.validate().unwrap_err();
        assert!(err.downcast_ref::<ConfigError>().is_some());
    }

    #[test]
    fn test_validate_ok() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = SiteConfig::default();
        config.build.content = tmp.path().to_path_buf();
        config.build.output = tmp.path().join("output");

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_dotted_output_ext() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = SiteConfig::default();
        config.build.content = tmp.path().to_path_buf();
        config.build.output_ext = ".html".into();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_nested_root_subdir() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = SiteConfig::default();
        config.build.content = tmp.path().to_path_buf();
        config.build.root_subdir = Some("a/b".into());

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_full_config_all_sections() {
        let config = r#"
            [build]
            content = "pages"
            output = "dist"
            root_subdir = "top"
            default_template = "base.jinja"
            template_ext = "jinja"
            output_ext = "html"
            markdown_templating = false
            date_from_filename = false

            [serve]
            interface = "0.0.0.0"
            port = 3000

            [vars]
            site_name = "Example"
        "#;
        let config = SiteConfig::from_str(config).unwrap();

        assert_eq!(config.build.content, PathBuf::from("pages"));
        assert_eq!(config.build.output, PathBuf::from("dist"));
        assert_eq!(config.build.root_subdir.as_deref(), Some("top"));
        assert_eq!(config.build.default_template, "base.jinja");
        assert!(!config.build.markdown_templating);
        assert!(!config.build.date_from_filename);
        assert_eq!(config.serve.interface, "0.0.0.0");
        assert_eq!(config.serve.port, 3000);
        assert!(config.vars.contains_key("site_name"));
    }
}
