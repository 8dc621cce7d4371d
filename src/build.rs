//! Site building orchestration.
//!
//! # Architecture
//!
//! ```text
//! build_site()
//!     │
//!     ├── snapshot existing output files
//!     │
//!     ├── Walker::run() ──► aggregate markers, render pages, copy files
//!     │
//!     └── remove stale output ──► repeated builds stay byte-identical
//! ```

use crate::config::SiteConfig;
use crate::content::walker::{BuildStats, Walker};
use crate::log;
use crate::render::engine::Engine;
use anyhow::{Context, Result};
use std::fs;
use std::time::Instant;

/// Build the entire site.
///
/// Walks the content tree depth-first, then deletes output files whose
/// sources no longer exist (and prunes the directories that leaves empty),
/// so a rebuilt site never accumulates leftovers.
pub fn build_site(config: &SiteConfig) -> Result<BuildStats> {
    let started = Instant::now();

    fs::create_dir_all(&config.build.output).with_context(|| {
        format!(
            "failed to create output directory `{}`",
            config.build.output.display()
        )
    })?;

    let engine = Engine::new();
    let walker = Walker::new(config, &engine);
    let before = walker.writer.existing_files();

    let (writer, stats) = walker.run()?;
    let stale = writer.remove_stale(&before)?;

    if writer.written_count() == 0 {
        log!("warn"; "output is empty, check if content has .md files");
    }

    log!(
        "build";
        "{} pages, {} aggregated, {} copied, {} skipped, {} stale removed in {:.2?}",
        stats.pages,
        stats.aggregated,
        stats.copied,
        stats.skipped,
        stale,
        started.elapsed()
    );

    Ok(stats)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::fs;
    use std::path::{Path, PathBuf};

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn site(tmp: &Path) -> SiteConfig {
        let mut config = SiteConfig::default();
        config.build.content = tmp.join("content");
        config.build.output = tmp.join("output");
        config
    }

    /// Map of output-relative path → file bytes, for whole-tree comparisons.
    fn output_tree(output: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
        walkdir::WalkDir::new(output)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                let rel = e.path().strip_prefix(output).unwrap().to_path_buf();
                (rel, fs::read(e.path()).unwrap())
            })
            .collect()
    }

    #[test]
    fn test_build_aggregation_scenario() {
        // content/default.jinja + index.md + _lists/{a,b}.md builds exactly
        // one output file, with the aggregated list in filename order
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        write(
            root,
            "content/default.jinja",
            "{{ page.title }}:{% for p in page.lists %}{{ p.title }},{% endfor %}",
        );
        write(root, "content/index.md", "Title: Home\n\nx\n");
        write(root, "content/_lists/a.md", "Title: A\n\nx\n");
        write(root, "content/_lists/b.md", "Title: B\n\nx\n");
        let config = site(root);

        build_site(&config).unwrap();

        let tree = output_tree(&config.build.output);
        let paths: Vec<_> = tree.keys().collect();
        assert_eq!(paths, vec![Path::new("index.html")]);
        assert_eq!(tree[Path::new("index.html")], b"Home:A,B,");
        assert!(!config.build.output.join("_lists").exists());
    }

    #[test]
    fn test_build_template_not_found_names_document() {
        use crate::content::error::BuildError;

        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        write(root, "content/default.jinja", "x");
        write(
            root,
            "content/sub/page.md",
            "Title: T\nTemplate: awesome\n\nx\n",
        );
        let config = site(root);

        let err = build_site(&config).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::TemplateNotFound { .. })
        ));
        // the error chain points at the offending document
        assert!(format!("{err:#}").contains("page.md"));
    }

    #[test]
    fn test_build_date_inference_scenarios() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        write(root, "content/default.jinja", "<{{ page.date }}>");
        write(root, "content/2016-06-22.md", "Title: Dated\n\nx\n");
        write(root, "content/notes.md", "Title: Notes\n\nx\n");
        let config = site(root);

        build_site(&config).unwrap();

        assert_eq!(
            fs::read_to_string(config.build.output.join("2016-06-22.html")).unwrap(),
            "<2016-06-22>"
        );
        // no date tag, stem is not a date: the page simply has no date
        assert_eq!(
            fs::read_to_string(config.build.output.join("notes.html")).unwrap(),
            "<>"
        );
    }

    #[test]
    fn test_build_twice_is_byte_identical() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        write(root, "content/default.jinja", "{{ page.content }}");
        write(root, "content/index.md", "Title: Home\n\nhello\n");
        write(root, "content/sub/page.md", "Title: Sub\n\nworld\n");
        write(root, "content/logo.svg", "<svg/>");
        let config = site(root);

        build_site(&config).unwrap();
        let first = output_tree(&config.build.output);
        build_site(&config).unwrap();
        let second = output_tree(&config.build.output);

        assert_eq!(first, second);
    }

    #[test]
    fn test_build_removes_output_of_deleted_sources() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        write(root, "content/default.jinja", "x");
        write(root, "content/index.md", "Title: Home\n\nx\n");
        write(root, "content/sub/page.md", "Title: Sub\n\nx\n");
        let config = site(root);

        build_site(&config).unwrap();
        assert!(config.build.output.join("sub/page.html").exists());

        fs::remove_file(root.join("content/sub/page.md")).unwrap();
        build_site(&config).unwrap();

        assert!(!config.build.output.join("sub/page.html").exists());
        // the emptied directory is pruned too
        assert!(!config.build.output.join("sub").exists());
        assert!(config.build.output.join("index.html").exists());
    }

    #[test]
    fn test_build_empty_content_tree() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("content")).unwrap();
        let config = site(tmp.path());

        let stats = build_site(&config).unwrap();
        assert_eq!(stats.pages, 0);
    }
}
