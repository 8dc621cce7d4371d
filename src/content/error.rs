//! Build error taxonomy.
//!
//! Every variant names the file it faulted on; the first error aborts the
//! build. These are carried as `bail!` payloads inside `anyhow::Result` so
//! callers can `downcast_ref` on the kind.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors raised while resolving and writing content.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("document `{path}` has no `title` tag")]
    MissingTitle { path: PathBuf },

    #[error("no template `{name}` found between `{start}` and the content root")]
    TemplateNotFound { name: String, start: PathBuf },

    #[error("document `{path}` has an unparseable `date` value `{value}`")]
    InvalidDate { path: PathBuf, value: String },

    #[error("failed to write output file `{path}`")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind;

    #[test]
    fn test_errors_name_the_faulting_file() {
        let err = BuildError::MissingTitle {
            path: "content/sub/page.md".into(),
        };
        assert!(err.to_string().contains("content/sub/page.md"));

        let err = BuildError::TemplateNotFound {
            name: "awesome.jinja".into(),
            start: "content/sub".into(),
        };
        let display = err.to_string();
        assert!(display.contains("awesome.jinja"));
        assert!(display.contains("content/sub"));

        let err = BuildError::InvalidDate {
            path: "content/post.md".into(),
            value: "yesterday".into(),
        };
        assert!(err.to_string().contains("yesterday"));
    }

    #[test]
    fn test_output_write_keeps_io_source() {
        use std::error::Error as _;

        let err = BuildError::OutputWrite {
            path: "output/index.html".into(),
            source: io::Error::new(ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("output/index.html"));
        assert!(err.source().is_some());
    }
}
