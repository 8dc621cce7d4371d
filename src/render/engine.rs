//! Template engine boundary.
//!
//! Wraps a minijinja environment behind the two operations the build needs:
//! rendering a resolved template and rendering a document body inline (for
//! templating directives embedded in Markdown source). The page namespace is
//! exposed to templates as a single `page` variable; its entries become
//! named fields at this boundary only.
//!
//! Filters and functions (built-in or caller-supplied) must all be
//! registered before the first render.

use crate::content::page::Page;
use crate::content::template::TemplateRef;
use anyhow::{Context, Result};
use minijinja::value::{FunctionArgs, FunctionResult};
use minijinja::{Environment, context};
use std::borrow::Cow;

#[derive(Debug)]
pub struct Engine {
    env: Environment<'static>,
}

impl Engine {
    /// Create an engine with the built-in filter set registered.
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.add_filter("date", ext::date);
        env.add_filter("deslug", ext::deslug);
        env.add_filter("split", ext::split);
        env.add_function("now", ext::now);
        Self { env }
    }

    /// Register a named filter extension.
    #[allow(unused)]
    pub fn add_filter<N, F, Rv, Args>(&mut self, name: N, filter: F)
    where
        N: Into<Cow<'static, str>>,
        F: minijinja::filters::Filter<Rv, Args>
            + for<'a> minijinja::filters::Filter<Rv, <Args as FunctionArgs<'a>>::Output>,
        Rv: FunctionResult,
        Args: for<'a> FunctionArgs<'a>,
    {
        self.env.add_filter::<N, F, Rv, Args>(name, filter);
    }

    /// Register a named function extension.
    #[allow(unused)]
    pub fn add_function<N, F, Rv, Args>(&mut self, name: N, function: F)
    where
        N: Into<Cow<'static, str>>,
        F: minijinja::functions::Function<Rv, Args>
            + for<'a> minijinja::functions::Function<Rv, <Args as FunctionArgs<'a>>::Output>,
        Rv: FunctionResult,
        Args: for<'a> FunctionArgs<'a>,
    {
        self.env.add_function::<N, F, Rv, Args>(name, function);
    }

    /// Render a resolved template against a page namespace.
    pub fn render_template(&self, template: &TemplateRef, page: &Page) -> Result<String> {
        self.env
            .render_named_str(&template.name, &template.source, context! { page })
            .with_context(|| format!("failed to render template `{}`", template.path.display()))
    }

    /// Render a document body as an inline template. `name` labels the
    /// source in error messages (the document's relative path).
    pub fn render_body(&self, name: &str, source: &str, page: &Page) -> Result<String> {
        self.env
            .render_named_str(name, source, context! { page })
            .with_context(|| format!("failed to render embedded template in `{name}`"))
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

mod ext {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
    use minijinja::value::Value;
    use minijinja::{Error, ErrorKind};

    /// Format a date-like value with a strftime pattern. Accepts `YYYY-MM-DD`
    /// strings (the form page dates serialize to), full datetimes, and unix
    /// timestamps.
    pub fn date(value: Value, fmt: &str) -> Result<Value, Error> {
        if let Some(string) = value.as_str() {
            let formatted = string
                .parse::<NaiveDate>()
                .map(|d| d.format(fmt).to_string())
                .or_else(|_| {
                    string
                        .parse::<NaiveDateTime>()
                        .map(|dt| dt.format(fmt).to_string())
                })
                .or_else(|_| {
                    string
                        .parse::<DateTime<Utc>>()
                        .map(|dt| dt.format(fmt).to_string())
                })
                .map_err(|e| {
                    Error::new(
                        ErrorKind::InvalidOperation,
                        format!("failed to parse `{string}` as a date: {e}"),
                    )
                })?;
            return Ok(Value::from(formatted));
        }

        if let Ok(timestamp) = i64::try_from(value.clone()) {
            let datetime = DateTime::<Utc>::from_timestamp(timestamp, 0).ok_or_else(|| {
                Error::new(ErrorKind::InvalidOperation, "timestamp out of range")
            })?;
            return Ok(Value::from(datetime.format(fmt).to_string()));
        }

        Err(Error::new(
            ErrorKind::InvalidOperation,
            format!("`date` expects a string or integer, got {}", value.kind()),
        ))
    }

    /// Turn a slug back into words: `hello-world` → `hello world`.
    pub fn deslug(value: &str) -> String {
        value.replace('-', " ")
    }

    /// Split a string, returning either the whole list or the nth piece.
    pub fn split(value: &str, pat: &str, n: Option<usize>) -> Value {
        match n {
            Some(n) => value
                .split(pat)
                .nth(n)
                .map(Value::from)
                .unwrap_or(Value::UNDEFINED),
            None => Value::from(value.split(pat).map(Value::from).collect::<Vec<_>>()),
        }
    }

    /// Current unix timestamp.
    pub fn now() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::SystemTime::UNIX_EPOCH)
            .unwrap()
            .as_secs()
    }
}

// ============================================================================
// Tests
// ============================================================================
