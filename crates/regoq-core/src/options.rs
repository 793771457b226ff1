//! Per-call query options.

use std::fmt;
use std::io::Write;
use std::sync::{Arc, Mutex};

/// Receives lines produced by the policy's `print` calls during one evaluation.
pub trait PrintHook: Send + Sync {
    fn print(&self, line: &str);
}

impl<F> PrintHook for F
where
    F: Fn(&str) + Send + Sync,
{
    fn print(&self, line: &str) {
        self(line)
    }
}

/// Print hook that writes every line, newline-terminated, to a writer.
pub struct WriterPrintHook<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterPrintHook<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W: Write + Send> PrintHook for WriterPrintHook<W> {
    fn print(&self, line: &str) {
        let mut w = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // print output is diagnostic only; a failing sink must not fail the query
        let _ = writeln!(w, "{line}");
    }
}

/// Knobs scoped to a single query. Not every source accepts every option; an unsupported
/// option fails the query with [`Error::InvalidQueryOption`](crate::Error::InvalidQueryOption).
#[derive(Clone, Default)]
pub struct QueryOptions {
    print_hook: Option<Arc<dyn PrintHook>>,
    package_suffix: Option<String>,
    headers: Vec<(String, String)>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_print_hook(mut self, hook: Arc<dyn PrintHook>) -> Self {
        self.print_hook = Some(hook);
        self
    }

    pub fn with_print_writer<W>(self, writer: W) -> Self
    where
        W: Write + Send + 'static,
    {
        self.with_print_hook(Arc::new(WriterPrintHook::new(writer)))
    }

    /// Appended verbatim to the query path, e.g. `".test"`.
    pub fn with_package_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.package_suffix = Some(suffix.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn print_hook(&self) -> Option<&dyn PrintHook> {
        self.print_hook.as_deref()
    }

    pub fn package_suffix(&self) -> Option<&str> {
        self.package_suffix.as_deref()
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Query path with the package suffix applied.
    pub fn effective_query(&self, query: &str) -> String {
        match &self.package_suffix {
            Some(suffix) => format!("{query}{suffix}"),
            None => query.to_string(),
        }
    }
}

impl fmt::Debug for QueryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryOptions")
            .field("print_hook", &self.print_hook.is_some())
            .field("package_suffix", &self.package_suffix)
            .field("headers", &self.headers)
            .finish()
    }
}
