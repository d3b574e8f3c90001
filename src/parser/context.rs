//! Per-document parse state.

use std::collections::{HashMap, HashSet};

use crate::error::Diagnostic;

use super::options::ParseOptions;
use super::text::StoryTrace;

/// Mutable state of one document's parse.
///
/// Holds the options, the diagnostics recorded so far, and the story trace
/// cache. A context is created per document and dropped with it; nothing is
/// shared across documents.
#[derive(Debug)]
pub struct ParseContext {
    options: ParseOptions,
    diagnostics: Vec<Diagnostic>,
    reported: HashSet<String>,
    traces: HashMap<String, StoryTrace>,
}

impl ParseContext {
    /// Create a context for one document.
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            diagnostics: Vec::new(),
            reported: HashSet::new(),
            traces: HashMap::new(),
        }
    }

    /// Parse options.
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Record a recovered problem.
    pub fn record(&mut self, diagnostic: Diagnostic) {
        log::warn!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    /// Record a problem only the first time `key` is seen.
    pub fn record_once(&mut self, key: impl Into<String>, diagnostic: Diagnostic) {
        if self.reported.insert(key.into()) {
            self.record(diagnostic);
        }
    }

    /// Add diagnostics recorded elsewhere (e.g. while reading the package).
    pub fn extend_diagnostics(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    /// Diagnostics recorded so far.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Trace of a story file, scanning `raw` on first use.
    pub fn trace(&mut self, path: &str, raw: &str) -> &StoryTrace {
        self.traces
            .entry(path.to_string())
            .or_insert_with(|| StoryTrace::scan(raw))
    }

    /// Store a prebuilt trace.
    pub fn insert_trace(&mut self, path: impl Into<String>, trace: StoryTrace) {
        self.traces.insert(path.into(), trace);
    }

    /// Cached trace of a story file.
    pub fn cached_trace(&self, path: &str) -> Option<&StoryTrace> {
        self.traces.get(path)
    }

    /// Finish the parse and hand back the diagnostics.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
