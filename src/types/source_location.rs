//! Source locations for lexing and parse-error reporting.
//!
//! A location keeps a reference-counted copy of the input string together
//! with a `[start, end)` byte range, so errors can point at the offending
//! span long after the lexer is gone.

use std::sync::Arc;

/// A span within a LaTeX input string.
///
/// Immutable once created; the input is shared via `Arc` so tokens and
/// errors can carry locations without cloning the whole source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceLocation {
    /// Reference-counted input string the span points into.
    pub input: Arc<str>,
    /// Zero-based inclusive start byte offset.
    pub start: usize,
    /// Zero-based exclusive end byte offset.
    pub end: usize,
}

impl SourceLocation {
    /// Creates a new location covering `[start, end)` of `input`.
    #[must_use]
    pub const fn new(input: Arc<str>, start: usize, end: usize) -> Self {
        Self { input, start, end }
    }

    /// The text the span covers.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.input[self.start..self.end]
    }

    /// Merges two locations into one spanning both, provided they refer to
    /// the same input. Returns `None` when the inputs differ.
    #[must_use]
    pub fn range(first: &Self, last: &Self) -> Option<Self> {
        Arc::ptr_eq(&first.input, &last.input).then(|| Self {
            input: Arc::clone(&first.input),
            start: first.start,
            end: last.end,
        })
    }
}
