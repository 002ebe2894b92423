//! Parse error handling.
//!
//! A [`ParseError`] distinguishes malformed input (the user's problem) from
//! structural invariant breaches, which are programming-contract violations
//! checked with `debug_assert!` and never surfaced through this type. A
//! failed parse is never partially applied: the parser builds into a fresh
//! tree that is discarded wholesale on error.

use crate::types::SourceLocation;
use core::fmt;
use thiserror::Error;

/// Error produced when a LaTeX input cannot be parsed.
///
/// Carries a categorised [`ParseErrorKind`] plus the byte position and
/// length of the offending span when the lexer could attribute one.
#[derive(Debug, Error)]
#[error("latex parse error: {kind}{context}")]
pub struct ParseError {
    /// Categorised reason for the failure.
    pub kind: Box<ParseErrorKind>,
    /// Start byte offset of the affected text, if known.
    pub position: Option<usize>,
    /// Byte length of the affected text, if known.
    pub length: Option<usize>,
    /// Rendered source context, if a location was attached.
    context: ErrorContext,
}

impl ParseError {
    /// Create a new error with no location information.
    pub fn new<T: Into<ParseErrorKind>>(kind: T) -> Self {
        Self {
            kind: Box::new(kind.into()),
            position: None,
            length: None,
            context: ErrorContext::None,
        }
    }

    /// Create a new error pointing at `loc`.
    pub fn with_loc<T: Into<ParseErrorKind>>(kind: T, loc: &SourceLocation) -> Self {
        Self {
            kind: Box::new(kind.into()),
            position: Some(loc.start),
            length: Some(loc.end.saturating_sub(loc.start)),
            context: ErrorContext::Location(loc.clone()),
        }
    }
}

/// Describes the specific reason for a [`ParseError`].
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("{0}")]
    Message(&'static str),
    #[error(r"Undefined control sequence: \{name}")]
    UnknownCommand { name: String },
    #[error(r"Expected an argument for \{command}, got {found}")]
    ExpectedGroup { command: String, found: String },
    #[error("Expected '}}', got {found}")]
    ExpectedClosingBrace { found: String },
    #[error("Unexpected end of input")]
    UnexpectedEnd,
    #[error("Unexpected token: {found}")]
    UnexpectedToken { found: String },
}

impl From<&'static str> for ParseErrorKind {
    fn from(message: &'static str) -> Self {
        Self::Message(message)
    }
}

/// Optional source context appended to an error's display output.
#[derive(Debug)]
enum ErrorContext {
    None,
    Location(SourceLocation),
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::Location(loc) => {
                write!(f, " at position {}: ", loc.start)?;
                let prefix = &loc.input[..loc.start];
                let span = &loc.input[loc.start..loc.end];
                let suffix = &loc.input[loc.end..];
                write!(f, "{prefix}{}{suffix}", Underlined(span))
            }
        }
    }
}

/// Wraps a span with combining low lines so the error text highlights it.
struct Underlined<'a>(&'a str);

impl fmt::Display for Underlined<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ch in self.0.chars() {
            write!(f, "{ch}\u{0332}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_error_without_location() {
        let err = ParseError::new(ParseErrorKind::UnexpectedEnd);
        assert_eq!(
            err.to_string(),
            "latex parse error: Unexpected end of input"
        );
        assert_eq!(err.position, None);
    }

    #[test]
    fn test_error_with_location() {
        let input: Arc<str> = Arc::from(r"\foo x");
        let loc = SourceLocation::new(input, 0, 4);
        let err = ParseError::with_loc(
            ParseErrorKind::UnknownCommand {
                name: "foo".to_owned(),
            },
            &loc,
        );
        assert_eq!(err.position, Some(0));
        assert_eq!(err.length, Some(4));
        assert!(err.to_string().contains("Undefined control sequence"));
        assert!(err.to_string().contains("position 0"));
    }

    #[test]
    fn test_kind_from_message() {
        let err = ParseError::new("boom");
        assert!(matches!(*err.kind, ParseErrorKind::Message("boom")));
    }
}
