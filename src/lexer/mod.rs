//! The lexer turns LaTeX input into tokens: control sequences, single
//! characters, and a terminating EOF marker.
//!
//! Whitespace between math tokens is insignificant and skipped. Text-mode
//! bodies are the exception (`\text{a b}` keeps its spaces), so the lexer
//! also exposes [`Lexer::raw_group`], which reads a brace-delimited run
//! verbatim without tokenizing it.

use crate::types::{ParseError, ParseErrorKind, SourceLocation};
use std::sync::Arc;

/// Text a lexed token carries when the input is exhausted.
pub const EOF: &str = "EOF";

/// A single lexed token: a control sequence (`\frac`), one character, or
/// [`EOF`]. The raw text is preserved; classification helpers live on the
/// token itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The raw text of the token, backslash included for control sequences.
    pub text: String,
    /// Where in the input the token came from.
    pub loc: SourceLocation,
}

impl Token {
    /// Whether this is the end-of-input marker.
    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.text == EOF
    }

    /// The control-sequence name without its backslash, if this token is a
    /// control sequence.
    #[must_use]
    pub fn ctrl_seq(&self) -> Option<&str> {
        self.text.strip_prefix('\\')
    }

    /// The single character of a bare-character token.
    #[must_use]
    pub fn char(&self) -> Option<char> {
        if self.is_eof() || self.text.starts_with('\\') {
            return None;
        }
        let mut chars = self.text.chars();
        let ch = chars.next()?;
        chars.next().is_none().then_some(ch)
    }
}

/// Tokenizer over one input string. Positions are byte offsets; the input is
/// shared via `Arc` so every token's location stays valid after the lexer is
/// dropped.
#[derive(Debug)]
pub struct Lexer {
    input: Arc<str>,
    pos: usize,
}

fn match_control_sequence(s: &str) -> Option<usize> {
    let mut chars = s.chars();
    if chars.next()? != '\\' {
        return None;
    }
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() {
        // Single-character control sequence like `\{`.
        return Some(1 + first.len_utf8());
    }
    let mut len = 1 + first.len_utf8();
    for c in chars {
        if c.is_ascii_alphabetic() {
            len += c.len_utf8();
        } else {
            break;
        }
    }
    Some(len)
}

impl Lexer {
    /// Creates a lexer over `input`, positioned at its start.
    #[must_use]
    pub fn new(input: &str) -> Self {
        Self {
            input: Arc::from(input),
            pos: 0,
        }
    }

    /// The shared input string.
    #[must_use]
    pub fn input(&self) -> &Arc<str> {
        &self.input
    }

    fn rest(&self) -> &str {
        &self.input[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.input.len() - trimmed.len();
    }

    fn token(&self, start: usize, end: usize) -> Token {
        Token {
            text: self.input[start..end].to_owned(),
            loc: SourceLocation::new(Arc::clone(&self.input), start, end),
        }
    }

    /// Lexes the next token, skipping leading whitespace. At the end of the
    /// input this returns the [`EOF`] marker token forever after.
    pub fn lex(&mut self) -> Token {
        self.skip_whitespace();
        let start = self.pos;
        let rest = self.rest();
        if rest.is_empty() {
            return Token {
                text: EOF.to_owned(),
                loc: SourceLocation::new(Arc::clone(&self.input), start, start),
            };
        }
        let len = match_control_sequence(rest).unwrap_or_else(|| {
            rest.chars()
                .next()
                .map_or(0, char::len_utf8)
        });
        self.pos = start + len;
        self.token(start, self.pos)
    }

    /// Reads a `{…}`-delimited run verbatim, whitespace and all, consuming
    /// the closing brace. Used for text-mode bodies where spaces are
    /// significant and nothing inside is a command except the escapes
    /// `\{`, `\}`, and `\\`, which decode to their literal character.
    pub fn raw_group(&mut self, command: &str) -> Result<String, ParseError> {
        self.skip_whitespace();
        let start = self.pos;
        if !self.rest().starts_with('{') {
            let found = self.lex();
            return Err(ParseError::with_loc(
                ParseErrorKind::ExpectedGroup {
                    command: command.to_owned(),
                    found: found.text,
                },
                &found.loc,
            ));
        }
        self.pos += 1;
        let mut body = String::new();
        loop {
            let mut chars = self.rest().chars();
            match chars.next() {
                None => {
                    let loc =
                        SourceLocation::new(Arc::clone(&self.input), start, self.input.len());
                    return Err(ParseError::with_loc(ParseErrorKind::UnexpectedEnd, &loc));
                }
                Some('}') => {
                    self.pos += 1;
                    return Ok(body);
                }
                Some('\\') => match chars.next() {
                    Some(escaped @ ('{' | '}' | '\\')) => {
                        body.push(escaped);
                        self.pos += 1 + escaped.len_utf8();
                    }
                    Some(other) => {
                        body.push('\\');
                        body.push(other);
                        self.pos += 1 + other.len_utf8();
                    }
                    None => {
                        let loc =
                            SourceLocation::new(Arc::clone(&self.input), start, self.input.len());
                        return Err(ParseError::with_loc(ParseErrorKind::UnexpectedEnd, &loc));
                    }
                },
                Some(ch) => {
                    body.push(ch);
                    self.pos += ch.len_utf8();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(input: &str) -> Vec<String> {
        let mut lexer = Lexer::new(input);
        let mut out = Vec::new();
        loop {
            let token = lexer.lex();
            if token.is_eof() {
                return out;
            }
            out.push(token.text);
        }
    }

    #[test]
    fn test_lexes_characters_and_commands() {
        assert_eq!(
            texts("x + \\frac{1}{2}"),
            vec!["x", "+", "\\frac", "{", "1", "}", "{", "2", "}"]
        );
    }

    #[test]
    fn test_single_char_control_sequence() {
        assert_eq!(texts("\\{a"), vec!["\\{", "a"]);
    }

    #[test]
    fn test_eof_is_sticky() {
        let mut lexer = Lexer::new("  ");
        assert!(lexer.lex().is_eof());
        assert!(lexer.lex().is_eof());
    }

    #[test]
    fn test_token_spans() {
        let mut lexer = Lexer::new(" \\pi x");
        let pi = lexer.lex();
        assert_eq!(pi.ctrl_seq(), Some("pi"));
        assert_eq!((pi.loc.start, pi.loc.end), (1, 4));
        let x = lexer.lex();
        assert_eq!(x.char(), Some('x'));
        assert_eq!(x.loc.start, 5);
    }

    #[test]
    fn test_raw_group_keeps_whitespace() {
        let mut lexer = Lexer::new("{a b  c}x");
        assert_eq!(lexer.raw_group("text").unwrap(), "a b  c");
        assert_eq!(lexer.lex().char(), Some('x'));
    }

    #[test]
    fn test_raw_group_decodes_escapes() {
        let mut lexer = Lexer::new("{a\\}b\\\\c}x");
        assert_eq!(lexer.raw_group("text").unwrap(), "a}b\\c");
        assert_eq!(lexer.lex().char(), Some('x'));
    }

    #[test]
    fn test_raw_group_requires_brace() {
        let mut lexer = Lexer::new("nope");
        let err = lexer.raw_group("text").unwrap_err();
        assert!(matches!(*err.kind, ParseErrorKind::ExpectedGroup { .. }));
    }

    #[test]
    fn test_raw_group_unclosed() {
        let mut lexer = Lexer::new("{abc");
        let err = lexer.raw_group("text").unwrap_err();
        assert!(matches!(*err.kind, ParseErrorKind::UnexpectedEnd));
    }
}
