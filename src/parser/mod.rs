//! Recursive-descent parser from LaTeX notation to a node/block tree.
//!
//! The parser keeps one lookahead token and builds directly into a fresh
//! [`Tree`], so a failed parse leaves nothing behind; callers only swap the
//! new tree in after `Ok`. Grammar notes:
//!
//! - `{…}` groups are transparent: their contents are parsed into a scratch
//!   block and spliced inline as a fragment, matching how `\ln{123}` counts
//!   five characters rather than treating the braces as structure.
//! - `^` and `_` take one argument, either a braced group or a single
//!   token (`x^2`).
//! - Text-mode bodies are read verbatim through [`Lexer::raw_group`]; their
//!   whitespace is significant.

use crate::commands::{Command, TEXT_COMMANDS};
use crate::lexer::{Lexer, Token};
use crate::tree::{BlockId, Fragment, Tree};
use crate::types::{Dir, ParseError, ParseErrorKind};

/// Parses `input` into a fresh tree, returning it with its root block.
pub fn parse_latex(input: &str) -> Result<(Tree, BlockId), ParseError> {
    let mut parser = Parser::new(input);
    let root = parser.tree.new_block();
    parser.parse_expression(root)?;
    let trailing = parser.next_token();
    if !trailing.is_eof() {
        return Err(ParseError::with_loc(
            ParseErrorKind::UnexpectedToken {
                found: trailing.text,
            },
            &trailing.loc,
        ));
    }
    Ok((parser.tree, root))
}

struct Parser {
    lexer: Lexer,
    lookahead: Option<Token>,
    tree: Tree,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            lexer: Lexer::new(input),
            lookahead: None,
            tree: Tree::new(),
        }
    }

    fn peek(&mut self) -> &Token {
        self.lookahead.get_or_insert_with(|| self.lexer.lex())
    }

    fn next_token(&mut self) -> Token {
        match self.lookahead.take() {
            Some(token) => token,
            None => self.lexer.lex(),
        }
    }

    /// Parses atoms into `block` until a closing brace or the end of input;
    /// neither terminator is consumed.
    fn parse_expression(&mut self, block: BlockId) -> Result<(), ParseError> {
        loop {
            let next = self.peek();
            if next.is_eof() || next.char() == Some('}') {
                return Ok(());
            }
            self.parse_atom(block)?;
        }
    }

    /// Parses one atom (symbol, command with arguments, group, or
    /// sup/subscript) and appends it to `block`.
    fn parse_atom(&mut self, block: BlockId) -> Result<(), ParseError> {
        let token = self.next_token();
        if let Some(ch) = token.char() {
            return match ch {
                '{' => self.parse_group_splice(block),
                '}' => Err(ParseError::with_loc(
                    ParseErrorKind::UnexpectedToken { found: token.text },
                    &token.loc,
                )),
                '^' => {
                    let sup = self.parse_argument("^")?;
                    self.append_node(block, Command::superscript(sup));
                    Ok(())
                }
                '_' => {
                    let sub = self.parse_argument("_")?;
                    self.append_node(block, Command::subscript(sub));
                    Ok(())
                }
                _ => {
                    self.append_node(block, Command::plain_symbol(ch));
                    Ok(())
                }
            };
        }
        if let Some(name) = token.ctrl_seq() {
            let name = name.to_owned();
            return self.parse_command(block, &name, &token);
        }
        // EOF: only reachable through parse_argument.
        Err(ParseError::with_loc(
            ParseErrorKind::UnexpectedEnd,
            &token.loc,
        ))
    }

    fn parse_command(
        &mut self,
        block: BlockId,
        name: &str,
        token: &Token,
    ) -> Result<(), ParseError> {
        match name {
            "frac" => {
                let numer = self.parse_argument(name)?;
                let denom = self.parse_argument(name)?;
                self.append_node(block, Command::fraction(numer, denom));
            }
            "mfrac" => {
                let whole = self.parse_argument(name)?;
                let numer = self.parse_argument(name)?;
                let denom = self.parse_argument(name)?;
                self.append_node(block, Command::mixed_fraction(whole, numer, denom));
            }
            "sqrt" => {
                let radicand = self.parse_argument(name)?;
                self.append_node(block, Command::sqrt(radicand));
            }
            // Escaped notation characters, e.g. a typed `{` serializes as
            // `\{` and must parse back to the same plain symbol.
            "{" => self.append_node(block, Command::plain_symbol('{')),
            "}" => self.append_node(block, Command::plain_symbol('}')),
            "\\" => self.append_node(block, Command::plain_symbol('\\')),
            _ if TEXT_COMMANDS.contains(name) => {
                debug_assert!(self.lookahead.is_none(), "raw group after a peek");
                let raw = self.lexer.raw_group(name)?;
                let body = self.tree.new_block();
                if !raw.is_empty() {
                    let piece = self.tree.new_node(Command::text_piece(raw));
                    self.tree.append(body, piece);
                }
                self.append_node(block, Command::text(body));
            }
            _ => {
                let cmd = Command::named_symbol(name)
                    .or_else(|| Command::operator_name(name))
                    .ok_or_else(|| {
                        ParseError::with_loc(
                            ParseErrorKind::UnknownCommand {
                                name: name.to_owned(),
                            },
                            &token.loc,
                        )
                    })?;
                self.append_node(block, cmd);
            }
        }
        Ok(())
    }

    /// Parses `{…}` contents into a scratch block and splices them inline
    /// into `block`, leaving no trace of the braces in the tree.
    fn parse_group_splice(&mut self, block: BlockId) -> Result<(), ParseError> {
        let scratch = self.tree.new_block();
        self.parse_expression(scratch)?;
        self.expect_close()?;
        if let (Some(first), Some(last)) = (
            self.tree.end(scratch, Dir::Left),
            self.tree.end(scratch, Dir::Right),
        ) {
            let run = Fragment::new(first, last);
            run.disown(&mut self.tree);
            let left = self.tree.end(block, Dir::Right);
            run.adopt(&mut self.tree, block, left, None);
        }
        Ok(())
    }

    /// Parses one command argument into a fresh block: either a braced
    /// group or a single token.
    fn parse_argument(&mut self, command: &str) -> Result<BlockId, ParseError> {
        let block = self.tree.new_block();
        let next = self.peek();
        if next.is_eof() {
            let loc = next.loc.clone();
            return Err(ParseError::with_loc(
                ParseErrorKind::ExpectedGroup {
                    command: command.to_owned(),
                    found: "EOF".to_owned(),
                },
                &loc,
            ));
        }
        if next.char() == Some('{') {
            self.next_token();
            self.parse_expression(block)?;
            self.expect_close()?;
        } else {
            self.parse_atom(block)?;
        }
        Ok(block)
    }

    fn expect_close(&mut self) -> Result<(), ParseError> {
        let token = self.next_token();
        if token.char() == Some('}') {
            Ok(())
        } else {
            Err(ParseError::with_loc(
                ParseErrorKind::ExpectedClosingBrace { found: token.text },
                &token.loc,
            ))
        }
    }

    fn append_node(&mut self, block: BlockId, cmd: Command) {
        let node = self.tree.new_node(cmd);
        self.tree.append(block, node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::CommandKind;

    fn roundtrip(latex: &str) -> String {
        let (tree, root) = parse_latex(latex).unwrap();
        tree.validate(root);
        tree.latex(root)
    }

    #[test]
    fn test_parses_empty_input() {
        let (tree, root) = parse_latex("").unwrap();
        assert!(tree.is_empty(root));
    }

    #[test]
    fn test_ignores_whitespace() {
        assert_eq!(roundtrip("  x   y "), "xy");
    }

    #[test]
    fn test_braces_are_transparent() {
        assert_eq!(roundtrip("{12}3"), "123");
        let (tree, root) = parse_latex("{12}3").unwrap();
        assert_eq!(tree.children(root).count(), 3);
    }

    #[test]
    fn test_fraction_roundtrip() {
        assert_eq!(roundtrip("\\frac{d}{dx}"), "\\frac{d}{dx}");
    }

    #[test]
    fn test_single_token_arguments() {
        assert_eq!(roundtrip("x^2"), "x^{2}");
        assert_eq!(roundtrip("\\frac12"), "\\frac{1}{2}");
    }

    #[test]
    fn test_subscript_roundtrip() {
        assert_eq!(roundtrip("a_{12}"), "a_{12}");
    }

    #[test]
    fn test_mixed_fraction_parses() {
        let (tree, root) = parse_latex("\\mfrac{12}{34}{56}").unwrap();
        let node = tree.end(root, Dir::Left).unwrap();
        assert_eq!(tree.cmd(node).kind(), CommandKind::MixedFraction);
        assert_eq!(tree.latex(root), "12\\frac{34}{56}");
    }

    #[test]
    fn test_text_preserves_whitespace() {
        assert_eq!(roundtrip("\\text{a b  c}"), "\\text{a b  c}");
    }

    #[test]
    fn test_text_aliases() {
        let (tree, root) = parse_latex("\\textit{hi}").unwrap();
        let node = tree.end(root, Dir::Left).unwrap();
        assert_eq!(tree.cmd(node).kind(), CommandKind::Text);
    }

    #[test]
    fn test_named_symbols_and_operators() {
        assert_eq!(roundtrip("\\pm x"), "\\pm x");
        assert_eq!(roundtrip("\\ln{123}"), "\\ln 123");
    }

    #[test]
    fn test_escaped_notation_characters() {
        assert_eq!(roundtrip("\\{x\\}"), "\\{x\\}");
        assert_eq!(roundtrip("\\\\"), "\\\\");
        assert_eq!(roundtrip("\\text{a\\}b}"), "\\text{a\\}b}");
    }

    #[test]
    fn test_unknown_command_errors() {
        let err = parse_latex("\\nonsense").unwrap_err();
        assert!(matches!(
            *err.kind,
            ParseErrorKind::UnknownCommand { ref name } if name == "nonsense"
        ));
        assert_eq!(err.position, Some(0));
    }

    #[test]
    fn test_unbalanced_group_errors() {
        let err = parse_latex("\\frac{1}{2").unwrap_err();
        assert!(matches!(
            *err.kind,
            ParseErrorKind::ExpectedClosingBrace { .. }
        ));
        let err = parse_latex("x}").unwrap_err();
        assert!(matches!(*err.kind, ParseErrorKind::UnexpectedToken { .. }));
    }

    #[test]
    fn test_missing_argument_errors() {
        let err = parse_latex("\\frac{1}").unwrap_err();
        assert!(matches!(*err.kind, ParseErrorKind::ExpectedGroup { .. }));
    }

    #[test]
    fn test_nested_structures() {
        assert_eq!(
            roundtrip("\\frac{d}{dx}\\sqrt{x}=x^{\\frac{1}{2}}"),
            "\\frac{d}{dx}\\sqrt{x}=x^{\\frac{1}{2}}"
        );
    }
}
