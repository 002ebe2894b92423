//! Structured math editing - a typed document model for math input
//!
//! A formula is held as a tree of command nodes grouped into sibling-linked
//! blocks, with a LaTeX parser and serializer on one side and a cursor-based
//! editing surface (movement, selection, typing, deletion) on the other.
#![warn(missing_docs)]
#![warn(clippy::nursery)]
#![warn(clippy::pedantic)]
#![warn(clippy::str_to_string)]
#![warn(clippy::non_ascii_literal)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::panic)]
#![warn(clippy::expect_used)]
#![warn(clippy::unwrap_in_result)]
#![warn(clippy::if_then_some_else_none)]
#![warn(clippy::unused_trait_names)]
#![warn(clippy::get_unwrap)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::unimplemented)]
#![warn(clippy::return_and_then)]
#![warn(clippy::needless_raw_strings)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(clippy::undocumented_unsafe_blocks)]
#![warn(clippy::separated_literal_suffix)]
#![warn(clippy::ref_patterns)]
// clippy exceptions
#![allow(clippy::indexing_slicing)]
#![allow(clippy::string_slice)]
#![allow(clippy::pub_use)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::single_call_fn)]

pub mod commands;
pub mod cursor;
pub mod lexer;
/// Recursive-descent parsing of LaTeX notation into the document tree.
pub mod parser;
pub mod tree;
pub mod types;

pub use commands::{Command, CommandKind};
pub use cursor::{MathField, Point};
pub use parser::parse_latex;
pub use tree::{BlockId, Fragment, NodeId, Tree};
pub use types::{Dir, ParseError, ParseErrorKind, VDir};
