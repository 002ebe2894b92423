//! Bottom-up aggregations over the tree.
//!
//! Two folds are exposed: a generic document-order fold over every node, and
//! the semantic character count, which is not a plain sum: stacked blocks
//! count as the wider of the two, and multi-glyph function names count their
//! visible glyphs.

use crate::commands::{
    Command, Fraction, MixedFraction, OperatorName, Sqrt, Subscript, Superscript, TextPiece,
};
use crate::tree::{BlockId, NodeId, Tree};

impl Tree {
    /// Folds `combine` over every node under `block` in document order
    /// (each node before its child blocks, blocks in reading order).
    pub fn fold<A>(&self, block: BlockId, seed: A, combine: &mut impl FnMut(A, NodeId) -> A) -> A {
        let mut acc = seed;
        for node in self.children(block) {
            acc = combine(acc, node);
            for child in self.cmd(node).child_blocks() {
                acc = self.fold(child, acc, combine);
            }
        }
        acc
    }

    /// The semantic character count of everything under `block`.
    #[must_use]
    pub fn char_count(&self, block: BlockId) -> usize {
        self.children(block).map(|node| self.weight(node)).sum()
    }

    /// The deepest block-nesting level under `block`, counting `block`
    /// itself: a flat run is 1, each composite's child blocks add a level.
    #[must_use]
    pub fn max_nesting(&self, block: BlockId) -> usize {
        let mut deepest = 1;
        for node in self.children(block) {
            for child in self.cmd(node).child_blocks() {
                deepest = deepest.max(1 + self.max_nesting(child));
            }
        }
        deepest
    }

    /// The semantic character count of one node, children included.
    ///
    /// Defaults to "one glyph plus the children", with the variants that
    /// visually differ from their structure overriding: an exponent hat is
    /// free, a fraction is as wide as its wider block, and `\ln` spells two
    /// glyphs despite being one node.
    #[must_use]
    pub fn weight(&self, node: NodeId) -> usize {
        match self.cmd(node) {
            Command::Symbol(_) => 1,
            Command::OperatorName(OperatorName { name }) => name.chars().count(),
            Command::Fraction(Fraction { numer, denom }) => {
                self.char_count(*numer).max(self.char_count(*denom))
            }
            Command::MixedFraction(MixedFraction {
                whole,
                numer,
                denom,
            }) => self.char_count(*whole) + self.char_count(*numer).max(self.char_count(*denom)),
            Command::Superscript(Superscript { sup }) => self.char_count(*sup),
            Command::Subscript(Subscript { sub }) => self.char_count(*sub),
            Command::Sqrt(Sqrt { radicand }) => 1 + self.char_count(*radicand),
            Command::Text(text) => self.char_count(text.body),
            Command::TextPiece(TextPiece { text }) => text.chars().count(),
        }
    }
}
