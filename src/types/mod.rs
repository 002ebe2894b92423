//! Shared primitive types used across the tree, parser, and cursor.

mod parse_error;
mod source_location;

pub use parse_error::{ParseError, ParseErrorKind};
pub use source_location::SourceLocation;

use core::ops::{Index, IndexMut};

/// Horizontal direction within a block's sibling order.
///
/// Every directional editing primitive (movement, deletion, selection) is
/// written once and parameterized over `Dir`, so "backspace" is just "delete
/// towards [`Dir::Left`]".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dir {
    /// Towards the left end of the block.
    Left,
    /// Towards the right end of the block.
    Right,
}

impl Dir {
    /// The opposite direction.
    #[must_use]
    pub const fn flip(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// Vertical direction for jumps between stacked blocks
/// (numerator/denominator, base/exponent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VDir {
    /// Towards the visually higher block.
    Up,
    /// Towards the visually lower block.
    Down,
}

/// A left/right pair indexable by [`Dir`].
///
/// Used for block endpoints; `ends[Dir::Left]` is the leftmost member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ends<T> {
    /// The left-hand entry.
    pub left: T,
    /// The right-hand entry.
    pub right: T,
}

impl<T> Index<Dir> for Ends<T> {
    type Output = T;

    fn index(&self, dir: Dir) -> &T {
        match dir {
            Dir::Left => &self.left,
            Dir::Right => &self.right,
        }
    }
}

impl<T> IndexMut<Dir> for Ends<T> {
    fn index_mut(&mut self, dir: Dir) -> &mut T {
        match dir {
            Dir::Left => &mut self.left,
            Dir::Right => &mut self.right,
        }
    }
}
