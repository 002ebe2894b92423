//! Concrete command variants and their per-variant behavior.
//!
//! Every node in the tree stores one [`Command`]. The enum is closed: each
//! editing capability (serialization, weight, cursor entry, vertical
//! navigation) is an exhaustive match over it, with leaf symbols providing
//! the base-case behavior and composites overriding selectively.

pub mod text;

use crate::tree::{BlockId, Tree};
use crate::types::{Dir, VDir};
use phf::{Map, Set, phf_map, phf_set};
use strum::{AsRefStr, Display, EnumDiscriminants};

/// Named symbols reachable as control sequences, e.g. `\pm` for `±`.
///
/// The key is the control-sequence name without the backslash; the value is
/// the single glyph the symbol renders as.
pub static SYMBOLS: Map<&'static str, char> = phf_map! {
    "pm" => '\u{00b1}',
    "mp" => '\u{2213}',
    "cdot" => '\u{00b7}',
    "times" => '\u{00d7}',
    "div" => '\u{00f7}',
    "neq" => '\u{2260}',
    "leq" => '\u{2264}',
    "geq" => '\u{2265}',
    "approx" => '\u{2248}',
    "infty" => '\u{221e}',
    "partial" => '\u{2202}',
    "sum" => '\u{2211}',
    "prod" => '\u{220f}',
    "int" => '\u{222b}',
    "rightarrow" => '\u{2192}',
    "leftarrow" => '\u{2190}',
    "alpha" => '\u{03b1}',
    "beta" => '\u{03b2}',
    "gamma" => '\u{03b3}',
    "delta" => '\u{03b4}',
    "epsilon" => '\u{03b5}',
    "theta" => '\u{03b8}',
    "lambda" => '\u{03bb}',
    "mu" => '\u{03bc}',
    "pi" => '\u{03c0}',
    "sigma" => '\u{03c3}',
    "phi" => '\u{03c6}',
    "omega" => '\u{03c9}',
};

/// Function names rendered as upright multi-glyph operators, e.g. `\ln`.
pub static OPERATOR_NAMES: Set<&'static str> = phf_set! {
    "ln", "log", "exp", "lim", "det", "dim", "gcd", "max", "min",
    "sin", "cos", "tan", "sec", "csc", "cot",
    "arcsin", "arccos", "arctan", "sinh", "cosh", "tanh",
};

/// Control sequences that open a text run. All aliases behave identically
/// here; fonts are a rendering concern.
pub static TEXT_COMMANDS: Set<&'static str> = phf_set! {
    "text", "textnormal", "textrm", "textup", "textmd",
    "textit", "textbf", "textsf", "texttt",
};

/// A symbol leaf: one glyph, no child blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// The glyph the symbol renders as.
    pub ch: char,
    /// Control-sequence name (without backslash) for named symbols like
    /// `\pm`; `None` for bare characters.
    pub ctrl_seq: Option<&'static str>,
}

/// An upright function-name leaf such as `\ln` or `\arcsin`.
///
/// Structurally a single node, but it visually spells out its name, which is
/// why its weight is the glyph count of the name rather than 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorName {
    /// The function name, e.g. `"ln"`.
    pub name: &'static str,
}

/// `\frac{numer}{denom}`: two stacked blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fraction {
    /// The numerator block.
    pub numer: BlockId,
    /// The denominator block.
    pub denom: BlockId,
}

/// `\mfrac{whole}{numer}{denom}`: a whole part beside a stacked fraction.
/// Serializes as the whole part followed by a plain `\frac`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MixedFraction {
    /// The whole-number block.
    pub whole: BlockId,
    /// The numerator block.
    pub numer: BlockId,
    /// The denominator block.
    pub denom: BlockId,
}

/// `^{sup}`: a raised exponent block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Superscript {
    /// The exponent block.
    pub sup: BlockId,
}

/// `_{sub}`: a lowered subscript block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscript {
    /// The subscript block.
    pub sub: BlockId,
}

/// `\sqrt{radicand}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sqrt {
    /// The block under the radical.
    pub radicand: BlockId,
}

/// `\text{…}`: a run of plain text whose children are [`TextPiece`] leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextBlock {
    /// The block holding the run's pieces.
    pub body: BlockId,
}

/// A piece of plain text inside a [`TextBlock`]. The payload is always
/// non-empty; a piece shrinking to zero characters is removed instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPiece {
    /// The character payload.
    pub text: String,
}

/// One concrete node variant.
///
/// The [`CommandKind`] discriminant identifies a variant at runtime without
/// pattern matching, mirroring how parse nodes carry a `NodeType` tag.
#[derive(Debug, Clone, PartialEq, EnumDiscriminants)]
#[strum_discriminants(vis(pub))]
#[strum_discriminants(name(CommandKind))]
#[strum_discriminants(doc = "Discriminant tag identifying a command variant")]
#[strum_discriminants(derive(Display, Hash, AsRefStr), strum(serialize_all = "lowercase"))]
pub enum Command {
    /// A single-glyph leaf.
    Symbol(Symbol),
    /// An upright function-name leaf.
    OperatorName(OperatorName),
    /// A stacked fraction.
    Fraction(Fraction),
    /// A mixed fraction with a whole part.
    MixedFraction(MixedFraction),
    /// An exponent.
    Superscript(Superscript),
    /// A subscript.
    Subscript(Subscript),
    /// A square root.
    Sqrt(Sqrt),
    /// A text run.
    Text(TextBlock),
    /// A piece of a text run.
    TextPiece(TextPiece),
}

/// What a vertical jump does when it reaches a particular child block of a
/// composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalJump {
    /// Enter the given stacked sibling block.
    Enter(BlockId),
    /// Exit the composite, landing adjacent to it in its parent block.
    Exit,
}

impl Command {
    /// A bare-character symbol.
    #[must_use]
    pub const fn plain_symbol(ch: char) -> Self {
        Self::Symbol(Symbol { ch, ctrl_seq: None })
    }

    /// A named symbol like `\pm`, if `name` is in the symbol table. The
    /// returned command remembers its control sequence for serialization.
    #[must_use]
    pub fn named_symbol(name: &str) -> Option<Self> {
        let (key, ch) = SYMBOLS.get_entry(name)?;
        Some(Self::Symbol(Symbol {
            ch: *ch,
            ctrl_seq: Some(key),
        }))
    }

    /// An operator-name leaf like `\ln`, if `name` is in the operator set.
    #[must_use]
    pub fn operator_name(name: &str) -> Option<Self> {
        let key = OPERATOR_NAMES.get_key(name)?;
        Some(Self::OperatorName(OperatorName { name: key }))
    }

    /// A fraction over the two given blocks.
    #[must_use]
    pub const fn fraction(numer: BlockId, denom: BlockId) -> Self {
        Self::Fraction(Fraction { numer, denom })
    }

    /// A mixed fraction over the three given blocks.
    #[must_use]
    pub const fn mixed_fraction(whole: BlockId, numer: BlockId, denom: BlockId) -> Self {
        Self::MixedFraction(MixedFraction {
            whole,
            numer,
            denom,
        })
    }

    /// An exponent over the given block.
    #[must_use]
    pub const fn superscript(sup: BlockId) -> Self {
        Self::Superscript(Superscript { sup })
    }

    /// A subscript over the given block.
    #[must_use]
    pub const fn subscript(sub: BlockId) -> Self {
        Self::Subscript(Subscript { sub })
    }

    /// A square root over the given block.
    #[must_use]
    pub const fn sqrt(radicand: BlockId) -> Self {
        Self::Sqrt(Sqrt { radicand })
    }

    /// A text run over the given body block.
    #[must_use]
    pub const fn text(body: BlockId) -> Self {
        Self::Text(TextBlock { body })
    }

    /// A text piece with the given payload. The payload must be non-empty.
    #[must_use]
    pub fn text_piece(text: impl Into<String>) -> Self {
        let text = text.into();
        debug_assert!(!text.is_empty(), "text pieces must be non-empty");
        Self::TextPiece(TextPiece { text })
    }

    /// The discriminant tag of this command.
    #[must_use]
    pub fn kind(&self) -> CommandKind {
        self.into()
    }

    /// The named child blocks this command owns, in left-to-right reading
    /// order. Empty for leaves.
    pub fn child_blocks(&self) -> impl Iterator<Item = BlockId> {
        let blocks: [Option<BlockId>; 3] = match *self {
            Self::Symbol(_) | Self::OperatorName(_) | Self::TextPiece(_) => [None; 3],
            Self::Fraction(Fraction { numer, denom }) => [Some(numer), Some(denom), None],
            Self::MixedFraction(MixedFraction {
                whole,
                numer,
                denom,
            }) => [Some(whole), Some(numer), Some(denom)],
            Self::Superscript(Superscript { sup }) => [Some(sup), None, None],
            Self::Subscript(Subscript { sub }) => [Some(sub), None, None],
            Self::Sqrt(Sqrt { radicand }) => [Some(radicand), None, None],
            Self::Text(TextBlock { body }) => [Some(body), None, None],
        };
        blocks.into_iter().flatten()
    }

    /// The block a cursor enters when moving into this node in direction
    /// `dir`: the leftmost block when arriving from the left, the rightmost
    /// when arriving from the right. `None` for leaves, which the cursor
    /// steps across instead.
    #[must_use]
    pub fn entry_block(&self, dir: Dir) -> Option<BlockId> {
        match dir {
            // Moving right, so entering at the node's left edge.
            Dir::Right => self.child_blocks().next(),
            Dir::Left => self.child_blocks().last(),
        }
    }

    /// The block a cursor enters when jumping vertically into this node
    /// from outside, e.g. up into a fraction lands in the numerator.
    #[must_use]
    pub fn vertical_entry(&self, vdir: VDir) -> Option<BlockId> {
        match (self, vdir) {
            (Self::Fraction(Fraction { numer, .. }), VDir::Up) => Some(*numer),
            (Self::Fraction(Fraction { denom, .. }), VDir::Down) => Some(*denom),
            (Self::MixedFraction(MixedFraction { whole, .. }), VDir::Up) => Some(*whole),
            (Self::MixedFraction(MixedFraction { denom, .. }), VDir::Down) => Some(*denom),
            (Self::Superscript(Superscript { sup }), VDir::Up) => Some(*sup),
            (Self::Subscript(Subscript { sub }), VDir::Down) => Some(*sub),
            _ => None,
        }
    }

    /// How a vertical jump proceeds from child block `from` of this
    /// composite: enter a stacked sibling block, exit beside the composite,
    /// or (`None`) propagate outward to the enclosing composite.
    #[must_use]
    pub fn vertical_jump(&self, from: BlockId, vdir: VDir) -> Option<VerticalJump> {
        match *self {
            Self::Fraction(Fraction { numer, denom }) => match vdir {
                VDir::Down if from == numer => Some(VerticalJump::Enter(denom)),
                VDir::Up if from == denom => Some(VerticalJump::Enter(numer)),
                _ => None,
            },
            Self::MixedFraction(MixedFraction {
                whole,
                numer,
                denom,
            }) => match vdir {
                VDir::Down if from == whole => Some(VerticalJump::Enter(numer)),
                VDir::Down if from == numer => Some(VerticalJump::Enter(denom)),
                VDir::Up if from == denom => Some(VerticalJump::Enter(numer)),
                _ => None,
            },
            Self::Superscript(Superscript { sup }) => {
                (vdir == VDir::Down && from == sup).then_some(VerticalJump::Exit)
            }
            Self::Subscript(Subscript { sub }) => {
                (vdir == VDir::Up && from == sub).then_some(VerticalJump::Exit)
            }
            _ => None,
        }
    }
}

impl Tree {
    /// Whether every child block of `node` is empty. Vacuously true for
    /// leaves with no blocks.
    #[must_use]
    pub fn is_blank(&self, node: crate::tree::NodeId) -> bool {
        self.cmd(node).child_blocks().all(|b| self.is_empty(b))
    }

    /// Serializes `block` back to LaTeX notation.
    #[must_use]
    pub fn latex(&self, block: BlockId) -> String {
        let mut out = String::new();
        self.write_block(block, &mut out);
        out
    }

    fn write_block(&self, block: BlockId, out: &mut String) {
        for node in self.children(block) {
            self.write_node(node, out);
        }
    }

    fn write_node(&self, node: crate::tree::NodeId, out: &mut String) {
        match self.cmd(node) {
            Command::Symbol(Symbol { ch, ctrl_seq }) => match ctrl_seq {
                Some(name) => {
                    out.push('\\');
                    out.push_str(name);
                    out.push(' ');
                }
                None => push_escaped(out, *ch),
            },
            Command::OperatorName(OperatorName { name }) => {
                out.push('\\');
                out.push_str(name);
                out.push(' ');
            }
            Command::Fraction(Fraction { numer, denom }) => {
                self.write_frac(*numer, *denom, out);
            }
            Command::MixedFraction(MixedFraction {
                whole,
                numer,
                denom,
            }) => {
                // The whole part serializes inline, so a mixed fraction
                // round-trips as ordinary math followed by a \frac.
                self.write_block(*whole, out);
                self.write_frac(*numer, *denom, out);
            }
            Command::Superscript(Superscript { sup }) => {
                out.push_str("^{");
                self.write_block(*sup, out);
                out.push('}');
            }
            Command::Subscript(Subscript { sub }) => {
                out.push_str("_{");
                self.write_block(*sub, out);
                out.push('}');
            }
            Command::Sqrt(Sqrt { radicand }) => {
                out.push_str("\\sqrt{");
                self.write_block(*radicand, out);
                out.push('}');
            }
            Command::Text(TextBlock { body }) => {
                out.push_str("\\text{");
                self.write_block(*body, out);
                out.push('}');
            }
            Command::TextPiece(TextPiece { text }) => {
                for ch in text.chars() {
                    push_escaped(out, ch);
                }
            }
        }
    }

    /// Serializes the sibling run `[first, last]` back to LaTeX notation.
    #[must_use]
    pub fn latex_run(&self, first: crate::tree::NodeId, last: crate::tree::NodeId) -> String {
        let mut out = String::new();
        let mut node = Some(first);
        while let Some(n) = node {
            self.write_node(n, &mut out);
            if n == last {
                break;
            }
            node = self.sibling(n, Dir::Right);
        }
        out
    }

    fn write_frac(&self, numer: BlockId, denom: BlockId, out: &mut String) {
        out.push_str("\\frac{");
        self.write_block(numer, out);
        out.push_str("}{");
        self.write_block(denom, out);
        out.push('}');
    }
}

/// Writes one character, backslash-escaping the three that collide with the
/// notation itself so typed `{`/`}`/`\` round-trip through the parser.
fn push_escaped(out: &mut String, ch: char) {
    if matches!(ch, '{' | '}' | '\\') {
        out.push('\\');
    }
    out.push(ch);
}
