//! The cursor and the editable field built around it.
//!
//! A [`Point`] is a gap between two sibling nodes in one block; the cursor
//! is a point plus an optional anticursor marking the far end of a
//! selection. Rather than maintaining a selection fragment incrementally,
//! the field re-derives it after every selecting step: both endpoints are
//! lifted to their deepest common block and the sibling run between them is
//! the selection. That keeps every structural edit funneled through
//! [`Fragment`] with no selection bookkeeping to corrupt.

use crate::commands::{Command, VerticalJump, text};
use crate::parser::parse_latex;
use crate::tree::{BlockId, Fragment, NodeId, Tree};
use crate::types::{Dir, ParseError, VDir};

/// A position between two sibling nodes in a block. `left` and `right` are
/// the flanking nodes, `None` at the block's ends; an empty block has one
/// point with both sides `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    /// The block the point sits in.
    pub block: BlockId,
    /// The node left of the gap, if any.
    pub left: Option<NodeId>,
    /// The node right of the gap, if any.
    pub right: Option<NodeId>,
}

impl Point {
    /// The flanking node in direction `dir`.
    #[must_use]
    pub fn neighbor(&self, dir: Dir) -> Option<NodeId> {
        match dir {
            Dir::Left => self.left,
            Dir::Right => self.right,
        }
    }

    /// The point at the `dir` end of `block`.
    #[must_use]
    pub fn at_end(tree: &Tree, block: BlockId, dir: Dir) -> Self {
        match dir {
            Dir::Left => Self {
                block,
                left: None,
                right: tree.end(block, Dir::Left),
            },
            Dir::Right => Self {
                block,
                left: tree.end(block, Dir::Right),
                right: None,
            },
        }
    }

    /// The point directly beside `node` on its `dir` side, in the block that
    /// owns it. `None` if the node is detached.
    #[must_use]
    pub fn beside(tree: &Tree, node: NodeId, dir: Dir) -> Option<Self> {
        let block = tree.parent(node)?;
        Some(match dir {
            Dir::Left => Self {
                block,
                left: tree.sibling(node, Dir::Left),
                right: Some(node),
            },
            Dir::Right => Self {
                block,
                left: Some(node),
                right: tree.sibling(node, Dir::Right),
            },
        })
    }
}

/// An editable math field: one document tree, a cursor, and the selection
/// anticursor.
#[derive(Debug)]
pub struct MathField {
    tree: Tree,
    root: BlockId,
    cursor: Point,
    anticursor: Option<Point>,
}

impl Default for MathField {
    fn default() -> Self {
        Self::new()
    }
}

impl MathField {
    /// An empty field with the cursor in its root block.
    #[must_use]
    pub fn new() -> Self {
        let mut tree = Tree::new();
        let root = tree.new_block();
        Self {
            tree,
            cursor: Point {
                block: root,
                left: None,
                right: None,
            },
            root,
            anticursor: None,
        }
    }

    /// Replaces the whole document with the parse of `latex`, leaving the
    /// cursor at the right end of the new root. On a parse error the field
    /// is untouched.
    pub fn render_latex(&mut self, latex: &str) -> Result<(), ParseError> {
        let (tree, root) = parse_latex(latex)?;
        self.cursor = Point::at_end(&tree, root, Dir::Right);
        self.tree = tree;
        self.root = root;
        self.anticursor = None;
        Ok(())
    }

    /// The document tree.
    #[must_use]
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// The root block of the document.
    #[must_use]
    pub fn root(&self) -> BlockId {
        self.root
    }

    /// The current cursor position.
    #[must_use]
    pub fn cursor(&self) -> Point {
        self.cursor
    }

    /// Serializes the whole document back to LaTeX notation.
    #[must_use]
    pub fn latex(&self) -> String {
        self.tree.latex(self.root)
    }

    /// The semantic character count of the whole document.
    #[must_use]
    pub fn char_count(&self) -> usize {
        self.tree.char_count(self.root)
    }

    /// The deepest block-nesting level of the document.
    #[must_use]
    pub fn max_nesting(&self) -> usize {
        self.tree.max_nesting(self.root)
    }

    /// Folds `combine` over every node of the document in document order.
    pub fn fold<A>(&self, seed: A, combine: &mut impl FnMut(A, NodeId) -> A) -> A {
        self.tree.fold(self.root, seed, combine)
    }

    /// Weak lookup: the command for `id` if that node is currently attached
    /// to the document.
    #[must_use]
    pub fn lookup(&self, id: NodeId) -> Option<&Command> {
        self.tree.lookup(id)
    }

    /// The LaTeX of the current selection, or `None` when nothing is
    /// selected.
    #[must_use]
    pub fn selection_latex(&self) -> Option<String> {
        let (first, last, _) = self.selection_span()?;
        Some(self.tree.latex_run(first, last))
    }

    /// Whether a non-empty selection exists.
    #[must_use]
    pub fn has_selection(&self) -> bool {
        self.selection_span().is_some()
    }

    /// Drops the selection without moving the cursor.
    pub fn deselect(&mut self) {
        self.anticursor = None;
    }

    /// Places the cursor at the left end of `block`, dropping any selection.
    pub fn ins_at_left_end(&mut self, block: BlockId) {
        self.anticursor = None;
        self.cursor = Point::at_end(&self.tree, block, Dir::Left);
    }

    /// Places the cursor at the right end of `block`, dropping any
    /// selection.
    pub fn ins_at_right_end(&mut self, block: BlockId) {
        self.anticursor = None;
        self.cursor = Point::at_end(&self.tree, block, Dir::Right);
    }

    /// Moves the cursor one step left. A selection collapses to its left
    /// edge instead.
    pub fn move_left(&mut self) {
        self.move_dir(Dir::Left);
    }

    /// Moves the cursor one step right. A selection collapses to its right
    /// edge instead.
    pub fn move_right(&mut self) {
        self.move_dir(Dir::Right);
    }

    /// Jumps the cursor up: into an adjacent composite's upper block if one
    /// flanks the cursor, else out through the enclosing composites.
    pub fn move_up(&mut self) {
        self.anticursor = None;
        self.vertical(VDir::Up);
    }

    /// Jumps the cursor down, mirroring [`MathField::move_up`].
    pub fn move_down(&mut self) {
        self.anticursor = None;
        self.vertical(VDir::Down);
    }

    /// Extends the selection one step left.
    pub fn select_left(&mut self) {
        self.select_dir(Dir::Left);
    }

    /// Extends the selection one step right.
    pub fn select_right(&mut self) {
        self.select_dir(Dir::Right);
    }

    /// Extends the selection through an upward jump.
    pub fn select_up(&mut self) {
        self.ensure_anticursor();
        self.vertical(VDir::Up);
    }

    /// Extends the selection through a downward jump.
    pub fn select_down(&mut self) {
        self.ensure_anticursor();
        self.vertical(VDir::Down);
    }

    /// Deletes leftward: the selection if one exists, else one character or
    /// node left of the cursor.
    pub fn backspace(&mut self) {
        self.delete_dir(Dir::Left);
    }

    /// Deletes rightward, mirroring [`MathField::backspace`].
    pub fn delete(&mut self) {
        self.delete_dir(Dir::Right);
    }

    /// Types one character at the cursor, replacing the selection if one
    /// exists.
    ///
    /// In math context `^` and `_` open an empty script block with the
    /// cursor inside, [`text::ESCAPE`] opens an empty text run, whitespace
    /// is ignored, and anything else becomes a symbol. Inside a text run
    /// every character is literal except [`text::ESCAPE`], which exits.
    pub fn write(&mut self, ch: char) {
        self.delete_selection();
        let in_text = self.tree.owner(self.cursor.block).and_then(|owner| {
            matches!(self.tree.cmd(owner), Command::Text(_)).then_some(owner)
        });
        if let Some(text_node) = in_text {
            text::write(&mut self.tree, &mut self.cursor, text_node, ch);
            return;
        }
        match ch {
            '^' => {
                let sup = self.tree.new_block();
                self.insert_at_cursor(Command::superscript(sup));
                self.cursor = Point {
                    block: sup,
                    left: None,
                    right: None,
                };
            }
            '_' => {
                let sub = self.tree.new_block();
                self.insert_at_cursor(Command::subscript(sub));
                self.cursor = Point {
                    block: sub,
                    left: None,
                    right: None,
                };
            }
            text::ESCAPE => {
                let body = self.tree.new_block();
                self.insert_at_cursor(Command::text(body));
                self.cursor = Point {
                    block: body,
                    left: None,
                    right: None,
                };
            }
            _ if ch.is_whitespace() => {}
            _ => {
                self.insert_at_cursor(Command::plain_symbol(ch));
            }
        }
    }

    /// Re-merges fragmented text runs everywhere in the document. Gaps held
    /// by the cursor or anticursor are preserved.
    pub fn consolidate(&mut self) {
        let mut bodies = Vec::new();
        self.tree.fold(self.root, (), &mut |(), node| {
            if let Command::Text(run) = self.tree.cmd(node) {
                bodies.push(run.body);
            }
        });
        for body in bodies {
            text::consolidate(&mut self.tree, body, &mut self.cursor, &mut self.anticursor);
        }
    }

    fn insert_at_cursor(&mut self, cmd: Command) -> NodeId {
        let node = self.tree.new_node(cmd);
        Fragment::single(node).adopt(&mut self.tree, self.cursor.block, self.cursor.left, self.cursor.right);
        self.cursor.left = Some(node);
        node
    }

    fn ensure_anticursor(&mut self) {
        if self.anticursor.is_none() {
            self.anticursor = Some(self.cursor);
        }
    }

    fn move_dir(&mut self, dir: Dir) {
        if self.collapse_selection(dir) {
            return;
        }
        match self.cursor.neighbor(dir) {
            Some(node) => self.move_towards(node, dir),
            None => self.move_out_of(dir),
        }
    }

    fn move_towards(&mut self, node: NodeId, dir: Dir) {
        if matches!(self.tree.cmd(node), Command::TextPiece(_)) {
            text::piece_step(&mut self.tree, &mut self.cursor, &mut self.anticursor, node, dir);
            return;
        }
        match self.tree.cmd(node).entry_block(dir) {
            // Entering a composite: moving right arrives at the left end of
            // its leftmost block, and mirrored.
            Some(block) => self.cursor = Point::at_end(&self.tree, block, dir.flip()),
            None => {
                if let Some(point) = Point::beside(&self.tree, node, dir) {
                    self.cursor = point;
                }
            }
        }
    }

    /// Exits the current block to sit beside its owning composite. At the
    /// root this is a no-op. Leaving a text run consolidates it.
    fn move_out_of(&mut self, dir: Dir) {
        let Some(owner) = self.tree.owner(self.cursor.block) else {
            return;
        };
        let Some(point) = Point::beside(&self.tree, owner, dir) else {
            return;
        };
        self.cursor = point;
        let body = match self.tree.cmd(owner) {
            Command::Text(run) => Some(run.body),
            _ => None,
        };
        if let Some(body) = body {
            text::consolidate(&mut self.tree, body, &mut self.cursor, &mut self.anticursor);
        }
    }

    fn vertical(&mut self, vdir: VDir) {
        // Entering a flanking composite takes priority over leaving the
        // current one; the right neighbor is tried first.
        if let Some(node) = self.cursor.right
            && let Some(block) = self.tree.cmd(node).vertical_entry(vdir)
        {
            self.cursor = Point::at_end(&self.tree, block, Dir::Left);
            return;
        }
        if let Some(node) = self.cursor.left
            && let Some(block) = self.tree.cmd(node).vertical_entry(vdir)
        {
            self.cursor = Point::at_end(&self.tree, block, Dir::Right);
            return;
        }

        let side = self.nearest_end();
        let exit_dir = if self.cursor.right.is_none() && self.cursor.left.is_some() {
            Dir::Right
        } else {
            Dir::Left
        };
        let mut block = self.cursor.block;
        loop {
            let Some(owner) = self.tree.owner(block) else {
                return;
            };
            match self.tree.cmd(owner).vertical_jump(block, vdir) {
                Some(VerticalJump::Enter(target)) => {
                    self.cursor = Point::at_end(&self.tree, target, side);
                    return;
                }
                Some(VerticalJump::Exit) => {
                    if let Some(point) = Point::beside(&self.tree, owner, exit_dir) {
                        self.cursor = point;
                    }
                    return;
                }
                None => {
                    let Some(parent) = self.tree.parent(owner) else {
                        return;
                    };
                    block = parent;
                }
            }
        }
    }

    /// Which end of the cursor's block is closer, counting nodes. Ties go
    /// left, as does the empty block.
    fn nearest_end(&self) -> Dir {
        let mut left_steps = 0usize;
        let mut node = self.cursor.left;
        while let Some(n) = node {
            left_steps += 1;
            node = self.tree.sibling(n, Dir::Left);
        }
        let mut right_steps = 0usize;
        let mut node = self.cursor.right;
        while let Some(n) = node {
            right_steps += 1;
            node = self.tree.sibling(n, Dir::Right);
        }
        if right_steps < left_steps {
            Dir::Right
        } else {
            Dir::Left
        }
    }

    fn select_dir(&mut self, dir: Dir) {
        self.ensure_anticursor();
        match self.cursor.neighbor(dir) {
            Some(node) => {
                if matches!(self.tree.cmd(node), Command::TextPiece(_)) {
                    text::piece_step(&mut self.tree, &mut self.cursor, &mut self.anticursor, node, dir);
                } else if let Some(point) = Point::beside(&self.tree, node, dir) {
                    // Whole nodes are stepped over, never entered, so a
                    // selection always covers complete nodes.
                    self.cursor = point;
                }
            }
            None => {
                if let Some(owner) = self.tree.owner(self.cursor.block)
                    && let Some(point) = Point::beside(&self.tree, owner, dir)
                {
                    self.cursor = point;
                }
            }
        }
    }

    /// Collapses an existing selection to its `dir` edge. Returns whether a
    /// selection was present (even a zero-width one, which just clears).
    fn collapse_selection(&mut self, dir: Dir) -> bool {
        if self.anticursor.is_none() {
            return false;
        }
        let span = self.selection_span();
        self.anticursor = None;
        let Some((first, last, block)) = span else {
            return false;
        };
        self.cursor = match dir {
            Dir::Left => Point {
                block,
                left: self.tree.sibling(first, Dir::Left),
                right: Some(first),
            },
            Dir::Right => Point {
                block,
                left: Some(last),
                right: self.tree.sibling(last, Dir::Right),
            },
        };
        true
    }

    /// Deletes the current selection. Returns whether anything was removed.
    fn delete_selection(&mut self) -> bool {
        if self.anticursor.is_none() {
            return false;
        }
        let span = self.selection_span();
        self.anticursor = None;
        let Some((first, last, block)) = span else {
            return false;
        };
        let left = self.tree.sibling(first, Dir::Left);
        let right = self.tree.sibling(last, Dir::Right);
        Fragment::new(first, last).remove(&mut self.tree);
        self.cursor = Point { block, left, right };
        true
    }

    fn delete_dir(&mut self, dir: Dir) {
        if self.delete_selection() {
            return;
        }
        match self.cursor.neighbor(dir) {
            Some(node) => {
                if matches!(self.tree.cmd(node), Command::TextPiece(_)) {
                    text::piece_delete(&mut self.tree, &mut self.cursor, &mut self.anticursor, node, dir);
                } else if self.tree.is_blank(node) {
                    self.remove_neighbor(node, dir);
                } else {
                    // A non-blank composite is stepped into, not deleted.
                    self.move_towards(node, dir);
                }
            }
            None => self.delete_out_of(dir),
        }
    }

    fn remove_neighbor(&mut self, node: NodeId, dir: Dir) {
        let beyond = self.tree.sibling(node, dir);
        Fragment::single(node).remove(&mut self.tree);
        match dir {
            Dir::Left => self.cursor.left = beyond,
            Dir::Right => self.cursor.right = beyond,
        }
    }

    /// Deleting against the boundary of the current block: an empty
    /// composite unwraps (its surviving blocks splice into the parent), a
    /// non-empty one just lets the cursor out. No-op at the root.
    fn delete_out_of(&mut self, dir: Dir) {
        let Some(owner) = self.tree.owner(self.cursor.block) else {
            return;
        };
        if matches!(self.tree.cmd(owner), Command::Text(_)) {
            // The ends of a non-empty text run absorb the delete; only an
            // empty run is removed.
            if self.tree.is_empty(self.cursor.block) {
                self.remove_owner(owner);
            }
            return;
        }
        if self.tree.is_empty(self.cursor.block) {
            self.unwrap_composite(owner);
        } else {
            self.move_out_of(dir);
        }
    }

    fn remove_owner(&mut self, owner: NodeId) {
        let Some(block) = self.tree.parent(owner) else {
            return;
        };
        let left = self.tree.sibling(owner, Dir::Left);
        let right = self.tree.sibling(owner, Dir::Right);
        Fragment::single(owner).remove(&mut self.tree);
        self.cursor = Point { block, left, right };
    }

    /// Replaces `owner` with the contents of its blocks other than the
    /// cursor's (empty) one, spliced into the parent in reading order. The
    /// cursor lands before the spliced material.
    fn unwrap_composite(&mut self, owner: NodeId) {
        let Some(parent) = self.tree.parent(owner) else {
            return;
        };
        let left = self.tree.sibling(owner, Dir::Left);
        let right = self.tree.sibling(owner, Dir::Right);
        let survivors: Vec<BlockId> = self
            .tree
            .cmd(owner)
            .child_blocks()
            .filter(|&b| b != self.cursor.block)
            .collect();
        let mut runs = Vec::new();
        for block in survivors {
            if let (Some(first), Some(last)) = (
                self.tree.end(block, Dir::Left),
                self.tree.end(block, Dir::Right),
            ) {
                runs.push((first, last));
            }
        }
        for &(first, last) in &runs {
            Fragment::new(first, last).disown(&mut self.tree);
        }
        Fragment::single(owner).remove(&mut self.tree);

        let mut anchor = left;
        let mut first_spliced = None;
        for (first, last) in runs {
            Fragment::new(first, last).adopt(&mut self.tree, parent, anchor, right);
            if first_spliced.is_none() {
                first_spliced = Some(first);
            }
            anchor = Some(last);
        }
        self.cursor = Point {
            block: parent,
            left,
            right: first_spliced.or(right),
        };
    }

    /// The current selection as a sibling run in the deepest block
    /// containing both endpoints, or `None` when the selection is absent or
    /// zero-width.
    fn selection_span(&self) -> Option<(NodeId, NodeId, BlockId)> {
        let anti = self.anticursor?;
        let cursor_chain = self.chain(self.cursor.block);
        let anti_chain = self.chain(anti.block);
        let (common, via_cursor, via_anti) = cursor_chain.iter().find_map(|&(block, via_c)| {
            anti_chain
                .iter()
                .find(|&&(b, _)| b == block)
                .map(|&(_, via_a)| (block, via_c, via_a))
        })?;

        let kids: Vec<NodeId> = self.tree.children(common).collect();
        let index_of = |n: NodeId| kids.iter().position(|&k| k == n);
        // A point projects to a zero-width gap, a node an endpoint sits
        // inside to the unit interval it occupies.
        let interval = |point: Point, via: Option<NodeId>| -> Option<(usize, usize)> {
            match via {
                Some(node) => {
                    let i = index_of(node)?;
                    Some((i, i + 1))
                }
                None => {
                    let gap = match point.left {
                        None => 0,
                        Some(l) => index_of(l)? + 1,
                    };
                    Some((gap, gap))
                }
            }
        };
        let (c_lo, c_hi) = interval(self.cursor, via_cursor)?;
        let (a_lo, a_hi) = interval(anti, via_anti)?;
        let lo = c_lo.min(a_lo);
        let hi = c_hi.max(a_hi);
        if lo == hi {
            return None;
        }
        Some((kids[lo], kids[hi - 1], common))
    }

    /// The blocks from `start` up to the root, each paired with the node
    /// through which the previous (deeper) block hangs off it.
    fn chain(&self, start: BlockId) -> Vec<(BlockId, Option<NodeId>)> {
        let mut out = vec![(start, None)];
        let mut block = start;
        while let Some(owner) = self.tree.owner(block) {
            let Some(parent) = self.tree.parent(owner) else {
                break;
            };
            out.push((parent, Some(owner)));
            block = parent;
        }
        out
    }
}
