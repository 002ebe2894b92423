//! The arena-backed node/block tree.
//!
//! A formula is a tree of [`Command`] nodes grouped into blocks: a block is
//! an ordered run of sibling nodes, and composite commands (fractions,
//! exponents, text runs) own one or more named child blocks. Nodes and
//! blocks live in a [`Tree`] arena and refer to each other through opaque
//! [`NodeId`]/[`BlockId`] handles, so the sibling-linked structure of the
//! model needs no reference counting or interior mutability.
//!
//! All structural mutation goes through [`Fragment::adopt`],
//! [`Fragment::disown`], and [`Fragment::remove`]; the cursor and parser
//! never touch sibling links directly. Violating a fragment contract
//! (adopting an already-parented node, disowning a detached one) is a
//! programming error caught by `debug_assert!`, not a runtime error.

pub mod fold;

use crate::commands::Command;
use crate::types::{Dir, Ends};
use rapidhash::RapidHashSet;

/// Default hash set, using the same backend the rest of the crate does.
pub type KeySet<K> = RapidHashSet<K>;

/// Opaque handle to a node in a [`Tree`].
///
/// Ids are unique for the lifetime of the tree (slots are never reused), so
/// a `NodeId` also serves as the weak identifier external collaborators use
/// with [`Tree::lookup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

/// Opaque handle to a block in a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(u32);

#[derive(Debug)]
struct NodeRecord {
    parent: Option<BlockId>,
    left: Option<NodeId>,
    right: Option<NodeId>,
    cmd: Command,
}

#[derive(Debug)]
struct BlockRecord {
    parent: Option<NodeId>,
    ends: Ends<Option<NodeId>>,
}

/// Arena owning every node and block of one document.
#[derive(Debug, Default)]
pub struct Tree {
    nodes: Vec<NodeRecord>,
    blocks: Vec<BlockRecord>,
    /// Weak lookup registry: ids of nodes currently attached to the tree.
    /// Populated on adopt, cleared on [`Fragment::remove`].
    registry: KeySet<NodeId>,
}

impl Tree {
    /// Creates an empty tree with no blocks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a new, empty, unowned block.
    pub fn new_block(&mut self) -> BlockId {
        let id = BlockId(u32::try_from(self.blocks.len()).unwrap_or(u32::MAX));
        self.blocks.push(BlockRecord {
            parent: None,
            ends: Ends::default(),
        });
        id
    }

    /// Allocates a new unattached node and claims ownership of the child
    /// blocks its command names.
    pub fn new_node(&mut self, cmd: Command) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        for block in cmd.child_blocks() {
            debug_assert!(
                self.blocks[block.0 as usize].parent.is_none(),
                "child block already owned by another node"
            );
            self.blocks[block.0 as usize].parent = Some(id);
        }
        self.nodes.push(NodeRecord {
            parent: None,
            left: None,
            right: None,
            cmd,
        });
        id
    }

    /// The command stored at `node`.
    #[must_use]
    pub fn cmd(&self, node: NodeId) -> &Command {
        &self.nodes[node.0 as usize].cmd
    }

    /// Mutable access to the command stored at `node`.
    pub fn cmd_mut(&mut self, node: NodeId) -> &mut Command {
        &mut self.nodes[node.0 as usize].cmd
    }

    /// The block owning `node`, or `None` for a detached node.
    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<BlockId> {
        self.nodes[node.0 as usize].parent
    }

    /// The sibling of `node` in direction `dir`, or `None` at a block end.
    #[must_use]
    pub fn sibling(&self, node: NodeId, dir: Dir) -> Option<NodeId> {
        let record = &self.nodes[node.0 as usize];
        match dir {
            Dir::Left => record.left,
            Dir::Right => record.right,
        }
    }

    /// The composite node owning `block`, or `None` for a root block.
    #[must_use]
    pub fn owner(&self, block: BlockId) -> Option<NodeId> {
        self.blocks[block.0 as usize].parent
    }

    /// The endpoint of `block` in direction `dir`.
    #[must_use]
    pub fn end(&self, block: BlockId, dir: Dir) -> Option<NodeId> {
        self.blocks[block.0 as usize].ends[dir]
    }

    /// Whether `block` has no children.
    #[must_use]
    pub fn is_empty(&self, block: BlockId) -> bool {
        self.blocks[block.0 as usize].ends.left.is_none()
    }

    /// Iterates the children of `block` left to right.
    pub fn children(&self, block: BlockId) -> impl Iterator<Item = NodeId> + '_ {
        let mut next = self.end(block, Dir::Left);
        core::iter::from_fn(move || {
            let node = next?;
            next = self.sibling(node, Dir::Right);
            Some(node)
        })
    }

    /// Adopts a single detached node at the right end of `block`.
    pub fn append(&mut self, block: BlockId, node: NodeId) {
        let left = self.end(block, Dir::Right);
        Fragment::single(node).adopt(self, block, left, None);
    }

    /// Weak registry lookup: the command for `id` if that node is currently
    /// attached to the tree.
    #[must_use]
    pub fn lookup(&self, id: NodeId) -> Option<&Command> {
        self.registry.contains(&id).then(|| self.cmd(id))
    }

    /// Whether `id` is currently in the weak registry.
    #[must_use]
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.registry.contains(&id)
    }

    fn register_recursive(&mut self, node: NodeId) {
        self.registry.insert(node);
        for block in self.cmd(node).child_blocks().collect::<Vec<_>>() {
            let children: Vec<_> = self.children(block).collect();
            for child in children {
                self.register_recursive(child);
            }
        }
    }

    fn deregister_recursive(&mut self, node: NodeId) {
        self.registry.remove(&node);
        for block in self.cmd(node).child_blocks().collect::<Vec<_>>() {
            let children: Vec<_> = self.children(block).collect();
            for child in children {
                self.deregister_recursive(child);
            }
        }
    }

    /// Walks `block` in both directions and checks every structural
    /// invariant: endpoint reachability, sibling symmetry, parent pointers,
    /// and child-block ownership. Panics on the first breach. Test support.
    pub fn validate(&self, block: BlockId) {
        let mut forward = Vec::new();
        let mut cursor = self.end(block, Dir::Left);
        while let Some(node) = cursor {
            assert_eq!(
                self.parent(node),
                Some(block),
                "child's parent pointer disagrees with its block"
            );
            forward.push(node);
            cursor = self.sibling(node, Dir::Right);
        }
        let mut backward = Vec::new();
        let mut cursor = self.end(block, Dir::Right);
        while let Some(node) = cursor {
            backward.push(node);
            cursor = self.sibling(node, Dir::Left);
        }
        backward.reverse();
        assert_eq!(forward, backward, "left and right walks disagree");

        for node in forward {
            for child in self.cmd(node).child_blocks() {
                assert_eq!(
                    self.owner(child),
                    Some(node),
                    "child block's owner disagrees with its command"
                );
                self.validate(child);
            }
        }
    }
}

/// A contiguous run `[first, last]` of siblings within one block.
///
/// A fragment is a view, not an owner: it can re-parent the run into another
/// block ([`Fragment::adopt`]), unstitch it from its current block
/// ([`Fragment::disown`]), or unstitch and deregister it
/// ([`Fragment::remove`]). The empty fragment is valid and all operations on
/// it are no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment {
    ends: Option<(NodeId, NodeId)>,
}

impl Fragment {
    /// A fragment spanning `[first, last]`. Both ends must belong to the
    /// same block with `first` at or left of `last`.
    #[must_use]
    pub const fn new(first: NodeId, last: NodeId) -> Self {
        Self {
            ends: Some((first, last)),
        }
    }

    /// A fragment of one node.
    #[must_use]
    pub const fn single(node: NodeId) -> Self {
        Self::new(node, node)
    }

    /// The empty fragment.
    #[must_use]
    pub const fn empty() -> Self {
        Self { ends: None }
    }

    /// Whether the fragment spans no nodes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.ends.is_none()
    }

    /// The endpoint in direction `dir`, if any.
    #[must_use]
    pub const fn end(&self, dir: Dir) -> Option<NodeId> {
        match self.ends {
            Some((first, last)) => Some(match dir {
                Dir::Left => first,
                Dir::Right => last,
            }),
            None => None,
        }
    }

    fn run(&self, tree: &Tree) -> Vec<NodeId> {
        let Some((first, last)) = self.ends else {
            return Vec::new();
        };
        let mut nodes = Vec::new();
        let mut cursor = Some(first);
        while let Some(node) = cursor {
            nodes.push(node);
            if node == last {
                return nodes;
            }
            cursor = tree.sibling(node, Dir::Right);
        }
        debug_assert!(false, "fragment ends are not siblings in order");
        nodes
    }

    /// Re-parents every node in the run into `block` between `left` and
    /// `right`, updating sibling links and the block's endpoints. The run's
    /// nodes must be detached (freshly created or disowned) and `left`/
    /// `right` must be adjacent positions of `block`.
    pub fn adopt(
        &self,
        tree: &mut Tree,
        block: BlockId,
        left: Option<NodeId>,
        right: Option<NodeId>,
    ) {
        let Some((first, last)) = self.ends else {
            return;
        };
        debug_assert_eq!(
            left.map_or(tree.end(block, Dir::Left), |l| tree.sibling(l, Dir::Right)),
            right,
            "adopt target neighbors are not adjacent"
        );

        let run = self.run(tree);
        for &node in &run {
            debug_assert!(
                tree.parent(node).is_none(),
                "adopting a node that already has a parent"
            );
            tree.nodes[node.0 as usize].parent = Some(block);
        }

        tree.nodes[first.0 as usize].left = left;
        tree.nodes[last.0 as usize].right = right;
        match left {
            Some(l) => tree.nodes[l.0 as usize].right = Some(first),
            None => tree.blocks[block.0 as usize].ends.left = Some(first),
        }
        match right {
            Some(r) => tree.nodes[r.0 as usize].left = Some(last),
            None => tree.blocks[block.0 as usize].ends.right = Some(last),
        }

        for node in run {
            tree.register_recursive(node);
        }
    }

    /// Removes the run from its block, restitching the block's endpoints and
    /// the former neighbors around the gap. The nodes themselves survive,
    /// detached, with their intra-run sibling links intact.
    pub fn disown(&self, tree: &mut Tree) {
        let Some((first, last)) = self.ends else {
            return;
        };
        let block = tree.parent(first);
        debug_assert!(block.is_some(), "disowning a node with no parent");
        let Some(block) = block else { return };
        debug_assert_eq!(tree.parent(last), Some(block), "fragment spans two blocks");

        let before = tree.sibling(first, Dir::Left);
        let after = tree.sibling(last, Dir::Right);
        match before {
            Some(l) => tree.nodes[l.0 as usize].right = after,
            None => tree.blocks[block.0 as usize].ends.left = after,
        }
        match after {
            Some(r) => tree.nodes[r.0 as usize].left = before,
            None => tree.blocks[block.0 as usize].ends.right = before,
        }
        tree.nodes[first.0 as usize].left = None;
        tree.nodes[last.0 as usize].right = None;
        for node in self.run(tree) {
            tree.nodes[node.0 as usize].parent = None;
        }
    }

    /// Disowns the run and clears it (and every descendant) from the weak
    /// lookup registry. The slots linger in the arena, unreachable.
    pub fn remove(self, tree: &mut Tree) {
        if self.ends.is_none() {
            return;
        }
        let run = self.run(tree);
        self.disown(tree);
        for node in run {
            tree.deregister_recursive(node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;

    fn symbol(tree: &mut Tree, ch: char) -> NodeId {
        tree.new_node(Command::plain_symbol(ch))
    }

    #[test]
    fn test_append_builds_sibling_chain() {
        let mut tree = Tree::new();
        let block = tree.new_block();
        let a = symbol(&mut tree, 'a');
        let b = symbol(&mut tree, 'b');
        let c = symbol(&mut tree, 'c');
        tree.append(block, a);
        tree.append(block, b);
        tree.append(block, c);

        tree.validate(block);
        assert_eq!(tree.children(block).collect::<Vec<_>>(), vec![a, b, c]);
        assert_eq!(tree.end(block, Dir::Left), Some(a));
        assert_eq!(tree.end(block, Dir::Right), Some(c));
        assert_eq!(tree.sibling(b, Dir::Left), Some(a));
        assert_eq!(tree.sibling(b, Dir::Right), Some(c));
    }

    #[test]
    fn test_disown_restitches_neighbors() {
        let mut tree = Tree::new();
        let block = tree.new_block();
        let nodes: Vec<_> = "abcd".chars().map(|ch| symbol(&mut tree, ch)).collect();
        for &n in &nodes {
            tree.append(block, n);
        }

        Fragment::new(nodes[1], nodes[2]).disown(&mut tree);
        tree.validate(block);
        assert_eq!(
            tree.children(block).collect::<Vec<_>>(),
            vec![nodes[0], nodes[3]]
        );
        assert_eq!(tree.parent(nodes[1]), None);
        // The run keeps its internal links for re-adoption.
        assert_eq!(tree.sibling(nodes[1], Dir::Right), Some(nodes[2]));
    }

    #[test]
    fn test_adopt_between_neighbors() {
        let mut tree = Tree::new();
        let block = tree.new_block();
        let a = symbol(&mut tree, 'a');
        let d = symbol(&mut tree, 'd');
        tree.append(block, a);
        tree.append(block, d);

        let other = tree.new_block();
        let b = symbol(&mut tree, 'b');
        let c = symbol(&mut tree, 'c');
        tree.append(other, b);
        tree.append(other, c);

        let run = Fragment::new(b, c);
        run.disown(&mut tree);
        run.adopt(&mut tree, block, Some(a), Some(d));

        tree.validate(block);
        tree.validate(other);
        assert_eq!(tree.children(block).collect::<Vec<_>>(), vec![a, b, c, d]);
        assert!(tree.is_empty(other));
        assert_eq!(tree.parent(b), Some(block));
    }

    #[test]
    fn test_remove_clears_registry_recursively() {
        let mut tree = Tree::new();
        let block = tree.new_block();
        let numer = tree.new_block();
        let denom = tree.new_block();
        let one = symbol(&mut tree, '1');
        let two = symbol(&mut tree, '2');
        tree.append(numer, one);
        tree.append(denom, two);
        let frac = tree.new_node(Command::fraction(numer, denom));
        tree.append(block, frac);

        assert!(tree.lookup(frac).is_some());
        assert!(tree.is_attached(one));
        assert!(tree.is_attached(two));

        Fragment::single(frac).remove(&mut tree);
        assert!(tree.lookup(frac).is_none());
        assert!(!tree.is_attached(one));
        assert!(!tree.is_attached(two));
        assert!(tree.is_empty(block));
    }

    #[test]
    fn test_empty_fragment_is_noop() {
        let mut tree = Tree::new();
        let block = tree.new_block();
        Fragment::empty().disown(&mut tree);
        Fragment::empty().adopt(&mut tree, block, None, None);
        Fragment::empty().remove(&mut tree);
        assert!(tree.is_empty(block));
    }
}
