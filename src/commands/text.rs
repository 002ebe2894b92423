//! Editing behavior for text runs.
//!
//! A text node's body holds [`TextPiece`](super::TextPiece) leaves, and the
//! cursor sits *between* nodes, so to move through text one character at a
//! time, characters are transferred between the pieces flanking the cursor:
//! stepping right over `|"abc"` peels `a` off into the piece on the
//! cursor's left (creating it if needed), leaving `"a"|"bc"`. Deletion
//! shrinks the near end of the adjacent piece in place, removing the piece
//! outright when its last character goes.
//!
//! Pieces are never empty, and adjacent pieces not separated by the cursor
//! or anticursor are merged back into maximal runs by [`consolidate`].

use crate::commands::Command;
use crate::cursor::Point;
use crate::tree::{BlockId, Fragment, NodeId, Tree};
use crate::types::Dir;

/// The character that enters and leaves text mode.
pub const ESCAPE: char = '$';

fn piece_text(tree: &Tree, node: NodeId) -> &str {
    match tree.cmd(node) {
        Command::TextPiece(piece) => &piece.text,
        _ => {
            debug_assert!(false, "expected a text piece");
            ""
        }
    }
}

fn is_piece(tree: &Tree, node: NodeId) -> bool {
    matches!(tree.cmd(node), Command::TextPiece(_))
}

/// The character at the `dir` end of a piece's payload.
fn end_char(tree: &Tree, node: NodeId, dir: Dir) -> Option<char> {
    let text = piece_text(tree, node);
    match dir {
        Dir::Left => text.chars().next(),
        Dir::Right => text.chars().next_back(),
    }
}

/// Appends `ch` at the `dir` end of a piece's payload.
fn push_char(tree: &mut Tree, node: NodeId, ch: char, dir: Dir) {
    if let Command::TextPiece(piece) = tree.cmd_mut(node) {
        match dir {
            Dir::Left => piece.text.insert(0, ch),
            Dir::Right => piece.text.push(ch),
        }
    } else {
        debug_assert!(false, "expected a text piece");
    }
}

/// Drops the character at the `dir` end of a piece's payload. The caller
/// guarantees at least two characters remain.
fn pop_char(tree: &mut Tree, node: NodeId, dir: Dir) {
    if let Command::TextPiece(piece) = tree.cmd_mut(node) {
        match dir {
            Dir::Left => {
                let ch = piece.text.chars().next().map_or(0, char::len_utf8);
                piece.text.drain(..ch);
            }
            Dir::Right => {
                piece.text.pop();
            }
        }
        debug_assert!(!piece.text.is_empty(), "pieces must stay non-empty");
    }
}

fn repoint(point: &mut Point, removed: NodeId, left: Option<NodeId>, right: Option<NodeId>) {
    if point.left == Some(removed) {
        point.left = left;
    }
    if point.right == Some(removed) {
        point.right = right;
    }
}

/// Writes `ch` with the cursor inside the body of the text node `text`.
///
/// Ordinary characters grow the piece left of the cursor (or start a new
/// piece when the cursor is at the run's left end). The [`ESCAPE`] character
/// leaves text mode instead: out of an empty run by deleting the whole text
/// node, at either end of a non-empty run by stepping outside it, and
/// strictly inside by splitting the run into two sibling text nodes with
/// the cursor between them.
pub fn write(tree: &mut Tree, cursor: &mut Point, text: NodeId, ch: char) {
    if ch != ESCAPE {
        match cursor.left {
            Some(piece) => push_char(tree, piece, ch, Dir::Right),
            None => {
                let piece = tree.new_node(Command::text_piece(ch.to_string()));
                Fragment::single(piece).adopt(tree, cursor.block, None, cursor.right);
                cursor.left = Some(piece);
            }
        }
        return;
    }

    let Some(outside) = tree.parent(text) else {
        return;
    };
    if tree.is_empty(cursor.block) {
        let left = tree.sibling(text, Dir::Left);
        let right = tree.sibling(text, Dir::Right);
        Fragment::single(text).remove(tree);
        *cursor = Point {
            block: outside,
            left,
            right,
        };
    } else if cursor.right.is_none() {
        *cursor = Point {
            block: outside,
            left: Some(text),
            right: tree.sibling(text, Dir::Right),
        };
    } else if cursor.left.is_none() {
        *cursor = Point {
            block: outside,
            left: tree.sibling(text, Dir::Left),
            right: Some(text),
        };
    } else if let (Some(first), Some(split_at)) = (tree.end(cursor.block, Dir::Left), cursor.left) {
        // Split: the pieces left of the cursor move into a fresh text node
        // inserted before this one.
        let run = Fragment::new(first, split_at);
        run.disown(tree);
        let body = tree.new_block();
        run.adopt(tree, body, None, None);
        let split = tree.new_node(Command::text(body));
        let left = tree.sibling(text, Dir::Left);
        Fragment::single(split).adopt(tree, outside, left, Some(text));
        *cursor = Point {
            block: outside,
            left: Some(split),
            right: Some(text),
        };
    }
}

/// Moves the cursor one character through `piece`, its neighbor in
/// direction `dir`, by transferring the near-end character to the other
/// side of the cursor. Also the one-step worker for character-level
/// selection, which is why it takes the anticursor: the gap the anticursor
/// marks must stay a piece boundary, so the transferred character goes into
/// a fresh piece rather than merging across it.
pub fn piece_step(
    tree: &mut Tree,
    cursor: &mut Point,
    anticursor: &mut Option<Point>,
    piece: NodeId,
    dir: Dir,
) {
    debug_assert_eq!(cursor.neighbor(dir), Some(piece));
    let Some(ch) = end_char(tree, piece, dir.flip()) else {
        return;
    };

    let same_gap = anticursor.is_some_and(|a| a == *cursor);
    let from = cursor.neighbor(dir.flip());
    match from {
        Some(from) if !same_gap && is_piece(tree, from) => {
            push_char(tree, from, ch, dir);
        }
        _ => {
            let fresh = tree.new_node(Command::text_piece(ch.to_string()));
            Fragment::single(fresh).adopt(tree, cursor.block, cursor.left, cursor.right);
            match dir {
                Dir::Right => cursor.left = Some(fresh),
                Dir::Left => cursor.right = Some(fresh),
            }
            if same_gap && let Some(anti) = anticursor {
                // The anticursor stays on the far side of the new piece.
                match dir {
                    Dir::Right => anti.right = Some(fresh),
                    Dir::Left => anti.left = Some(fresh),
                }
            }
        }
    }

    piece_delete(tree, cursor, anticursor, piece, dir);
}

/// Deletes one character from `piece`, the cursor's neighbor in direction
/// `dir`: the payload shrinks at its near end, and a single-character piece
/// is removed whole with cursor and anticursor repointed past it.
pub fn piece_delete(
    tree: &mut Tree,
    cursor: &mut Point,
    anticursor: &mut Option<Point>,
    piece: NodeId,
    dir: Dir,
) {
    debug_assert_eq!(cursor.neighbor(dir), Some(piece));
    if piece_text(tree, piece).chars().count() > 1 {
        pop_char(tree, piece, dir.flip());
        return;
    }
    let left = tree.sibling(piece, Dir::Left);
    let right = tree.sibling(piece, Dir::Right);
    Fragment::single(piece).remove(tree);
    repoint(cursor, piece, left, right);
    if let Some(anti) = anticursor {
        repoint(anti, piece, left, right);
    }
}

/// Merges every pair of adjacent pieces in `body` that is not separated by
/// the cursor or the anticursor, restoring the maximal-runs invariant.
/// Idempotent: a second pass with no intervening edit changes nothing.
pub fn consolidate(
    tree: &mut Tree,
    body: BlockId,
    cursor: &mut Point,
    anticursor: &mut Option<Point>,
) {
    let mut current = tree.end(body, Dir::Left);
    while let Some(piece) = current {
        let Some(next) = tree.sibling(piece, Dir::Right) else {
            return;
        };
        let gap_guarded = cursor.left == Some(piece)
            || anticursor.is_some_and(|a| a.left == Some(piece));
        if gap_guarded {
            current = Some(next);
            continue;
        }
        let tail = piece_text(tree, next).to_owned();
        if let Command::TextPiece(merged) = tree.cmd_mut(piece) {
            merged.text.push_str(&tail);
        }
        let after = tree.sibling(next, Dir::Right);
        Fragment::single(next).remove(tree);
        repoint(cursor, next, Some(piece), after);
        if let Some(anti) = anticursor {
            repoint(anti, next, Some(piece), after);
        }
    }
}
