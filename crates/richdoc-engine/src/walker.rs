//! Lazy document-order traversal.
//!
//! [`TreeWalker`] visits nodes in pre-order (or its exact reverse) and asks a
//! filter what to do with each one. Walks over a [`Range`] only descend into
//! subtrees that overlap it.

use crate::error::{ModelError, Result};
use crate::model::{NodeId, Tree};
use crate::position::{IndexPath, Position, RelativePosition, compare_paths};
use crate::range::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterResult {
    /// Yield the node and descend into it.
    Accept,
    /// Don't yield the node but still descend into it.
    Skip,
    /// Neither yield nor descend.
    Reject,
}

impl From<bool> for FilterResult {
    fn from(accept: bool) -> Self {
        if accept {
            FilterResult::Accept
        } else {
            FilterResult::Skip
        }
    }
}

pub fn accept_text(tree: &Tree, id: NodeId) -> FilterResult {
    tree.is_text(id).into()
}

pub fn accept_text_and_void(tree: &Tree, id: NodeId) -> FilterResult {
    (tree.is_text(id) || tree.is_void(id)).into()
}

pub fn accept_all(_: &Tree, _: NodeId) -> FilterResult {
    FilterResult::Accept
}

struct Frame {
    node: NodeId,
    path: IndexPath,
    expanded: bool,
    accepted: bool,
}

struct Bounds {
    start: IndexPath,
    end: IndexPath,
}

impl Bounds {
    /// A node spans from just before it to just after it in its parent.
    fn overlaps(&self, path: &[usize]) -> bool {
        let Some((last, prefix)) = path.split_last() else {
            return true;
        };
        let mut after = prefix.to_vec();
        after.push(last + 1);
        compare_paths(path, &self.end) == RelativePosition::Before
            && compare_paths(&after, &self.start) == RelativePosition::After
    }

    fn starts_past_end(&self, path: &[usize]) -> bool {
        compare_paths(path, &self.end) != RelativePosition::Before
    }
}

pub struct TreeWalker<'a, F>
where
    F: FnMut(&Tree, NodeId) -> FilterResult,
{
    tree: &'a Tree,
    filter: F,
    reverse: bool,
    bounds: Option<Bounds>,
    stack: Vec<Frame>,
}

impl<'a, F> TreeWalker<'a, F>
where
    F: FnMut(&Tree, NodeId) -> FilterResult,
{
    /// Walks every descendant of `root`, excluding `root` itself.
    pub fn subtree(tree: &'a Tree, root: NodeId, filter: F, reverse: bool) -> Self {
        let mut walker = Self {
            tree,
            filter,
            reverse,
            bounds: None,
            stack: Vec::new(),
        };
        walker.push_children(root, &[]);
        walker
    }

    /// Walks the nodes overlapping `range`, starting from the deepest element
    /// that contains both of its ends.
    pub fn from_range(tree: &'a Tree, range: &Range, filter: F, reverse: bool) -> Result<Self> {
        let root = range.root();
        tree.node(root)?;
        let common = range.common_ancestor();
        let mut scope = root;
        let mut scope_path = IndexPath::new();
        for index in common.path() {
            match tree.child_at(scope, *index) {
                Some(child) if tree.is_element(child) => {
                    scope = child;
                    scope_path.push(*index);
                }
                _ => break,
            }
        }
        let mut walker = Self {
            tree,
            filter,
            reverse,
            bounds: Some(Bounds {
                start: range.start().path().to_vec(),
                end: range.end().path().to_vec(),
            }),
            stack: Vec::new(),
        };
        walker.push_children(scope, &scope_path);
        Ok(walker)
    }

    fn push_children(&mut self, node: NodeId, path: &[usize]) {
        let children = self.tree.children(node);
        let frames = children.iter().enumerate().map(|(i, child)| {
            let mut child_path = path.to_vec();
            child_path.push(i);
            Frame {
                node: *child,
                path: child_path,
                expanded: false,
                accepted: false,
            }
        });
        if self.reverse {
            // Last child on top of the stack
            self.stack.extend(frames);
        } else {
            let frames: Vec<Frame> = frames.collect();
            self.stack.extend(frames.into_iter().rev());
        }
    }

    fn next_forward(&mut self) -> Option<NodeId> {
        while let Some(frame) = self.stack.pop() {
            if let Some(bounds) = &self.bounds {
                if bounds.starts_past_end(&frame.path) {
                    // Everything still on the stack comes later in document order
                    self.stack.clear();
                    return None;
                }
                if !bounds.overlaps(&frame.path) {
                    continue;
                }
            }
            let decision = (self.filter)(self.tree, frame.node);
            if decision != FilterResult::Reject {
                self.push_children(frame.node, &frame.path);
            }
            if decision == FilterResult::Accept {
                return Some(frame.node);
            }
        }
        None
    }

    fn next_reverse(&mut self) -> Option<NodeId> {
        while let Some(frame) = self.stack.pop() {
            if frame.expanded {
                if frame.accepted {
                    return Some(frame.node);
                }
                continue;
            }
            if let Some(bounds) = &self.bounds
                && !bounds.overlaps(&frame.path)
            {
                continue;
            }
            let decision = (self.filter)(self.tree, frame.node);
            let node = frame.node;
            let path = frame.path;
            self.stack.push(Frame {
                node,
                path: path.clone(),
                expanded: true,
                accepted: decision == FilterResult::Accept,
            });
            if decision != FilterResult::Reject {
                self.push_children(node, &path);
            }
        }
        None
    }
}

impl<F> Iterator for TreeWalker<'_, F>
where
    F: FnMut(&Tree, NodeId) -> FilterResult,
{
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.reverse {
            self.next_reverse()
        } else {
            self.next_forward()
        }
    }
}

fn end_of(tree: &Tree, root: NodeId) -> Position {
    Position::from_path(root, vec![tree.node_len(root)])
}

/// The first text node after `node` in document order.
pub fn next_text_node(tree: &Tree, node: NodeId) -> Option<NodeId> {
    let root = tree.root_of(node);
    let start = Position::after_node(tree, node).ok()?;
    let range = Range::new(start, end_of(tree, root)).ok()?;
    TreeWalker::from_range(tree, &range, accept_text, false)
        .ok()?
        .find(|n| *n != node && !tree.is_ancestor_of(*n, node))
}

/// The last text node before `node` in document order.
pub fn previous_text_node(tree: &Tree, node: NodeId) -> Option<NodeId> {
    let root = tree.root_of(node);
    let end = Position::before_node(tree, node).ok()?;
    let range = Range::new(Position::from_path(root, vec![0]), end).ok()?;
    TreeWalker::from_range(tree, &range, accept_text, true)
        .ok()?
        .find(|n| *n != node)
}

/// Width of a leaf when counting global text offsets: characters for text,
/// one for voids.
fn leaf_width(tree: &Tree, id: NodeId) -> usize {
    if tree.is_void(id) { 1 } else { tree.node_len(id) }
}

/// Maps a flat text offset, counting every void as one character, to a
/// path under `root`. Offsets on a boundary resolve to the end of the
/// earlier text node.
pub fn global_text_offset_to_path(tree: &Tree, root: NodeId, offset: usize) -> Result<IndexPath> {
    let mut remaining = offset;
    let mut last_text: Option<NodeId> = None;
    for leaf in TreeWalker::subtree(tree, root, accept_text_and_void, false) {
        let width = leaf_width(tree, leaf);
        if tree.is_text(leaf) {
            if remaining <= width {
                let mut path = relative_path(tree, root, leaf);
                path.push(remaining);
                return Ok(path);
            }
            last_text = Some(leaf);
        } else if remaining == 0 {
            // Caret right before a void
            return Ok(relative_path(tree, root, leaf));
        }
        remaining -= width;
    }
    if remaining == 0 {
        if let Some(text) = last_text {
            let mut path = relative_path(tree, root, text);
            path.push(tree.node_len(text));
            return Ok(path);
        }
        return Ok(vec![tree.node_len(root)]);
    }
    Err(ModelError::OffsetOutOfRange {
        offset,
        length: offset - remaining,
    })
}

/// Inverse of [`global_text_offset_to_path`].
pub fn global_text_offset(tree: &Tree, position: &Position) -> Result<usize> {
    let root = position.root();
    let target = position.path();
    let mut total = 0;
    for leaf in TreeWalker::subtree(tree, root, accept_text_and_void, false) {
        let path = relative_path(tree, root, leaf);
        if tree.is_text(leaf) && target.len() == path.len() + 1 && target.starts_with(&path) {
            return Ok(total + position.parent_offset());
        }
        let mut after = path.clone();
        if let Some(last) = after.last_mut() {
            *last += 1;
        }
        if compare_paths(&after, target) == RelativePosition::After {
            break;
        }
        total += leaf_width(tree, leaf);
    }
    Ok(total)
}

fn relative_path(tree: &Tree, root: NodeId, node: NodeId) -> IndexPath {
    let full = tree.index_path(node);
    let depth = tree.index_path(root).len();
    full[depth..].to_vec()
}
