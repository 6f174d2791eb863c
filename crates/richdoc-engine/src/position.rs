//! Addresses inside the document tree.
//!
//! A [`Position`] is a root node plus an index path. Every element of the
//! path except the last selects a child; the last is an offset inside the
//! node reached so far: a child index for elements, a character offset for
//! text. The empty path addresses the root itself.

use std::cell::Cell;
use std::cmp::Ordering;
use std::fmt;

use crate::error::{ModelError, Result};
use crate::model::{NodeId, Tree};

pub type IndexPath = Vec<usize>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativePosition {
    Before,
    Equal,
    After,
}

impl From<Ordering> for RelativePosition {
    fn from(ordering: Ordering) -> Self {
        match ordering {
            Ordering::Less => RelativePosition::Before,
            Ordering::Equal => RelativePosition::Equal,
            Ordering::Greater => RelativePosition::After,
        }
    }
}

/// Document order of two paths: lexicographic, a prefix sorting first.
pub fn compare_paths(a: &[usize], b: &[usize]) -> RelativePosition {
    a.cmp(b).into()
}

#[derive(Debug, Clone)]
pub struct Position {
    root: NodeId,
    path: IndexPath,
    parent: Cell<Option<NodeId>>,
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root && self.path == other.path
    }
}

impl Eq for Position {}

impl Position {
    pub fn from_path(root: NodeId, path: IndexPath) -> Self {
        Self {
            root,
            path,
            parent: Cell::new(None),
        }
    }

    /// Position at `offset` inside `parent`, which must live under `root`.
    pub fn from_parent(tree: &Tree, root: NodeId, parent: NodeId, offset: usize) -> Result<Self> {
        tree.node(parent)?;
        if tree.root_of(parent) != root {
            return Err(ModelError::DifferentRoots);
        }
        let length = tree.node_len(parent);
        if offset > length {
            return Err(ModelError::OffsetOutOfRange { offset, length });
        }
        let mut path = tree.index_path(parent);
        path.push(offset);
        let position = Self::from_path(root, path);
        position.parent.set(Some(parent));
        Ok(position)
    }

    /// Position right before `node` in its parent.
    pub fn before_node(tree: &Tree, node: NodeId) -> Result<Self> {
        let parent = tree.parent(node).ok_or(ModelError::NoParent(node))?;
        let index = tree.index_in_parent(node).ok_or(ModelError::NoParent(node))?;
        Self::from_parent(tree, tree.root_of(node), parent, index)
    }

    /// Position right after `node` in its parent.
    pub fn after_node(tree: &Tree, node: NodeId) -> Result<Self> {
        let parent = tree.parent(node).ok_or(ModelError::NoParent(node))?;
        let index = tree.index_in_parent(node).ok_or(ModelError::NoParent(node))?;
        Self::from_parent(tree, tree.root_of(node), parent, index + 1)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn path(&self) -> &[usize] {
        &self.path
    }

    pub fn set_path(&mut self, path: IndexPath) {
        self.path = path;
        self.parent.set(None);
    }

    /// Offset inside the parent node; zero for the root position.
    pub fn parent_offset(&self) -> usize {
        self.path.last().copied().unwrap_or(0)
    }

    /// Offset into the node at `path`, when this position points directly
    /// inside it.
    pub fn offset_within(&self, path: &[usize]) -> Option<usize> {
        (self.path.len() == path.len() + 1 && self.path.starts_with(path))
            .then(|| self.parent_offset())
    }

    /// The node the last path element indexes into.
    pub fn parent(&self, tree: &Tree) -> Result<NodeId> {
        let steps = self.path.len().saturating_sub(1);
        // The cache only holds while the tree still places it at our path
        if let Some(cached) = self.parent.get()
            && tree.contains(cached)
            && tree.root_of(cached) == self.root
            && tree.index_path(cached) == self.path[..steps]
        {
            return Ok(cached);
        }
        tree.node(self.root)?;
        let parent = tree
            .node_at_path(self.root, &self.path[..steps])
            .ok_or_else(|| ModelError::InvalidPath(self.path.clone()))?;
        self.parent.set(Some(parent));
        Ok(parent)
    }

    /// The parent, or the element containing it when the parent is a leaf.
    pub fn parent_element(&self, tree: &Tree) -> Result<NodeId> {
        let parent = self.parent(tree)?;
        if tree.is_element(parent) {
            return Ok(parent);
        }
        tree.parent(parent).ok_or(ModelError::NoParent(parent))
    }

    pub fn is_inside_text(&self, tree: &Tree) -> bool {
        self.parent(tree).is_ok_and(|p| tree.is_text(p))
    }

    pub fn compare(&self, other: &Position) -> Result<RelativePosition> {
        if self.root != other.root {
            return Err(ModelError::DifferentRoots);
        }
        Ok(compare_paths(&self.path, &other.path))
    }

    pub fn is_before(&self, other: &Position) -> Result<bool> {
        Ok(self.compare(other)? == RelativePosition::Before)
    }

    pub fn is_after(&self, other: &Position) -> Result<bool> {
        Ok(self.compare(other)? == RelativePosition::After)
    }

    pub fn same_as(&self, other: &Position) -> Result<bool> {
        Ok(self.compare(other)? == RelativePosition::Equal)
    }

    /// Position made of the longest shared path prefix.
    pub fn common_ancestor(&self, other: &Position) -> Option<Position> {
        if self.root != other.root {
            return None;
        }
        let shared: IndexPath = self
            .path
            .iter()
            .zip(&other.path)
            .take_while(|(a, b)| a == b)
            .map(|(a, _)| *a)
            .collect();
        Some(Position::from_path(self.root, shared))
    }

    /// Moves the last offset by `delta`, clamped to the parent's bounds.
    pub fn shifted_by(&self, tree: &Tree, delta: isize) -> Result<Position> {
        let parent = self.parent(tree)?;
        let length = tree.node_len(parent);
        let offset = self
            .parent_offset()
            .saturating_add_signed(delta)
            .min(length);
        let mut path = self.path.clone();
        match path.last_mut() {
            Some(last) => *last = offset,
            None => return Err(ModelError::InvalidPath(path)),
        }
        Ok(Position::from_path(self.root, path))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    /// div > [p > ["ab", "cd"], p > ["ef"]]
    fn sample() -> (Tree, NodeId) {
        let mut tree = Tree::new();
        let root = tree.create_element("div");
        let p1 = tree.create_element("p");
        let p2 = tree.create_element("p");
        let ab = tree.create_text("ab");
        let cd = tree.create_text("cd");
        let ef = tree.create_text("ef");
        tree.append_children(p1, [ab, cd]).unwrap();
        tree.add_child(p2, ef).unwrap();
        tree.append_children(root, [p1, p2]).unwrap();
        (tree, root)
    }

    #[rstest]
    #[case(vec![0], vec![1], RelativePosition::Before)]
    #[case(vec![0], vec![0, 1], RelativePosition::Before)]
    #[case(vec![0, 1], vec![0], RelativePosition::After)]
    #[case(vec![1, 0, 2], vec![1, 0, 2], RelativePosition::Equal)]
    #[case(vec![0, 5], vec![1], RelativePosition::Before)]
    #[case(vec![], vec![0], RelativePosition::Before)]
    fn test_compare_paths(
        #[case] a: IndexPath,
        #[case] b: IndexPath,
        #[case] expected: RelativePosition,
    ) {
        assert_eq!(compare_paths(&a, &b), expected);
    }

    #[test]
    fn test_compare_across_roots_fails() {
        let a = Position::from_path(NodeId::new(), vec![0]);
        let b = Position::from_path(NodeId::new(), vec![0]);
        assert_eq!(a.compare(&b), Err(ModelError::DifferentRoots));
        assert_eq!(a.same_as(&b), Err(ModelError::DifferentRoots));

        let c = Position::from_path(a.root(), vec![0]);
        assert_eq!(a.same_as(&c), Ok(true));
        assert_eq!(a.same_as(&Position::from_path(a.root(), vec![1])), Ok(false));
    }

    #[test]
    fn test_from_parent_checks_offset() {
        let (tree, root) = sample();
        let ab = tree.node_at_path(root, &[0, 0]).unwrap();

        let pos = Position::from_parent(&tree, root, ab, 2).unwrap();
        assert_eq!(pos.path(), &[0, 0, 2]);
        assert_eq!(pos.parent(&tree).unwrap(), ab);

        assert_eq!(
            Position::from_parent(&tree, root, ab, 3),
            Err(ModelError::OffsetOutOfRange {
                offset: 3,
                length: 2
            })
        );
    }

    #[test]
    fn test_parent_resolution_and_cache_invalidation() {
        let (tree, root) = sample();
        let mut pos = Position::from_path(root, vec![1, 0, 1]);
        let ef = tree.node_at_path(root, &[1, 0]).unwrap();
        assert_eq!(pos.parent(&tree).unwrap(), ef);
        assert!(pos.is_inside_text(&tree));
        assert_eq!(pos.parent_element(&tree).unwrap(), tree.parent(ef).unwrap());

        pos.set_path(vec![1]);
        assert_eq!(pos.parent(&tree).unwrap(), root);

        pos.set_path(vec![7, 0]);
        assert!(matches!(pos.parent(&tree), Err(ModelError::InvalidPath(_))));
    }

    #[test]
    fn test_before_and_after_node() {
        let (tree, root) = sample();
        let cd = tree.node_at_path(root, &[0, 1]).unwrap();
        assert_eq!(Position::before_node(&tree, cd).unwrap().path(), &[0, 1]);
        assert_eq!(Position::after_node(&tree, cd).unwrap().path(), &[0, 2]);
        assert!(Position::before_node(&tree, root).is_err());
    }

    #[test]
    fn test_common_ancestor_and_shift() {
        let (tree, root) = sample();
        let a = Position::from_path(root, vec![0, 1, 1]);
        let b = Position::from_path(root, vec![0, 0, 2]);
        assert_eq!(a.common_ancestor(&b).unwrap().path(), &[0]);

        assert_eq!(a.shifted_by(&tree, -5).unwrap().path(), &[0, 1, 0]);
        assert_eq!(a.shifted_by(&tree, 5).unwrap().path(), &[0, 1, 2]);
    }
}
