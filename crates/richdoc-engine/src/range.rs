use crate::error::{ModelError, Result};
use crate::model::{NodeId, Tree};
use crate::position::{IndexPath, Position, RelativePosition};

/// An ordered pair of positions under the same root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Range {
    start: Position,
    end: Position,
}

impl Range {
    /// Fails when the positions have different roots or `start` is after `end`.
    pub fn new(start: Position, end: Position) -> Result<Self> {
        match start.compare(&end)? {
            RelativePosition::After => Err(ModelError::InvertedRange),
            _ => Ok(Self { start, end }),
        }
    }

    /// Builds a range from two positions in either order.
    pub fn ordered(a: Position, b: Position) -> Result<Self> {
        match a.compare(&b)? {
            RelativePosition::After => Ok(Self { start: b, end: a }),
            _ => Ok(Self { start: a, end: b }),
        }
    }

    pub fn collapsed_at(position: Position) -> Self {
        Self {
            start: position.clone(),
            end: position,
        }
    }

    pub fn from_paths(root: NodeId, start: IndexPath, end: IndexPath) -> Result<Self> {
        Self::new(Position::from_path(root, start), Position::from_path(root, end))
    }

    /// Everything inside `node`: from offset 0 to its length.
    pub fn inside_node(tree: &Tree, node: NodeId) -> Result<Self> {
        let root = tree.root_of(node);
        let start = Position::from_parent(tree, root, node, 0)?;
        let end = Position::from_parent(tree, root, node, tree.node_len(node))?;
        Ok(Self { start, end })
    }

    pub fn start(&self) -> &Position {
        &self.start
    }

    pub fn end(&self) -> &Position {
        &self.end
    }

    pub fn root(&self) -> NodeId {
        self.start.root()
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    pub fn common_ancestor(&self) -> Position {
        self.start
            .common_ancestor(&self.end)
            .unwrap_or_else(|| Position::from_path(self.root(), Vec::new()))
    }

    /// Whether `position` lies within the range, bounds included.
    pub fn contains(&self, position: &Position) -> bool {
        matches!(
            (self.start.compare(position), position.compare(&self.end)),
            (
                Ok(RelativePosition::Before | RelativePosition::Equal),
                Ok(RelativePosition::Before | RelativePosition::Equal)
            )
        )
    }

    pub fn into_positions(self) -> (Position, Position) {
        (self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverted_range_is_rejected() {
        let root = NodeId::new();
        assert_eq!(
            Range::from_paths(root, vec![1], vec![0, 4]),
            Err(ModelError::InvertedRange)
        );
        let ordered = Range::ordered(
            Position::from_path(root, vec![1]),
            Position::from_path(root, vec![0, 4]),
        )
        .unwrap();
        assert_eq!(ordered.start().path(), &[0, 4]);
    }

    #[test]
    fn test_mixed_roots_are_rejected() {
        let a = Position::from_path(NodeId::new(), vec![0]);
        let b = Position::from_path(NodeId::new(), vec![1]);
        assert_eq!(Range::new(a, b), Err(ModelError::DifferentRoots));
    }

    #[test]
    fn test_collapsed_and_contains() {
        let root = NodeId::new();
        let caret = Range::collapsed_at(Position::from_path(root, vec![0, 2]));
        assert!(caret.is_collapsed());

        let range = Range::from_paths(root, vec![0, 1], vec![2]).unwrap();
        assert!(!range.is_collapsed());
        assert!(range.contains(&Position::from_path(root, vec![0, 1])));
        assert!(range.contains(&Position::from_path(root, vec![1, 3, 0])));
        assert!(range.contains(&Position::from_path(root, vec![2])));
        assert!(!range.contains(&Position::from_path(root, vec![2, 0])));
        assert_eq!(range.common_ancestor().path(), &[] as &[usize]);
    }

    #[test]
    fn test_inside_node() {
        let mut tree = Tree::new();
        let p = tree.create_element("p");
        let t = tree.create_text("four");
        tree.add_child(p, t).unwrap();
        let range = Range::inside_node(&tree, t).unwrap();
        assert_eq!(range.start().path(), &[0, 0]);
        assert_eq!(range.end().path(), &[0, 4]);
    }
}
