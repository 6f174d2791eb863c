use std::collections::VecDeque;

use crate::model::{NodeId, Tree};
use crate::selection::Selection;

/// A deep copy of the document and selection at one point in time.
#[derive(Debug, Clone)]
pub struct Snapshot {
    tree: Tree,
    root: NodeId,
    selection: Selection,
}

impl Snapshot {
    pub(crate) fn new(tree: Tree, root: NodeId, selection: Selection) -> Self {
        Self {
            tree,
            root,
            selection,
        }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub(crate) fn into_parts(self) -> (Tree, NodeId, Selection) {
        (self.tree, self.root, self.selection)
    }
}

/// Bounded stack of snapshots. Pushing past the limit drops the oldest; a
/// limit of zero keeps nothing.
#[derive(Debug, Clone)]
pub struct History {
    snapshots: VecDeque<Snapshot>,
    limit: usize,
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            snapshots: VecDeque::new(),
            limit,
        }
    }

    pub fn push(&mut self, snapshot: Snapshot) {
        if self.limit == 0 {
            return;
        }
        while self.snapshots.len() >= self.limit {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(snapshot);
    }

    pub fn pop(&mut self) -> Option<Snapshot> {
        self.snapshots.pop_back()
    }

    pub fn peek(&self) -> Option<&Snapshot> {
        self.snapshots.back()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
        while self.snapshots.len() > limit {
            self.snapshots.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn snapshot(label: &str) -> Snapshot {
        let mut tree = Tree::new();
        let root = tree.create_element("div");
        let text = tree.create_text(label);
        tree.add_child(root, text).unwrap();
        Snapshot::new(tree, root, Selection::new())
    }

    fn label(snapshot: &Snapshot) -> String {
        let text = snapshot.tree().children(snapshot.root())[0];
        snapshot.tree().text_content(text).unwrap().to_string()
    }

    #[test]
    fn test_push_drops_oldest_over_limit() {
        let mut history = History::new(2);
        history.push(snapshot("a"));
        history.push(snapshot("b"));
        history.push(snapshot("c"));

        assert_eq!(history.len(), 2);
        assert_eq!(label(&history.pop().unwrap()), "c");
        assert_eq!(label(&history.pop().unwrap()), "b");
        assert!(history.pop().is_none());
    }

    #[test]
    fn test_zero_limit_keeps_nothing() {
        let mut history = History::new(0);
        history.push(snapshot("a"));
        assert!(history.is_empty());
    }

    #[test]
    fn test_shrinking_limit_trims_oldest() {
        let mut history = History::new(5);
        for l in ["a", "b", "c"] {
            history.push(snapshot(l));
        }
        history.set_limit(1);
        assert_eq!(history.len(), 1);
        assert_eq!(label(history.peek().unwrap()), "c");
    }
}
