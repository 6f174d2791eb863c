use crate::error::{ModelError, Result};
use crate::model::{Attributes, ComponentSpec, MarksRegistry, NodeId, Props, Tree};
use crate::position::Position;
use crate::range::Range;
use crate::selection::Selection;
use crate::walker::{
    TreeWalker, accept_text, accept_text_and_void, global_text_offset, global_text_offset_to_path,
};

/// Write access to the model inside a change scope.
///
/// Every operation keeps the tree consistent and flags what it touched; the
/// owning [`Model`](super::Model) writes the flagged nodes back when the
/// scope ends.
pub struct Mutator<'a> {
    tree: &'a mut Tree,
    selection: &'a mut Selection,
    marks: &'a MarksRegistry,
    root: NodeId,
}

/// Node-relative copy of a selection that survives structural edits which
/// shift index paths.
#[derive(Debug, Clone)]
pub struct SelectionBookmark {
    anchor: (NodeId, usize),
    focus: (NodeId, usize),
    right_to_left: bool,
}

impl<'a> Mutator<'a> {
    pub(crate) fn new(
        tree: &'a mut Tree,
        selection: &'a mut Selection,
        marks: &'a MarksRegistry,
        root: NodeId,
    ) -> Self {
        Self {
            tree,
            selection,
            marks,
            root,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn tree(&self) -> &Tree {
        &*self.tree
    }

    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut *self.tree
    }

    pub fn selection(&self) -> &Selection {
        &*self.selection
    }

    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut *self.selection
    }

    pub fn marks(&self) -> &MarksRegistry {
        self.marks
    }

    pub fn select_range(&mut self, range: Range) {
        self.selection.select_range(range);
    }

    pub fn collapse_on(&mut self, node: NodeId) -> Result<()> {
        self.selection.collapse_on(self.tree, node)
    }

    pub fn bookmark_selection(&self) -> Option<SelectionBookmark> {
        let anchor = self.selection.anchor()?;
        let focus = self.selection.focus()?;
        Some(SelectionBookmark {
            anchor: (anchor.parent(self.tree).ok()?, anchor.parent_offset()),
            focus: (focus.parent(self.tree).ok()?, focus.parent_offset()),
            right_to_left: self.selection.is_right_to_left(),
        })
    }

    /// Re-resolves a bookmark against the current tree. Offsets are clamped;
    /// a bookmark whose nodes left the document clears the selection.
    pub fn restore_bookmark(&mut self, bookmark: &SelectionBookmark) -> Result<()> {
        let resolve = |(node, offset): (NodeId, usize)| -> Option<Position> {
            if !self.tree.contains(node) || self.tree.root_of(node) != self.root {
                return None;
            }
            let offset = offset.min(self.tree.node_len(node));
            Position::from_parent(self.tree, self.root, node, offset).ok()
        };
        match (resolve(bookmark.anchor), resolve(bookmark.focus)) {
            (Some(anchor), Some(focus)) => {
                self.selection.select_range(Range::ordered(anchor, focus)?);
                self.selection.set_right_to_left(bookmark.right_to_left);
            }
            _ => self.selection.clear(),
        }
        Ok(())
    }

    /// Inserts `text` at `position` and returns the range it now covers.
    ///
    /// At an element position the text joins an adjacent text node when
    /// there is one, preferring the one before; otherwise a new text node is
    /// created.
    pub fn insert_text(&mut self, position: &Position, text: &str) -> Result<Range> {
        let parent = position.parent(self.tree)?;
        let offset = position.parent_offset();
        let length = self.tree.node_len(parent);
        if offset > length {
            return Err(ModelError::OffsetOutOfRange { offset, length });
        }

        let (node, at) = if self.tree.is_text(parent) {
            (parent, offset)
        } else if self.tree.is_element(parent) {
            let before = offset
                .checked_sub(1)
                .and_then(|i| self.tree.child_at(parent, i))
                .filter(|n| self.tree.is_text(*n));
            let after = self
                .tree
                .child_at(parent, offset)
                .filter(|n| self.tree.is_text(*n));
            match (before, after) {
                (Some(before), _) => (before, self.tree.node_len(before)),
                (None, Some(after)) => (after, 0),
                (None, None) => {
                    let created = self.tree.create_text("");
                    self.tree.insert_child(parent, created, offset)?;
                    (created, 0)
                }
            }
        } else {
            return Err(ModelError::NotImplemented("inserting text inside void nodes"));
        };

        self.tree.insert_text(node, at, text)?;
        let inserted = text.chars().count();
        let root = position.root();
        Range::new(
            Position::from_parent(self.tree, root, node, at)?,
            Position::from_parent(self.tree, root, node, at + inserted)?,
        )
    }

    /// Splits a text node at `position` so it becomes a child boundary, and
    /// returns the equivalent element-level position. Element positions come
    /// back unchanged.
    pub fn split_text_at(&mut self, position: &Position) -> Result<Position> {
        let parent = position.parent(self.tree)?;
        if !self.tree.is_text(parent) {
            return Ok(position.clone());
        }
        let offset = position.parent_offset();
        if offset == 0 {
            return Position::before_node(self.tree, parent);
        }
        if offset >= self.tree.node_len(parent) {
            return Position::after_node(self.tree, parent);
        }
        let right = self.tree.split_text(parent, offset)?;
        Position::before_node(self.tree, right)
    }

    /// Inserts `nodes` in order at `position`, splitting text as needed.
    pub fn insert_nodes(&mut self, position: &Position, nodes: &[NodeId]) -> Result<()> {
        let at = self.split_text_at(position)?;
        let parent = at.parent(self.tree)?;
        if !self.tree.is_element(parent) {
            return Err(ModelError::NotAnElement(parent));
        }
        let mut index = at.parent_offset();
        for node in nodes {
            self.tree.insert_child(parent, *node, index)?;
            index += 1;
        }
        Ok(())
    }

    /// Inserts a new `spec` component at `position`, caret right after it.
    pub fn insert_component(
        &mut self,
        position: &Position,
        spec: &ComponentSpec,
        props: &Props,
    ) -> Result<NodeId> {
        let component = self.tree.create_void_with(&spec.tag, spec.attributes(props));
        self.insert_nodes(position, &[component])?;
        let after = Position::after_node(self.tree, component)?;
        self.selection.select_range(Range::collapsed_at(after));
        Ok(component)
    }

    /// Deletes the text and void nodes covered by `range` and collapses the
    /// selection where the range started. Elements emptied along the way are
    /// kept.
    pub fn delete_range(&mut self, range: &Range) -> Result<Position> {
        if range.is_collapsed() {
            self.selection
                .select_range(Range::collapsed_at(range.start().clone()));
            return Ok(range.start().clone());
        }
        let start_parent = range.start().parent(self.tree)?;
        let start_offset = range.start().parent_offset();

        // Back to front, so earlier paths stay valid
        let leaves: Vec<NodeId> =
            TreeWalker::from_range(self.tree, range, accept_text_and_void, true)?.collect();
        for leaf in leaves {
            if self.tree.is_void(leaf) {
                self.tree.detach(leaf)?;
                continue;
            }
            let path = self.tree.index_path(leaf);
            let length = self.tree.node_len(leaf);
            let from = range.start().offset_within(&path).unwrap_or(0).min(length);
            let to = range.end().offset_within(&path).unwrap_or(length).min(length);
            if from == 0 && to == length {
                self.tree.detach(leaf)?;
            } else if from < to {
                self.tree.delete_text(leaf, from, to)?;
            }
        }

        let caret = if self.tree.root_of(start_parent) == self.root {
            let offset = start_offset.min(self.tree.node_len(start_parent));
            Position::from_parent(self.tree, self.root, start_parent, offset)?
        } else {
            // The start text went away entirely; sit where it used to be
            let path = range.start().path();
            Position::from_path(self.root, path[..path.len().saturating_sub(1)].to_vec())
        };
        self.selection.select_range(Range::collapsed_at(caret.clone()));
        Ok(caret)
    }

    /// Adds (`enabled`) or removes the mark `name` on exactly the text
    /// covered by `range`, splitting text at the boundaries and merging
    /// equal neighbours afterwards. The selection ends up over the same
    /// characters.
    pub fn set_property(
        &mut self,
        range: &Range,
        name: &str,
        attributes: Attributes,
        enabled: bool,
    ) -> Result<()> {
        if range.is_collapsed() {
            return Ok(());
        }
        let root = range.root();
        let start_offset = global_text_offset(self.tree, range.start())?;
        let end_offset = global_text_offset(self.tree, range.end())?;

        let texts: Vec<NodeId> =
            TreeWalker::from_range(self.tree, range, accept_text, false)?.collect();
        let mut plan = Vec::with_capacity(texts.len());
        for text in texts {
            let path = self.tree.index_path(text);
            let length = self.tree.node_len(text);
            let from = range.start().offset_within(&path).unwrap_or(0).min(length);
            let to = range.end().offset_within(&path).unwrap_or(length).min(length);
            if from < to {
                plan.push((text, from, to, length));
            }
        }

        let mut parents: Vec<NodeId> = Vec::new();
        for (text, from, to, length) in plan {
            if to < length {
                self.tree.split_text(text, to)?;
            }
            let target = if from > 0 {
                self.tree.split_text(text, from)?
            } else {
                text
            };
            if enabled {
                self.tree.add_mark(target, name, attributes.clone())?;
            } else {
                self.tree.remove_mark(target, name)?;
            }
            if let Some(parent) = self.tree.parent(target)
                && !parents.contains(&parent)
            {
                parents.push(parent);
            }
        }
        for parent in parents {
            self.tree.merge_text_siblings(parent)?;
        }

        let start = global_text_offset_to_path(self.tree, root, start_offset)?;
        let end = global_text_offset_to_path(self.tree, root, end_offset)?;
        let right_to_left = self.selection.is_right_to_left();
        self.selection.select_range(Range::from_paths(root, start, end)?);
        self.selection.set_right_to_left(right_to_left);
        Ok(())
    }

    /// Replaces `element` with its children.
    pub fn unwrap(&mut self, element: NodeId) -> Result<Vec<NodeId>> {
        self.tree.parent(element).ok_or(ModelError::NoParent(element))?;
        let children = self.tree.children(element).to_vec();
        for child in &children {
            self.tree.insert_before(element, *child)?;
        }
        self.tree.detach(element)?;
        Ok(children)
    }

    pub fn merge_text_nodes(&mut self, parent: NodeId) -> Result<()> {
        self.tree.merge_text_siblings(parent)
    }

    /// Detaches `node`; it is collected when the change scope ends.
    pub fn remove(&mut self, node: NodeId) -> Result<()> {
        self.tree.detach(node)
    }
}
