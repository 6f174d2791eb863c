use std::collections::{HashMap, HashSet};

use super::marks::MarkSet;
use super::node::{Attributes, DirtyFlags, NodeData, NodeId, NodeKind};
use crate::error::{ModelError, Result};
use crate::position::IndexPath;

/// Arena holding every node of one or more documents.
///
/// Nodes refer to each other by [`NodeId`]. A node has at most one parent;
/// attaching a node somewhere else detaches it first. Cloning a `Tree` gives
/// a fully independent copy that keeps all ids.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    nodes: HashMap<NodeId, NodeData>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> Result<&NodeData> {
        self.nodes.get(&id).ok_or(ModelError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut NodeData> {
        self.nodes.get_mut(&id).ok_or(ModelError::UnknownNode(id))
    }

    fn insert(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId::new();
        self.nodes.insert(id, NodeData::new(kind));
        id
    }

    // --- creation ---

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.create_element_with(tag, Attributes::new())
    }

    pub fn create_element_with(&mut self, tag: &str, attributes: Attributes) -> NodeId {
        self.insert(NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
            attributes,
            children: Vec::new(),
        })
    }

    pub fn create_text(&mut self, content: impl Into<String>) -> NodeId {
        self.create_text_with_marks(content, MarkSet::new())
    }

    pub fn create_text_with_marks(&mut self, content: impl Into<String>, marks: MarkSet) -> NodeId {
        self.insert(NodeKind::Text {
            content: content.into(),
            marks,
        })
    }

    pub fn create_void(&mut self, tag: &str) -> NodeId {
        self.create_void_with(tag, Attributes::new())
    }

    pub fn create_void_with(&mut self, tag: &str, attributes: Attributes) -> NodeId {
        self.insert(NodeKind::Void {
            tag: tag.to_ascii_lowercase(),
            attributes,
        })
    }

    // --- inspection ---

    pub fn kind(&self, id: NodeId) -> Result<&NodeKind> {
        Ok(&self.node(id)?.kind)
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.nodes.get(&id).is_some_and(NodeData::is_element)
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        self.nodes.get(&id).is_some_and(NodeData::is_text)
    }

    pub fn is_void(&self, id: NodeId) -> bool {
        self.nodes.get(&id).is_some_and(NodeData::is_void)
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(&id).and_then(|n| n.kind.tag())
    }

    pub fn has_tag(&self, id: NodeId, tag: &str) -> bool {
        self.tag(id).is_some_and(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Children of an element; leaves and unknown ids have none.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.nodes.get(&id).map(|n| &n.kind) {
            Some(NodeKind::Element { children, .. }) => children,
            _ => &[],
        }
    }

    pub fn child_at(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).get(index).copied()
    }

    /// Child count for elements, character count for text, zero otherwise.
    pub fn node_len(&self, id: NodeId) -> usize {
        self.nodes.get(&id).map(|n| n.kind.len()).unwrap_or(0)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|c| *c == id)
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        self.child_at(parent, index + 1)
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        index.checked_sub(1).and_then(|i| self.child_at(parent, i))
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).last().copied()
    }

    /// Ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |p| self.parent(*p))
    }

    /// `id` itself followed by its ancestors.
    pub fn ancestors_or_self(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::once(id).chain(self.ancestors(id))
    }

    pub fn root_of(&self, id: NodeId) -> NodeId {
        self.ancestors(id).last().unwrap_or(id)
    }

    pub fn is_ancestor_of(&self, ancestor: NodeId, id: NodeId) -> bool {
        self.ancestors(id).any(|a| a == ancestor)
    }

    /// Index path from the node's root down to `id`.
    pub fn index_path(&self, id: NodeId) -> IndexPath {
        let mut path: IndexPath = self
            .ancestors_or_self(id)
            .filter_map(|n| self.index_in_parent(n))
            .collect();
        path.reverse();
        path
    }

    /// Follows `path` from `root`, descending through elements only.
    pub fn node_at_path(&self, root: NodeId, path: &[usize]) -> Option<NodeId> {
        path.iter()
            .try_fold(root, |node, index| self.child_at(node, *index))
    }

    // --- structure ---

    fn element_children_mut(&mut self, id: NodeId) -> Result<&mut Vec<NodeId>> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Element { children, .. } => Ok(children),
            _ => Err(ModelError::NotAnElement(id)),
        }
    }

    fn check_insertable(&self, parent: NodeId, child: NodeId) -> Result<()> {
        if !self.node(parent)?.is_element() {
            return Err(ModelError::NotAnElement(parent));
        }
        self.node(child)?;
        if parent == child || self.is_ancestor_of(child, parent) {
            return Err(ModelError::Cycle(child));
        }
        Ok(())
    }

    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.check_insertable(parent, child)?;
        self.detach(child)?;
        let index = self.node_len(parent);
        self.attach_at(parent, child, index)
    }

    pub fn append_children(
        &mut self,
        parent: NodeId,
        children: impl IntoIterator<Item = NodeId>,
    ) -> Result<()> {
        for child in children {
            self.add_child(parent, child)?;
        }
        Ok(())
    }

    /// Inserts `child` at `index`. The index is interpreted after `child` has
    /// been detached from its current parent.
    pub fn insert_child(&mut self, parent: NodeId, child: NodeId, index: usize) -> Result<()> {
        self.check_insertable(parent, child)?;
        self.detach(child)?;
        let length = self.node_len(parent);
        if index > length {
            return Err(ModelError::OffsetOutOfRange {
                offset: index,
                length,
            });
        }
        self.attach_at(parent, child, index)
    }

    pub fn insert_before(&mut self, reference: NodeId, child: NodeId) -> Result<()> {
        let parent = self.parent(reference).ok_or(ModelError::NoParent(reference))?;
        self.check_insertable(parent, child)?;
        self.detach(child)?;
        let index = self
            .index_in_parent(reference)
            .ok_or(ModelError::NoParent(reference))?;
        self.attach_at(parent, child, index)
    }

    pub fn insert_after(&mut self, reference: NodeId, child: NodeId) -> Result<()> {
        let parent = self.parent(reference).ok_or(ModelError::NoParent(reference))?;
        self.check_insertable(parent, child)?;
        self.detach(child)?;
        let index = self
            .index_in_parent(reference)
            .ok_or(ModelError::NoParent(reference))?;
        self.attach_at(parent, child, index + 1)
    }

    fn attach_at(&mut self, parent: NodeId, child: NodeId, index: usize) -> Result<()> {
        self.element_children_mut(parent)?.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);
        self.touch_content(parent);
        Ok(())
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let children = self.element_children_mut(parent)?;
        let index = children
            .iter()
            .position(|c| *c == child)
            .ok_or(ModelError::NotAChild { parent, child })?;
        children.remove(index);
        self.node_mut(child)?.parent = None;
        self.touch_content(parent);
        Ok(())
    }

    /// Puts `new` where `old` was. `old` ends up detached.
    pub fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) -> Result<()> {
        if old == new {
            return Ok(());
        }
        self.check_insertable(parent, new)?;
        self.detach(new)?;
        let index = self
            .children(parent)
            .iter()
            .position(|c| *c == old)
            .ok_or(ModelError::NotAChild { parent, child: old })?;
        self.remove_child(parent, old)?;
        self.attach_at(parent, new, index)
    }

    /// Removes `id` from its parent, if any.
    pub fn detach(&mut self, id: NodeId) -> Result<()> {
        match self.node(id)?.parent {
            Some(parent) => self.remove_child(parent, id),
            None => Ok(()),
        }
    }

    /// Detaches `id` and drops it and its descendants from the arena.
    pub fn dispose(&mut self, id: NodeId) -> Result<()> {
        self.detach(id)?;
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(data) = self.nodes.remove(&next)
                && let NodeKind::Element { children, .. } = data.kind
            {
                stack.extend(children);
            }
        }
        Ok(())
    }

    /// Drops every node not reachable from one of `roots`.
    pub fn retain_reachable(&mut self, roots: &[NodeId]) -> usize {
        let mut reachable = HashSet::new();
        let mut stack: Vec<NodeId> = roots.to_vec();
        while let Some(id) = stack.pop() {
            if reachable.insert(id) {
                stack.extend_from_slice(self.children(id));
            }
        }
        let before = self.nodes.len();
        self.nodes.retain(|id, _| reachable.contains(id));
        before - self.nodes.len()
    }

    /// Deep copy of a subtree with fresh ids. The copy is detached and dirty.
    pub fn clone_subtree(&mut self, id: NodeId) -> Result<NodeId> {
        let kind = self.node(id)?.kind.clone();
        match kind {
            NodeKind::Element {
                tag,
                attributes,
                children,
            } => {
                let copy = self.create_element_with(&tag, attributes);
                for child in children {
                    let child_copy = self.clone_subtree(child)?;
                    self.add_child(copy, child_copy)?;
                }
                Ok(copy)
            }
            other => Ok(self.insert(other)),
        }
    }

    /// Copy of an element's tag and attributes, without children.
    pub fn shallow_clone(&mut self, id: NodeId) -> Result<NodeId> {
        match self.node(id)?.kind.clone() {
            NodeKind::Element {
                tag, attributes, ..
            } => Ok(self.create_element_with(&tag, attributes)),
            other => Ok(self.insert(other)),
        }
    }

    /// Structural equality of two subtrees, ignoring ids and dirtiness.
    pub fn same_as(&self, a: NodeId, b: NodeId) -> bool {
        Self::structurally_equal(self, a, self, b)
    }

    pub fn structurally_equal(left: &Tree, a: NodeId, right: &Tree, b: NodeId) -> bool {
        let (Ok(ka), Ok(kb)) = (left.kind(a), right.kind(b)) else {
            return false;
        };
        match (ka, kb) {
            (
                NodeKind::Element {
                    tag: ta,
                    attributes: aa,
                    children: ca,
                },
                NodeKind::Element {
                    tag: tb,
                    attributes: ab,
                    children: cb,
                },
            ) => {
                ta == tb
                    && aa == ab
                    && ca.len() == cb.len()
                    && ca
                        .iter()
                        .zip(cb)
                        .all(|(x, y)| Self::structurally_equal(left, *x, right, *y))
            }
            (other_a, other_b) => other_a == other_b,
        }
    }

    // --- text ---

    pub fn text_content(&self, id: NodeId) -> Result<&str> {
        match &self.node(id)?.kind {
            NodeKind::Text { content, .. } => Ok(content),
            _ => Err(ModelError::NotText(id)),
        }
    }

    fn text_mut(&mut self, id: NodeId) -> Result<&mut String> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Text { content, .. } => Ok(content),
            _ => Err(ModelError::NotText(id)),
        }
    }

    pub fn set_text_content(&mut self, id: NodeId, content: impl Into<String>) -> Result<()> {
        *self.text_mut(id)? = content.into();
        self.touch_content(id);
        Ok(())
    }

    /// Inserts `text` at a character offset.
    pub fn insert_text(&mut self, id: NodeId, offset: usize, text: &str) -> Result<()> {
        let content = self.text_mut(id)?;
        let at = byte_offset(content, offset)?;
        content.insert_str(at, text);
        self.touch_content(id);
        Ok(())
    }

    /// Deletes the characters in `start..end`.
    pub fn delete_text(&mut self, id: NodeId, start: usize, end: usize) -> Result<()> {
        let content = self.text_mut(id)?;
        let from = byte_offset(content, start)?;
        let to = byte_offset(content, end)?;
        if from > to {
            return Err(ModelError::InvertedRange);
        }
        content.replace_range(from..to, "");
        self.touch_content(id);
        Ok(())
    }

    /// Splits a text node at a character offset. The original keeps the
    /// left part; the returned node holds the right part, carries the same
    /// marks and is inserted right after the original when it has a parent.
    pub fn split_text(&mut self, id: NodeId, offset: usize) -> Result<NodeId> {
        let (right, marks) = match &mut self.node_mut(id)?.kind {
            NodeKind::Text { content, marks } => {
                let at = byte_offset(content, offset)?;
                (content.split_off(at), marks.clone())
            }
            _ => return Err(ModelError::NotText(id)),
        };
        self.touch_content(id);
        let right = self.create_text_with_marks(right, marks);
        if self.parent(id).is_some() {
            self.insert_after(id, right)?;
        }
        Ok(right)
    }

    /// Joins adjacent text children with identical marks and drops empty
    /// text children.
    pub fn merge_text_siblings(&mut self, parent: NodeId) -> Result<()> {
        let children = self.children(parent).to_vec();
        let mut previous: Option<NodeId> = None;
        for child in children {
            if !self.is_text(child) {
                previous = None;
                continue;
            }
            if self.text_content(child)?.is_empty() {
                self.dispose(child)?;
                continue;
            }
            if let Some(prev) = previous
                && self.marks(prev)? == self.marks(child)?
            {
                let tail = self.text_content(child)?.to_string();
                self.text_mut(prev)?.push_str(&tail);
                self.touch_content(prev);
                self.dispose(child)?;
                continue;
            }
            previous = Some(child);
        }
        Ok(())
    }

    // --- marks ---

    pub fn marks(&self, id: NodeId) -> Result<&MarkSet> {
        match &self.node(id)?.kind {
            NodeKind::Text { marks, .. } => Ok(marks),
            _ => Err(ModelError::NotText(id)),
        }
    }

    pub fn has_mark(&self, id: NodeId, name: &str) -> bool {
        self.marks(id).is_ok_and(|m| m.contains(name))
    }

    pub fn add_mark(&mut self, id: NodeId, name: &str, attributes: Attributes) -> Result<()> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Text { marks, .. } => marks.insert(name, attributes),
            _ => return Err(ModelError::NotText(id)),
        }
        self.touch_marks(id);
        Ok(())
    }

    pub fn remove_mark(&mut self, id: NodeId, name: &str) -> Result<bool> {
        let removed = match &mut self.node_mut(id)?.kind {
            NodeKind::Text { marks, .. } => marks.remove(name),
            _ => return Err(ModelError::NotText(id)),
        };
        if removed {
            self.touch_marks(id);
        }
        Ok(removed)
    }

    // --- attributes ---

    pub fn attributes(&self, id: NodeId) -> Option<&Attributes> {
        self.nodes.get(&id).and_then(|n| n.kind.attributes())
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attributes(id)
            .and_then(|attrs| attrs.get(name))
            .map(String::as_str)
    }

    fn attributes_mut(&mut self, id: NodeId) -> Result<&mut Attributes> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Element { attributes, .. } | NodeKind::Void { attributes, .. } => {
                Ok(attributes)
            }
            NodeKind::Text { .. } => Err(ModelError::NotAnElement(id)),
        }
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: impl Into<String>) -> Result<()> {
        self.attributes_mut(id)?.insert(name.to_string(), value.into());
        self.touch_attributes(id);
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<Option<String>> {
        let removed = self.attributes_mut(id)?.remove(name);
        if removed.is_some() {
            self.touch_attributes(id);
        }
        Ok(removed)
    }

    // --- dirtiness ---

    pub fn dirtiness(&self, id: NodeId) -> DirtyFlags {
        self.nodes.get(&id).map(|n| n.dirty).unwrap_or_default()
    }

    pub fn mark_dirty(&mut self, id: NodeId, flags: DirtyFlags) -> Result<()> {
        let node = self.node_mut(id)?;
        node.dirty = node.dirty.union(flags);
        Ok(())
    }

    pub fn mark_subtree_dirty(&mut self, id: NodeId, flags: DirtyFlags) {
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(&next) {
                node.dirty = node.dirty.union(flags);
            }
            stack.extend_from_slice(self.children(next));
        }
    }

    pub fn clear_dirty(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.dirty = DirtyFlags::CLEAN;
        }
    }

    pub fn clear_dirty_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            self.clear_dirty(next);
            stack.extend_from_slice(self.children(next));
        }
    }

    /// Flags `id` content-dirty and every ancestor too, since their
    /// external children lists may change.
    fn touch_content(&mut self, id: NodeId) {
        let chain: Vec<NodeId> = self.ancestors_or_self(id).collect();
        for node in chain {
            if let Some(data) = self.nodes.get_mut(&node) {
                data.dirty.content = true;
            }
        }
    }

    /// Attribute changes stay local to the node, but the parent chain is
    /// flagged so writing reaches it.
    fn touch_attributes(&mut self, id: NodeId) {
        if let Some(data) = self.nodes.get_mut(&id) {
            data.dirty.attributes = true;
        }
        if let Some(parent) = self.parent(id) {
            self.touch_content(parent);
        }
    }

    /// A text node's wrappers change with its marks, so its parent chain must
    /// re-list children.
    fn touch_marks(&mut self, id: NodeId) {
        if let Some(data) = self.nodes.get_mut(&id) {
            data.dirty.attributes = true;
        }
        if let Some(parent) = self.parent(id) {
            self.touch_content(parent);
        }
    }
}

/// Byte index of a character offset, allowing the end of the string.
fn byte_offset(content: &str, offset: usize) -> Result<usize> {
    if offset == 0 {
        return Ok(0);
    }
    content
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(content.len()))
        .nth(offset)
        .ok_or(ModelError::OffsetOutOfRange {
            offset,
            length: content.chars().count(),
        })
}
