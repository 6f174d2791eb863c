//! The external markup tree the model is read from and written to.
//!
//! [`Dom`] is a small, HTML-shaped arena: elements with ordered attributes
//! and text nodes. Embedding surfaces own one of these; the model only ever
//! talks to it through [`DomNodeId`]s.
//!
//! ## Modules
//!
//! - **`build`**: declarative construction of DOM fragments
//! - **`html`**: serialization to HTML text
//! - **`markdown`**: building a DOM from Markdown source

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use crate::error::{ModelError, Result};
use crate::model::DirtyFlags;

pub mod build;
pub mod html;
pub mod markdown;

/// Elements that never have children.
pub const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements that start a new line box; whitespace next to them is dropped.
pub const BLOCK_TAGS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "body",
    "dd",
    "div",
    "dl",
    "dt",
    "figure",
    "footer",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hr",
    "li",
    "main",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "tbody",
    "td",
    "tfoot",
    "th",
    "thead",
    "tr",
    "ul",
];

pub fn is_void_tag(tag: &str) -> bool {
    VOID_TAGS.iter().any(|t| t.eq_ignore_ascii_case(tag))
}

pub fn is_block_tag(tag: &str) -> bool {
    BLOCK_TAGS.iter().any(|t| t.eq_ignore_ascii_case(tag))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DomNodeId(Uuid);

impl DomNodeId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for DomNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dom:{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DomNodeKind {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
        children: Vec<DomNodeId>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
pub struct DomNode {
    kind: DomNodeKind,
    parent: Option<DomNodeId>,
    dirty: DirtyFlags,
}

impl DomNode {
    pub fn kind(&self) -> &DomNodeKind {
        &self.kind
    }

    pub fn parent(&self) -> Option<DomNodeId> {
        self.parent
    }

    /// Dirtiness of the model node this was last written from.
    pub fn dirty(&self) -> DirtyFlags {
        self.dirty
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomPoint {
    pub node: DomNodeId,
    pub offset: usize,
}

impl DomPoint {
    pub fn new(node: DomNodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DomSelection {
    pub anchor: Option<DomPoint>,
    pub focus: Option<DomPoint>,
}

impl DomSelection {
    pub fn new(anchor: DomPoint, focus: DomPoint) -> Self {
        Self {
            anchor: Some(anchor),
            focus: Some(focus),
        }
    }

    pub fn collapsed(point: DomPoint) -> Self {
        Self::new(point, point)
    }

    pub fn is_empty(&self) -> bool {
        self.anchor.is_none()
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }
}

#[derive(Debug, Clone, Default)]
pub struct Dom {
    nodes: HashMap<DomNodeId, DomNode>,
}

impl Dom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn insert(&mut self, kind: DomNodeKind) -> DomNodeId {
        let id = DomNodeId::new();
        self.nodes.insert(
            id,
            DomNode {
                kind,
                parent: None,
                dirty: DirtyFlags::CLEAN,
            },
        );
        id
    }

    pub fn create_element(&mut self, tag: &str) -> DomNodeId {
        self.create_element_with(tag, Vec::new())
    }

    pub fn create_element_with(&mut self, tag: &str, attributes: Vec<(String, String)>) -> DomNodeId {
        self.insert(DomNodeKind::Element {
            tag: tag.to_ascii_lowercase(),
            attributes,
            children: Vec::new(),
        })
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> DomNodeId {
        self.insert(DomNodeKind::Text(text.into()))
    }

    pub fn contains(&self, id: DomNodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node(&self, id: DomNodeId) -> Result<&DomNode> {
        self.nodes.get(&id).ok_or(ModelError::UnknownDomNode(id))
    }

    fn node_mut(&mut self, id: DomNodeId) -> Result<&mut DomNode> {
        self.nodes.get_mut(&id).ok_or(ModelError::UnknownDomNode(id))
    }

    pub fn tag(&self, id: DomNodeId) -> Option<&str> {
        match self.nodes.get(&id).map(|n| &n.kind) {
            Some(DomNodeKind::Element { tag, .. }) => Some(tag),
            _ => None,
        }
    }

    pub fn is_element(&self, id: DomNodeId) -> bool {
        self.tag(id).is_some()
    }

    pub fn is_text(&self, id: DomNodeId) -> bool {
        matches!(
            self.nodes.get(&id).map(|n| &n.kind),
            Some(DomNodeKind::Text(_))
        )
    }

    pub fn text(&self, id: DomNodeId) -> Option<&str> {
        match self.nodes.get(&id).map(|n| &n.kind) {
            Some(DomNodeKind::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn set_text(&mut self, id: DomNodeId, text: impl Into<String>) -> Result<()> {
        match &mut self.node_mut(id)?.kind {
            DomNodeKind::Text(current) => {
                *current = text.into();
                Ok(())
            }
            DomNodeKind::Element { .. } => Err(ModelError::UnknownDomNode(id)),
        }
    }

    /// Concatenated text of a subtree.
    pub fn text_content(&self, id: DomNodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            match self.nodes.get(&next).map(|n| &n.kind) {
                Some(DomNodeKind::Text(text)) => out.push_str(text),
                Some(DomNodeKind::Element { children, .. }) => {
                    stack.extend(children.iter().rev().copied())
                }
                None => {}
            }
        }
        out
    }

    pub fn attributes(&self, id: DomNodeId) -> &[(String, String)] {
        match self.nodes.get(&id).map(|n| &n.kind) {
            Some(DomNodeKind::Element { attributes, .. }) => attributes,
            _ => &[],
        }
    }

    pub fn attribute(&self, id: DomNodeId, name: &str) -> Option<&str> {
        self.attributes(id)
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn attributes_mut(&mut self, id: DomNodeId) -> Result<&mut Vec<(String, String)>> {
        match &mut self.node_mut(id)?.kind {
            DomNodeKind::Element { attributes, .. } => Ok(attributes),
            DomNodeKind::Text(_) => Err(ModelError::DomNotAnElement(id)),
        }
    }

    /// Replaces the first attribute called `name`, or appends it.
    pub fn set_attribute(&mut self, id: DomNodeId, name: &str, value: impl Into<String>) -> Result<()> {
        let value = value.into();
        let attributes = self.attributes_mut(id)?;
        match attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value,
            None => attributes.push((name.to_string(), value)),
        }
        Ok(())
    }

    pub fn set_attributes(&mut self, id: DomNodeId, attributes: Vec<(String, String)>) -> Result<()> {
        *self.attributes_mut(id)? = attributes;
        Ok(())
    }

    pub fn children(&self, id: DomNodeId) -> &[DomNodeId] {
        match self.nodes.get(&id).map(|n| &n.kind) {
            Some(DomNodeKind::Element { children, .. }) => children,
            _ => &[],
        }
    }

    pub fn parent(&self, id: DomNodeId) -> Option<DomNodeId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    pub fn index_in_parent(&self, id: DomNodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|c| *c == id)
    }

    pub fn previous_sibling(&self, id: DomNodeId) -> Option<DomNodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        index
            .checked_sub(1)
            .and_then(|i| self.children(parent).get(i).copied())
    }

    pub fn next_sibling(&self, id: DomNodeId) -> Option<DomNodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        self.children(parent).get(index + 1).copied()
    }

    /// Child count for elements, character count for text.
    pub fn node_len(&self, id: DomNodeId) -> usize {
        match self.nodes.get(&id).map(|n| &n.kind) {
            Some(DomNodeKind::Element { children, .. }) => children.len(),
            Some(DomNodeKind::Text(text)) => text.chars().count(),
            None => 0,
        }
    }

    pub fn ancestors(&self, id: DomNodeId) -> impl Iterator<Item = DomNodeId> + '_ {
        std::iter::successors(self.parent(id), move |p| self.parent(*p))
    }

    fn children_mut(&mut self, id: DomNodeId) -> Result<&mut Vec<DomNodeId>> {
        match &mut self.node_mut(id)?.kind {
            DomNodeKind::Element { children, .. } => Ok(children),
            DomNodeKind::Text(_) => Err(ModelError::DomNotAnElement(id)),
        }
    }

    pub fn detach(&mut self, id: DomNodeId) -> Result<()> {
        let Some(parent) = self.node(id)?.parent else {
            return Ok(());
        };
        self.children_mut(parent)?.retain(|c| *c != id);
        self.node_mut(id)?.parent = None;
        Ok(())
    }

    pub fn append_child(&mut self, parent: DomNodeId, child: DomNodeId) -> Result<()> {
        self.children_mut(parent)?;
        self.detach(child)?;
        self.children_mut(parent)?.push(child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    pub fn remove_child(&mut self, parent: DomNodeId, child: DomNodeId) -> Result<()> {
        if self.parent(child) != Some(parent) {
            return Err(ModelError::DomNotAChild { parent, child });
        }
        self.detach(child)
    }

    /// Puts `new` where `old` is; `old` ends up detached.
    pub fn replace_child(&mut self, parent: DomNodeId, old: DomNodeId, new: DomNodeId) -> Result<()> {
        if old == new {
            return Ok(());
        }
        self.detach(new)?;
        let index = self
            .children(parent)
            .iter()
            .position(|c| *c == old)
            .ok_or(ModelError::DomNotAChild { parent, child: old })?;
        self.children_mut(parent)?[index] = new;
        self.node_mut(old)?.parent = None;
        self.node_mut(new)?.parent = Some(parent);
        Ok(())
    }

    /// Replaces all children of `parent`. Nodes in `children` are moved out of
    /// wherever they currently are; previous children not in the list end up
    /// detached.
    pub fn set_children(&mut self, parent: DomNodeId, children: Vec<DomNodeId>) -> Result<()> {
        let previous = std::mem::take(self.children_mut(parent)?);
        for old in previous {
            self.node_mut(old)?.parent = None;
        }
        for child in &children {
            self.detach(*child)?;
            self.node_mut(*child)?.parent = Some(parent);
        }
        *self.children_mut(parent)? = children;
        Ok(())
    }

    pub fn set_dirty(&mut self, id: DomNodeId, dirty: DirtyFlags) -> Result<()> {
        self.node_mut(id)?.dirty = dirty;
        Ok(())
    }

    /// Drops every node not reachable from one of `roots`.
    pub fn retain_reachable(&mut self, roots: &[DomNodeId]) -> usize {
        let mut reachable = HashSet::new();
        let mut stack = roots.to_vec();
        while let Some(id) = stack.pop() {
            if reachable.insert(id) {
                stack.extend_from_slice(self.children(id));
            }
        }
        let before = self.nodes.len();
        self.nodes.retain(|id, _| reachable.contains(id));
        before - self.nodes.len()
    }
}
