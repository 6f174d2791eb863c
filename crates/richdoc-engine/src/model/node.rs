use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use super::marks::MarkSet;

/// Stable identity of a node inside a [`Tree`](super::Tree).
///
/// Ids survive moves between parents and are preserved by snapshots, so they
/// are what the view registry and selection code key on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(Uuid);

impl NodeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub type Attributes = BTreeMap<String, String>;

/// Which parts of a node changed since it was last written out.
///
/// `node` means the node needs a brand new external representation,
/// `content` that its children (or text) changed and `attributes` that only
/// its attributes (or, for text, its marks) changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DirtyFlags {
    pub node: bool,
    pub content: bool,
    pub attributes: bool,
}

impl DirtyFlags {
    pub const CLEAN: DirtyFlags = DirtyFlags {
        node: false,
        content: false,
        attributes: false,
    };

    /// Flags carried by a freshly created node.
    pub const NEW: DirtyFlags = DirtyFlags {
        node: true,
        content: true,
        attributes: false,
    };

    pub const CONTENT: DirtyFlags = DirtyFlags {
        node: false,
        content: true,
        attributes: false,
    };

    pub const ATTRIBUTES: DirtyFlags = DirtyFlags {
        node: false,
        content: false,
        attributes: true,
    };

    pub fn is_clean(&self) -> bool {
        !(self.node || self.content || self.attributes)
    }

    pub fn union(self, other: DirtyFlags) -> DirtyFlags {
        DirtyFlags {
            node: self.node || other.node,
            content: self.content || other.content,
            attributes: self.attributes || other.attributes,
        }
    }

    /// Names of the set flags, in a fixed order.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.node {
            names.push("node");
        }
        if self.content {
            names.push("content");
        }
        if self.attributes {
            names.push("attributes");
        }
        names
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Element {
        tag: String,
        attributes: Attributes,
        children: Vec<NodeId>,
    },
    Text {
        content: String,
        marks: MarkSet,
    },
    Void {
        tag: String,
        attributes: Attributes,
    },
}

impl NodeKind {
    pub fn tag(&self) -> Option<&str> {
        match self {
            NodeKind::Element { tag, .. } | NodeKind::Void { tag, .. } => Some(tag),
            NodeKind::Text { .. } => None,
        }
    }

    pub fn attributes(&self) -> Option<&Attributes> {
        match self {
            NodeKind::Element { attributes, .. } | NodeKind::Void { attributes, .. } => {
                Some(attributes)
            }
            NodeKind::Text { .. } => None,
        }
    }

    /// Child count for elements, character count for text, zero for voids.
    pub fn len(&self) -> usize {
        match self {
            NodeKind::Element { children, .. } => children.len(),
            NodeKind::Text { content, .. } => content.chars().count(),
            NodeKind::Void { .. } => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone)]
pub struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) dirty: DirtyFlags,
}

impl NodeData {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            dirty: DirtyFlags::NEW,
        }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn dirty(&self) -> DirtyFlags {
        self.dirty
    }

    pub fn is_element(&self) -> bool {
        matches!(self.kind, NodeKind::Element { .. })
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text { .. })
    }

    pub fn is_void(&self) -> bool {
        matches!(self.kind, NodeKind::Void { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirty_flags_union_and_names() {
        let flags = DirtyFlags::CONTENT.union(DirtyFlags::ATTRIBUTES);
        assert_eq!(flags.names(), vec!["content", "attributes"]);
        assert!(!flags.is_clean());
        assert!(DirtyFlags::CLEAN.is_clean());
        assert_eq!(DirtyFlags::NEW.names(), vec!["node", "content"]);
    }

    #[test]
    fn test_text_length_counts_chars_not_bytes() {
        let kind = NodeKind::Text {
            content: "héllo".to_string(),
            marks: MarkSet::default(),
        };
        assert_eq!(kind.len(), 5);
    }

    #[test]
    fn test_node_ids_are_unique() {
        assert_ne!(NodeId::new(), NodeId::new());
    }
}
