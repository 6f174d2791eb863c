use std::collections::HashMap;

use crate::dom::{Dom, DomNodeId};
use crate::model::{NodeId, Tree};

/// The external nodes a model node is rendered as.
///
/// `view_root` is the outermost node (for marked text, the outermost mark
/// wrapper); `content_root` is where the node's own content lives (for text,
/// the external text node).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeView {
    pub view_root: DomNodeId,
    pub content_root: DomNodeId,
}

impl NodeView {
    pub fn single(node: DomNodeId) -> Self {
        Self {
            view_root: node,
            content_root: node,
        }
    }
}

/// Bidirectional mapping between model nodes and external nodes.
///
/// Entries never keep nodes alive: lookups ignore entries whose nodes are
/// gone and [`prune`](Self::prune) drops them.
#[derive(Debug, Clone, Default)]
pub struct ViewRegistry {
    view_to_model: HashMap<DomNodeId, NodeId>,
    content_to_model: HashMap<DomNodeId, NodeId>,
    model_to_view: HashMap<NodeId, NodeView>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.model_to_view.len()
    }

    pub fn is_empty(&self) -> bool {
        self.model_to_view.is_empty()
    }

    pub fn register(&mut self, model: NodeId, view: NodeView) {
        self.forget(model);
        self.view_to_model.insert(view.view_root, model);
        self.content_to_model.insert(view.content_root, model);
        self.model_to_view.insert(model, view);
    }

    pub fn forget(&mut self, model: NodeId) {
        if let Some(old) = self.model_to_view.remove(&model) {
            if self.view_to_model.get(&old.view_root) == Some(&model) {
                self.view_to_model.remove(&old.view_root);
            }
            if self.content_to_model.get(&old.content_root) == Some(&model) {
                self.content_to_model.remove(&old.content_root);
            }
        }
    }

    pub fn clear(&mut self) {
        self.view_to_model.clear();
        self.content_to_model.clear();
        self.model_to_view.clear();
    }

    pub fn model_to_view(&self, model: NodeId) -> Option<NodeView> {
        self.model_to_view.get(&model).copied()
    }

    /// Exact lookup of a view root.
    pub fn model_for_view(&self, view: DomNodeId) -> Option<NodeId> {
        self.view_to_model.get(&view).copied()
    }

    pub fn content_to_model(&self, content: DomNodeId) -> Option<NodeId> {
        self.content_to_model.get(&content).copied()
    }

    /// The model node for `view` or, failing that, for its nearest registered
    /// ancestor.
    pub fn view_to_model(&self, dom: &Dom, view: DomNodeId) -> Option<NodeId> {
        std::iter::once(view)
            .chain(dom.ancestors(view))
            .find_map(|node| {
                self.view_to_model
                    .get(&node)
                    .or_else(|| self.content_to_model.get(&node))
                    .copied()
            })
    }

    /// Drops entries whose model or external nodes no longer exist.
    pub fn prune(&mut self, tree: &Tree, dom: &Dom) -> usize {
        let dead: Vec<NodeId> = self
            .model_to_view
            .iter()
            .filter(|(model, view)| {
                !tree.contains(**model)
                    || !dom.contains(view.view_root)
                    || !dom.contains(view.content_root)
            })
            .map(|(model, _)| *model)
            .collect();
        for model in &dead {
            self.forget(*model);
        }
        self.view_to_model
            .retain(|view, model| dom.contains(*view) && tree.contains(*model));
        self.content_to_model
            .retain(|view, model| dom.contains(*view) && tree.contains(*model));
        dead.len()
    }
}
