//! Writing the model back out as external markup.
//!
//! Writes are incremental. A node whose dirty flags are clear and whose
//! previous view still exists is reused untouched; otherwise the least
//! disruptive update is made (attributes in place, children re-listed, or a
//! fresh view). Every produced view is stamped with the dirtiness it was
//! written from, and the model node's flags are then cleared.
//!
//! ## Modules
//!
//! - **`element`**: elements, void elements and inline components
//! - **`text`**: text nodes and their mark wrappers
//! - **`selection`**: model selections to external selections
//! - **`xml`**: a debugging dump that annotates dirtiness

use crate::dom::{Dom, DomNodeId};
use crate::error::Result;
use crate::model::{ComponentRegistry, MarksRegistry, NodeId, NodeKind, Tree};
use crate::registry::{NodeView, ViewRegistry};

pub mod element;
pub mod selection;
pub mod text;
pub mod xml;

pub use selection::write_selection;

pub struct WriterContext<'a> {
    pub tree: &'a mut Tree,
    pub dom: &'a mut Dom,
    pub registry: &'a mut ViewRegistry,
    pub marks: &'a MarksRegistry,
    pub components: &'a ComponentRegistry,
}

impl WriterContext<'_> {
    /// The node's current view, if it still exists in the DOM.
    pub(crate) fn live_view(&self, node: NodeId) -> Option<NodeView> {
        self.registry.model_to_view(node).filter(|view| {
            self.dom.contains(view.view_root) && self.dom.contains(view.content_root)
        })
    }
}

/// Writes `node`, returning the root of its view.
pub fn write_node(ctx: &mut WriterContext<'_>, node: NodeId) -> Result<DomNodeId> {
    let dirty = ctx.tree.dirtiness(node);
    let view = match ctx.tree.kind(node)? {
        NodeKind::Element { .. } => element::write_element(ctx, node)?,
        NodeKind::Void { .. } => element::write_void(ctx, node)?,
        NodeKind::Text { .. } => text::write_text(ctx, node)?,
    };
    ctx.dom.set_dirty(view, dirty)?;
    ctx.tree.clear_dirty(node);
    Ok(view)
}

/// Writes every child of `node` and returns their views in order.
pub(crate) fn write_children(ctx: &mut WriterContext<'_>, node: NodeId) -> Result<Vec<DomNodeId>> {
    let children = ctx.tree.children(node).to_vec();
    children
        .into_iter()
        .map(|child| write_node(ctx, child))
        .collect()
}

pub(crate) fn dom_attributes(tree: &Tree, node: NodeId) -> Vec<(String, String)> {
    tree.attributes(node)
        .map(|attrs| attrs.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .unwrap_or_default()
}
