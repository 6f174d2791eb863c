//! Reading external markup into the model.
//!
//! Each external node reads as zero or more model nodes. Mark wrappers like
//! `<strong>` produce no node of their own: they push a mark onto the
//! [`ReaderContext`] that every text node read beneath them picks up.
//!
//! ## Modules
//!
//! - **`element`**: generic elements, void elements and mark wrappers
//! - **`component`**: inline components and placeholders
//! - **`text`**: text nodes
//! - **`table`**: table structure
//! - **`whitespace`**: HTML whitespace collapsing
//! - **`selection`**: external selections to model selections

use crate::dom::{Dom, DomNodeId, DomNodeKind, is_void_tag};
use crate::error::{ModelError, Result};
use crate::model::components::{COMPONENT_ATTRIBUTE, PLACEHOLDER, PLACEHOLDER_CLASS};
use crate::model::marks::MARK_ATTRIBUTE;
use crate::model::{Attributes, ComponentRegistry, ComponentSpec, MarksRegistry, NodeId, Tree};
use crate::registry::{NodeView, ViewRegistry};

pub mod component;
pub mod element;
pub mod selection;
pub mod table;
pub mod text;
pub mod whitespace;

pub use selection::SelectionReader;

/// Tags that read as table structure.
pub const TABLE_TAGS: &[&str] = &["table", "thead", "tbody", "tfoot", "tr"];

struct ActiveMark {
    name: String,
    attributes: Attributes,
    wrapper: DomNodeId,
}

/// State threaded through one read.
pub struct ReaderContext<'a> {
    pub tree: &'a mut Tree,
    pub marks: &'a MarksRegistry,
    pub registry: &'a mut ViewRegistry,
    components: Option<&'a ComponentRegistry>,
    active_marks: Vec<ActiveMark>,
    convert_whitespace: bool,
}

impl<'a> ReaderContext<'a> {
    pub fn new(
        tree: &'a mut Tree,
        marks: &'a MarksRegistry,
        registry: &'a mut ViewRegistry,
        convert_whitespace: bool,
    ) -> Self {
        Self {
            tree,
            marks,
            registry,
            components: None,
            active_marks: Vec::new(),
            convert_whitespace,
        }
    }

    /// Reads elements of registered components as atomic nodes. Without a
    /// component registry they read as ordinary elements.
    pub fn with_components(mut self, components: &'a ComponentRegistry) -> Self {
        self.components = Some(components);
        self
    }

    /// The component `node` is markup for: an explicit component element, or
    /// an element carrying the placeholder class.
    pub fn component_for(&self, dom: &Dom, node: DomNodeId) -> Option<&'a ComponentSpec> {
        let components = self.components?;
        if let Some(name) = dom.attribute(node, COMPONENT_ATTRIBUTE) {
            return components.spec(name);
        }
        let placeholder = dom
            .attribute(node, "class")
            .is_some_and(|class| class.split_whitespace().any(|c| c == PLACEHOLDER_CLASS));
        if placeholder {
            components.spec(PLACEHOLDER)
        } else {
            None
        }
    }

    pub fn should_convert_whitespace(&self) -> bool {
        self.convert_whitespace
    }

    /// Runs `f` with whitespace conversion switched to `enabled`.
    pub fn with_whitespace<T>(&mut self, enabled: bool, f: impl FnOnce(&mut Self) -> T) -> T {
        let previous = std::mem::replace(&mut self.convert_whitespace, enabled);
        let result = f(self);
        self.convert_whitespace = previous;
        result
    }

    pub fn push_mark(&mut self, name: &str, attributes: Attributes, wrapper: DomNodeId) {
        self.active_marks.push(ActiveMark {
            name: name.to_string(),
            attributes,
            wrapper,
        });
    }

    pub fn pop_mark(&mut self) {
        self.active_marks.pop();
    }

    /// Marks currently in effect, outermost first.
    pub fn active_marks(&self) -> impl Iterator<Item = (&str, &Attributes)> {
        self.active_marks
            .iter()
            .map(|m| (m.name.as_str(), &m.attributes))
    }

    /// The outermost open mark wrapper holding nothing but `node`, through
    /// single-child wrappers. Falls back to `node` itself when its innermost
    /// wrapper has other content.
    pub fn owned_wrapper(&self, dom: &Dom, node: DomNodeId) -> DomNodeId {
        let mut view_root = node;
        for mark in self.active_marks.iter().rev() {
            if dom.children(mark.wrapper) != [view_root].as_slice() {
                break;
            }
            view_root = mark.wrapper;
        }
        view_root
    }

    pub fn register_node_view(&mut self, model: NodeId, view: NodeView) {
        self.registry.register(model, view);
    }
}

/// Reads one external node, dispatching on its kind and tag.
pub fn read_node(dom: &Dom, node: DomNodeId, ctx: &mut ReaderContext<'_>) -> Result<Vec<NodeId>> {
    match dom.node(node)?.kind() {
        DomNodeKind::Text(_) => text::read_text(dom, node, ctx),
        DomNodeKind::Element { tag, .. } => {
            if let Some(spec) = ctx.component_for(dom, node) {
                log::trace!("<{tag}> {node} read as component {}", spec.name);
                return component::read_component(dom, node, spec, ctx);
            }
            if let Some(spec) = ctx.marks.spec_for_tag(tag) {
                let name = spec.name.clone();
                log::trace!("<{tag}> {node} read as mark {name}");
                return element::read_mark_wrapper(dom, node, &name, ctx);
            }
            if let Some(name) = dom.attribute(node, MARK_ATTRIBUTE) {
                let name = name.to_string();
                return element::read_mark_wrapper(dom, node, &name, ctx);
            }
            if is_void_tag(tag) {
                return element::read_void(dom, node, ctx);
            }
            if TABLE_TAGS.contains(&tag.as_str()) {
                log::trace!("<{tag}> {node} read as table structure");
                return table::read_table_structure(dom, node, ctx);
            }
            element::read_element(dom, node, ctx)
        }
    }
}

/// Reads the children of `node` in order, concatenating their results.
pub fn read_children(
    dom: &Dom,
    node: DomNodeId,
    ctx: &mut ReaderContext<'_>,
) -> Result<Vec<NodeId>> {
    let mut result = Vec::new();
    for child in dom.children(node) {
        result.extend(read_node(dom, *child, ctx)?);
    }
    Ok(result)
}

/// Reads a document root, which must produce exactly one element.
pub fn read_root(dom: &Dom, root: DomNodeId, ctx: &mut ReaderContext<'_>) -> Result<NodeId> {
    match read_node(dom, root, ctx)?.as_slice() {
        [single] if ctx.tree.is_element(*single) => Ok(*single),
        _ => Err(ModelError::InvalidRoot),
    }
}

pub(crate) fn attributes_of(dom: &Dom, node: DomNodeId) -> Attributes {
    dom.attributes(node)
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
