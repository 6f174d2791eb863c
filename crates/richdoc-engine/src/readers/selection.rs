use crate::dom::{Dom, DomNodeId, DomPoint, DomSelection};
use crate::error::{ModelError, Result};
use crate::model::{NodeId, Tree};
use crate::position::Position;
use crate::range::Range;
use crate::registry::ViewRegistry;
use crate::selection::Selection;

/// Translates external selection points into model positions.
pub struct SelectionReader<'a> {
    tree: &'a Tree,
    root: NodeId,
    dom: &'a Dom,
    registry: &'a ViewRegistry,
}

impl<'a> SelectionReader<'a> {
    pub fn new(tree: &'a Tree, root: NodeId, dom: &'a Dom, registry: &'a ViewRegistry) -> Self {
        Self {
            tree,
            root,
            dom,
            registry,
        }
    }

    pub fn read(&self, selection: &DomSelection) -> Result<Selection> {
        let anchor = selection
            .anchor
            .ok_or(ModelError::Selection("external selection has no anchor"))?;
        let focus = selection.focus.unwrap_or(anchor);
        let anchor = self.read_dom_position(anchor.node, anchor.offset)?;
        let focus = self.read_dom_position(focus.node, focus.offset)?;

        let mut result = Selection::collapsed_at(anchor);
        result.set_focus(focus)?;
        Ok(result)
    }

    pub fn read_dom_range(&self, start: DomPoint, end: DomPoint) -> Result<Range> {
        let start = self.read_dom_position(start.node, start.offset)?;
        let end = self.read_dom_position(end.node, end.offset)?;
        Range::new(start, end).map_err(|err| match err {
            ModelError::InvertedRange => ModelError::Selection("external range is inverted"),
            other => other,
        })
    }

    pub fn read_dom_position(&self, node: DomNodeId, offset: usize) -> Result<Position> {
        if offset > self.dom.node_len(node) {
            return Err(ModelError::Selection("offset beyond the external node"));
        }
        if self.dom.is_text(node) {
            return self.read_text_position(node, offset);
        }
        self.dom.node(node)?;

        let exact = self.registry.model_for_view(node);
        if exact.is_none_or(|model| self.tree.is_text(model))
            && let Some(position) = self.read_wrapper_position(node, offset)?
        {
            return Ok(position);
        }

        let Some(model) = exact.or_else(|| self.registry.view_to_model(self.dom, node)) else {
            return Err(ModelError::NoModelForView(node));
        };

        if self.tree.is_text(model) {
            // Inside a mark wrapper: either before or after the text
            let offset = if offset == 0 {
                0
            } else {
                self.tree.node_len(model)
            };
            return Position::from_parent(self.tree, self.root, model, offset);
        }
        if self.tree.is_void(model) {
            return if offset == 0 {
                Position::before_node(self.tree, model)
            } else {
                Position::after_node(self.tree, model)
            };
        }

        let preceding = &self.dom.children(node)[..offset];
        let count = self
            .tree
            .children(model)
            .iter()
            .filter(|child| {
                self.registry.model_to_view(**child).is_some_and(|view| {
                    self.child_containing(node, view.view_root)
                        .is_some_and(|top| preceding.contains(&top))
                })
            })
            .count();
        Position::from_parent(self.tree, self.root, model, count)
    }

    /// A point inside a mark wrapper lands at the start of the first text
    /// from the point on, or at the end of the wrapper's last text.
    fn read_wrapper_position(&self, wrapper: DomNodeId, offset: usize) -> Result<Option<Position>> {
        let children = self.dom.children(wrapper);
        let following = children[offset..]
            .iter()
            .find_map(|child| self.texts_within(*child).first().copied());
        if let Some(text) = following {
            return Position::from_parent(self.tree, self.root, text, 0).map(Some);
        }
        let preceding = children[..offset]
            .iter()
            .rev()
            .find_map(|child| self.texts_within(*child).last().copied());
        match preceding {
            Some(text) => {
                Position::from_parent(self.tree, self.root, text, self.tree.node_len(text)).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Model texts read from `node` and its descendants, in document order.
    fn texts_within(&self, node: DomNodeId) -> Vec<NodeId> {
        let mut texts = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if let Some(model) = self
                .registry
                .content_to_model(current)
                .filter(|model| self.tree.is_text(*model))
            {
                texts.push(model);
            }
            stack.extend(self.dom.children(current).iter().rev());
        }
        texts
    }

    /// The child of `parent` that holds `descendant`, which may be the child
    /// itself.
    fn child_containing(&self, parent: DomNodeId, descendant: DomNodeId) -> Option<DomNodeId> {
        std::iter::once(descendant)
            .chain(self.dom.ancestors(descendant))
            .find(|node| self.dom.parent(*node) == Some(parent))
    }

    fn read_text_position(&self, node: DomNodeId, offset: usize) -> Result<Position> {
        match self.registry.content_to_model(node) {
            Some(model) if self.tree.is_text(model) => {
                // Collapsed whitespace can make the model text shorter
                let offset = offset.min(self.tree.node_len(model));
                Position::from_parent(self.tree, self.root, model, offset)
            }
            _ => {
                // Text that read as nothing: use its place in the parent
                let parent = self
                    .dom
                    .parent(node)
                    .ok_or(ModelError::Selection("external text has no counterpart"))?;
                let index = self.dom.index_in_parent(node).unwrap_or(0);
                self.read_dom_position(parent, index)
            }
        }
    }
}
