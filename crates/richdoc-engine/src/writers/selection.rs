use crate::dom::{Dom, DomPoint, DomSelection};
use crate::error::{ModelError, Result};
use crate::model::{NodeKind, Tree};
use crate::position::Position;
use crate::registry::ViewRegistry;
use crate::selection::Selection;

/// Maps the model selection onto the external tree. An empty selection maps
/// to an empty external selection.
pub fn write_selection(
    tree: &Tree,
    dom: &Dom,
    registry: &ViewRegistry,
    selection: &Selection,
) -> Result<DomSelection> {
    let (Some(anchor), Some(focus)) = (selection.anchor(), selection.focus()) else {
        return Ok(DomSelection::default());
    };
    Ok(DomSelection::new(
        write_position(tree, dom, registry, anchor)?,
        write_position(tree, dom, registry, focus)?,
    ))
}

pub fn write_position(
    tree: &Tree,
    dom: &Dom,
    registry: &ViewRegistry,
    position: &Position,
) -> Result<DomPoint> {
    let parent = position.parent(tree)?;
    let offset = position.parent_offset();
    let view = registry
        .model_to_view(parent)
        .ok_or(ModelError::NoViewForNode(parent))?;

    match tree.kind(parent)? {
        NodeKind::Text { .. } => Ok(DomPoint::new(view.content_root, offset)),
        NodeKind::Element { children, .. } => {
            let container = view.content_root;
            let dom_offset = match children.get(offset) {
                Some(child) => {
                    let child_view = registry
                        .model_to_view(*child)
                        .ok_or(ModelError::NoViewForNode(*child))?;
                    match dom.parent(child_view.view_root) {
                        Some(parent) if parent == container => dom
                            .index_in_parent(child_view.view_root)
                            .ok_or(ModelError::NoViewForNode(*child))?,
                        // Text inside a wrapper shared with earlier siblings
                        _ if tree.is_text(*child) => {
                            return Ok(DomPoint::new(child_view.content_root, 0));
                        }
                        _ => return Err(ModelError::NoViewForNode(*child)),
                    }
                }
                None => dom.node_len(container),
            };
            Ok(DomPoint::new(container, dom_offset))
        }
        NodeKind::Void { .. } => Err(ModelError::NotImplemented("positions inside void nodes")),
    }
}
