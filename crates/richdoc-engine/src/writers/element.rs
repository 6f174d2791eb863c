use super::{WriterContext, dom_attributes, write_children};
use crate::dom::DomNodeId;
use crate::error::{ModelError, Result};
use crate::model::NodeId;
use crate::model::components::{EDITABLE_ATTRIBUTE, Props, component_props};
use crate::registry::NodeView;

pub fn write_element(ctx: &mut WriterContext<'_>, node: NodeId) -> Result<DomNodeId> {
    let dirty = ctx.tree.dirtiness(node);
    let tag = ctx.tree.tag(node).ok_or(ModelError::NotAnElement(node))?.to_string();
    let existing = ctx
        .live_view(node)
        .map(|view| view.view_root)
        .filter(|view| ctx.dom.tag(*view) == Some(tag.as_str()));

    if let Some(view) = existing
        && !dirty.node
    {
        if dirty.attributes {
            ctx.dom.set_attributes(view, dom_attributes(ctx.tree, node))?;
        }
        if dirty.content {
            let children = write_children(ctx, node)?;
            ctx.dom.set_children(view, children)?;
        }
        return Ok(view);
    }

    let view = ctx
        .dom
        .create_element_with(&tag, dom_attributes(ctx.tree, node));
    let children = write_children(ctx, node)?;
    ctx.dom.set_children(view, children)?;
    ctx.registry.register(node, NodeView::single(view));
    Ok(view)
}

pub fn write_void(ctx: &mut WriterContext<'_>, node: NodeId) -> Result<DomNodeId> {
    let dirty = ctx.tree.dirtiness(node);
    let tag = ctx.tree.tag(node).ok_or(ModelError::NotAnElement(node))?.to_string();
    if let Some(view) = ctx.live_view(node).map(|v| v.view_root)
        && !dirty.node
        && ctx.dom.tag(view) == Some(tag.as_str())
    {
        if dirty.attributes {
            ctx.dom.set_attributes(view, void_attributes(ctx, node))?;
            let content = render_component(ctx, node)?;
            ctx.dom.set_children(view, content)?;
        }
        return Ok(view);
    }
    let view = ctx.dom.create_element_with(&tag, void_attributes(ctx, node));
    let content = render_component(ctx, node)?;
    ctx.dom.set_children(view, content)?;
    ctx.registry.register(node, NodeView::single(view));
    Ok(view)
}

fn void_attributes(ctx: &WriterContext<'_>, node: NodeId) -> Vec<(String, String)> {
    let mut attributes = dom_attributes(ctx.tree, node);
    if ctx.components.spec_for_node(ctx.tree, node).is_some() {
        attributes.push((EDITABLE_ATTRIBUTE.to_string(), "false".to_string()));
    }
    attributes
}

/// Static content of a component view; plain voids have none.
fn render_component(ctx: &mut WriterContext<'_>, node: NodeId) -> Result<Vec<DomNodeId>> {
    let components = ctx.components;
    let Some(spec) = components.spec_for_node(ctx.tree, node) else {
        return Ok(Vec::new());
    };
    let props = component_props(ctx.tree, node).unwrap_or_else(|err| {
        log::warn!("Rendering {node} without properties: {err}");
        Props::new()
    });
    let content = (spec.render)(&props);
    if content.is_empty() {
        return Ok(Vec::new());
    }
    Ok(vec![ctx.dom.create_text(content)])
}
