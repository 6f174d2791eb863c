use super::WriterContext;
use crate::dom::{Dom, DomNodeId};
use crate::error::Result;
use crate::model::NodeId;
use crate::model::marks::MARK_ATTRIBUTE;
use crate::registry::NodeView;

/// Writes a text node wrapped in one element per mark, outermost mark first.
///
/// A clean node reuses its view only when that view carries a wrapper for
/// every mark. Text read from inside a wrapper it shares with other content
/// has a partial view and gets a fresh one.
pub fn write_text(ctx: &mut WriterContext<'_>, node: NodeId) -> Result<DomNodeId> {
    let mark_count = ctx.tree.marks(node)?.len();
    if ctx.tree.dirtiness(node).is_clean()
        && let Some(view) = ctx.live_view(node)
        && wrapper_depth(ctx.dom, view) == Some(mark_count)
    {
        return Ok(view.view_root);
    }

    let content = ctx.tree.text_content(node)?.to_string();
    let text = ctx.dom.create_text(content);

    let wrappers: Vec<(String, Vec<(String, String)>)> = ctx
        .marks
        .nesting_order(ctx.tree.marks(node)?)
        .into_iter()
        .map(|(name, attrs)| {
            let mut attributes: Vec<(String, String)> =
                attrs.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
            if ctx.marks.spec(name).is_none() {
                attributes.insert(0, (MARK_ATTRIBUTE.to_string(), name.to_string()));
            }
            (ctx.marks.render_tag(name).to_string(), attributes)
        })
        .collect();

    let mut view_root = text;
    for (tag, attributes) in wrappers.into_iter().rev() {
        let wrapper = ctx.dom.create_element_with(&tag, attributes);
        ctx.dom.append_child(wrapper, view_root)?;
        view_root = wrapper;
    }

    ctx.registry.register(
        node,
        NodeView {
            view_root,
            content_root: text,
        },
    );
    Ok(view_root)
}

/// Number of wrappers between a view's content and its root.
fn wrapper_depth(dom: &Dom, view: NodeView) -> Option<usize> {
    if view.view_root == view.content_root {
        return Some(0);
    }
    dom.ancestors(view.content_root)
        .position(|ancestor| ancestor == view.view_root)
        .map(|index| index + 1)
}
