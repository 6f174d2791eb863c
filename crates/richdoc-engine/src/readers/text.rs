use super::ReaderContext;
use super::whitespace::normal_to_pre_wrap;
use crate::dom::{Dom, DomNodeId};
use crate::error::{ModelError, Result};
use crate::model::NodeId;
use crate::registry::NodeView;

/// Reads a text node. Text that is empty after whitespace collapsing reads
/// as nothing.
pub fn read_text(dom: &Dom, node: DomNodeId, ctx: &mut ReaderContext<'_>) -> Result<Vec<NodeId>> {
    let raw = dom.text(node).ok_or(ModelError::UnknownDomNode(node))?;
    let content = if ctx.should_convert_whitespace() {
        normal_to_pre_wrap(dom, node)
    } else {
        raw.to_string()
    };
    if content.is_empty() {
        return Ok(Vec::new());
    }

    let text = ctx.tree.create_text(content);
    let marks: Vec<(String, _)> = ctx
        .active_marks()
        .map(|(name, attrs)| (name.to_string(), attrs.clone()))
        .collect();
    for (name, attributes) in marks {
        ctx.tree.add_mark(text, &name, attributes)?;
    }
    // Wrappers shared with other content stay unregistered
    let view_root = ctx.owned_wrapper(dom, node);
    ctx.register_node_view(
        text,
        NodeView {
            view_root,
            content_root: node,
        },
    );
    Ok(vec![text])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MarksRegistry, Tree};
    use crate::registry::ViewRegistry;

    #[test]
    fn test_plain_text_maps_to_itself() {
        let mut dom = Dom::new();
        let node = dom.create_text("hello");
        let mut tree = Tree::new();
        let marks = MarksRegistry::with_defaults();
        let mut registry = ViewRegistry::new();
        let mut ctx = ReaderContext::new(&mut tree, &marks, &mut registry, true);

        let read = read_text(&dom, node, &mut ctx).unwrap();
        assert_eq!(read.len(), 1);
        assert_eq!(tree.text_content(read[0]).unwrap(), "hello");
        assert_eq!(registry.model_to_view(read[0]), Some(NodeView::single(node)));
    }

    #[test]
    fn test_whitespace_only_text_reads_as_nothing() {
        let mut dom = Dom::new();
        let node = dom.create_text("  \n ");
        let mut tree = Tree::new();
        let marks = MarksRegistry::with_defaults();
        let mut registry = ViewRegistry::new();
        let mut ctx = ReaderContext::new(&mut tree, &marks, &mut registry, true);

        assert!(read_text(&dom, node, &mut ctx).unwrap().is_empty());
        assert!(tree.is_empty());
    }
}
