use super::{ReaderContext, attributes_of, read_children};
use crate::dom::{Dom, DomNodeId};
use crate::error::Result;
use crate::model::NodeId;
use crate::model::marks::MARK_ATTRIBUTE;
use crate::registry::NodeView;

/// Default reader: one model element per external element.
pub fn read_element(dom: &Dom, node: DomNodeId, ctx: &mut ReaderContext<'_>) -> Result<Vec<NodeId>> {
    let tag = dom.tag(node).unwrap_or("div");
    let element = ctx.tree.create_element_with(tag, attributes_of(dom, node));
    let preformatted = tag == "pre";
    let children = if preformatted {
        ctx.with_whitespace(false, |ctx| read_children(dom, node, ctx))?
    } else {
        read_children(dom, node, ctx)?
    };
    ctx.tree.append_children(element, children)?;
    ctx.register_node_view(element, NodeView::single(node));
    Ok(vec![element])
}

/// Void elements read as leaves; anything nested inside is ignored.
pub fn read_void(dom: &Dom, node: DomNodeId, ctx: &mut ReaderContext<'_>) -> Result<Vec<NodeId>> {
    let tag = dom.tag(node).unwrap_or("br");
    let void = ctx.tree.create_void_with(tag, attributes_of(dom, node));
    ctx.register_node_view(void, NodeView::single(node));
    Ok(vec![void])
}

/// Mark wrappers produce no node themselves; their text descendants get the
/// mark, with the wrapper's attributes.
pub fn read_mark_wrapper(
    dom: &Dom,
    node: DomNodeId,
    name: &str,
    ctx: &mut ReaderContext<'_>,
) -> Result<Vec<NodeId>> {
    let mut attributes = attributes_of(dom, node);
    attributes.remove(MARK_ATTRIBUTE);
    ctx.push_mark(name, attributes, node);
    let result = read_children(dom, node, ctx);
    ctx.pop_mark();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::build::{el, el_with, text};
    use crate::model::{MarksRegistry, Tree, outline};
    use crate::readers::read_root;
    use crate::registry::ViewRegistry;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_nested_marks_and_attributes() {
        let mut dom = Dom::new();
        let root = dom.build(&el(
            "p",
            vec![
                text("a "),
                el_with(
                    "strong",
                    &[("class", "x")],
                    vec![text("b "), el("em", vec![text("c")])],
                ),
            ],
        ));
        let mut tree = Tree::new();
        let marks = MarksRegistry::with_defaults();
        let mut registry = ViewRegistry::new();
        let mut ctx = ReaderContext::new(&mut tree, &marks, &mut registry, true);
        let p = read_root(&dom, root, &mut ctx).unwrap();

        let lines = outline(&tree, p).unwrap().lines();
        assert_eq!(
            lines,
            vec!["<p>", "  \"a \"", "  \"b \" [bold]", "  \"c\" [bold, italic]"]
        );
        let c = tree.children(p)[2];
        assert_eq!(
            tree.marks(c).unwrap().get("bold").unwrap().get("class"),
            Some(&"x".to_string())
        );

        // Marked text maps to the wrappers it alone fills
        let strong = dom.children(root)[1];
        let em = dom.children(strong)[1];
        let view = registry.model_to_view(c).unwrap();
        assert_eq!(view.view_root, em);
        assert_eq!(view.content_root, dom.children(em)[0]);

        let b = tree.children(p)[1];
        let view = registry.model_to_view(b).unwrap();
        assert_eq!(view.view_root, dom.children(strong)[0]);
        assert_eq!(registry.model_for_view(strong), None);
    }

    #[test]
    fn test_pre_keeps_whitespace() {
        let mut dom = Dom::new();
        let root = dom.build(&el("div", vec![el("pre", vec![text("  a\n  b")])]));
        let mut tree = Tree::new();
        let marks = MarksRegistry::with_defaults();
        let mut registry = ViewRegistry::new();
        let mut ctx = ReaderContext::new(&mut tree, &marks, &mut registry, true);
        let div = read_root(&dom, root, &mut ctx).unwrap();

        let pre = tree.children(div)[0];
        let content = tree.text_content(tree.children(pre)[0]).unwrap();
        assert_eq!(content, "  a\n  b");
    }

    #[test]
    fn test_void_and_unregistered_mark() {
        let mut dom = Dom::new();
        let root = dom.build(&el(
            "p",
            vec![
                el("br", vec![]),
                el_with("span", &[("data-mark", "highlight")], vec![text("h")]),
            ],
        ));
        let mut tree = Tree::new();
        let marks = MarksRegistry::with_defaults();
        let mut registry = ViewRegistry::new();
        let mut ctx = ReaderContext::new(&mut tree, &marks, &mut registry, true);
        let p = read_root(&dom, root, &mut ctx).unwrap();

        let children = tree.children(p).to_vec();
        assert!(tree.is_void(children[0]));
        assert!(tree.has_mark(children[1], "highlight"));
        assert!(tree.marks(children[1]).unwrap().get("highlight").unwrap().is_empty());
    }
}
