use super::{ReaderContext, attributes_of, read_node};
use crate::dom::{Dom, DomNodeId};
use crate::error::Result;
use crate::model::NodeId;
use crate::registry::NodeView;

/// Reads `table`, `thead`, `tbody`, `tfoot` and `tr`. Every child is read,
/// text included. Formatting whitespace between structural children sits
/// between blocks, so whitespace collapsing reduces it to nothing; with
/// collapsing switched off it is kept as text.
pub fn read_table_structure(
    dom: &Dom,
    node: DomNodeId,
    ctx: &mut ReaderContext<'_>,
) -> Result<Vec<NodeId>> {
    let tag = dom.tag(node).unwrap_or("table");
    let element = ctx.tree.create_element_with(tag, attributes_of(dom, node));
    for child in dom.children(node) {
        let read = read_node(dom, *child, ctx)?;
        ctx.tree.append_children(element, read)?;
    }
    ctx.register_node_view(element, NodeView::single(node));
    Ok(vec![element])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::build::{el, text};
    use crate::model::{MarksRegistry, Tree, outline};
    use crate::readers::read_root;
    use crate::registry::ViewRegistry;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_formatting_whitespace_collapses_away() {
        let mut dom = Dom::new();
        let root = dom.build(&el(
            "table",
            vec![
                text("\n  "),
                el(
                    "tbody",
                    vec![
                        text("\n"),
                        el(
                            "tr",
                            vec![
                                text(" "),
                                el("td", vec![text("a")]),
                                el("td", vec![text(" ")]),
                            ],
                        ),
                    ],
                ),
            ],
        ));
        let mut tree = Tree::new();
        let marks = MarksRegistry::with_defaults();
        let mut registry = ViewRegistry::new();
        let mut ctx = ReaderContext::new(&mut tree, &marks, &mut registry, true);
        let table = read_root(&dom, root, &mut ctx).unwrap();

        assert_eq!(
            outline(&tree, table).unwrap().lines(),
            vec!["<table>", "  <tbody>", "    <tr>", "      <td>", "        \"a\"", "      <td>"]
        );
    }

    #[test]
    fn test_whitespace_kept_without_collapsing() {
        let mut dom = Dom::new();
        let root = dom.build(&el(
            "table",
            vec![text("\n "), el("tr", vec![el("td", vec![text("a")])])],
        ));
        let mut tree = Tree::new();
        let marks = MarksRegistry::with_defaults();
        let mut registry = ViewRegistry::new();
        let mut ctx = ReaderContext::new(&mut tree, &marks, &mut registry, false);
        let table = read_root(&dom, root, &mut ctx).unwrap();

        let children = tree.children(table);
        assert_eq!(children.len(), 2);
        assert_eq!(tree.text_content(children[0]).unwrap(), "\n ");
        assert_eq!(tree.tag(children[1]), Some("tr"));
    }
}
