use crate::dom::{Dom, DomNodeId, html};
use crate::error::Result;
use crate::model::{Attributes, MarksRegistry, NodeId, NodeKind, Tree};

pub const DIRTY_ATTRIBUTE: &str = "__dirty";

/// Dumps a model subtree into a standalone DOM for inspection.
///
/// Unlike the incremental writer this never reuses views and leaves the
/// model's dirty flags alone. Every element, void and text wrapper carries a
/// `__dirty` attribute listing the flags set on its model node; clean nodes
/// get none.
pub fn write_debug(tree: &Tree, marks: &MarksRegistry, node: NodeId) -> Result<(Dom, DomNodeId)> {
    let mut dom = Dom::new();
    let root = write_into(&mut dom, tree, marks, node)?;
    Ok((dom, root))
}

/// [`write_debug`] serialized to a string.
pub fn to_debug_string(tree: &Tree, marks: &MarksRegistry, node: NodeId) -> Result<String> {
    let (dom, root) = write_debug(tree, marks, node)?;
    Ok(html::to_html(&dom, root))
}

fn annotated(attributes: &Attributes, dirty: &str) -> Vec<(String, String)> {
    let mut out: Vec<(String, String)> = attributes
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    if !dirty.is_empty() {
        out.push((DIRTY_ATTRIBUTE.to_string(), dirty.to_string()));
    }
    out
}

fn write_into(dom: &mut Dom, tree: &Tree, marks: &MarksRegistry, node: NodeId) -> Result<DomNodeId> {
    let dirty = tree.dirtiness(node).names().join(" ");
    match tree.kind(node)? {
        NodeKind::Element {
            tag,
            attributes,
            children,
        } => {
            let element = dom.create_element_with(tag, annotated(attributes, &dirty));
            for child in children {
                let written = write_into(dom, tree, marks, *child)?;
                dom.append_child(element, written)?;
            }
            Ok(element)
        }
        NodeKind::Void { tag, attributes } => {
            Ok(dom.create_element_with(tag, annotated(attributes, &dirty)))
        }
        NodeKind::Text {
            content,
            marks: text_marks,
        } => {
            let text = dom.create_text(content.clone());
            let order = marks.nesting_order(text_marks);
            if order.is_empty() {
                if dirty.is_empty() {
                    return Ok(text);
                }
                // Bare text has nowhere to carry the annotation
                let wrapper = dom.create_element_with(
                    "span",
                    vec![(DIRTY_ATTRIBUTE.to_string(), dirty)],
                );
                dom.append_child(wrapper, text)?;
                return Ok(wrapper);
            }
            let mut view = text;
            let count = order.len();
            for (depth, (name, attrs)) in order.into_iter().rev().enumerate() {
                // Only the outermost wrapper is annotated
                let outermost = depth + 1 == count;
                let attributes = annotated(attrs, if outermost { &dirty } else { "" });
                let wrapper = dom.create_element_with(marks.render_tag(name), attributes);
                dom.append_child(wrapper, view)?;
                view = wrapper;
            }
            Ok(view)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_debug_dump_annotates_dirtiness() {
        let mut tree = Tree::new();
        let marks = MarksRegistry::with_defaults();
        let p = tree.create_element("p");
        let plain = tree.create_text("a");
        let bold = tree.create_text("b");
        tree.add_mark(bold, "bold", Attributes::new()).unwrap();
        tree.append_children(p, [plain, bold]).unwrap();
        tree.clear_dirty_subtree(p);

        assert_eq!(
            to_debug_string(&tree, &marks, p).unwrap(),
            "<p>a<strong>b</strong></p>"
        );

        tree.insert_text(plain, 1, "!").unwrap();
        assert_eq!(
            to_debug_string(&tree, &marks, p).unwrap(),
            "<p __dirty=\"content\"><span __dirty=\"content\">a!</span><strong>b</strong></p>"
        );
        // Dumping leaves the flags alone
        assert!(tree.dirtiness(p).content);
    }
}
