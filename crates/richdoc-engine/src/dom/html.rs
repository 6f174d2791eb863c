use super::{Dom, DomNodeId, DomNodeKind, is_void_tag};

/// Serializes a DOM subtree to HTML.
pub fn to_html(dom: &Dom, id: DomNodeId) -> String {
    let mut out = String::new();
    write_node(dom, id, &mut out);
    out
}

/// Serializes the children of `id` only.
pub fn inner_html(dom: &Dom, id: DomNodeId) -> String {
    let mut out = String::new();
    for child in dom.children(id) {
        write_node(dom, *child, &mut out);
    }
    out
}

fn write_node(dom: &Dom, id: DomNodeId, out: &mut String) {
    let Ok(node) = dom.node(id) else {
        return;
    };
    match node.kind() {
        DomNodeKind::Text(text) => out.push_str(&html_escape::encode_text(text)),
        DomNodeKind::Element {
            tag,
            attributes,
            children,
        } => {
            out.push('<');
            out.push_str(tag);
            for (name, value) in attributes {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&html_escape::encode_double_quoted_attribute(value));
                out.push('"');
            }
            out.push('>');
            if is_void_tag(tag) {
                return;
            }
            for child in children {
                write_node(dom, *child, out);
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::build::{el, el_with, text};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_escapes_text_and_attributes() {
        let mut dom = Dom::new();
        let root = dom.build(&el_with(
            "p",
            &[("title", "say \"hi\"")],
            vec![text("a < b & c"), el("br", vec![]), text("d")],
        ));
        assert_eq!(
            to_html(&dom, root),
            "<p title=\"say &quot;hi&quot;\">a &lt; b &amp; c<br>d</p>"
        );
        assert_eq!(inner_html(&dom, root), "a &lt; b &amp; c<br>d");
    }
}
