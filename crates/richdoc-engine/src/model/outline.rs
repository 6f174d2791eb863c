use std::collections::BTreeMap;

use serde::Serialize;

use super::node::{NodeId, NodeKind};
use super::tree::Tree;

/// Serializable, id-free view of a subtree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outline {
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Outline>,
}

pub fn outline(tree: &Tree, id: NodeId) -> Option<Outline> {
    let kind = tree.kind(id).ok()?;
    let node = match kind {
        NodeKind::Element {
            tag,
            attributes,
            children,
        } => Outline {
            kind: "element",
            tag: Some(tag.clone()),
            text: None,
            marks: Vec::new(),
            attributes: attributes.clone(),
            children: children.iter().filter_map(|c| outline(tree, *c)).collect(),
        },
        NodeKind::Text { content, marks } => Outline {
            kind: "text",
            tag: None,
            text: Some(content.clone()),
            marks: marks.names().into_iter().map(str::to_string).collect(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        },
        NodeKind::Void { tag, attributes } => Outline {
            kind: "void",
            tag: Some(tag.clone()),
            text: None,
            marks: Vec::new(),
            attributes: attributes.clone(),
            children: Vec::new(),
        },
    };
    Some(node)
}

impl Outline {
    /// One line per node, indented two spaces per level.
    pub fn lines(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.push_lines(0, &mut out);
        out
    }

    fn push_lines(&self, depth: usize, out: &mut Vec<String>) {
        let indent = "  ".repeat(depth);
        let line = match (self.kind, &self.tag, &self.text) {
            ("text", _, Some(text)) if self.marks.is_empty() => format!("{indent}{text:?}"),
            ("text", _, Some(text)) => format!("{indent}{text:?} [{}]", self.marks.join(", ")),
            ("void", Some(tag), _) => format!("{indent}<{tag}/>"),
            (_, Some(tag), _) => format!("{indent}<{tag}>"),
            _ => format!("{indent}?"),
        };
        out.push(line);
        for child in &self.children {
            child.push_lines(depth + 1, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Attributes;

    #[test]
    fn test_outline_yaml() {
        let mut tree = Tree::new();
        let p = tree.create_element("p");
        let plain = tree.create_text("hello");
        let bold = tree.create_text("world");
        tree.add_mark(bold, "bold", Attributes::new()).unwrap();
        let br = tree.create_void("br");
        tree.append_children(p, [plain, bold, br]).unwrap();

        insta::assert_yaml_snapshot!(outline(&tree, p).unwrap(), @r"
        kind: element
        tag: p
        children:
          - kind: text
            text: hello
          - kind: text
            text: world
            marks:
              - bold
          - kind: void
            tag: br
        ");
    }

    #[test]
    fn test_outline_lines() {
        let mut tree = Tree::new();
        let ul = tree.create_element("ul");
        let li = tree.create_element("li");
        let text = tree.create_text("item");
        tree.add_child(li, text).unwrap();
        tree.add_child(ul, li).unwrap();

        let lines = outline(&tree, ul).unwrap().lines();
        assert_eq!(lines, vec!["<ul>", "  <li>", "    \"item\""]);
    }
}
