//! Declarative DOM fragments, mostly for tests and fixtures.
//!
//! ```
//! use richdoc_engine::dom::{Dom, build::{el, text}};
//!
//! let mut dom = Dom::new();
//! let root = dom.build(&el("p", vec![text("hello "), el("b", vec![text("world")])]));
//! assert_eq!(dom.text_content(root), "hello world");
//! ```

use super::{Dom, DomNodeId, DomNodeKind};

#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
        children: Vec<Fragment>,
    },
    Text(String),
}

pub fn el(tag: &str, children: Vec<Fragment>) -> Fragment {
    el_with(tag, &[], children)
}

pub fn el_with(tag: &str, attributes: &[(&str, &str)], children: Vec<Fragment>) -> Fragment {
    Fragment::Element {
        tag: tag.to_string(),
        attributes: attributes
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        children,
    }
}

pub fn text(content: &str) -> Fragment {
    Fragment::Text(content.to_string())
}

impl Dom {
    /// Creates the nodes described by `fragment` and returns its root.
    pub fn build(&mut self, fragment: &Fragment) -> DomNodeId {
        match fragment {
            Fragment::Text(content) => self.create_text(content.clone()),
            Fragment::Element {
                tag,
                attributes,
                children,
            } => {
                let built: Vec<DomNodeId> = children.iter().map(|c| self.build(c)).collect();
                let id = self.insert(DomNodeKind::Element {
                    tag: tag.to_ascii_lowercase(),
                    attributes: attributes.clone(),
                    children: built.clone(),
                });
                for child in built {
                    if let Some(node) = self.nodes.get_mut(&child) {
                        node.parent = Some(id);
                    }
                }
                id
            }
        }
    }
}
