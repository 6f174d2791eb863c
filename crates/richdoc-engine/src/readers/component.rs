use serde_json::Value;

use super::{ReaderContext, attributes_of};
use crate::dom::{Dom, DomNodeId};
use crate::error::Result;
use crate::model::components::{
    COMPONENT_ATTRIBUTE, EDITABLE_ATTRIBUTE, PLACEHOLDER, PROPS_ATTRIBUTE, Props, parse_props,
    serialize_props,
};
use crate::model::{ComponentSpec, NodeId};
use crate::registry::NodeView;

/// Reads a component element as a single void node. Rendered content inside
/// it is skipped.
pub fn read_component(
    dom: &Dom,
    node: DomNodeId,
    spec: &ComponentSpec,
    ctx: &mut ReaderContext<'_>,
) -> Result<Vec<NodeId>> {
    let mut attributes = attributes_of(dom, node);
    attributes.remove(EDITABLE_ATTRIBUTE);
    attributes.insert(COMPONENT_ATTRIBUTE.to_string(), spec.name.clone());

    if !attributes.contains_key(PROPS_ATTRIBUTE) {
        let mut props = Props::new();
        // Bare placeholder markup keeps its text as content
        if spec.name == PLACEHOLDER {
            props.insert("text".to_string(), Value::String(dom.text_content(node)));
        }
        attributes.insert(PROPS_ATTRIBUTE.to_string(), serialize_props(&props));
    }
    if let Some(Err(reason)) = attributes.get(PROPS_ATTRIBUTE).map(|raw| parse_props(raw)) {
        log::warn!("Component {} at {node} has unreadable properties: {reason}", spec.name);
    }

    let tag = dom.tag(node).unwrap_or(spec.tag.as_str());
    let component = ctx.tree.create_void_with(tag, attributes);
    ctx.register_node_view(component, NodeView::single(node));
    Ok(vec![component])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::build::{el, el_with, text};
    use crate::model::components::component_props;
    use crate::model::{ComponentRegistry, MarksRegistry, Tree, outline};
    use crate::readers::read_root;
    use crate::registry::ViewRegistry;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_component_reads_as_one_void() {
        let mut dom = Dom::new();
        let root = dom.build(&el(
            "p",
            vec![
                text("count: "),
                el_with(
                    "span",
                    &[
                        ("data-component", "counter"),
                        ("data-props", r#"{"count":2}"#),
                        ("contenteditable", "false"),
                    ],
                    vec![el("b", vec![text("2")])],
                ),
            ],
        ));
        let mut tree = Tree::new();
        let marks = MarksRegistry::with_defaults();
        let components = ComponentRegistry::with_defaults();
        let mut registry = ViewRegistry::new();
        let mut ctx =
            ReaderContext::new(&mut tree, &marks, &mut registry, true).with_components(&components);
        let p = read_root(&dom, root, &mut ctx).unwrap();

        assert_eq!(
            outline(&tree, p).unwrap().lines(),
            vec!["<p>", "  \"count: \"", "  <span/>"]
        );
        let counter = tree.children(p)[1];
        assert_eq!(tree.attribute(counter, "contenteditable"), None);
        assert_eq!(
            json!(component_props(&tree, counter).unwrap()),
            json!({"count": 2})
        );
        assert_eq!(
            registry.model_to_view(counter),
            Some(NodeView::single(dom.children(root)[1]))
        );
    }

    #[test]
    fn test_bare_placeholder_takes_its_text() {
        let mut dom = Dom::new();
        let root = dom.build(&el(
            "p",
            vec![el_with("span", &[("class", "placeholder")], vec![text("Name")])],
        ));
        let mut tree = Tree::new();
        let marks = MarksRegistry::with_defaults();
        let components = ComponentRegistry::with_defaults();
        let mut registry = ViewRegistry::new();
        let mut ctx =
            ReaderContext::new(&mut tree, &marks, &mut registry, true).with_components(&components);
        let p = read_root(&dom, root, &mut ctx).unwrap();

        let placeholder = tree.children(p)[0];
        assert!(tree.is_void(placeholder));
        assert_eq!(tree.attribute(placeholder, "data-component"), Some("placeholder"));
        assert_eq!(tree.attribute(placeholder, "class"), Some("placeholder"));
        assert_eq!(
            json!(component_props(&tree, placeholder).unwrap()),
            json!({"text": "Name"})
        );
    }

    #[test]
    fn test_without_registry_components_read_as_elements() {
        let mut dom = Dom::new();
        let root = dom.build(&el_with(
            "span",
            &[("data-component", "counter")],
            vec![text("1")],
        ));
        let mut tree = Tree::new();
        let marks = MarksRegistry::with_defaults();
        let mut registry = ViewRegistry::new();
        let mut ctx = ReaderContext::new(&mut tree, &marks, &mut registry, true);
        let span = read_root(&dom, root, &mut ctx).unwrap();

        assert!(tree.is_element(span));
        assert_eq!(tree.children(span).len(), 1);
    }
}
