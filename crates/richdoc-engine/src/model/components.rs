//! Inline components.
//!
//! A component is an atomic inline node: a void node whose attributes carry
//! the component name and its properties serialized as a JSON object. The
//! external form is a non-editable element holding content rendered from the
//! properties. That content is output only and is never read back.
//!
//! Placeholders are a built-in component. Bare placeholder markup (an element
//! with the placeholder class and plain text inside) also reads as one.

use serde_json::{Map, Value};

use super::node::{Attributes, NodeId};
use super::tree::Tree;
use crate::error::{ModelError, Result};

pub const COMPONENT_ATTRIBUTE: &str = "data-component";
pub const PROPS_ATTRIBUTE: &str = "data-props";
/// Written on every component view and dropped again on read.
pub const EDITABLE_ATTRIBUTE: &str = "contenteditable";
pub const PLACEHOLDER: &str = "placeholder";
pub const PLACEHOLDER_CLASS: &str = "placeholder";

pub type Props = Map<String, Value>;

/// Produces the text shown inside a component's view.
pub type RenderFn = fn(&Props) -> String;

#[derive(Debug, Clone)]
pub struct ComponentSpec {
    pub name: String,
    /// Tag of the element the component renders as.
    pub tag: String,
    pub render: RenderFn,
}

impl ComponentSpec {
    pub fn new(name: impl Into<String>, tag: &str, render: RenderFn) -> Self {
        Self {
            name: name.into(),
            tag: tag.to_ascii_lowercase(),
            render,
        }
    }

    /// Attributes for a new node of this component.
    pub fn attributes(&self, props: &Props) -> Attributes {
        let mut attributes = Attributes::new();
        attributes.insert(COMPONENT_ATTRIBUTE.to_string(), self.name.clone());
        attributes.insert(PROPS_ATTRIBUTE.to_string(), serialize_props(props));
        attributes
    }
}

fn render_placeholder(props: &Props) -> String {
    props
        .get("text")
        .and_then(Value::as_str)
        .unwrap_or(PLACEHOLDER)
        .to_string()
}

fn render_counter(props: &Props) -> String {
    props.get("count").and_then(Value::as_i64).unwrap_or(0).to_string()
}

pub fn default_components() -> Vec<ComponentSpec> {
    vec![
        ComponentSpec::new(PLACEHOLDER, "span", render_placeholder),
        ComponentSpec::new("counter", "span", render_counter),
    ]
}

#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    specs: Vec<ComponentSpec>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_specs(specs: impl IntoIterator<Item = ComponentSpec>) -> Self {
        let mut registry = Self::new();
        for spec in specs {
            registry.register(spec);
        }
        registry
    }

    pub fn with_defaults() -> Self {
        Self::with_specs(default_components())
    }

    pub fn register(&mut self, spec: ComponentSpec) {
        match self.specs.iter_mut().find(|s| s.name == spec.name) {
            Some(existing) => *existing = spec,
            None => self.specs.push(spec),
        }
    }

    pub fn spec(&self, name: &str) -> Option<&ComponentSpec> {
        self.specs.iter().find(|s| s.name == name)
    }

    pub fn specs(&self) -> &[ComponentSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// The registered component `node` is an instance of.
    pub fn spec_for_node(&self, tree: &Tree, node: NodeId) -> Option<&ComponentSpec> {
        if !tree.is_void(node) {
            return None;
        }
        tree.attribute(node, COMPONENT_ATTRIBUTE)
            .and_then(|name| self.spec(name))
    }
}

pub fn serialize_props(props: &Props) -> String {
    Value::Object(props.clone()).to_string()
}

pub fn parse_props(raw: &str) -> std::result::Result<Props, String> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(props)) => Ok(props),
        Ok(other) => Err(format!("expected an object, found {other}")),
        Err(err) => Err(err.to_string()),
    }
}

/// Properties stored on a component node. No properties attribute means an
/// empty set.
pub fn component_props(tree: &Tree, node: NodeId) -> Result<Props> {
    tree.node(node)?;
    match tree.attribute(node, PROPS_ATTRIBUTE) {
        Some(raw) => parse_props(raw).map_err(|reason| ModelError::InvalidProps { node, reason }),
        None => Ok(Props::new()),
    }
}

pub fn set_component_props(tree: &mut Tree, node: NodeId, props: &Props) -> Result<()> {
    tree.set_attribute(node, PROPS_ATTRIBUTE, serialize_props(props))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn props(value: Value) -> Props {
        match value {
            Value::Object(props) => props,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_props_live_in_attributes() {
        let registry = ComponentRegistry::with_defaults();
        let spec = registry.spec("counter").unwrap();
        let mut tree = Tree::new();
        let node = tree.create_void_with(&spec.tag, spec.attributes(&props(json!({"count": 3}))));

        assert_eq!(tree.attribute(node, COMPONENT_ATTRIBUTE), Some("counter"));
        assert_eq!(tree.attribute(node, PROPS_ATTRIBUTE), Some(r#"{"count":3}"#));
        assert_eq!(registry.spec_for_node(&tree, node).unwrap().name, "counter");

        let props = component_props(&tree, node).unwrap();
        assert_eq!((spec.render)(&props), "3");
    }

    #[test]
    fn test_updating_props_flags_attributes() {
        let registry = ComponentRegistry::with_defaults();
        let spec = registry.spec(PLACEHOLDER).unwrap();
        let mut tree = Tree::new();
        let node = tree.create_void_with(&spec.tag, spec.attributes(&Props::new()));
        tree.clear_dirty(node);

        set_component_props(&mut tree, node, &props(json!({"text": "Name"}))).unwrap();

        assert!(tree.dirtiness(node).attributes);
        assert_eq!(
            (spec.render)(&component_props(&tree, node).unwrap()),
            "Name"
        );
    }

    #[test]
    fn test_malformed_props_are_reported() {
        let mut tree = Tree::new();
        let mut attributes = Attributes::new();
        attributes.insert(PROPS_ATTRIBUTE.to_string(), "[1, 2]".to_string());
        let node = tree.create_void_with("span", attributes);

        assert!(matches!(
            component_props(&tree, node),
            Err(ModelError::InvalidProps { node: n, .. }) if n == node
        ));
    }

    #[test]
    fn test_plain_voids_are_not_components() {
        let registry = ComponentRegistry::with_defaults();
        let mut tree = Tree::new();
        let br = tree.create_void("br");
        let unknown = ComponentSpec::new("unknown", "span", |_| String::new());
        let element = tree.create_element_with("span", unknown.attributes(&Props::new()));
        let unregistered = tree.create_void_with("span", unknown.attributes(&Props::new()));

        assert!(registry.spec_for_node(&tree, br).is_none());
        assert!(registry.spec_for_node(&tree, element).is_none());
        assert!(registry.spec_for_node(&tree, unregistered).is_none());
    }
}
