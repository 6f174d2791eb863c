//! Inline formatting marks.
//!
//! Text nodes carry a [`MarkSet`]; the [`MarksRegistry`] knows which external
//! wrapper tags read as which mark and in what order marks nest when written.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use serde::Serialize;

use super::node::Attributes;

/// Attribute used to round-trip marks that have no registered spec.
pub const MARK_ATTRIBUTE: &str = "data-mark";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MarkSet(BTreeMap<String, Attributes>);

impl MarkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, attributes: Attributes) {
        self.0.insert(name.into(), attributes);
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.0.remove(name).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Attributes> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Attributes)> {
        self.0.iter().map(|(name, attrs)| (name.as_str(), attrs))
    }

    pub fn names(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The boolean text properties a selection can report on and toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextProperty {
    Bold,
    Italic,
    Underline,
    Strikethrough,
}

impl TextProperty {
    pub const ALL: [TextProperty; 4] = [
        TextProperty::Bold,
        TextProperty::Italic,
        TextProperty::Underline,
        TextProperty::Strikethrough,
    ];

    pub fn mark_name(self) -> &'static str {
        match self {
            TextProperty::Bold => "bold",
            TextProperty::Italic => "italic",
            TextProperty::Underline => "underline",
            TextProperty::Strikethrough => "strikethrough",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkSpec {
    pub name: String,
    /// Wrapper tags recognised when reading, lowercase.
    pub tags: Vec<String>,
    /// Higher priority marks nest closer to the root.
    pub priority: u32,
    /// Wrapper tag emitted when writing.
    pub render_tag: String,
}

impl MarkSpec {
    /// The first tag doubles as the render tag.
    pub fn new(name: impl Into<String>, tags: &[&str], priority: u32) -> Self {
        let tags: Vec<String> = tags.iter().map(|tag| tag.to_ascii_lowercase()).collect();
        let render_tag = tags.first().cloned().unwrap_or_else(|| "span".to_string());
        Self {
            name: name.into(),
            tags,
            priority,
            render_tag,
        }
    }

    pub fn with_render_tag(mut self, tag: impl Into<String>) -> Self {
        self.render_tag = tag.into().to_ascii_lowercase();
        self
    }
}

pub fn default_specs() -> Vec<MarkSpec> {
    vec![
        MarkSpec::new("bold", &["strong", "b"], 100),
        MarkSpec::new("italic", &["em", "i"], 200),
        MarkSpec::new("underline", &["u"], 300),
        MarkSpec::new("strikethrough", &["s", "del", "strike"], 400),
    ]
}

#[derive(Debug, Clone, Default)]
pub struct MarksRegistry {
    specs: Vec<MarkSpec>,
}

impl MarksRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_specs(specs: impl IntoIterator<Item = MarkSpec>) -> Self {
        let mut registry = Self::new();
        for spec in specs {
            registry.register(spec);
        }
        registry
    }

    pub fn with_defaults() -> Self {
        Self::with_specs(default_specs())
    }

    /// Registers a spec. Re-registering a name replaces the spec but keeps
    /// its original registration slot.
    pub fn register(&mut self, spec: MarkSpec) {
        match self.specs.iter_mut().find(|s| s.name == spec.name) {
            Some(existing) => *existing = spec,
            None => self.specs.push(spec),
        }
    }

    pub fn spec(&self, name: &str) -> Option<&MarkSpec> {
        self.specs.iter().find(|s| s.name == name)
    }

    pub fn spec_for_tag(&self, tag: &str) -> Option<&MarkSpec> {
        self.specs
            .iter()
            .find(|s| s.tags.iter().any(|t| t.eq_ignore_ascii_case(tag)))
    }

    pub fn specs(&self) -> &[MarkSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Orders the marks of a text node outermost first.
    ///
    /// Registered marks sort by descending priority, ties by registration
    /// order. Unregistered marks go innermost, by name.
    pub fn nesting_order<'a>(&self, marks: &'a MarkSet) -> Vec<(&'a str, &'a Attributes)> {
        let mut ordered: Vec<_> = marks.iter().collect();
        ordered.sort_by_key(|(name, _)| {
            match self.specs.iter().position(|s| s.name == *name) {
                Some(slot) => (0, Reverse(self.specs[slot].priority), slot, String::new()),
                None => (1, Reverse(0), 0, name.to_string()),
            }
        });
        ordered
    }

    /// Tag used to render a mark; unregistered marks render as `span`.
    pub fn render_tag(&self, name: &str) -> &str {
        self.spec(name).map(|s| s.render_tag.as_str()).unwrap_or("span")
    }
}
