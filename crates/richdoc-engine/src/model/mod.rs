//! The document tree.
//!
//! ## Modules
//!
//! - **`node`**: node ids, node kinds and dirty flags
//! - **`tree`**: the arena that owns nodes and enforces single parenthood
//! - **`marks`**: inline marks and the registry mapping them to wrapper tags
//! - **`components`**: atomic inline components and their properties
//! - **`outline`**: serializable view of a subtree for debugging and snapshots

pub mod components;
pub mod marks;
pub mod node;
pub mod outline;
pub mod tree;

pub use components::{ComponentRegistry, ComponentSpec, Props, default_components};
pub use marks::{MarkSet, MarkSpec, MarksRegistry, TextProperty, default_specs};
pub use node::{Attributes, DirtyFlags, NodeData, NodeId, NodeKind};
pub use outline::{Outline, outline};
pub use tree::Tree;
