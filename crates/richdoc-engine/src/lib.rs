pub mod dom;
pub mod editing;
pub mod error;
pub mod model;
pub mod position;
pub mod range;
pub mod readers;
pub mod registry;
pub mod selection;
pub mod walker;
pub mod writers;

// Re-export key types for easier usage
pub use dom::{Dom, DomNodeId, DomPoint, DomSelection};
pub use editing::{Cmd, CommandError, Model, ModelOptions, Mutator, Patch, Snapshot};
pub use error::{ErrorKind, ModelError, Result};
pub use model::{
    Attributes, ComponentRegistry, ComponentSpec, MarkSpec, MarksRegistry, NodeId, NodeKind, Props,
    TextProperty, Tree,
};
pub use position::{IndexPath, Position, RelativePosition};
pub use range::Range;
pub use registry::{NodeView, ViewRegistry};
pub use selection::{PropertyState, Selection};
pub use walker::{FilterResult, TreeWalker};
