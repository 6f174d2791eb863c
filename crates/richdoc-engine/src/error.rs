use thiserror::Error;

use crate::dom::DomNodeId;
use crate::model::NodeId;
use crate::position::IndexPath;

/// Broad classification of a [`ModelError`].
///
/// Callers (editing shells, command dispatchers) usually only care about the
/// class of failure: addressing and selection problems are "the edit does
/// nothing", while `NotImplemented` means the model and serializers disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Addressing,
    Selection,
    MisbehavedSelection,
    Structural,
    NotImplemented,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("offset {offset} out of range for node of length {length}")]
    OffsetOutOfRange { offset: usize, length: usize },
    #[error("cannot compare positions with different roots")]
    DifferentRoots,
    #[error("range start lies after its end")]
    InvertedRange,
    #[error("path {0:?} does not address a node")]
    InvalidPath(IndexPath),

    #[error("invalid selection: {0}")]
    Selection(&'static str),
    #[error("selection has no anchor and focus")]
    MisbehavedSelection,

    #[error("unknown node {0}")]
    UnknownNode(NodeId),
    #[error("unknown external node {0}")]
    UnknownDomNode(DomNodeId),
    #[error("node {0} has no parent")]
    NoParent(NodeId),
    #[error("node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },
    #[error("external node {child} is not a child of {parent}")]
    DomNotAChild { parent: DomNodeId, child: DomNodeId },
    #[error("node {0} is not an element")]
    NotAnElement(NodeId),
    #[error("external node {0} is not an element")]
    DomNotAnElement(DomNodeId),
    #[error("node {0} is not a text node")]
    NotText(NodeId),
    #[error("cannot insert node {0} into its own subtree")]
    Cycle(NodeId),
    #[error("reading the external root did not produce a single element")]
    InvalidRoot,
    #[error("the selection is not inside a table")]
    NotInTable,
    #[error("the selection is not inside a cell")]
    NotInCell,
    #[error("the selection is not inside a list")]
    NotInList,
    #[error("no external node registered for {0}")]
    NoViewForNode(NodeId),
    #[error("external node {0} has no corresponding model node")]
    NoModelForView(DomNodeId),
    #[error("no component named {0:?} is registered")]
    UnknownComponent(String),
    #[error("invalid properties on component {node}: {reason}")]
    InvalidProps { node: NodeId, reason: String },

    #[error("not implemented: {0}")]
    NotImplemented(&'static str),
}

impl ModelError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ModelError::OffsetOutOfRange { .. }
            | ModelError::DifferentRoots
            | ModelError::InvertedRange
            | ModelError::InvalidPath(_) => ErrorKind::Addressing,
            ModelError::Selection(_) => ErrorKind::Selection,
            ModelError::MisbehavedSelection => ErrorKind::MisbehavedSelection,
            ModelError::NotImplemented(_) => ErrorKind::NotImplemented,
            _ => ErrorKind::Structural,
        }
    }
}

pub type Result<T> = std::result::Result<T, ModelError>;
