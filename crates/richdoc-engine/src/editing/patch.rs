use crate::dom::DomSelection;
use crate::model::NodeId;

/// Result of a change scope or command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// Model subtree that was written back; `None` when write-back was skipped
    pub written: Option<NodeId>,
    pub new_selection: DomSelection,
    pub version: u64,
}
