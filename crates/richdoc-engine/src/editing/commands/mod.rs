//! Commands: edits driven by the current selection.
//!
//! Each command checks its preconditions, then performs all its mutations
//! inside one change scope. A command that is not executable fails with
//! [`CommandError::NotExecutable`] before anything is touched.

use thiserror::Error;

use super::model::Model;
use super::patch::Patch;
use crate::error::ModelError;
use crate::model::{Props, TextProperty};
use crate::selection::Selection;

mod component;
mod list;
mod table;
mod text;
mod text_property;

pub use list::list_items_in_selection;

/// Edit commands that can be applied to a [`Model`]
#[derive(Debug, Clone, PartialEq)]
pub enum Cmd {
    /// Lift the selected list items out of their list
    RemoveList,
    InsertTableRow { above: bool },
    RemoveTableColumn,
    SetTextProperty { property: TextProperty, enabled: bool },
    InsertText { text: String },
    /// Replace the selection with a new inline component
    InsertComponent { name: String, props: Props },
    /// Backspace
    DeleteBackward,
    Undo,
}

impl Cmd {
    pub fn name(&self) -> &'static str {
        match self {
            Cmd::RemoveList => "remove-list",
            Cmd::InsertTableRow { above: true } => "insert-table-row-above",
            Cmd::InsertTableRow { above: false } => "insert-table-row-below",
            Cmd::RemoveTableColumn => "remove-table-column",
            Cmd::SetTextProperty { enabled: true, .. } => "make-property",
            Cmd::SetTextProperty { enabled: false, .. } => "remove-property",
            Cmd::InsertText { .. } => "insert-text",
            Cmd::InsertComponent { .. } => "insert-component",
            Cmd::DeleteBackward => "delete-backward",
            Cmd::Undo => "undo",
        }
    }
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("command `{0}` cannot be executed")]
    NotExecutable(&'static str),
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl Model {
    /// Whether `cmd` may run against the current selection.
    pub fn can_execute(&self, cmd: &Cmd) -> bool {
        self.can_execute_on(cmd, self.selection())
    }

    fn can_execute_on(&self, cmd: &Cmd, selection: &Selection) -> bool {
        match cmd {
            Cmd::RemoveList => !list_items_in_selection(self.tree(), selection).is_empty(),
            // Table commands report a missing table or cell as an error
            Cmd::InsertTableRow { .. } | Cmd::RemoveTableColumn => true,
            Cmd::SetTextProperty { .. } | Cmd::InsertText { .. } | Cmd::DeleteBackward => {
                !selection.is_empty()
            }
            Cmd::InsertComponent { name, .. } => {
                !selection.is_empty() && self.components().spec(name).is_some()
            }
            Cmd::Undo => self.undo_depth() > 0,
        }
    }

    /// Runs `cmd` against `selection`, or the current selection when `None`.
    pub fn execute(&mut self, cmd: Cmd, selection: Option<Selection>) -> Result<Patch, CommandError> {
        let selection = selection.unwrap_or_else(|| self.selection().clone());
        if !self.can_execute_on(&cmd, &selection) {
            log::warn!("Command {} is not executable", cmd.name());
            return Err(CommandError::NotExecutable(cmd.name()));
        }
        log::debug!("Executing {}", cmd.name());

        let patch = match cmd {
            Cmd::RemoveList => list::remove_list(self, &selection)?,
            Cmd::InsertTableRow { above } => table::insert_table_row(self, &selection, above)?,
            Cmd::RemoveTableColumn => table::remove_table_column(self, &selection)?,
            Cmd::SetTextProperty { property, enabled } => {
                text_property::set_text_property(self, &selection, property, enabled)?
            }
            Cmd::InsertText { text } => text::insert_text(self, &selection, &text)?,
            Cmd::InsertComponent { name, props } => {
                component::insert_component(self, &selection, &name, &props)?
            }
            Cmd::DeleteBackward => text::delete_backward(self, &selection)?,
            Cmd::Undo => self
                .restore_snapshot(true)?
                .ok_or(CommandError::NotExecutable("undo"))?,
        };
        Ok(patch)
    }
}
