/*!
 * # Editing
 *
 * Everything that changes a document after it has been read.
 *
 * ## Change scopes
 *
 * The [`Model`] is the one context object an editing surface holds. All
 * edits go through [`Model::change`], which hands the callback a
 * [`Mutator`]. When the callback returns:
 *
 * 1. the version counter is bumped
 * 2. nodes no longer reachable from the root are collected
 * 3. the touched subtree is written back to the external tree
 * 4. the selection is re-materialised as an external selection
 *
 * Write-back is incremental: only nodes flagged dirty by the mutator get new
 * external views.
 *
 * ## Commands
 *
 * [`Cmd`] values bundle a precondition check and one change scope. They take
 * the current selection unless the caller passes an override.
 *
 * ## History
 *
 * Snapshots are explicit. Callers push one with [`Model::save_snapshot`]
 * before an edit they want to be able to undo, and pop it with
 * [`Model::restore_snapshot`] or [`Cmd::Undo`].
 *
 * ## Module Structure
 *
 * - **`model`**: `Model`, `ModelOptions`, read/write/change scopes
 * - **`mutator`**: tree and selection edits inside a change scope
 * - **`history`**: bounded snapshot stack
 * - **`table`**: row/column helpers for table structure
 * - **`commands`**: `Cmd` and its implementations
 * - **`patch`**: what a change scope reports back
 *
 * ## Usage Pattern
 *
 * ```rust
 * use richdoc_engine::editing::{Cmd, Model, ModelOptions};
 * use richdoc_engine::model::TextProperty;
 * use richdoc_engine::range::Range;
 *
 * let mut model = Model::from_markdown("Hello world", ModelOptions::default()).unwrap();
 * let root = model.root();
 *
 * // Select "world" and make it bold
 * model.select_range(Range::from_paths(root, vec![0, 0, 6], vec![0, 0, 11]).unwrap());
 * model.save_snapshot();
 * model
 *     .execute(Cmd::SetTextProperty { property: TextProperty::Bold, enabled: true }, None)
 *     .unwrap();
 * assert_eq!(model.to_html(), "<div><p>Hello <strong>world</strong></p></div>");
 *
 * // And back again
 * model.execute(Cmd::Undo, None).unwrap();
 * assert_eq!(model.to_html(), "<div><p>Hello world</p></div>");
 * ```
 */

pub mod commands;
pub mod history;
pub mod model;
pub mod mutator;
pub mod patch;
pub mod table;

pub use commands::{Cmd, CommandError};
pub use history::{History, Snapshot};
pub use model::{Model, ModelOptions};
pub use mutator::{Mutator, SelectionBookmark};
pub use patch::Patch;
