//! Table structure helpers.
//!
//! A table holds rows either directly or through `thead`/`tbody`/`tfoot`
//! sections; rows hold `td`/`th` cells. Rows may be ragged, so column
//! counts are taken from the widest row.

use crate::error::{ModelError, Result};
use crate::model::{NodeId, Tree};
use crate::selection::Selection;

const SECTION_TAGS: &[&str] = &["thead", "tbody", "tfoot"];
const CELL_TAGS: &[&str] = &["td", "th"];

fn has_any_tag(tree: &Tree, node: NodeId, tags: &[&str]) -> bool {
    tags.iter().any(|tag| tree.has_tag(node, tag))
}

pub fn is_cell(tree: &Tree, node: NodeId) -> bool {
    has_any_tag(tree, node, CELL_TAGS)
}

/// The cell containing `node`, if any.
pub fn enclosing_cell(tree: &Tree, node: NodeId) -> Option<NodeId> {
    tree.ancestors_or_self(node).find(|n| is_cell(tree, *n))
}

pub fn enclosing_table(tree: &Tree, node: NodeId) -> Option<NodeId> {
    tree.ancestors_or_self(node)
        .find(|n| tree.has_tag(*n, "table"))
}

/// The cell around the selection's anchor.
pub fn cell_from_selection(tree: &Tree, selection: &Selection) -> Result<NodeId> {
    let (anchor, _) = selection.well_behaved()?;
    let parent = anchor.parent(tree)?;
    enclosing_cell(tree, parent).ok_or(ModelError::NotInCell)
}

pub fn table_from_selection(tree: &Tree, selection: &Selection) -> Result<NodeId> {
    let (anchor, _) = selection.well_behaved()?;
    let parent = anchor.parent(tree)?;
    enclosing_table(tree, parent).ok_or(ModelError::NotInTable)
}

pub fn rows(tree: &Tree, table: NodeId) -> Vec<NodeId> {
    let mut rows = Vec::new();
    for child in tree.children(table) {
        if tree.has_tag(*child, "tr") {
            rows.push(*child);
        } else if has_any_tag(tree, *child, SECTION_TAGS) {
            rows.extend(
                tree.children(*child)
                    .iter()
                    .filter(|row| tree.has_tag(**row, "tr")),
            );
        }
    }
    rows
}

pub fn cells(tree: &Tree, row: NodeId) -> Vec<NodeId> {
    tree.children(row)
        .iter()
        .copied()
        .filter(|c| is_cell(tree, *c))
        .collect()
}

/// Column and row of `cell` inside `table`.
pub fn cell_index(tree: &Tree, table: NodeId, cell: NodeId) -> Result<(usize, usize)> {
    let row = tree.parent(cell).ok_or(ModelError::NoParent(cell))?;
    let y = rows(tree, table)
        .iter()
        .position(|r| *r == row)
        .ok_or(ModelError::NotInTable)?;
    let x = cells(tree, row)
        .iter()
        .position(|c| *c == cell)
        .ok_or(ModelError::NotInCell)?;
    Ok((x, y))
}

/// `(columns, rows)`.
pub fn dimensions(tree: &Tree, table: NodeId) -> (usize, usize) {
    let rows = rows(tree, table);
    let columns = rows
        .iter()
        .map(|row| cells(tree, *row).len())
        .max()
        .unwrap_or(0);
    (columns, rows.len())
}

pub fn cell_at(tree: &Tree, table: NodeId, x: usize, y: usize) -> Option<NodeId> {
    let row = *rows(tree, table).get(y)?;
    cells(tree, row).get(x).copied()
}

/// Inserts an empty row so that it ends up at row index `index`. The new
/// row goes into the same section as the row it is placed before (or
/// after, when appending) and has one `td` per column.
pub fn add_row(tree: &mut Tree, table: NodeId, index: usize) -> Result<NodeId> {
    let existing = rows(tree, table);
    if index > existing.len() {
        return Err(ModelError::OffsetOutOfRange {
            offset: index,
            length: existing.len(),
        });
    }
    let (columns, _) = dimensions(tree, table);

    let row = tree.create_element("tr");
    for _ in 0..columns.max(1) {
        let cell = tree.create_element("td");
        tree.add_child(row, cell)?;
    }

    match (existing.get(index), index.checked_sub(1).and_then(|i| existing.get(i))) {
        (Some(next), _) => tree.insert_before(*next, row)?,
        (None, Some(previous)) => tree.insert_after(*previous, row)?,
        (None, None) => tree.add_child(table, row)?,
    }
    Ok(row)
}

/// Removes the cell at column `x` from every row that has one.
pub fn remove_column(tree: &mut Tree, table: NodeId, x: usize) -> Result<()> {
    for row in rows(tree, table) {
        if let Some(cell) = cells(tree, row).get(x).copied() {
            tree.detach(cell)?;
        }
    }
    Ok(())
}
