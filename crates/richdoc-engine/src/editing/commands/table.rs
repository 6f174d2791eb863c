use crate::editing::model::Model;
use crate::editing::patch::Patch;
use crate::editing::table::{
    add_row, cell_at, cell_from_selection, cell_index, dimensions, remove_column,
    table_from_selection,
};
use crate::error::Result;
use crate::position::Position;
use crate::range::Range;
use crate::selection::Selection;

pub fn insert_table_row(model: &mut Model, selection: &Selection, above: bool) -> Result<Patch> {
    let cell = cell_from_selection(model.tree(), selection)?;
    let table = table_from_selection(model.tree(), selection)?;
    let (_, y) = cell_index(model.tree(), table, cell)?;
    let index = if above { y } else { y + 1 };

    model.change(|m| {
        let bookmark = m.bookmark_selection();
        add_row(m.tree_mut(), table, index)?;
        if let Some(bookmark) = bookmark {
            m.restore_bookmark(&bookmark)?;
        }
        Ok(Some(table))
    })
}

/// Removes the selected cell's column and moves the caret into the cell to
/// its right, or to its left when it was the last column.
pub fn remove_table_column(model: &mut Model, selection: &Selection) -> Result<Patch> {
    let cell = cell_from_selection(model.tree(), selection)?;
    let table = table_from_selection(model.tree(), selection)?;
    let (x, y) = cell_index(model.tree(), table, cell)?;
    let (columns, _) = dimensions(model.tree(), table);

    model.change(|m| {
        if columns <= 1 {
            let before = Position::before_node(m.tree(), table)?;
            m.remove(table)?;
            m.select_range(Range::collapsed_at(before));
            return Ok(None);
        }

        let neighbour = if x + 1 < columns { x + 1 } else { x - 1 };
        let target = cell_at(m.tree(), table, neighbour, y);
        remove_column(m.tree_mut(), table, x)?;
        match target {
            Some(target) => m.collapse_on(target)?,
            None => m.selection_mut().clear(),
        }
        Ok(Some(table))
    })
}
