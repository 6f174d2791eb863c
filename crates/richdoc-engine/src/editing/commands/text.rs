use crate::editing::model::Model;
use crate::editing::patch::Patch;
use crate::error::{ModelError, Result};
use crate::position::Position;
use crate::range::Range;
use crate::selection::Selection;
use crate::walker::{TreeWalker, accept_text_and_void};

/// Replaces the last range with `text` and leaves the caret after it.
pub fn insert_text(model: &mut Model, selection: &Selection, text: &str) -> Result<Patch> {
    let range = selection
        .last_range()
        .cloned()
        .ok_or(ModelError::MisbehavedSelection)?;
    model.change(|m| {
        let caret = m.delete_range(&range)?;
        let inserted = m.insert_text(&caret, text)?;
        m.select_range(Range::collapsed_at(inserted.end().clone()));
        Ok(None)
    })
}

/// Deletes the last range or, for a caret, the character or void right
/// before it, looking back across element boundaries.
pub fn delete_backward(model: &mut Model, selection: &Selection) -> Result<Patch> {
    let range = selection
        .last_range()
        .cloned()
        .ok_or(ModelError::MisbehavedSelection)?;
    model.change(|m| {
        if !range.is_collapsed() {
            m.delete_range(&range)?;
            return Ok(None);
        }

        let caret = range.start();
        let parent = caret.parent(m.tree())?;
        if m.tree().is_text(parent) && caret.parent_offset() > 0 {
            let previous = caret.shifted_by(m.tree(), -1)?;
            m.delete_range(&Range::new(previous, caret.clone())?)?;
            return Ok(None);
        }

        let start = Position::from_path(m.root(), vec![0]);
        let Ok(before) = Range::new(start, caret.clone()) else {
            return Ok(None);
        };
        let tree = m.tree();
        let leaf = TreeWalker::from_range(tree, &before, accept_text_and_void, true)?
            .find(|n| *n != parent && (tree.is_void(*n) || tree.node_len(*n) > 0));
        let Some(leaf) = leaf else {
            return Ok(None);
        };

        if m.tree().is_void(leaf) {
            let at = Position::before_node(m.tree(), leaf)?;
            m.remove(leaf)?;
            m.select_range(Range::collapsed_at(at));
        } else {
            let length = m.tree().node_len(leaf);
            let root = m.root();
            let last = Range::new(
                Position::from_parent(m.tree(), root, leaf, length - 1)?,
                Position::from_parent(m.tree(), root, leaf, length)?,
            )?;
            m.delete_range(&last)?;
        }
        Ok(None)
    })
}
