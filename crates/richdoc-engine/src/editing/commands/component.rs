use crate::editing::model::Model;
use crate::editing::patch::Patch;
use crate::error::{ModelError, Result};
use crate::model::Props;
use crate::selection::Selection;

/// Replaces the last range with a new `name` component.
pub fn insert_component(
    model: &mut Model,
    selection: &Selection,
    name: &str,
    props: &Props,
) -> Result<Patch> {
    let range = selection
        .last_range()
        .cloned()
        .ok_or(ModelError::MisbehavedSelection)?;
    let spec = model
        .components()
        .spec(name)
        .cloned()
        .ok_or_else(|| ModelError::UnknownComponent(name.to_string()))?;
    model.change(|m| {
        let caret = m.delete_range(&range)?;
        m.insert_component(&caret, &spec, props)?;
        Ok(None)
    })
}
