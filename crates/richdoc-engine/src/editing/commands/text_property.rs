use crate::editing::model::Model;
use crate::editing::patch::Patch;
use crate::error::{ModelError, Result};
use crate::model::{Attributes, TextProperty};
use crate::selection::Selection;

/// Applies or clears `property` over the last range. A collapsed range
/// changes nothing.
pub fn set_text_property(
    model: &mut Model,
    selection: &Selection,
    property: TextProperty,
    enabled: bool,
) -> Result<Patch> {
    let range = selection
        .last_range()
        .cloned()
        .ok_or(ModelError::MisbehavedSelection)?;
    model.change(|m| {
        m.select_range(range.clone());
        m.set_property(&range, property.mark_name(), Attributes::new(), enabled)?;
        Ok(None)
    })
}
