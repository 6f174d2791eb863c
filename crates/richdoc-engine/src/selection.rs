use serde::Serialize;

use crate::error::{ModelError, Result};
use crate::model::{NodeId, TextProperty, Tree};
use crate::position::Position;
use crate::range::Range;
use crate::walker::{TreeWalker, accept_text};

/// Aggregate state of a boolean text property over a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PropertyState {
    Enabled,
    Disabled,
    Unknown,
}

/// Ordered ranges plus a direction flag.
///
/// The anchor is where the user started selecting and the focus where they
/// are now; both live on the last range.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    ranges: Vec<Range>,
    right_to_left: bool,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_range(range: Range) -> Self {
        Self {
            ranges: vec![range],
            right_to_left: false,
        }
    }

    pub fn collapsed_at(position: Position) -> Self {
        Self::from_range(Range::collapsed_at(position))
    }

    pub fn ranges(&self) -> &[Range] {
        &self.ranges
    }

    pub fn last_range(&self) -> Option<&Range> {
        self.ranges.last()
    }

    pub fn set_ranges(&mut self, ranges: Vec<Range>) {
        self.ranges = ranges;
    }

    pub fn add_range(&mut self, range: Range) {
        self.ranges.push(range);
    }

    pub fn range_at(&self, index: usize) -> Option<&Range> {
        self.ranges.get(index)
    }

    pub fn select_range(&mut self, range: Range) {
        self.ranges = vec![range];
        self.right_to_left = false;
    }

    pub fn clear(&mut self) {
        self.ranges.clear();
        self.right_to_left = false;
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn is_right_to_left(&self) -> bool {
        self.right_to_left
    }

    pub fn set_right_to_left(&mut self, right_to_left: bool) {
        self.right_to_left = right_to_left;
    }

    pub fn anchor(&self) -> Option<&Position> {
        let range = self.ranges.last()?;
        Some(if self.right_to_left {
            range.end()
        } else {
            range.start()
        })
    }

    pub fn focus(&self) -> Option<&Position> {
        let range = self.ranges.last()?;
        Some(if self.right_to_left {
            range.start()
        } else {
            range.end()
        })
    }

    /// Anchor and focus, failing when there are no ranges.
    pub fn well_behaved(&self) -> Result<(Position, Position)> {
        match (self.anchor(), self.focus()) {
            (Some(anchor), Some(focus)) => Ok((anchor.clone(), focus.clone())),
            _ => Err(ModelError::MisbehavedSelection),
        }
    }

    /// Deepest position containing both ends of the last range.
    pub fn common_ancestor(&self) -> Option<Position> {
        self.ranges.last().map(Range::common_ancestor)
    }

    pub fn is_collapsed(&self) -> bool {
        self.ranges.last().is_some_and(Range::is_collapsed)
    }

    /// Moves the focus, keeping the anchor, and flips direction as needed.
    pub fn set_focus(&mut self, focus: Position) -> Result<()> {
        let anchor = self.anchor().cloned().unwrap_or_else(|| focus.clone());
        self.rebuild_last(anchor, focus)
    }

    /// Moves the anchor, keeping the focus.
    pub fn set_anchor(&mut self, anchor: Position) -> Result<()> {
        let focus = self.focus().cloned().unwrap_or_else(|| anchor.clone());
        self.rebuild_last(anchor, focus)
    }

    fn rebuild_last(&mut self, anchor: Position, focus: Position) -> Result<()> {
        let right_to_left = anchor.is_after(&focus)?;
        let range = Range::ordered(anchor, focus)?;
        match self.ranges.last_mut() {
            Some(last) => *last = range,
            None => self.ranges.push(range),
        }
        self.right_to_left = right_to_left;
        Ok(())
    }

    /// Collapses the last range onto its start (`to_left`) or its end.
    pub fn collapse(&mut self, to_left: bool) {
        if let Some(last) = self.ranges.last_mut() {
            let target = if to_left { last.start() } else { last.end() }.clone();
            *last = Range::collapsed_at(target);
            self.right_to_left = false;
        }
    }

    /// Places a caret at offset 0 inside `node`.
    pub fn collapse_on(&mut self, tree: &Tree, node: NodeId) -> Result<()> {
        let position = Position::from_parent(tree, tree.root_of(node), node, 0)?;
        self.select_range(Range::collapsed_at(position));
        Ok(())
    }

    /// Selects the whole content of `node`.
    pub fn select_node(&mut self, tree: &Tree, node: NodeId) -> Result<()> {
        self.select_range(Range::inside_node(tree, node)?);
        Ok(())
    }

    /// Whether every text node touched by the last range carries `property`.
    pub fn text_property_state(&self, tree: &Tree, property: TextProperty) -> PropertyState {
        let Some(range) = self.ranges.last() else {
            return PropertyState::Unknown;
        };
        let mark = property.mark_name();
        let state = |enabled: bool| {
            if enabled {
                PropertyState::Enabled
            } else {
                PropertyState::Disabled
            }
        };

        if range.is_collapsed() {
            return match range.start().parent(tree) {
                Ok(parent) if tree.is_text(parent) => state(tree.has_mark(parent, mark)),
                _ => PropertyState::Unknown,
            };
        }

        let Ok(walker) = TreeWalker::from_range(tree, range, accept_text, false) else {
            return PropertyState::Unknown;
        };
        let mut first: Option<bool> = None;
        for text in walker {
            // Texts the range only touches at an edge do not count
            let path = tree.index_path(text);
            let length = tree.node_len(text);
            let from = range.start().offset_within(&path).unwrap_or(0);
            let to = range.end().offset_within(&path).unwrap_or(length).min(length);
            if from >= to {
                continue;
            }
            let enabled = tree.has_mark(text, mark);
            match first {
                None => first = Some(enabled),
                Some(seen) if seen != enabled => return PropertyState::Unknown,
                Some(_) => {}
            }
        }
        state(first.unwrap_or(false))
    }

    pub fn bold(&self, tree: &Tree) -> PropertyState {
        self.text_property_state(tree, TextProperty::Bold)
    }

    pub fn italic(&self, tree: &Tree) -> PropertyState {
        self.text_property_state(tree, TextProperty::Italic)
    }

    pub fn underline(&self, tree: &Tree) -> PropertyState {
        self.text_property_state(tree, TextProperty::Underline)
    }

    pub fn strikethrough(&self, tree: &Tree) -> PropertyState {
        self.text_property_state(tree, TextProperty::Strikethrough)
    }
}
