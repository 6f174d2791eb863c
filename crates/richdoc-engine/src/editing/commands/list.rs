use crate::editing::model::Model;
use crate::editing::mutator::Mutator;
use crate::editing::patch::Patch;
use crate::error::{ModelError, Result};
use crate::model::{NodeId, Tree};
use crate::position::Position;
use crate::range::Range;
use crate::selection::Selection;
use crate::walker::{FilterResult, TreeWalker};

const LIST_TAGS: &[&str] = &["ul", "ol"];

fn is_list(tree: &Tree, node: NodeId) -> bool {
    LIST_TAGS.iter().any(|tag| tree.has_tag(node, tag))
}

fn enclosing_item(tree: &Tree, node: NodeId) -> Option<NodeId> {
    tree.ancestors_or_self(node).find(|n| tree.has_tag(*n, "li"))
}

/// List items touched by the last range, in document order: the items
/// around both ends plus every item the range overlaps.
pub fn list_items_in_selection(tree: &Tree, selection: &Selection) -> Vec<NodeId> {
    let Some(range) = selection.last_range() else {
        return Vec::new();
    };
    let mut items: Vec<NodeId> = [range.start(), range.end()]
        .into_iter()
        .filter_map(|position| position.parent(tree).ok())
        .filter_map(|parent| enclosing_item(tree, parent))
        .collect();
    if !range.is_collapsed()
        && let Ok(walker) = TreeWalker::from_range(
            tree,
            range,
            |t: &Tree, n: NodeId| FilterResult::from(t.has_tag(n, "li")),
            false,
        )
    {
        items.extend(walker);
    }
    items.sort_by_cached_key(|item| tree.index_path(*item));
    items.dedup();
    items
}

/// Moves every selected list item's content out of its list, right after
/// the outermost list, followed by a `<br>`. Items after the lifted one stay
/// in a copy of the list structure placed after the lifted content.
pub fn remove_list(model: &mut Model, selection: &Selection) -> Result<Patch> {
    let items = list_items_in_selection(model.tree(), selection);
    model.change(|m| {
        let mut first_moved = None;
        for item in items.into_iter().rev() {
            if m.tree().root_of(item) != m.root() {
                continue;
            }
            first_moved = Some(lift_item(m, item)?);
        }
        match first_moved {
            Some(node) if m.tree().is_void(node) => {
                let before = Position::before_node(m.tree(), node)?;
                m.select_range(Range::collapsed_at(before));
            }
            Some(node) => m.collapse_on(node)?,
            None => {}
        }
        Ok(None)
    })
}

/// Lifts one item out; returns the first node placed after the list.
fn lift_item(m: &mut Mutator<'_>, item: NodeId) -> Result<NodeId> {
    let tree = m.tree_mut();
    let container = tree
        .ancestors(item)
        .filter(|n| is_list(tree, *n))
        .last()
        .ok_or(ModelError::NotInList)?;

    // Split every level between the item and the outermost list; what
    // follows the item moves into shallow copies that nest like the
    // originals.
    let mut current = item;
    let mut carry: Option<NodeId> = None;
    loop {
        let parent = tree.parent(current).ok_or(ModelError::NoParent(current))?;
        let index = tree
            .index_in_parent(current)
            .ok_or(ModelError::NoParent(current))?;
        let following = tree.children(parent)[index + 1..].to_vec();

        let copy = if following.is_empty() && carry.is_none() {
            None
        } else {
            let copy = tree.shallow_clone(parent)?;
            if let Some(lower) = carry {
                tree.add_child(copy, lower)?;
            }
            tree.append_children(copy, following)?;
            Some(copy)
        };

        if current == item || tree.children(current).is_empty() {
            tree.detach(current)?;
        }
        carry = copy;
        if parent == container {
            break;
        }
        current = parent;
    }

    let contents = tree.children(item).to_vec();
    let mut anchor = container;
    for node in &contents {
        tree.insert_after(anchor, *node)?;
        anchor = *node;
    }
    let br = tree.create_void("br");
    tree.insert_after(anchor, br)?;
    if let Some(rest) = carry {
        tree.insert_after(br, rest)?;
    }
    if tree.children(container).is_empty() {
        tree.detach(container)?;
    }
    Ok(contents.first().copied().unwrap_or(br))
}
