//! Structural operations over a field forest.
//!
//! Missing ids are never errors here: lookups return `None`, mutations
//! return `false` (or hand the node back) and leave the forest untouched.

use crate::field::{FieldId, FieldNode, Forest};

/// Where a node should land when dropped onto a container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlacementHint {
    pub parent_id: Option<FieldId>,
    /// Position among the parent's children; appends when absent.
    pub index: Option<usize>,
}

impl PlacementHint {
    pub fn into_parent(parent_id: FieldId, index: Option<usize>) -> Self {
        Self {
            parent_id: Some(parent_id),
            index,
        }
    }
}

/// Parent id (None for roots) and index within that parent's children.
pub type Location = (Option<FieldId>, usize);

pub fn find_by_id<'a>(forest: &'a [FieldNode], id: &FieldId) -> Option<&'a FieldNode> {
    for node in forest {
        if &node.id == id {
            return Some(node);
        }
        if let Some(found) = find_by_id(node.children(), id) {
            return Some(found);
        }
    }
    None
}

pub fn find_by_id_mut<'a>(forest: &'a mut [FieldNode], id: &FieldId) -> Option<&'a mut FieldNode> {
    for node in forest.iter_mut() {
        if &node.id == id {
            return Some(node);
        }
        if let Some(children) = node.children_mut() {
            if let Some(found) = find_by_id_mut(children, id) {
                return Some(found);
            }
        }
    }
    None
}

pub fn locate(forest: &[FieldNode], id: &FieldId) -> Option<Location> {
    fn walk(forest: &[FieldNode], parent: Option<&FieldId>, id: &FieldId) -> Option<Location> {
        for (idx, node) in forest.iter().enumerate() {
            if &node.id == id {
                return Some((parent.cloned(), idx));
            }
            if let Some(found) = walk(node.children(), Some(&node.id), id) {
                return Some(found);
            }
        }
        None
    }
    walk(forest, None, id)
}

/// Splice a node (and its subtree) out of the forest.
pub fn remove_by_id(forest: &mut Forest, id: &FieldId) -> Option<FieldNode> {
    if let Some(pos) = forest.iter().position(|n| &n.id == id) {
        let mut node = forest.remove(pos);
        node.parent_id = None;
        return Some(node);
    }
    for node in forest.iter_mut() {
        if let Some(children) = node.children_mut() {
            if let Some(found) = remove_by_id(children, id) {
                return Some(found);
            }
        }
    }
    None
}

/// Children list of `parent`, or the root list when `parent` is None.
/// None when the parent is missing or cannot hold children.
fn siblings_mut<'a>(forest: &'a mut Forest, parent: Option<&FieldId>) -> Option<&'a mut Forest> {
    match parent {
        None => Some(forest),
        Some(pid) => find_by_id_mut(forest, pid).and_then(|n| n.children_mut()),
    }
}

/// Insert `node` either into the hinted container or right after `after_id`.
///
/// With a hinted parent, the parent must exist and be a container. A hint
/// carrying only an index places the node at that root position. Otherwise
/// the node follows `after_id` at the same depth, or is appended at the
/// root when `after_id` is None. On failure the node is handed back.
pub fn insert_after(
    forest: &mut Forest,
    mut node: FieldNode,
    after_id: Option<&FieldId>,
    hint: Option<&PlacementHint>,
) -> Result<(), FieldNode> {
    if let Some(hint) = hint {
        if let Some(parent_id) = &hint.parent_id {
            let Some(children) = siblings_mut(forest, Some(parent_id)) else {
                return Err(node);
            };
            let at = hint.index.map_or(children.len(), |i| i.min(children.len()));
            node.parent_id = Some(parent_id.clone());
            children.insert(at, node);
            return Ok(());
        }
        if let Some(index) = hint.index {
            node.parent_id = None;
            forest.insert(index.min(forest.len()), node);
            return Ok(());
        }
    }

    let Some(after) = after_id else {
        node.parent_id = None;
        forest.push(node);
        return Ok(());
    };

    let Some((parent, pos)) = locate(forest, after) else {
        return Err(node);
    };
    let Some(siblings) = siblings_mut(forest, parent.as_ref()) else {
        return Err(node);
    };
    node.parent_id = parent;
    siblings.insert(pos + 1, node);
    Ok(())
}

/// Put a node back where `locate` found it before removal.
fn restore(forest: &mut Forest, mut node: FieldNode, origin: Location) {
    let (parent, index) = origin;
    match siblings_mut(forest, parent.as_ref()) {
        Some(siblings) => {
            node.parent_id = parent;
            let at = index.min(siblings.len());
            siblings.insert(at, node);
        }
        None => {
            node.parent_id = None;
            forest.push(node);
        }
    }
}

/// Re-parent `node_id` under `target_parent` (root when None) at a clamped
/// index.
pub fn move_to(
    forest: &mut Forest,
    node_id: &FieldId,
    target_parent: Option<&FieldId>,
    target_index: usize,
) -> bool {
    let Some(node) = find_by_id(forest, node_id) else {
        return false;
    };
    if let Some(target) = target_parent {
        // Moving a node into its own subtree would orphan it.
        if target == node_id || find_by_id(node.children(), target).is_some() {
            return false;
        }
        match find_by_id(forest, target) {
            Some(t) if t.is_container() => {}
            _ => return false,
        }
    }

    let Some(origin) = locate(forest, node_id) else {
        return false;
    };
    let Some(mut node) = remove_by_id(forest, node_id) else {
        return false;
    };
    match siblings_mut(forest, target_parent) {
        Some(siblings) => {
            node.parent_id = target_parent.cloned();
            let at = target_index.min(siblings.len());
            siblings.insert(at, node);
            true
        }
        None => {
            restore(forest, node, origin);
            false
        }
    }
}

/// Drag-over reorder: lift `active_id` and re-seat it after `over_id` (or
/// into the hinted container).
pub fn reorder_relative(
    forest: &mut Forest,
    active_id: &FieldId,
    over_id: &FieldId,
    hint: Option<&PlacementHint>,
) -> bool {
    if find_by_id(forest, active_id).is_none() || find_by_id(forest, over_id).is_none() {
        return false;
    }
    let Some(origin) = locate(forest, active_id) else {
        return false;
    };
    let Some(node) = remove_by_id(forest, active_id) else {
        return false;
    };
    match insert_after(forest, node, Some(over_id), hint) {
        Ok(()) => true,
        Err(node) => {
            restore(forest, node, origin);
            false
        }
    }
}

/// Pre-order list of every id in the forest.
pub fn collect_all_ids(forest: &[FieldNode]) -> Vec<FieldId> {
    let mut out = Vec::new();
    fn walk(forest: &[FieldNode], out: &mut Vec<FieldId>) {
        for node in forest {
            out.push(node.id.clone());
            walk(node.children(), out);
        }
    }
    walk(forest, &mut out);
    out
}

/// Return a forest where the node with `updated.id` is swapped for
/// `updated`. Untouched subtrees are moved across as-is.
///
/// The replacement inherits the original node's `parent_id`.
pub fn replace_by_id(forest: Forest, updated: FieldNode) -> Forest {
    let mut slot = Some(updated);
    replace_in(forest, &mut slot)
}

fn replace_in(forest: Forest, slot: &mut Option<FieldNode>) -> Forest {
    forest
        .into_iter()
        .map(|mut node| {
            match slot.take() {
                Some(mut replacement) if replacement.id == node.id => {
                    replacement.parent_id = node.parent_id.take();
                    replacement.adopt_children();
                    return replacement;
                }
                other => *slot = other,
            }
            if slot.is_some() {
                if let Some(children) = node.children_mut() {
                    let taken = std::mem::take(children);
                    *children = replace_in(taken, slot);
                }
            }
            node
        })
        .collect()
}

/// Node count of a subtree, the node included.
pub fn subtree_size(node: &FieldNode) -> usize {
    1 + node.children().iter().map(subtree_size).sum::<usize>()
}

/// Make every `parent_id` match containment. Returns how many were wrong.
pub fn relink_parents(forest: &mut Forest) -> usize {
    fn walk(forest: &mut [FieldNode], parent: Option<&FieldId>) -> usize {
        let mut fixed = 0;
        for node in forest.iter_mut() {
            if node.parent_id.as_ref() != parent {
                node.parent_id = parent.cloned();
                fixed += 1;
            }
            let id = node.id.clone();
            if let Some(children) = node.children_mut() {
                fixed += walk(children, Some(&id));
            }
        }
        fixed
    }
    walk(forest, None)
}
