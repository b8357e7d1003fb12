//! Mutation and query operations on the task forest.
//!
//! Parent lookup is a full-tree recursive scan, an O(nodes) cost per
//! mutation that is acceptable at the forest sizes this app sees. Id
//! allocation recomputes `find_max_id` from scratch each time; two
//! independent sessions writing concurrently can therefore mint colliding
//! ids. That gap is inherited from the original design and left as-is.

use super::node::{Forest, TreeNode, TRASH_ID};

/// Maximum numeric id in the forest at any depth, or -1 if none exists.
///
/// Non-numeric ids (notably `"trash"`) are ignored.
#[must_use]
pub fn find_max_id(forest: &[TreeNode]) -> i64 {
    let mut max = -1;
    for node in forest {
        if let Ok(n) = node.id.parse::<i64>() {
            max = max.max(n);
        }
        max = max.max(find_max_id(&node.children));
    }
    max
}

/// Mint the id for the next new node: `find_max_id + 1`, stringified.
#[must_use]
pub fn next_id(forest: &[TreeNode]) -> String {
    (find_max_id(forest) + 1).to_string()
}

/// Find a node by id anywhere in the forest.
#[must_use]
pub fn find_node<'a>(forest: &'a [TreeNode], id: &str) -> Option<&'a TreeNode> {
    for node in forest {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_node(&node.children, id) {
            return Some(found);
        }
    }
    None
}

/// Mutable counterpart of [`find_node`].
pub fn find_node_mut<'a>(forest: &'a mut [TreeNode], id: &str) -> Option<&'a mut TreeNode> {
    for node in forest {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_node_mut(&mut node.children, id) {
            return Some(found);
        }
    }
    None
}

/// Whether any node in the forest carries the given id.
#[must_use]
pub fn contains_id(forest: &[TreeNode], id: &str) -> bool {
    find_node(forest, id).is_some()
}

/// Whether `id` names the trash root itself or any transitive descendant of
/// it.
///
/// Returns `false` for ids not present in the forest and when no trash root
/// exists.
#[must_use]
pub fn is_descendant_of_trash(forest: &[TreeNode], id: &str) -> bool {
    forest
        .iter()
        .find(|node| node.is_trash())
        .is_some_and(|trash| trash.id == id || contains_id(&trash.children, id))
}

/// Append `node` to the children of `parent_id`, wherever it sits.
///
/// Missing parents are a silent no-op (callers are expected to have
/// validated selection beforehand); the return value reports whether the
/// add actually happened, for callers that need to react.
pub fn add_node_under_parent(forest: &mut [TreeNode], parent_id: &str, node: TreeNode) -> bool {
    match find_node_mut(forest, parent_id) {
        Some(parent) => {
            parent.children.push(node);
            true
        }
        None => false,
    }
}

/// Insert `node` as a new root.
///
/// If a trash root exists at index > 0 the node goes immediately before it,
/// keeping trash last; with trash at index 0 or absent the node goes to the
/// front. New tasks always appear above the trash bin.
pub fn add_node_at_top_level(forest: &mut Forest, node: TreeNode) {
    match forest.iter().position(TreeNode::is_trash) {
        Some(trash_index) if trash_index > 0 => forest.insert(trash_index, node),
        _ => forest.insert(0, node),
    }
}

/// Add a new task, minting its id and placing it per the selection rule.
///
/// With no selection, or with the trash root or one of its descendants
/// selected, the task lands at top level before trash. Otherwise it nests
/// under the selected node. Returns the new id, or `None` when the selected
/// parent does not exist anywhere in the forest (the add is a no-op).
pub fn add_task(forest: &mut Forest, selected: Option<&str>, value: &str) -> Option<String> {
    let id = next_id(forest);
    let node = TreeNode::new(id.clone(), value);

    match selected {
        None => {
            add_node_at_top_level(forest, node);
            Some(id)
        }
        Some(sel) if sel == TRASH_ID || is_descendant_of_trash(forest, sel) => {
            add_node_at_top_level(forest, node);
            Some(id)
        }
        Some(sel) => add_node_under_parent(forest, sel, node).then_some(id),
    }
}

/// Toggle the completion state of a node. Returns `false` if the id is
/// unknown.
pub fn toggle_done(forest: &mut [TreeNode], id: &str) -> bool {
    match find_node_mut(forest, id) {
        Some(node) => {
            node.done = Some(!node.done_or_default());
            true
        }
        None => false,
    }
}

/// Replace the text of a node. Returns `false` if the id is unknown.
pub fn set_value(forest: &mut [TreeNode], id: &str, value: &str) -> bool {
    match find_node_mut(forest, id) {
        Some(node) => {
            node.value = value.to_string();
            true
        }
        None => false,
    }
}

/// Detach a node (with its whole subtree) from wherever it sits.
pub fn remove_node(forest: &mut Forest, id: &str) -> Option<TreeNode> {
    if let Some(index) = forest.iter().position(|node| node.id == id) {
        return Some(forest.remove(index));
    }
    for node in forest {
        if let Some(removed) = remove_node(&mut node.children, id) {
            return Some(removed);
        }
    }
    None
}

/// Re-parent a node under `new_parent_id`, keeping its subtree intact.
///
/// Refuses to move the trash root, a node under itself or one of its own
/// descendants, or to a parent that does not exist. Returns whether the
/// move happened.
pub fn move_node(forest: &mut Forest, id: &str, new_parent_id: &str) -> bool {
    if id == TRASH_ID || id == new_parent_id {
        return false;
    }
    let Some(subject) = find_node(forest, id) else {
        return false;
    };
    if contains_id(&subject.children, new_parent_id) {
        return false;
    }
    if !contains_id(forest, new_parent_id) {
        return false;
    }

    // Both ends verified above, so the detach cannot strand the subtree.
    match remove_node(forest, id) {
        Some(node) => add_node_under_parent(forest, new_parent_id, node),
        None => false,
    }
}

/// Move a node to the top level, before the trash root.
pub fn move_node_to_top_level(forest: &mut Forest, id: &str) -> bool {
    if id == TRASH_ID {
        return false;
    }
    match remove_node(forest, id) {
        Some(node) => {
            add_node_at_top_level(forest, node);
            true
        }
        None => false,
    }
}

/// Move a node into the trash subtree.
///
/// Returns `false` when the node is unknown, is the trash root itself, or
/// no trash root exists ("no trash" is a legal forest).
pub fn move_to_trash(forest: &mut Forest, id: &str) -> bool {
    if !contains_id(forest, id) || is_descendant_of_trash(forest, id) {
        return false;
    }
    move_node(forest, id, TRASH_ID)
}

/// Purge everything inside the trash root. Returns the number of direct
/// children discarded.
pub fn empty_trash(forest: &mut [TreeNode]) -> usize {
    match forest.iter_mut().find(|node| node.is_trash()) {
        Some(trash) => {
            let count = trash.children.len();
            trash.children.clear();
            count
        }
        None => 0,
    }
}
