//! The built-in default forest.
//!
//! Used when a signed-in identity has no remote state yet. The seed is never
//! persisted immediately after loading, so a racing fetch cannot clobber an
//! as-yet-unseen remote copy.

use super::node::{Forest, TreeNode, TRASH_ID};

fn category(id: &str, value: &str, children: Vec<TreeNode>) -> TreeNode {
    TreeNode {
        id: id.to_string(),
        value: value.to_string(),
        done: Some(false),
        children,
    }
}

fn task(id: &str, value: &str, done: bool) -> TreeNode {
    TreeNode {
        id: id.to_string(),
        value: value.to_string(),
        done: Some(done),
        children: Vec::new(),
    }
}

/// Build the default seed forest shown to a fresh account.
///
/// A handful of starter categories plus the trash root in last position.
#[must_use]
pub fn seed_forest() -> Forest {
    vec![
        category(
            "0",
            "Do now",
            vec![
                task("1", "Call the dentist\n000-0000-0000", false),
                task("2", "Reply to the landlord's mail", true),
            ],
        ),
        category("3", "Do later", vec![task("4", "Plan the team dinner", false)]),
        category(
            "5",
            "Project",
            vec![
                category("6", "Thinking", vec![task("7", "Collect references", false)]),
                category("8", "In progress", vec![task("9", "Draft the proposal", false)]),
            ],
        ),
        category("10", "Notes", vec![task("11", "Oct 2 is D's birthday", false)]),
        category(
            "12",
            "Shopping list",
            vec![task("13", "Detergent", true), task("14", "Erasers", false)],
        ),
        TreeNode {
            id: TRASH_ID.to_string(),
            value: "Trash".to_string(),
            done: None,
            children: Vec::new(),
        },
    ]
}
