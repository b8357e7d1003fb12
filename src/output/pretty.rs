//! Human-readable output formatting for tasktree.

use colored::Colorize;

use crate::tree::{AppState, TreeNode};

/// Format the forest as an indented, colored listing.
///
/// Honors `hideDoneItems`: completed tasks (and their subtrees) are
/// omitted. The trash root is always shown, dimmed, with its content count.
#[must_use]
pub fn format_state_pretty(state: &AppState) -> String {
    let mut out = String::new();
    for node in &state.items {
        render_node(node, 0, state.hide_done_items, &mut out);
    }
    if out.is_empty() {
        out.push_str("(empty)\n");
    }
    out.trim_end().to_string()
}

fn render_node(node: &TreeNode, depth: usize, hide_done: bool, out: &mut String) {
    if hide_done && !node.is_trash() && node.done_or_default() {
        return;
    }

    let indent = "  ".repeat(depth);
    let label = first_line(&node.value);

    let line = if node.is_trash() {
        format!(
            "{indent}{} {}",
            label.dimmed(),
            format!("({} items)", node.children.len()).dimmed()
        )
    } else {
        let marker = match node.done {
            Some(true) => "[x]".green().to_string(),
            Some(false) => "[ ]".to_string(),
            None => "   ".to_string(),
        };
        let text = if node.done_or_default() {
            label.dimmed().strikethrough().to_string()
        } else {
            label.to_string()
        };
        format!("{indent}{marker} {text} {}", format!("#{}", node.id).dimmed())
    };
    out.push_str(&line);
    out.push('\n');

    // Trash content stays collapsed in the listing.
    if node.is_trash() {
        return;
    }
    for child in &node.children {
        render_node(child, depth + 1, hide_done, out);
    }
}

fn first_line(value: &str) -> &str {
    value.lines().next().unwrap_or("")
}
