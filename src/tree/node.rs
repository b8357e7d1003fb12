use serde::{Deserialize, Serialize};

/// Reserved id of the trash root. A node is "in trash" iff it is this root
/// or a transitive descendant of it.
pub const TRASH_ID: &str = "trash";

/// A single task in the forest.
///
/// Ids are unique across the entire forest, not just among siblings. They
/// are minted as stringified integers, except for the reserved `"trash"`
/// root. `children` is always present; missing arrays in loaded payloads are
/// repaired on ingest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub id: String,
    pub value: String,
    /// Completion state. Organizational nodes (including the trash root) may
    /// carry no completion state at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,
    #[serde(default)]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Create a leaf task.
    #[must_use]
    pub fn new(id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
            done: Some(false),
            children: Vec::new(),
        }
    }

    /// Completion state, defaulting to `false` where a consumer needs one.
    #[must_use]
    pub fn done_or_default(&self) -> bool {
        self.done.unwrap_or(false)
    }

    /// Whether this node is the trash root.
    #[must_use]
    pub fn is_trash(&self) -> bool {
        self.id == TRASH_ID
    }
}

/// An ordered sequence of root nodes. Root order is display order and must
/// survive persistence round-trips.
pub type Forest = Vec<TreeNode>;

/// The complete persisted/exportable unit.
///
/// The sync point timestamp (`lastUpdated`) is carried out-of-band by the
/// transports and is deliberately not part of this payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub items: Forest,
    pub hide_done_items: bool,
    pub dark_mode: bool,
}

impl AppState {
    /// Create a state wrapping the given forest with default settings.
    #[must_use]
    pub const fn with_items(items: Forest) -> Self {
        Self {
            items,
            hide_done_items: false,
            dark_mode: false,
        }
    }
}
