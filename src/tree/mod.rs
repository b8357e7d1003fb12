//! The tree engine: pure data-structure logic for the task forest.
//!
//! No I/O happens here. Every operation takes and returns plain values, so
//! the whole module is usable from tests and from the sync engine without
//! side effects.

mod node;
pub mod ops;
pub mod seed;
pub mod validate;

pub use node::{AppState, Forest, TreeNode, TRASH_ID};
