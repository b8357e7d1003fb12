//! tasktree - a hierarchical task list kept in sync with a remote copy
//!
//! Two cooperating components: the tree engine ([`tree`]) owns the pure
//! forest algebra, and the sync engine ([`sync`]) reconciles it with a
//! remote persisted copy keyed by user identity, debouncing outgoing
//! writes and suppressing self-triggered echoes.

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod backup;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod storage;
pub mod sync;
pub mod tree;

pub use cli::args::{Cli, Commands, OutputFormat};
pub use error::TaskTreeError;
pub use tree::{AppState, Forest, TreeNode, TRASH_ID};
