//! Command-line interface for tasktree.

pub mod args;
pub mod commands;
