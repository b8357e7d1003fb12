//! Configuration management for tasktree.
//!
//! This module handles loading and saving configuration from `~/.tasktree/`.

mod paths;
mod settings;

pub use paths::Paths;
pub use settings::{Config, GeneralConfig};
