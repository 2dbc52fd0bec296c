//! CLI command implementations

pub mod completions;
pub mod config;
pub mod init;
pub mod interactive;
pub mod list;
pub mod lookup;
pub mod map;
pub mod refresh;
pub mod register;
pub mod remove;
pub mod search;
pub mod show;
pub mod status;
