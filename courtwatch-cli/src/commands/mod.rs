//! CLI subcommands.

pub mod common;
pub mod config;
pub mod distance;
pub mod monitor;
pub mod search;
