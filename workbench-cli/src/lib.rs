//! Command-line entry point for the workbench server.

pub mod cli;
pub mod commands;

pub use cli::{AppName, Cli, Commands};
