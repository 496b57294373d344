//! Command-line interface for cairn.
//!
//! This module provides the CLI argument parsing using clap's derive
//! macros and the command implementations.
//!
//! # Architecture
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations behind a dispatcher

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, CompletionsArgs, GenerateArgs, ListArgs, RunArgs};
pub use commands::{Command, CommandDispatcher, CommandResult};
