//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Cairn - declarative build-pipeline orchestrator.
#[derive(Debug, Parser)]
#[command(name = "cairn")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the pipeline file (overrides default cairn.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to project root (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run one or more targets with their dependencies
    Run(RunArgs),

    /// List declared targets
    List(ListArgs),

    /// Generate the CI workflow file from the pipeline
    Generate(GenerateArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `run` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RunArgs {
    /// Targets to run
    #[arg(required = true)]
    pub targets: Vec<String>,

    /// Bind a parameter (repeatable)
    #[arg(long = "param", value_name = "NAME=VALUE")]
    pub params: Vec<String>,

    /// Skip all dependencies, or only the named targets (comma-separated)
    #[arg(long, num_args = 0..=1, value_delimiter = ',', value_name = "TARGETS")]
    pub skip: Option<Vec<String>>,

    /// Branch name override for condition evaluation
    #[arg(long, value_name = "NAME")]
    pub branch: Option<String>,

    /// Execute independent targets concurrently
    #[arg(long)]
    pub parallel: bool,

    /// Maximum concurrent targets in parallel mode
    #[arg(long, default_value_t = 4, value_name = "N")]
    pub max_parallel: usize,

    /// Evaluate the plan without running actions
    #[arg(long)]
    pub dry_run: bool,

    /// Never prompt; unresolved parameters fail
    #[arg(long)]
    pub non_interactive: bool,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `list` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Include unlisted targets
    #[arg(long)]
    pub all: bool,
}

/// Arguments for the `generate` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct GenerateArgs {
    /// Verify the on-disk workflow matches a fresh generation
    #[arg(long)]
    pub check: bool,

    /// Output path (default .github/workflows/<name>.yml)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
