//! Command-line interface for stickynotes.
//!
//! This module provides the CLI structure for the `stickies` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, DeleteCommand, ListCommand, NewCommand, OutputFormat, RunCommand, ShowCommand,
};

/// stickies - Sticky notes that remember where you left them
///
/// Runs the note orchestrator for a renderer, or inspects and edits the note
/// store directly.
#[derive(Debug, Parser)]
#[command(name = "stickies")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the orchestrator, speaking JSON lines on stdin/stdout
    Run(RunCommand),

    /// List all notes
    List(ListCommand),

    /// Show a single note
    Show(ShowCommand),

    /// Create a note without opening a window
    New(NewCommand),

    /// Delete a note
    Delete(DeleteCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
