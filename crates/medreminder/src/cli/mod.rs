//! Command-line interface for medreminder.
//!
//! This module provides the CLI structure for the `medrem` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AddCommand, ConfigCommand, ListCommand, OutputFormat, RemoveCommand,
    ScheduleCommand, SessionArgs, StatsCommand,
};

use crate::logging::Verbosity;

/// medrem - Daily medication reminders and adherence tracking
///
/// Shows today's dose schedule, marks doses taken, and reports adherence.
/// The registry lives for one invocation only; start each session from the
/// sample medications, an import file, or both.
#[derive(Debug, Parser)]
#[command(name = "medrem")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors; command output is still printed
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show today's dose schedule
    Schedule(ScheduleCommand),

    /// Show taken/total, adherence and active medication count
    Stats(StatsCommand),

    /// List registered medications
    List(ListCommand),

    /// Register a medication for this session and show the new schedule
    Add(AddCommand),

    /// Remove a medication for this session
    Remove(RemoveCommand),

    /// View configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}
