//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};

use crate::medication::{MedicationDraft, MedicationId, PillColor};
use crate::schedule::ReminderKey;

/// Arguments shared by every command that works on the session registry.
#[derive(Debug, Clone, Default, Args)]
pub struct SessionArgs {
    /// Evaluate at this time instead of now ("2024-01-15T09:00" or "21:00")
    #[arg(long, value_name = "DATETIME")]
    pub at: Option<String>,

    /// Mark a dose taken before showing results (ID-INDEX, repeatable).
    /// With `add`, applied after the new medication is registered.
    #[arg(long = "taken", value_name = "KEY")]
    pub taken: Vec<ReminderKey>,
}

/// Schedule command arguments.
#[derive(Debug, Args)]
pub struct ScheduleCommand {
    /// Session options
    #[command(flatten)]
    pub session: SessionArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Stats command arguments.
#[derive(Debug, Args)]
pub struct StatsCommand {
    /// Session options
    #[command(flatten)]
    pub session: SessionArgs,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Session options
    #[command(flatten)]
    pub session: SessionArgs,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Add command arguments.
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Medication name
    #[arg(short, long)]
    pub name: String,

    /// Dosage, e.g. "500mg"
    #[arg(short, long)]
    pub dosage: String,

    /// Dose time as HH:MM (repeat for several doses a day)
    #[arg(short, long = "time", value_name = "HH:MM")]
    pub times: Vec<String>,

    /// First day of the course (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub from: Option<NaiveDate>,

    /// Last day of the course (YYYY-MM-DD); open-ended if omitted
    #[arg(long, value_name = "DATE")]
    pub until: Option<NaiveDate>,

    /// Frequency label, e.g. "Twice Daily"
    #[arg(long, default_value = "")]
    pub frequency: String,

    /// Instructions, e.g. "Take after meals"
    #[arg(short, long, default_value = "")]
    pub instructions: String,

    /// Display colour
    #[arg(long, value_enum, default_value_t)]
    pub color: PillColor,

    /// Session options
    #[command(flatten)]
    pub session: SessionArgs,
}

impl AddCommand {
    /// Build the draft this command describes.
    #[must_use]
    pub fn to_draft(&self) -> MedicationDraft {
        MedicationDraft {
            name: self.name.clone(),
            dosage: self.dosage.clone(),
            frequency_label: self.frequency.clone(),
            instructions: self.instructions.clone(),
            color: self.color,
            dose_times: self.times.clone(),
            active_from: self.from,
            active_until: self.until,
        }
    }
}

/// Remove command arguments.
#[derive(Debug, Args)]
pub struct RemoveCommand {
    /// Id of the medication to remove
    pub id: MedicationId,

    /// Session options
    #[command(flatten)]
    pub session: SessionArgs,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// Formatted table
    Table,
    /// JSON output
    Json,
}
