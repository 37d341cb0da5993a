//! Error types for medreminder.
//!
//! This module defines all error types used throughout the medreminder crate.
//! Registry operations report exactly two domain failures, a missing
//! reminder or medication and a rejected draft; everything else comes from
//! the configuration and import plumbing around them.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::medication::MedicationId;
use crate::schedule::ReminderKey;

/// The main error type for medreminder operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Registry Errors ===
    /// Mark-taken was given a key that resolves to no medication or dose slot.
    #[error("no reminder {key} in the registry")]
    ReminderNotFound {
        /// The unresolvable `(medication, dose index)` key.
        key: ReminderKey,
    },

    /// No medication with the given id exists.
    #[error("no medication with id {id}")]
    MedicationNotFound {
        /// The unknown id.
        id: MedicationId,
    },

    /// A medication draft or edit was rejected.
    #[error("invalid medication: {0}")]
    Validation(ValidationErrors),

    /// A reminder key string could not be parsed.
    #[error("invalid reminder key '{value}': expected ID-INDEX or ID:INDEX")]
    InvalidKey {
        /// The offending input.
        value: String,
    },

    /// An evaluation time could not be parsed.
    #[error("invalid time '{value}': expected YYYY-MM-DDTHH:MM or HH:MM")]
    InvalidInstant {
        /// The offending input.
        value: String,
    },

    // === Import Errors ===
    /// A draft in an import file failed to register.
    #[error("draft #{index} in {path} rejected: {source}")]
    Import {
        /// Path of the import file.
        path: PathBuf,
        /// Zero-based position of the rejected draft.
        index: usize,
        /// Why it was rejected.
        #[source]
        source: Box<Error>,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// An explicitly requested configuration file does not exist.
    #[error("configuration file not found: {}", path.display())]
    ConfigNotFound {
        /// The missing file.
        path: PathBuf,
    },

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for medreminder operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl Error {
    /// The validation issues carried by this error, if it is a validation failure.
    #[must_use]
    pub fn validation_issues(&self) -> Option<&[ValidationIssue]> {
        match self {
            Self::Validation(errors) => Some(errors.issues()),
            _ => None,
        }
    }
}

/// A single reason a medication draft or edit was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    /// The draft has no dose times, or an edit would leave none.
    EmptyDoseTimes,
    /// A dose time is not a valid `HH:MM` value.
    MalformedDoseTime {
        /// Position of the bad value in the dose-time list.
        index: usize,
        /// The raw value as given.
        value: String,
    },
    /// The draft has no start date.
    MissingStartDate,
    /// An edit addressed a dose slot that does not exist.
    DoseIndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of dose slots the medication has.
        len: usize,
    },
}

impl ValidationIssue {
    /// Name of the field this issue concerns.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyDoseTimes | Self::MalformedDoseTime { .. } => "dose_times",
            Self::MissingStartDate => "active_from",
            Self::DoseIndexOutOfRange { .. } => "dose_index",
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = self.field();
        match self {
            Self::EmptyDoseTimes => write!(f, "{field}: at least one dose time is required"),
            Self::MalformedDoseTime { index, value } => {
                write!(f, "{field}[{index}]: '{value}' is not a valid HH:MM time")
            }
            Self::MissingStartDate => write!(f, "{field}: a start date is required"),
            Self::DoseIndexOutOfRange { index, len } => {
                write!(f, "{field}: {index} is out of range for {len} dose slot(s)")
            }
        }
    }
}

/// Every issue found while validating one draft or edit.
///
/// Never empty when carried by [`Error::Validation`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    issues: Vec<ValidationIssue>,
}

impl ValidationErrors {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an issue.
    pub fn push(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    /// The recorded issues, in the order they were found.
    #[must_use]
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// Check if no issues were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

}

impl From<ValidationIssue> for ValidationErrors {
    fn from(issue: ValidationIssue) -> Self {
        Self {
            issues: vec![issue],
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}
