//! `medreminder` - daily medication schedule builder and adherence tracker
//!
//! This library keeps an in-memory registry of medications, expands it into
//! today's dose reminders, and reports how many of them were taken.
//!
//! ```
//! use chrono::NaiveDate;
//! use medreminder::{expand_schedule, AdherenceSummary, MedicationDraft, MedicationRegistry};
//!
//! let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
//! let mut registry = MedicationRegistry::new();
//! registry
//!     .register(
//!         MedicationDraft::new("Paracetamol", "500mg")
//!             .dose_time("08:00")
//!             .dose_time("20:00")
//!             .active_from(today),
//!     )
//!     .unwrap();
//!
//! let now = today.and_hms_opt(9, 0, 0).unwrap();
//! let reminders = expand_schedule(&registry, now);
//! assert_eq!(AdherenceSummary::from_reminders(&reminders).total, 2);
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod adherence;
pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod import;
pub mod logging;
pub mod medication;
pub mod registry;
pub mod samples;
pub mod schedule;
pub mod session;

pub use adherence::{AdherenceSummary, DayOverview};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use error::{Error, Result, ValidationErrors, ValidationIssue};
pub use logging::init_logging;
pub use medication::{DoseTime, MedicationDraft, MedicationEntry, MedicationId, PillColor};
pub use registry::MedicationRegistry;
pub use schedule::{expand_schedule, ReminderInstance, ReminderKey, ReminderStatus};
pub use session::Session;
