//! Adherence figures over an expanded schedule.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::registry::MedicationRegistry;
use crate::schedule::{expand_schedule, ReminderInstance};

/// How many of a day's doses were taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AdherenceSummary {
    /// Number of reminders considered.
    pub total: usize,
    /// Number of those marked taken.
    pub taken_count: usize,
    /// `round(100 * taken_count / total)`, or 0 when there are no reminders.
    pub adherence_percent: u32,
}

impl AdherenceSummary {
    /// Summarize a set of reminders in a single pass.
    #[must_use]
    pub fn from_reminders(reminders: &[ReminderInstance<'_>]) -> Self {
        let taken_count = reminders.iter().filter(|r| r.is_taken()).count();
        Self::from_counts(taken_count, reminders.len())
    }

    /// Build a summary from raw counts.
    ///
    /// A zero total yields 0%. Halves round up, so 1 of 8 is 13%.
    #[must_use]
    pub fn from_counts(taken_count: usize, total: usize) -> Self {
        let adherence_percent = if total == 0 {
            0
        } else {
            let taken = taken_count.min(total) as u64;
            let total = total as u64;
            // Integer round-half-up of 100 * taken / total.
            u32::try_from((200 * taken + total) / (2 * total)).unwrap_or(100)
        };

        Self {
            total,
            taken_count,
            adherence_percent,
        }
    }

    /// Number of reminders not yet taken.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.taken_count)
    }
}

/// Headline figures for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayOverview {
    /// The day summarized.
    pub date: NaiveDate,
    /// Adherence over the day's reminders.
    pub adherence: AdherenceSummary,
    /// Medications active on `date`.
    pub active_medications: usize,
}

impl DayOverview {
    /// Expand the registry at `now` and summarize the result.
    #[must_use]
    pub fn compute(registry: &MedicationRegistry, now: NaiveDateTime) -> Self {
        let reminders = expand_schedule(registry, now);
        Self::from_reminders(registry, now.date(), &reminders)
    }

    /// Summarize reminders that were already expanded for `date`.
    #[must_use]
    pub fn from_reminders(
        registry: &MedicationRegistry,
        date: NaiveDate,
        reminders: &[ReminderInstance<'_>],
    ) -> Self {
        Self {
            date,
            adherence: AdherenceSummary::from_reminders(reminders),
            active_medications: registry.active_count(date),
        }
    }
}
