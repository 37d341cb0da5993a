//! In-memory medication registry.
//!
//! The registry is an explicit value owned by its caller and passed into the
//! schedule and adherence operations. Entries keep insertion order, which is
//! also the tie-break order of the schedule.

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::error::{Error, Result, ValidationErrors};
use crate::medication::{DoseTime, MedicationDraft, MedicationEntry, MedicationId};
use crate::schedule::ReminderKey;

/// Ordered collection of registered medications.
#[derive(Debug, Clone)]
pub struct MedicationRegistry {
    entries: Vec<MedicationEntry>,
    next_id: u64,
}

impl Default for MedicationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MedicationRegistry {
    /// Create an empty registry. The first registered entry gets id 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }

    /// Register a new medication.
    ///
    /// Assigns a fresh id, starts every dose untaken and appends the entry.
    /// The registry is left untouched if the draft is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the draft has no dose times, a
    /// malformed dose time, or no start date.
    pub fn register(&mut self, draft: MedicationDraft) -> Result<MedicationId> {
        let id = MedicationId::new(self.next_id);
        let name = draft.name.clone();

        let entry = MedicationEntry::from_draft(id, draft).inspect_err(|e| {
            warn!(medication = %name, error = %e, "Rejected medication draft");
        })?;

        debug!(
            %id,
            medication = %entry.name(),
            doses = entry.dose_times().len(),
            "Registered medication"
        );
        self.entries.push(entry);
        self.next_id += 1;
        Ok(id)
    }

    /// Mark one dose taken.
    ///
    /// Marking an already-taken dose is a no-op, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReminderNotFound`] if the key names no medication or
    /// no dose slot; nothing is modified in that case.
    pub fn mark_taken(&mut self, key: ReminderKey) -> Result<()> {
        let marked = self
            .find_mut(key.medication_id())
            .is_some_and(|entry| entry.mark_taken(key.dose_index()));

        if marked {
            debug!(%key, "Marked dose taken");
            Ok(())
        } else {
            warn!(%key, "Mark-taken on unknown reminder");
            Err(Error::ReminderNotFound { key })
        }
    }

    /// Delete a medication and return it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MedicationNotFound`] if no entry has this id.
    pub fn remove(&mut self, id: MedicationId) -> Result<MedicationEntry> {
        let position = self
            .entries
            .iter()
            .position(|entry| entry.id() == id)
            .ok_or(Error::MedicationNotFound { id })?;

        let entry = self.entries.remove(position);
        debug!(%id, medication = %entry.name(), "Removed medication");
        Ok(entry)
    }

    /// Append a dose time to a medication. The new dose starts untaken.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MedicationNotFound`] if no entry has this id.
    pub fn add_dose_time(&mut self, id: MedicationId, time: DoseTime) -> Result<()> {
        let entry = self.find_mut(id).ok_or(Error::MedicationNotFound { id })?;
        entry.push_dose_time(time);
        debug!(%id, %time, "Added dose time");
        Ok(())
    }

    /// Change the time of an existing dose slot, keeping its taken flag.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MedicationNotFound`] for an unknown id, or
    /// [`Error::Validation`] if `index` is out of range.
    pub fn update_dose_time(&mut self, id: MedicationId, index: usize, time: DoseTime) -> Result<()> {
        let entry = self.find_mut(id).ok_or(Error::MedicationNotFound { id })?;
        entry
            .set_dose_time(index, time)
            .map_err(|issue| Error::Validation(ValidationErrors::from(issue)))?;
        debug!(%id, index, %time, "Updated dose time");
        Ok(())
    }

    /// Remove a dose slot and its taken flag, returning the removed time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MedicationNotFound`] for an unknown id, or
    /// [`Error::Validation`] if `index` is out of range or the slot is the
    /// medication's last one.
    pub fn remove_dose_time(&mut self, id: MedicationId, index: usize) -> Result<DoseTime> {
        let entry = self.find_mut(id).ok_or(Error::MedicationNotFound { id })?;
        let time = entry
            .remove_dose_time(index)
            .map_err(|issue| Error::Validation(ValidationErrors::from(issue)))?;
        debug!(%id, index, %time, "Removed dose time");
        Ok(time)
    }

    /// Look up a medication by id.
    #[must_use]
    pub fn get(&self, id: MedicationId) -> Option<&MedicationEntry> {
        self.entries.iter().find(|entry| entry.id() == id)
    }

    /// Iterate over entries in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, MedicationEntry> {
        self.entries.iter()
    }

    /// Number of registered medications.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the registry holds no medications.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of medications active on `date`.
    #[must_use]
    pub fn active_count(&self, date: NaiveDate) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.is_active_on(date))
            .count()
    }

    fn find_mut(&mut self, id: MedicationId) -> Option<&mut MedicationEntry> {
        self.entries.iter_mut().find(|entry| entry.id() == id)
    }
}

impl<'a> IntoIterator for &'a MedicationRegistry {
    type Item = &'a MedicationEntry;
    type IntoIter = std::slice::Iter<'a, MedicationEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
