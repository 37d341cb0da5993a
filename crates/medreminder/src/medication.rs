//! Medication data model.
//!
//! This module defines the registry's stored record, [`MedicationEntry`], the
//! user-supplied [`MedicationDraft`] it is built from, and the small value
//! types they share.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationErrors, ValidationIssue};

/// Format used to parse and display dose times.
const DOSE_TIME_FORMAT: &str = "%H:%M";

/// Unique identifier of a medication within its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MedicationId(u64);

impl MedicationId {
    /// Wrap a raw id.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw numeric id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MedicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MedicationId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// A time of day at which one daily dose is due.
///
/// Serialized as an `HH:MM` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DoseTime(NaiveTime);

impl DoseTime {
    /// Build a dose time from hour and minute, or `None` if out of range.
    #[must_use]
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    /// Parse an `HH:MM` string. A single-digit hour is accepted.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        NaiveTime::parse_from_str(value.trim(), DOSE_TIME_FORMAT)
            .ok()
            .map(Self)
    }

    /// The time as a chrono value.
    #[must_use]
    pub fn as_naive_time(self) -> NaiveTime {
        self.0
    }

    /// Render as a 12-hour clock time, e.g. `8:00 PM`.
    #[must_use]
    pub fn to_12h_string(self) -> String {
        self.0.format("%-I:%M %p").to_string()
    }
}

impl fmt::Display for DoseTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DOSE_TIME_FORMAT))
    }
}

impl TryFrom<String> for DoseTime {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("'{value}' is not a valid HH:MM time"))
    }
}

impl From<DoseTime> for String {
    fn from(time: DoseTime) -> Self {
        time.to_string()
    }
}

/// Display colour of a medication, from a fixed eight-colour palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum PillColor {
    /// Blue.
    #[default]
    Blue,
    /// Green.
    Green,
    /// Purple.
    Purple,
    /// Orange.
    Orange,
    /// Red.
    Red,
    /// Indigo.
    Indigo,
    /// Pink.
    Pink,
    /// Teal.
    Teal,
}

impl fmt::Display for PillColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Purple => "purple",
            Self::Orange => "orange",
            Self::Red => "red",
            Self::Indigo => "indigo",
            Self::Pink => "pink",
            Self::Teal => "teal",
        };
        f.write_str(name)
    }
}

/// User input for a new medication: everything but the id and taken flags.
///
/// Dose times are kept as raw strings so registration can report every
/// malformed value at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MedicationDraft {
    /// Medication name, e.g. "Paracetamol".
    pub name: String,
    /// Dosage, e.g. "500mg".
    pub dosage: String,
    /// Human-readable frequency, e.g. "Twice Daily".
    #[serde(alias = "frequency")]
    pub frequency_label: String,
    /// Free-text instructions, e.g. "Take after meals".
    pub instructions: String,
    /// Display colour.
    pub color: PillColor,
    /// Raw `HH:MM` dose times, one per daily dose.
    #[serde(alias = "times")]
    pub dose_times: Vec<String>,
    /// First day the medication is taken.
    #[serde(alias = "start_date")]
    pub active_from: Option<NaiveDate>,
    /// Last day the medication is taken; open-ended when unset.
    #[serde(alias = "end_date")]
    pub active_until: Option<NaiveDate>,
}

impl MedicationDraft {
    /// Start a draft with a name and dosage.
    #[must_use]
    pub fn new(name: impl Into<String>, dosage: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dosage: dosage.into(),
            ..Self::default()
        }
    }

    /// Set the frequency label.
    #[must_use]
    pub fn frequency(mut self, label: impl Into<String>) -> Self {
        self.frequency_label = label.into();
        self
    }

    /// Set the instructions.
    #[must_use]
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    /// Set the display colour.
    #[must_use]
    pub fn color(mut self, color: PillColor) -> Self {
        self.color = color;
        self
    }

    /// Append a raw dose time.
    #[must_use]
    pub fn dose_time(mut self, time: impl Into<String>) -> Self {
        self.dose_times.push(time.into());
        self
    }

    /// Set the first active day.
    #[must_use]
    pub fn active_from(mut self, date: NaiveDate) -> Self {
        self.active_from = Some(date);
        self
    }

    /// Set the last active day.
    #[must_use]
    pub fn active_until(mut self, date: NaiveDate) -> Self {
        self.active_until = Some(date);
        self
    }

    /// Check the draft, collecting every problem rather than stopping at the first.
    ///
    /// Returns the parsed dose times and start date on success.
    fn validate(&self) -> std::result::Result<(Vec<DoseTime>, NaiveDate), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.dose_times.is_empty() {
            errors.push(ValidationIssue::EmptyDoseTimes);
        }

        let mut times = Vec::with_capacity(self.dose_times.len());
        for (index, raw) in self.dose_times.iter().enumerate() {
            match DoseTime::parse(raw) {
                Some(time) => times.push(time),
                None => errors.push(ValidationIssue::MalformedDoseTime {
                    index,
                    value: raw.clone(),
                }),
            }
        }

        match self.active_from {
            Some(from) if errors.is_empty() => Ok((times, from)),
            Some(_) => Err(errors),
            None => {
                errors.push(ValidationIssue::MissingStartDate);
                Err(errors)
            }
        }
    }
}

/// A registered medication.
///
/// `taken_flags` is always index-aligned with `dose_times`; every mutation
/// goes through methods that keep the two the same length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MedicationEntry {
    id: MedicationId,
    name: String,
    dosage: String,
    frequency_label: String,
    instructions: String,
    color: PillColor,
    dose_times: Vec<DoseTime>,
    active_from: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    active_until: Option<NaiveDate>,
    taken_flags: Vec<bool>,
}

impl MedicationEntry {
    /// Validate a draft and build an entry with all doses untaken.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Validation`] listing every failing field.
    pub(crate) fn from_draft(id: MedicationId, draft: MedicationDraft) -> Result<Self> {
        let (dose_times, active_from) = draft.validate()?;
        let taken_flags = vec![false; dose_times.len()];

        Ok(Self {
            id,
            name: draft.name,
            dosage: draft.dosage,
            frequency_label: draft.frequency_label,
            instructions: draft.instructions,
            color: draft.color,
            dose_times,
            active_from,
            active_until: draft.active_until,
            taken_flags,
        })
    }

    /// The entry's id.
    #[must_use]
    pub fn id(&self) -> MedicationId {
        self.id
    }

    /// Medication name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dosage.
    #[must_use]
    pub fn dosage(&self) -> &str {
        &self.dosage
    }

    /// Frequency label.
    #[must_use]
    pub fn frequency_label(&self) -> &str {
        &self.frequency_label
    }

    /// Instructions.
    #[must_use]
    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    /// Display colour.
    #[must_use]
    pub fn color(&self) -> PillColor {
        self.color
    }

    /// Dose times, in the order they were given.
    #[must_use]
    pub fn dose_times(&self) -> &[DoseTime] {
        &self.dose_times
    }

    /// First active day.
    #[must_use]
    pub fn active_from(&self) -> NaiveDate {
        self.active_from
    }

    /// Last active day, if bounded.
    #[must_use]
    pub fn active_until(&self) -> Option<NaiveDate> {
        self.active_until
    }

    /// Taken flags, index-aligned with [`dose_times`](Self::dose_times).
    #[must_use]
    pub fn taken_flags(&self) -> &[bool] {
        &self.taken_flags
    }

    /// Whether the dose at `index` is taken, or `None` if there is no such slot.
    #[must_use]
    pub fn is_taken(&self, index: usize) -> Option<bool> {
        self.taken_flags.get(index).copied()
    }

    /// Whether `date` falls inside the inclusive active range.
    #[must_use]
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        date >= self.active_from && self.active_until.map_or(true, |until| date <= until)
    }

    /// Mark the dose at `index` taken. Returns `false` if there is no such slot.
    pub(crate) fn mark_taken(&mut self, index: usize) -> bool {
        match self.taken_flags.get_mut(index) {
            Some(flag) => {
                *flag = true;
                true
            }
            None => false,
        }
    }

    /// Append a dose slot; its flag starts untaken.
    pub(crate) fn push_dose_time(&mut self, time: DoseTime) {
        self.dose_times.push(time);
        self.taken_flags.push(false);
    }

    /// Replace the time of an existing slot, keeping its flag.
    pub(crate) fn set_dose_time(
        &mut self,
        index: usize,
        time: DoseTime,
    ) -> std::result::Result<(), ValidationIssue> {
        let len = self.dose_times.len();
        let slot = self
            .dose_times
            .get_mut(index)
            .ok_or(ValidationIssue::DoseIndexOutOfRange { index, len })?;
        *slot = time;
        Ok(())
    }

    /// Remove a slot together with its flag. The last slot cannot be removed.
    pub(crate) fn remove_dose_time(
        &mut self,
        index: usize,
    ) -> std::result::Result<DoseTime, ValidationIssue> {
        let len = self.dose_times.len();
        if index >= len {
            return Err(ValidationIssue::DoseIndexOutOfRange { index, len });
        }
        if len == 1 {
            return Err(ValidationIssue::EmptyDoseTimes);
        }
        self.taken_flags.remove(index);
        Ok(self.dose_times.remove(index))
    }
}
