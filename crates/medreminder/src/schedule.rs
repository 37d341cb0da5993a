//! Daily schedule expansion.
//!
//! Flattens each active medication's dose times into dated reminder
//! instances for "today" and classifies each one against the current time.
//! Instances borrow from the registry and are rebuilt on every call; nothing
//! here is cached, since the same registry yields different statuses as the
//! clock moves.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::trace;

use crate::error::Error;
use crate::medication::{DoseTime, MedicationEntry, MedicationId};
use crate::registry::MedicationRegistry;

/// Identifies one dose slot: a medication and an index into its dose times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ReminderKey {
    medication_id: MedicationId,
    dose_index: usize,
}

impl ReminderKey {
    /// Build a key.
    #[must_use]
    pub const fn new(medication_id: MedicationId, dose_index: usize) -> Self {
        Self {
            medication_id,
            dose_index,
        }
    }

    /// The medication this key refers to.
    #[must_use]
    pub const fn medication_id(self) -> MedicationId {
        self.medication_id
    }

    /// Position of the dose in the medication's dose times.
    #[must_use]
    pub const fn dose_index(self) -> usize {
        self.dose_index
    }
}

impl fmt::Display for ReminderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.medication_id, self.dose_index)
    }
}

impl FromStr for ReminderKey {
    type Err = Error;

    /// Parse `ID-INDEX` or `ID:INDEX`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidKey {
            value: s.to_string(),
        };

        let (id, index) = s.split_once(['-', ':']).ok_or_else(invalid)?;
        let id = id.parse::<MedicationId>().map_err(|_| invalid())?;
        let index = index.trim().parse::<usize>().map_err(|_| invalid())?;
        Ok(Self::new(id, index))
    }
}

/// Where a reminder stands relative to now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderStatus {
    /// The dose has been marked taken.
    Taken,
    /// The scheduled time has passed and the dose is not taken.
    Overdue,
    /// The scheduled time has not passed yet.
    Pending,
}

impl ReminderStatus {
    /// Classify a dose. Taken wins regardless of time; otherwise a dose is
    /// overdue only once `now` is strictly after its scheduled time.
    #[must_use]
    pub fn classify(taken: bool, scheduled_at: NaiveDateTime, now: NaiveDateTime) -> Self {
        if taken {
            Self::Taken
        } else if now > scheduled_at {
            Self::Overdue
        } else {
            Self::Pending
        }
    }
}

impl fmt::Display for ReminderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Taken => write!(f, "taken"),
            Self::Overdue => write!(f, "overdue"),
            Self::Pending => write!(f, "pending"),
        }
    }
}

/// One expected dose for today.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReminderInstance<'a> {
    key: ReminderKey,
    dose_time: DoseTime,
    scheduled_at: NaiveDateTime,
    status: ReminderStatus,
    medication: &'a MedicationEntry,
}

impl<'a> ReminderInstance<'a> {
    /// The dose slot this reminder stands for.
    #[must_use]
    pub fn key(&self) -> ReminderKey {
        self.key
    }

    /// The dose time this reminder was expanded from.
    #[must_use]
    pub fn dose_time(&self) -> DoseTime {
        self.dose_time
    }

    /// Today's date at the dose time.
    #[must_use]
    pub fn scheduled_at(&self) -> NaiveDateTime {
        self.scheduled_at
    }

    /// Taken, overdue or pending.
    #[must_use]
    pub fn status(&self) -> ReminderStatus {
        self.status
    }

    /// Shorthand for `status() == Taken`.
    #[must_use]
    pub fn is_taken(&self) -> bool {
        self.status == ReminderStatus::Taken
    }

    /// The medication this dose belongs to.
    #[must_use]
    pub fn medication(&self) -> &'a MedicationEntry {
        self.medication
    }
}

/// Expand the registry into today's reminders.
///
/// "Today" is the date of `now`. Only medications active on that date
/// contribute. The result is sorted by scheduled time; equal times keep
/// registry insertion order, then dose order.
#[must_use]
pub fn expand_schedule(registry: &MedicationRegistry, now: NaiveDateTime) -> Vec<ReminderInstance<'_>> {
    let today = now.date();

    let mut reminders: Vec<ReminderInstance<'_>> = registry
        .iter()
        .filter(|entry| entry.is_active_on(today))
        .flat_map(|entry| {
            entry
                .dose_times()
                .iter()
                .zip(entry.taken_flags())
                .enumerate()
                .map(move |(index, (&dose_time, &taken))| {
                    let scheduled_at = today.and_time(dose_time.as_naive_time());
                    ReminderInstance {
                        key: ReminderKey::new(entry.id(), index),
                        dose_time,
                        scheduled_at,
                        status: ReminderStatus::classify(taken, scheduled_at, now),
                        medication: entry,
                    }
                })
        })
        .collect();

    // Stable sort keeps insertion order for equal times.
    reminders.sort_by_key(ReminderInstance::scheduled_at);

    trace!(count = reminders.len(), %now, "Expanded schedule");
    reminders
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::medication::MedicationDraft;
    use chrono::{NaiveDate, NaiveTime};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        today().and_time(NaiveTime::from_hms_opt(hour, minute, 0).unwrap())
    }

    fn draft(name: &str, times: &[&str]) -> MedicationDraft {
        times
            .iter()
            .fold(MedicationDraft::new(name, "1 tab"), |d, t| d.dose_time(*t))
            .active_from(today())
    }

    /// One medication "A" at 08:00 and 20:00 with the first dose taken.
    fn create_scenario_registry() -> (MedicationRegistry, MedicationId) {
        let mut registry = MedicationRegistry::new();
        let id = registry.register(draft("A", &["08:00", "20:00"])).unwrap();
        registry.mark_taken(ReminderKey::new(id, 0)).unwrap();
        (registry, id)
    }

    #[test]
    fn test_key_display_and_parse() {
        let key = ReminderKey::new(MedicationId::new(3), 1);
        assert_eq!(key.to_string(), "3-1");
        assert_eq!("3-1".parse::<ReminderKey>().unwrap(), key);
        assert_eq!("3:1".parse::<ReminderKey>().unwrap(), key);
    }

    #[test]
    fn test_key_parse_rejects_garbage() {
        for bad in ["", "3", "a-1", "3-b", "3-", "-1", "3--1"] {
            assert!(
                matches!(bad.parse::<ReminderKey>(), Err(Error::InvalidKey { .. })),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn test_status_classify() {
        let scheduled = at(12, 0);
        assert_eq!(
            ReminderStatus::classify(true, scheduled, at(13, 0)),
            ReminderStatus::Taken
        );
        assert_eq!(
            ReminderStatus::classify(false, scheduled, at(13, 0)),
            ReminderStatus::Overdue
        );
        assert_eq!(
            ReminderStatus::classify(false, scheduled, at(11, 0)),
            ReminderStatus::Pending
        );
        assert_eq!(
            ReminderStatus::classify(false, scheduled, scheduled),
            ReminderStatus::Pending
        );
    }

    #[test]
    fn test_status_display() {
        assert_eq!(ReminderStatus::Taken.to_string(), "taken");
        assert_eq!(ReminderStatus::Overdue.to_string(), "overdue");
        assert_eq!(ReminderStatus::Pending.to_string(), "pending");
    }

    #[test]
    fn test_scenario_morning() {
        let (registry, id) = create_scenario_registry();
        let reminders = expand_schedule(&registry, at(9, 0));

        assert_eq!(reminders.len(), 2);
        assert_eq!(reminders[0].key(), ReminderKey::new(id, 0));
        assert_eq!(reminders[0].status(), ReminderStatus::Taken);
        assert_eq!(reminders[0].scheduled_at(), at(8, 0));
        assert_eq!(reminders[1].status(), ReminderStatus::Pending);
        assert_eq!(reminders[1].scheduled_at(), at(20, 0));
    }

    #[test]
    fn test_scenario_evening() {
        let (registry, _) = create_scenario_registry();
        let reminders = expand_schedule(&registry, at(21, 0));

        assert_eq!(reminders[0].status(), ReminderStatus::Taken);
        assert_eq!(reminders[1].status(), ReminderStatus::Overdue);
    }

    #[test]
    fn test_sorted_across_medications() {
        let mut registry = MedicationRegistry::new();
        registry.register(draft("A", &["20:00", "08:00"])).unwrap();
        registry.register(draft("B", &["14:00", "06:30"])).unwrap();

        let reminders = expand_schedule(&registry, at(0, 0));
        let times: Vec<_> = reminders.iter().map(ReminderInstance::scheduled_at).collect();

        assert_eq!(times, vec![at(6, 30), at(8, 0), at(14, 0), at(20, 0)]);
        assert!(times.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_ties_break_by_insertion_order() {
        let mut registry = MedicationRegistry::new();
        let first = registry.register(draft("First", &["08:00"])).unwrap();
        let second = registry.register(draft("Second", &["08:00"])).unwrap();
        let third = registry.register(draft("Third", &["07:00", "08:00"])).unwrap();

        let reminders = expand_schedule(&registry, at(0, 0));
        let keys: Vec<_> = reminders.iter().map(ReminderInstance::key).collect();

        assert_eq!(
            keys,
            vec![
                ReminderKey::new(third, 0),
                ReminderKey::new(first, 0),
                ReminderKey::new(second, 0),
                ReminderKey::new(third, 1),
            ]
        );
    }

    #[test]
    fn test_status_taken_iff_flag_set() {
        let mut registry = MedicationRegistry::new();
        let id = registry
            .register(draft("A", &["01:00", "12:00", "23:00"]))
            .unwrap();
        registry.mark_taken(ReminderKey::new(id, 1)).unwrap();

        for now in [at(0, 0), at(12, 30), at(23, 59)] {
            let reminders = expand_schedule(&registry, now);
            for reminder in &reminders {
                let flag = registry
                    .get(id)
                    .unwrap()
                    .is_taken(reminder.key().dose_index())
                    .unwrap();
                assert_eq!(reminder.is_taken(), flag);
            }
        }
    }

    #[test]
    fn test_future_start_contributes_nothing() {
        let mut registry = MedicationRegistry::new();
        registry
            .register(
                MedicationDraft::new("Later", "1")
                    .dose_time("08:00")
                    .active_from(today().succ_opt().unwrap()),
            )
            .unwrap();

        assert!(expand_schedule(&registry, at(9, 0)).is_empty());
    }

    #[test]
    fn test_expired_course_contributes_nothing() {
        let mut registry = MedicationRegistry::new();
        registry
            .register(
                MedicationDraft::new("Done", "1")
                    .dose_time("08:00")
                    .active_from(today().pred_opt().unwrap().pred_opt().unwrap())
                    .active_until(today().pred_opt().unwrap()),
            )
            .unwrap();

        assert!(expand_schedule(&registry, at(9, 0)).is_empty());
    }

    #[test]
    fn test_last_day_is_active() {
        let mut registry = MedicationRegistry::new();
        registry
            .register(draft("Ends today", &["08:00"]).active_until(today()))
            .unwrap();

        assert_eq!(expand_schedule(&registry, at(9, 0)).len(), 1);
    }

    #[test]
    fn test_empty_registry() {
        let registry = MedicationRegistry::new();
        assert!(expand_schedule(&registry, at(9, 0)).is_empty());
    }

    #[test]
    fn test_expansion_is_repeatable() {
        let (registry, _) = create_scenario_registry();
        let first = expand_schedule(&registry, at(9, 0));
        let second = expand_schedule(&registry, at(9, 0));
        assert_eq!(first, second);
    }

    #[test]
    fn test_instance_carries_dose_time() {
        let mut registry = MedicationRegistry::new();
        registry.register(draft("A", &["20:00", "08:00"])).unwrap();

        let reminders = expand_schedule(&registry, at(9, 0));
        for reminder in &reminders {
            let slot = reminder.medication().dose_times()[reminder.key().dose_index()];
            assert_eq!(reminder.dose_time(), slot);
            assert_eq!(reminder.scheduled_at().time(), slot.as_naive_time());
        }
        assert_eq!(reminders[0].dose_time().to_string(), "08:00");
    }

    #[test]
    fn test_instance_exposes_medication() {
        let (registry, id) = create_scenario_registry();
        let reminders = expand_schedule(&registry, at(9, 0));
        assert_eq!(reminders[0].medication().id(), id);
        assert_eq!(reminders[0].medication().name(), "A");
    }

    #[test]
    fn test_instance_serialize() {
        let (registry, _) = create_scenario_registry();
        let reminders = expand_schedule(&registry, at(9, 0));
        let json = serde_json::to_value(&reminders).unwrap();

        assert_eq!(json[0]["status"], "taken");
        assert_eq!(json[1]["status"], "pending");
        assert_eq!(json[1]["key"]["dose_index"], 1);
        assert_eq!(json[1]["dose_time"], "20:00");
        assert_eq!(json[1]["medication"]["name"], "A");
    }
}
