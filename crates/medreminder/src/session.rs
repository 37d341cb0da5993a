//! One invocation's working state.
//!
//! A session pins the instant to evaluate at and builds the registry from the
//! sample medications and the configured import file. Nothing outlives it.

use chrono::NaiveDateTime;
use tracing::{debug, info};

use crate::clock::{parse_instant, Clock};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::import;
use crate::registry::MedicationRegistry;
use crate::samples;
use crate::schedule::ReminderKey;

/// The registry and evaluation time for one invocation.
#[derive(Debug, Clone)]
pub struct Session {
    registry: MedicationRegistry,
    now: NaiveDateTime,
}

impl Session {
    /// Resolve "now" and seed the registry.
    ///
    /// `at` overrides the clock; see [`parse_instant`] for accepted forms.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInstant`] if `at` cannot be parsed, or any
    /// error from reading or registering the import file.
    pub fn open(config: &Config, at: Option<&str>, clock: &dyn Clock) -> Result<Self> {
        let now = resolve_now(at, clock)?;
        let registry = build_registry(config, now)?;
        Ok(Self { registry, now })
    }

    /// Mark each key taken, in order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReminderNotFound`] for the first key that names no
    /// dose. Keys before it stay applied.
    pub fn mark_taken(&mut self, keys: &[ReminderKey]) -> Result<()> {
        for key in keys {
            self.registry.mark_taken(*key)?;
        }
        Ok(())
    }

    /// The session registry.
    #[must_use]
    pub fn registry(&self) -> &MedicationRegistry {
        &self.registry
    }

    /// Mutable access for commands that register or remove medications.
    pub fn registry_mut(&mut self) -> &mut MedicationRegistry {
        &mut self.registry
    }

    /// The instant this session evaluates at.
    #[must_use]
    pub fn now(&self) -> NaiveDateTime {
        self.now
    }
}

fn resolve_now(at: Option<&str>, clock: &dyn Clock) -> Result<NaiveDateTime> {
    match at {
        Some(value) => parse_instant(value, clock.today()).ok_or_else(|| Error::InvalidInstant {
            value: value.to_string(),
        }),
        None => Ok(clock.now()),
    }
}

fn build_registry(config: &Config, now: NaiveDateTime) -> Result<MedicationRegistry> {
    let mut registry = if config.registry.seed_samples {
        samples::sample_registry(now.date())?
    } else {
        MedicationRegistry::new()
    };

    if let Some(path) = &config.registry.import_path {
        let ids = import::import_drafts(&mut registry, path)?;
        info!(count = ids.len(), "Session registry includes imported medications");
    }

    debug!(medications = registry.len(), "Session registry ready");
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::medication::{MedicationDraft, MedicationId};
    use crate::schedule::{expand_schedule, ReminderStatus};
    use chrono::{NaiveDate, NaiveTime};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        today().and_time(NaiveTime::from_hms_opt(hour, minute, 0).unwrap())
    }

    fn empty_config() -> Config {
        let mut config = Config::default();
        config.registry.seed_samples = false;
        config
    }

    #[test]
    fn test_open_uses_clock_without_at() {
        let session = Session::open(&Config::default(), None, &FixedClock(at(7, 15))).unwrap();
        assert_eq!(session.now(), at(7, 15));
        assert_eq!(session.registry().len(), 3);
    }

    #[test]
    fn test_open_with_time_only_at() {
        let session =
            Session::open(&empty_config(), Some("21:00"), &FixedClock(at(7, 15))).unwrap();
        assert_eq!(session.now(), at(21, 0));
        assert!(session.registry().is_empty());
    }

    #[test]
    fn test_open_with_full_at() {
        let session = Session::open(
            &empty_config(),
            Some("2024-06-03T09:30"),
            &FixedClock(at(7, 15)),
        )
        .unwrap();
        assert_eq!(
            session.now(),
            NaiveDate::from_ymd_opt(2024, 6, 3)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_open_rejects_bad_at() {
        let err = Session::open(&empty_config(), Some("teatime"), &FixedClock(at(7, 15)))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInstant { ref value } if value == "teatime"));
    }

    #[test]
    fn test_samples_anchor_on_session_date() {
        let session =
            Session::open(&Config::default(), Some("2024-06-03T09:00"), &FixedClock(at(7, 15)))
                .unwrap();
        let first = session.registry().iter().next().unwrap();
        assert_eq!(first.active_from(), NaiveDate::from_ymd_opt(2024, 6, 3).unwrap());
    }

    #[test]
    fn test_mark_taken_unknown_key() {
        let mut session = Session::open(&Config::default(), None, &FixedClock(at(9, 0))).unwrap();
        let err = session
            .mark_taken(&[ReminderKey::new(MedicationId::new(9), 0)])
            .unwrap_err();
        assert!(matches!(err, Error::ReminderNotFound { .. }));
    }

    #[test]
    fn test_mark_taken_sample_dose() {
        let mut session = Session::open(&Config::default(), None, &FixedClock(at(21, 0))).unwrap();
        let key = ReminderKey::new(MedicationId::new(1), 1);
        session.mark_taken(&[key]).unwrap();

        let reminders = expand_schedule(session.registry(), session.now());
        let evening = reminders.iter().find(|r| r.key() == key).unwrap();
        assert_eq!(evening.status(), ReminderStatus::Taken);
    }

    #[test]
    fn test_take_dose_of_newly_added_medication() {
        let mut session = Session::open(&Config::default(), Some("09:00"), &FixedClock(at(7, 0)))
            .unwrap();
        let id = session
            .registry_mut()
            .register(
                MedicationDraft::new("X", "1")
                    .dose_time("08:00")
                    .active_from(today()),
            )
            .unwrap();
        assert_eq!(id, MedicationId::new(4));

        session.mark_taken(&[ReminderKey::new(id, 0)]).unwrap();

        let reminders = expand_schedule(session.registry(), session.now());
        let added = reminders.iter().find(|r| r.key().medication_id() == id).unwrap();
        assert_eq!(added.status(), ReminderStatus::Taken);
    }

    #[test]
    fn test_open_imports_configured_file() {
        let path = std::env::temp_dir().join(format!(
            "medreminder_session_{}_import.json",
            std::process::id()
        ));
        std::fs::write(
            &path,
            r#"[{"name": "Aspirin", "dosage": "75mg", "dose_times": ["08:00"], "active_from": "2024-06-01"}]"#,
        )
        .unwrap();

        let mut config = empty_config();
        config.registry.import_path = Some(path.clone());
        let session = Session::open(&config, None, &FixedClock(at(9, 0))).unwrap();

        assert_eq!(session.registry().len(), 1);
        assert_eq!(session.registry().iter().next().unwrap().name(), "Aspirin");

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_open_missing_import_file() {
        let mut config = empty_config();
        config.registry.import_path = Some("/nonexistent/medreminder/drafts.json".into());
        let err = Session::open(&config, None, &FixedClock(at(9, 0))).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
