//! Demo medications.
//!
//! Three sample courses that make a fresh session show a non-empty
//! schedule. Date ranges are anchored on the day the registry is built.

use chrono::{Days, NaiveDate};

use crate::error::Result;
use crate::medication::{MedicationDraft, PillColor};
use crate::registry::MedicationRegistry;
use crate::schedule::ReminderKey;

struct Sample {
    name: &'static str,
    dosage: &'static str,
    frequency: &'static str,
    times: &'static [&'static str],
    course_days: u64,
    instructions: &'static str,
    color: PillColor,
    taken: &'static [bool],
}

const SAMPLES: &[Sample] = &[
    Sample {
        name: "Paracetamol",
        dosage: "500mg",
        frequency: "Twice Daily",
        times: &["08:00", "20:00"],
        course_days: 14,
        instructions: "Take after meals",
        color: PillColor::Blue,
        taken: &[true, false],
    },
    Sample {
        name: "Vitamin D3",
        dosage: "1000 IU",
        frequency: "Once Daily",
        times: &["09:00"],
        course_days: 60,
        instructions: "Take with breakfast",
        color: PillColor::Orange,
        taken: &[true],
    },
    Sample {
        name: "Metformin",
        dosage: "500mg",
        frequency: "Three times daily",
        times: &["08:00", "14:00", "20:00"],
        course_days: 365,
        instructions: "Take before meals",
        color: PillColor::Green,
        taken: &[true, true, false],
    },
];

/// Build a registry holding the sample medications, all starting on `today`.
///
/// # Errors
///
/// Returns an error only if a sample fails registration, which would be a bug.
pub fn sample_registry(today: NaiveDate) -> Result<MedicationRegistry> {
    let mut registry = MedicationRegistry::new();

    for sample in SAMPLES {
        let mut draft = MedicationDraft::new(sample.name, sample.dosage)
            .frequency(sample.frequency)
            .instructions(sample.instructions)
            .color(sample.color)
            .active_from(today);
        draft.dose_times = sample.times.iter().map(ToString::to_string).collect();
        draft.active_until = today.checked_add_days(Days::new(sample.course_days));

        let id = registry.register(draft)?;
        for (index, &taken) in sample.taken.iter().enumerate() {
            if taken {
                registry.mark_taken(ReminderKey::new(id, index))?;
            }
        }
    }

    Ok(registry)
}
