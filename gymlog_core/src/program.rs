//! The 12-week program: exercise catalog plus week × day prescriptions.
//!
//! The default program runs three 4-week phases over an Upper A / Lower A /
//! Upper B / Lower B split:
//! - Weeks 1–4: hypertrophy (main lifts 8–12, accessories 10–15)
//! - Weeks 5–8: strength-hypertrophy (main lifts 6–10, accessories 8–12)
//! - Weeks 9–12: strength (main lifts 4–8, accessories 8–12)

use crate::types::*;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Exercise catalog and program rows
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Program {
    #[serde(default)]
    pub exercises: BTreeMap<ExerciseId, Exercise>,
    #[serde(default)]
    pub entries: Vec<ProgramEntry>,
}

/// Cached default program - built once and reused across all operations
static DEFAULT_PROGRAM: Lazy<Program> = Lazy::new(build_default_program);

/// Get a reference to the cached default program
pub fn get_default_program() -> &'static Program {
    &DEFAULT_PROGRAM
}

impl Program {
    /// Insert or replace an exercise by id
    pub fn upsert_exercise(&mut self, exercise: Exercise) {
        self.exercises.insert(exercise.id.clone(), exercise);
    }

    /// Insert or replace a program entry keyed by (week, day, exercise)
    pub fn upsert_entry(&mut self, entry: ProgramEntry) {
        match self.entries.iter_mut().find(|e| e.key() == entry.key()) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// Merge another program into this one, replacing by key
    pub fn merge(&mut self, other: &Program) {
        for exercise in other.exercises.values() {
            self.upsert_exercise(exercise.clone());
        }
        for entry in &other.entries {
            self.upsert_entry(entry.clone());
        }
    }

    /// Program rows for one day joined with their exercises, in program order
    ///
    /// Rows whose exercise is missing from the catalog are skipped with a warning.
    pub fn planned(&self, week: u8, day: DayLabel) -> Vec<PlannedExercise> {
        self.entries
            .iter()
            .filter(|e| e.week == week && e.day == day)
            .filter_map(|entry| match self.exercises.get(&entry.exercise_id) {
                Some(exercise) => Some(PlannedExercise {
                    exercise_id: exercise.id.clone(),
                    name: exercise.name.clone(),
                    cue: exercise.cue.clone(),
                    classification: exercise.classification,
                    sets: entry.sets,
                    reps: entry.reps,
                }),
                None => {
                    tracing::warn!(
                        "Program row week {} {} references unknown exercise '{}'",
                        week,
                        day,
                        entry.exercise_id
                    );
                    None
                }
            })
            .collect()
    }

    /// Validate the program, returning every problem found
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (id, exercise) in &self.exercises {
            if id.is_empty() || exercise.id.is_empty() {
                errors.push("Exercise has empty ID".to_string());
            }
            if id != &exercise.id {
                errors.push(format!(
                    "Exercise key '{}' doesn't match exercise.id '{}'",
                    id, exercise.id
                ));
            }
            if exercise.name.is_empty() {
                errors.push(format!("Exercise '{}' has empty name", id));
            }
        }

        let mut seen = HashSet::new();
        for entry in &self.entries {
            let (week, day, exercise_id) = entry.key();
            if !seen.insert(entry.key()) {
                errors.push(format!(
                    "Duplicate program row: week {} {} '{}'",
                    week, day, exercise_id
                ));
            }
            if !(1..=PROGRAM_WEEKS).contains(&week) {
                errors.push(format!(
                    "Program row '{}' has week {} outside 1-{}",
                    exercise_id, week, PROGRAM_WEEKS
                ));
            }
            if !self.exercises.contains_key(exercise_id) {
                errors.push(format!(
                    "Program row week {} {} references non-existent exercise '{}'",
                    week, day, exercise_id
                ));
            }
            if entry.sets == 0 {
                errors.push(format!(
                    "Program row week {} {} '{}' has zero sets",
                    week, day, exercise_id
                ));
            }
            if entry.reps.floor > entry.reps.ceiling {
                errors.push(format!(
                    "Program row week {} {} '{}': rep floor {} > ceiling {}",
                    week, day, exercise_id, entry.reps.floor, entry.reps.ceiling
                ));
            }
        }

        errors
    }
}

// ============================================================================
// Default program
// ============================================================================

#[derive(Clone, Copy)]
enum Role {
    Main,
    Accessory,
}

fn exercise(
    id: &str,
    name: &str,
    cue: Option<&str>,
    classification: Classification,
) -> Exercise {
    Exercise {
        id: id.into(),
        name: name.into(),
        cue: cue.map(Into::into),
        classification: Some(classification),
    }
}

fn default_exercises() -> Vec<Exercise> {
    use Classification::{LowerBody, UpperBody};

    vec![
        // Press / back
        exercise("incline_db_press", "Incline Dumbbell Press", Some("Shoulder blades pinned, elbows ~45°"), UpperBody),
        exercise("cable_fly_high_low", "Cable Fly (high → low)", None, UpperBody),
        exercise("single_arm_cable_press", "Single-Arm Cable Press", Some("Stagger stance, no torso twist"), UpperBody),
        exercise("single_arm_db_row", "Single-Arm Dumbbell Row", Some("Pull the elbow to the hip"), UpperBody),
        exercise("db_lateral_raise", "Dumbbell Lateral Raise", Some("Lead with the elbows, stop at shoulder height"), UpperBody),
        exercise("triceps_pushdown", "Triceps Pushdown", None, UpperBody),
        exercise("flat_db_press", "Flat Dumbbell Bench Press", Some("Feet planted, controlled descent"), UpperBody),
        exercise("cable_fly_low_high", "Cable Fly (low → high)", None, UpperBody),
        exercise("incline_cable_press", "Incline Cable Press", None, UpperBody),
        exercise("seated_cable_row", "Seated Cable Row", Some("Chest tall, squeeze for a beat"), UpperBody),
        exercise("face_pull", "Face Pull", Some("Pull to the forehead, thumbs back"), UpperBody),
        exercise("db_shoulder_press", "Dumbbell Shoulder Press", None, UpperBody),
        exercise("db_biceps_curl", "Dumbbell Biceps Curl", None, UpperBody),
        // Legs / hip
        exercise("back_squat", "Back Squat", Some("Brace, sit between the hips, drive up"), LowerBody),
        exercise("romanian_deadlift", "Romanian Deadlift", Some("Hips back, soft knees, neutral spine"), LowerBody),
        exercise("bulgarian_split_squat", "Bulgarian Split Squat", Some("Front shin near vertical"), LowerBody),
        exercise("cable_pull_through", "Cable Pull-Through", None, LowerBody),
        exercise("calf_raise", "Calf Raise", Some("Full stretch, pause at the top"), LowerBody),
        exercise("cable_crunch", "Cable Crunch", None, LowerBody),
        exercise("deadlift", "Deadlift", Some("Bar over midfoot, push the floor away"), LowerBody),
        exercise("goblet_squat", "Front Squat / Goblet Squat", None, LowerBody),
        exercise("hip_thrust", "Hip Thrust", Some("Chin tucked, ribs down, full lockout"), LowerBody),
        exercise("reverse_lunge", "Reverse Lunge", None, LowerBody),
        exercise("cable_woodchop", "Cable Woodchop", None, LowerBody),
    ]
}

/// Exercise slots for each day of the split
fn day_slots(day: DayLabel) -> &'static [(&'static str, Role)] {
    use Role::{Accessory, Main};

    match day {
        DayLabel::UpperA => &[
            ("incline_db_press", Main),
            ("single_arm_db_row", Main),
            ("single_arm_cable_press", Accessory),
            ("cable_fly_high_low", Accessory),
            ("db_lateral_raise", Accessory),
            ("triceps_pushdown", Accessory),
        ],
        DayLabel::LowerA => &[
            ("back_squat", Main),
            ("romanian_deadlift", Main),
            ("bulgarian_split_squat", Accessory),
            ("cable_pull_through", Accessory),
            ("calf_raise", Accessory),
            ("cable_crunch", Accessory),
        ],
        DayLabel::UpperB => &[
            ("flat_db_press", Main),
            ("seated_cable_row", Main),
            ("db_shoulder_press", Main),
            ("incline_cable_press", Accessory),
            ("cable_fly_low_high", Accessory),
            ("face_pull", Accessory),
            ("db_biceps_curl", Accessory),
        ],
        DayLabel::LowerB => &[
            ("deadlift", Main),
            ("goblet_squat", Main),
            ("hip_thrust", Main),
            ("reverse_lunge", Accessory),
            ("cable_woodchop", Accessory),
        ],
    }
}

/// Sets and rep range for a slot in a given week
fn prescription(week: u8, role: Role) -> (u32, RepRange) {
    let phase = (week - 1) / 4;
    let (sets, floor, ceiling) = match (role, phase) {
        (Role::Main, 0) => (3, 8, 12),
        (Role::Main, 1) => (4, 6, 10),
        (Role::Main, _) => (4, 4, 8),
        (Role::Accessory, 0) => (3, 10, 15),
        (Role::Accessory, _) => (3, 8, 12),
    };
    (sets, RepRange::normalized(floor, ceiling))
}

/// Builds the default 12-week program
///
/// **Note**: For production use, prefer `get_default_program()` which returns a
/// cached reference.
pub fn build_default_program() -> Program {
    let mut program = Program::default();

    for exercise in default_exercises() {
        program.upsert_exercise(exercise);
    }

    for week in 1..=PROGRAM_WEEKS {
        for day in DayLabel::ALL {
            for &(exercise_id, role) in day_slots(day) {
                let (sets, reps) = prescription(week, role);
                program.entries.push(ProgramEntry {
                    week,
                    day,
                    exercise_id: exercise_id.into(),
                    sets,
                    reps,
                });
            }
        }
    }

    program
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_program_validates() {
        let program = build_default_program();
        let errors = program.validate();
        assert!(
            errors.is_empty(),
            "Default program has validation errors: {:?}",
            errors
        );
    }

    #[test]
    fn test_every_week_and_day_is_planned() {
        let program = get_default_program();
        for week in 1..=PROGRAM_WEEKS {
            for day in DayLabel::ALL {
                assert!(
                    !program.planned(week, day).is_empty(),
                    "No exercises for week {} {}",
                    week,
                    day
                );
            }
        }
    }

    #[test]
    fn test_phases_tighten_rep_ranges() {
        let program = get_default_program();
        let squat = |week| {
            program
                .planned(week, DayLabel::LowerA)
                .into_iter()
                .find(|p| p.exercise_id == "back_squat")
                .unwrap()
        };

        assert_eq!(squat(1).reps, RepRange { floor: 8, ceiling: 12 });
        assert_eq!(squat(6).reps, RepRange { floor: 6, ceiling: 10 });
        assert_eq!(squat(12).reps, RepRange { floor: 4, ceiling: 8 });
        assert_eq!(squat(12).sets, 4);
    }

    #[test]
    fn test_lower_days_use_lower_body_lifts() {
        let program = get_default_program();
        for day in [DayLabel::LowerA, DayLabel::LowerB] {
            for planned in program.planned(1, day) {
                assert_eq!(planned.classification, Some(Classification::LowerBody));
            }
        }
    }

    #[test]
    fn test_upsert_entry_replaces_by_key() {
        let mut program = build_default_program();
        let before = program.entries.len();

        program.upsert_entry(ProgramEntry {
            week: 1,
            day: DayLabel::LowerA,
            exercise_id: "back_squat".into(),
            sets: 5,
            reps: RepRange { floor: 5, ceiling: 5 },
        });

        assert_eq!(program.entries.len(), before);
        let squat = program
            .planned(1, DayLabel::LowerA)
            .into_iter()
            .find(|p| p.exercise_id == "back_squat")
            .unwrap();
        assert_eq!(squat.sets, 5);
    }

    #[test]
    fn test_validate_catches_problems() {
        let mut program = build_default_program();
        program.entries.push(ProgramEntry {
            week: 13,
            day: DayLabel::UpperA,
            exercise_id: "zercher_squat".into(),
            sets: 0,
            reps: RepRange { floor: 10, ceiling: 6 },
        });
        program.entries.push(program.entries[0].clone());

        let errors = program.validate();
        assert!(errors.iter().any(|e| e.contains("outside 1-12")));
        assert!(errors.iter().any(|e| e.contains("non-existent exercise")));
        assert!(errors.iter().any(|e| e.contains("zero sets")));
        assert!(errors.iter().any(|e| e.contains("rep floor 10 > ceiling 6")));
        assert!(errors.iter().any(|e| e.contains("Duplicate program row")));
    }
}
