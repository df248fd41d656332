//! Persistence gateway used by the tracker.
//!
//! The core never talks to files directly; it goes through [`WorkoutStore`],
//! which is implemented by [`MemoryStore`] (tests, dry runs) and
//! [`crate::file_store::FileStore`] (program state file + set journal).

use crate::program::Program;
use crate::{
    DayLabel, HistorySet, PlannedExercise, Result, SetKey, SetRecord, Workout,
};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Storage operations needed by the tracker and its collaborators
pub trait WorkoutStore {
    /// All sets ever logged for an exercise, joined with their workout date.
    /// No ordering is guaranteed.
    fn list_sets_for_exercise(&self, exercise_id: &str) -> Result<Vec<HistorySet>>;

    /// Look up the workout for a date + day label without creating it
    fn find_workout(&self, date: NaiveDate, day: DayLabel) -> Result<Option<Workout>>;

    /// Return the workout for a date + day label, creating it on first use
    fn get_or_create_workout(&mut self, date: NaiveDate, day: DayLabel) -> Result<Workout>;

    /// Insert or replace a set keyed by (workout, exercise, set number)
    fn upsert_set(&mut self, record: SetRecord) -> Result<()>;

    /// Sets of one workout, ordered by exercise then set number
    fn list_sets_for_workout(&self, workout_id: Uuid) -> Result<Vec<SetRecord>>;

    /// Every logged set with its workout, for export
    fn all_sets(&self) -> Result<Vec<(Workout, SetRecord)>>;

    /// The current program (exercise catalog + rows)
    fn program(&self) -> Result<Program>;

    /// Replace the stored program
    fn save_program(&mut self, program: &Program) -> Result<()>;

    /// Program rows for a day joined with their exercises
    fn list_program_entries(&self, week: u8, day: DayLabel) -> Result<Vec<PlannedExercise>> {
        Ok(self.program()?.planned(week, day))
    }

    /// Load the program, modify it, and save it back
    fn update_program<F>(&mut self, f: F) -> Result<Program>
    where
        F: FnOnce(&mut Program) -> Result<()>,
        Self: Sized,
    {
        let mut program = self.program()?;
        f(&mut program)?;
        self.save_program(&program)?;
        Ok(program)
    }
}

/// Materialized view of workouts and sets with upsert semantics
///
/// Both stores keep their data in this shape; the file store rebuilds it by
/// replaying its journal.
#[derive(Clone, Debug, Default)]
pub struct Ledger {
    pub workouts: BTreeMap<Uuid, Workout>,
    pub sets: BTreeMap<SetKey, SetRecord>,
}

impl Ledger {
    /// Record a workout unless one already exists for its date + day
    ///
    /// Returns the workout that owns the (date, day) pair afterwards.
    pub fn insert_workout(&mut self, workout: Workout) -> Workout {
        if let Some(existing) = self.find_workout(workout.date, workout.day) {
            return existing.clone();
        }
        self.workouts.insert(workout.id, workout.clone());
        workout
    }

    pub fn upsert_set(&mut self, record: SetRecord) {
        self.sets.insert(record.key(), record);
    }

    pub fn find_workout(&self, date: NaiveDate, day: DayLabel) -> Option<&Workout> {
        self.workouts
            .values()
            .find(|w| w.date == date && w.day == day)
    }

    pub fn history_for(&self, exercise_id: &str) -> Vec<HistorySet> {
        self.sets
            .values()
            .filter(|s| s.exercise_id == exercise_id)
            .map(|s| HistorySet::from_record(s, self.workouts.get(&s.workout_id)))
            .collect()
    }

    pub fn sets_for_workout(&self, workout_id: Uuid) -> Vec<SetRecord> {
        // BTreeMap order is (workout, exercise, set number)
        self.sets
            .values()
            .filter(|s| s.workout_id == workout_id)
            .cloned()
            .collect()
    }

    /// Sets joined with their workouts; orphaned sets are skipped
    pub fn joined_sets(&self) -> Vec<(Workout, SetRecord)> {
        self.sets
            .values()
            .filter_map(|s| {
                self.workouts
                    .get(&s.workout_id)
                    .map(|w| (w.clone(), s.clone()))
            })
            .collect()
    }
}

/// In-memory store
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    ledger: Ledger,
    program: Program,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-loaded with a program
    pub fn with_program(program: Program) -> Self {
        Self {
            ledger: Ledger::default(),
            program,
        }
    }

    /// Number of set records held (one per key)
    pub fn set_count(&self) -> usize {
        self.ledger.sets.len()
    }
}

impl WorkoutStore for MemoryStore {
    fn list_sets_for_exercise(&self, exercise_id: &str) -> Result<Vec<HistorySet>> {
        Ok(self.ledger.history_for(exercise_id))
    }

    fn find_workout(&self, date: NaiveDate, day: DayLabel) -> Result<Option<Workout>> {
        Ok(self.ledger.find_workout(date, day).cloned())
    }

    fn get_or_create_workout(&mut self, date: NaiveDate, day: DayLabel) -> Result<Workout> {
        Ok(self.ledger.insert_workout(Workout::new(date, day)))
    }

    fn upsert_set(&mut self, record: SetRecord) -> Result<()> {
        self.ledger.upsert_set(record);
        Ok(())
    }

    fn list_sets_for_workout(&self, workout_id: Uuid) -> Result<Vec<SetRecord>> {
        Ok(self.ledger.sets_for_workout(workout_id))
    }

    fn all_sets(&self) -> Result<Vec<(Workout, SetRecord)>> {
        Ok(self.ledger.joined_sets())
    }

    fn program(&self) -> Result<Program> {
        Ok(self.program.clone())
    }

    fn save_program(&mut self, program: &Program) -> Result<()> {
        self.program = program.clone();
        Ok(())
    }
}
