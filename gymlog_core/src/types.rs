//! Core domain types for the workout log.
//!
//! This module defines the fundamental types used throughout the system:
//! - Exercises and their progression classification
//! - Program entries (week × day × exercise with a rep range)
//! - Workouts and logged sets
//! - History rows and the derived performance summary

use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Number of weeks in the periodized program
pub const PROGRAM_WEEKS: u8 = 12;

// ============================================================================
// Exercise Types
// ============================================================================

/// Opaque exercise identifier (a slug such as `back_squat`)
pub type ExerciseId = String;

/// Classification used only to pick the progression increment
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Legs and hip-dominant lifts (larger increment)
    LowerBody,
    /// Presses, pulls and arm work (smaller increment)
    UpperBody,
}

/// An exercise definition (e.g., "Back Squat")
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    pub id: ExerciseId,
    pub name: String,
    #[serde(default)]
    pub cue: Option<String>,
    #[serde(default)]
    pub classification: Option<Classification>,
}

// ============================================================================
// Program Types
// ============================================================================

/// Training day within a program week
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DayLabel {
    #[serde(rename = "Upper A")]
    UpperA,
    #[serde(rename = "Lower A")]
    LowerA,
    #[serde(rename = "Upper B")]
    UpperB,
    #[serde(rename = "Lower B")]
    LowerB,
}

impl DayLabel {
    /// All day labels in program order
    pub const ALL: [DayLabel; 4] = [
        DayLabel::UpperA,
        DayLabel::LowerA,
        DayLabel::UpperB,
        DayLabel::LowerB,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DayLabel::UpperA => "Upper A",
            DayLabel::LowerA => "Lower A",
            DayLabel::UpperB => "Upper B",
            DayLabel::LowerB => "Lower B",
        }
    }
}

impl fmt::Display for DayLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayLabel {
    type Err = Error;

    /// Accepts "Upper A", "upper-a", "upper_a" and "uppera"
    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "uppera" => Ok(DayLabel::UpperA),
            "lowera" => Ok(DayLabel::LowerA),
            "upperb" => Ok(DayLabel::UpperB),
            "lowerb" => Ok(DayLabel::LowerB),
            _ => Err(Error::Validation(format!(
                "Unknown day label '{}' (expected Upper A, Lower A, Upper B or Lower B)",
                s
            ))),
        }
    }
}

/// Prescribed repetition range for an exercise in a given week
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepRange {
    pub floor: u32,
    pub ceiling: u32,
}

impl RepRange {
    /// Create a rep range, rejecting `floor > ceiling`
    pub fn new(floor: u32, ceiling: u32) -> Result<Self> {
        let range = Self { floor, ceiling };
        range.validate()?;
        Ok(range)
    }

    /// Create a rep range, clamping the ceiling up to the floor if inverted
    pub fn normalized(floor: u32, ceiling: u32) -> Self {
        Self {
            floor,
            ceiling: ceiling.max(floor),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.floor > self.ceiling {
            return Err(Error::Validation(format!(
                "Rep floor {} is above rep ceiling {}",
                self.floor, self.ceiling
            )));
        }
        Ok(())
    }
}

impl fmt::Display for RepRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}–{}", self.floor, self.ceiling)
    }
}

/// One row of the periodized program
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProgramEntry {
    pub week: u8,
    pub day: DayLabel,
    pub exercise_id: ExerciseId,
    pub sets: u32,
    pub reps: RepRange,
}

impl ProgramEntry {
    /// Uniqueness key within the program
    pub fn key(&self) -> (u8, DayLabel, &str) {
        (self.week, self.day, self.exercise_id.as_str())
    }
}

/// A program entry joined with its exercise, as consumed by the tracker
#[derive(Clone, Debug, PartialEq)]
pub struct PlannedExercise {
    pub exercise_id: ExerciseId,
    pub name: String,
    pub cue: Option<String>,
    pub classification: Option<Classification>,
    pub sets: u32,
    pub reps: RepRange,
}

// ============================================================================
// Workout and Set Types
// ============================================================================

/// A logged training session (one per date + day label)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Workout {
    pub id: Uuid,
    pub date: NaiveDate,
    pub day: DayLabel,
}

impl Workout {
    pub fn new(date: NaiveDate, day: DayLabel) -> Self {
        Self {
            id: Uuid::now_v7(),
            date,
            day,
        }
    }
}

/// Identity of a set record: re-logging the same key replaces the record
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SetKey {
    pub workout_id: Uuid,
    pub exercise_id: ExerciseId,
    pub set_number: u32,
}

/// A persisted set (weight × reps) within a workout
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SetRecord {
    pub workout_id: Uuid,
    pub exercise_id: ExerciseId,
    pub set_number: u32,
    pub reps: u32,
    pub weight: f64,
    #[serde(default)]
    pub pr: bool,
}

impl SetRecord {
    pub fn key(&self) -> SetKey {
        SetKey {
            workout_id: self.workout_id,
            exercise_id: self.exercise_id.clone(),
            set_number: self.set_number,
        }
    }
}

/// A set requested for logging, before it is bound to a workout
#[derive(Clone, Debug, PartialEq)]
pub struct SetLog {
    pub exercise_id: ExerciseId,
    pub set_number: u32,
    pub weight: f64,
    pub reps: u32,
}

impl SetLog {
    /// Reject set number 0 and negative or non-finite weights
    pub fn validate(&self) -> Result<()> {
        if self.set_number == 0 {
            return Err(Error::Validation(format!(
                "Set numbers start at 1 (got 0 for {})",
                self.exercise_id
            )));
        }
        validate_weight(self.weight)
    }
}

/// Weights must be finite and non-negative
pub fn validate_weight(weight: f64) -> Result<()> {
    if !weight.is_finite() || weight < 0.0 {
        return Err(Error::Validation(format!("Invalid weight: {}", weight)));
    }
    Ok(())
}

// ============================================================================
// History Types
// ============================================================================

/// A historical set as returned by the store for one exercise
///
/// Reps and weight are optional: rows missing either are skipped by the
/// aggregate that needs them, not dropped entirely.
#[derive(Clone, Debug, PartialEq)]
pub struct HistorySet {
    pub session_id: Uuid,
    pub session_date: Option<NaiveDate>,
    pub set_number: u32,
    pub reps: Option<u32>,
    pub weight: Option<f64>,
}

impl HistorySet {
    /// Build the history view of a stored set joined with its workout
    pub fn from_record(record: &SetRecord, workout: Option<&Workout>) -> Self {
        Self {
            session_id: record.workout_id,
            session_date: workout.map(|w| w.date),
            set_number: record.set_number,
            reps: Some(record.reps),
            weight: Some(record.weight),
        }
    }
}

/// Compact view of an exercise's recent performance
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct PerformanceSummary {
    /// Heaviest weight of the most recent session, if it had weighted sets
    pub last_top_weight: Option<f64>,
    /// Every recorded set of the most recent session reached the rep ceiling
    pub met_ceiling: bool,
    /// Consecutive most-recent sessions entirely below the rep floor (0..=2)
    pub under_floor_streak: u8,
}

impl PerformanceSummary {
    /// Summary for an exercise with no history
    pub fn absent() -> Self {
        Self::default()
    }
}
