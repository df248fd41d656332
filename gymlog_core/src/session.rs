//! Tracker: the entry point tying history, progression and PRs to a store.
//!
//! The tracker holds no state of its own besides the injected store and the
//! progression parameters. Every suggestion is recomputed from stored history.

use crate::config::ProgressionConfig;
use crate::progression::{self, Suggestion};
use crate::store::WorkoutStore;
use crate::types::validate_weight;
use crate::{
    history, records, Classification, DayLabel, Error, PerformanceSummary, PlannedExercise,
    RepRange, Result, SetLog, SetRecord, Workout, PROGRAM_WEEKS,
};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// One exercise of a training day with its computed suggestion
#[derive(Clone, Debug)]
pub struct DayPlanItem {
    pub exercise: PlannedExercise,
    pub summary: PerformanceSummary,
    pub suggestion: Option<Suggestion>,
}

/// Outcome of a successful session save
#[derive(Clone, Debug)]
pub struct SaveReport {
    pub workout: Workout,
    /// Saved records in the order they were written
    pub records: Vec<SetRecord>,
}

impl SaveReport {
    pub fn prs(&self) -> impl Iterator<Item = &SetRecord> {
        self.records.iter().filter(|r| r.pr)
    }
}

/// Progression tracker over a workout store
pub struct Tracker<S> {
    store: S,
    params: ProgressionConfig,
}

impl<S: WorkoutStore> Tracker<S> {
    pub fn new(store: S, params: ProgressionConfig) -> Self {
        Self { store, params }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Summarize an exercise's history and suggest its next working weight
    ///
    /// `Ok((_, None))` means there is nothing to progress from and the lifter
    /// has to choose a starting weight; it is not an error.
    pub fn summarize_and_suggest(
        &self,
        exercise_id: &str,
        classification: Option<Classification>,
        range: RepRange,
    ) -> Result<(PerformanceSummary, Option<Suggestion>)> {
        range.validate()?;

        let history = self.store.list_sets_for_exercise(exercise_id)?;
        let summary = history::summarize(&history, range);
        let suggestion = progression::suggest(classification, range, &summary, &self.params);

        Ok((summary, suggestion))
    }

    /// Would `(weight, reps)` be a personal record for this exercise?
    pub fn check_pr(&self, exercise_id: &str, weight: f64, reps: u32) -> Result<bool> {
        self.check_pr_excluding(exercise_id, weight, reps, None)
    }

    /// PR check as of set `n` of a workout being saved
    ///
    /// Stored sets of that workout numbered `n` or higher are ignored: they
    /// are either the set about to be overwritten or later sets from a
    /// previous save of the same session, which are re-saved after this one.
    fn check_pr_excluding(
        &self,
        exercise_id: &str,
        weight: f64,
        reps: u32,
        saving: Option<(Uuid, u32)>,
    ) -> Result<bool> {
        validate_weight(weight)?;

        let mut prior = self.store.list_sets_for_exercise(exercise_id)?;
        if let Some((workout_id, set_number)) = saving {
            prior.retain(|s| !(s.session_id == workout_id && s.set_number >= set_number));
        }

        Ok(records::is_pr(weight, reps, &prior))
    }

    /// The program for one day, each exercise paired with its suggestion
    pub fn plan_day(&self, week: u8, day: DayLabel) -> Result<Vec<DayPlanItem>> {
        validate_week(week)?;

        let planned = self.store.list_program_entries(week, day)?;
        tracing::info!("Planning week {} {}: {} exercises", week, day, planned.len());

        planned
            .into_iter()
            .map(|exercise| {
                let (summary, suggestion) = self.summarize_and_suggest(
                    &exercise.exercise_id,
                    exercise.classification,
                    exercise.reps,
                )?;
                Ok(DayPlanItem {
                    exercise,
                    summary,
                    suggestion,
                })
            })
            .collect()
    }

    /// Persist a session's sets with PR flags
    ///
    /// Sets are written one at a time, grouped by exercise (in the order the
    /// exercises first appear in `logs`) and in ascending set number, so a
    /// later set of the same session can PR against an earlier one. When a
    /// session is saved again, each set only sees the sets before it, so the
    /// PR flags come out the same as on the first save.
    ///
    /// If a write fails after at least one set was stored the error is
    /// [`Error::PartialSave`]; earlier sets stay persisted.
    pub fn save_session(
        &mut self,
        date: NaiveDate,
        day: DayLabel,
        logs: &[SetLog],
    ) -> Result<SaveReport> {
        let ordered = order_logs(logs)?;

        let workout = self.store.get_or_create_workout(date, day)?;
        let total = ordered.len();
        let mut saved = Vec::with_capacity(total);

        for log in ordered {
            match self.save_set(&workout, log) {
                Ok(record) => saved.push(record),
                Err(e) if saved.is_empty() => return Err(e),
                Err(e) => {
                    tracing::error!(
                        "Session save for {} {} stopped after {} of {} sets: {}",
                        date,
                        day,
                        saved.len(),
                        total,
                        e
                    );
                    return Err(Error::PartialSave {
                        saved: saved.len(),
                        total,
                        source: Box::new(e),
                    });
                }
            }
        }

        tracing::info!(
            "Saved {} sets for {} {} ({} PRs)",
            saved.len(),
            date,
            day,
            saved.iter().filter(|r| r.pr).count()
        );

        Ok(SaveReport {
            workout,
            records: saved,
        })
    }

    fn save_set(&mut self, workout: &Workout, log: &SetLog) -> Result<SetRecord> {
        let pr = self.check_pr_excluding(
            &log.exercise_id,
            log.weight,
            log.reps,
            Some((workout.id, log.set_number)),
        )?;

        let record = SetRecord {
            workout_id: workout.id,
            exercise_id: log.exercise_id.clone(),
            set_number: log.set_number,
            reps: log.reps,
            weight: log.weight,
            pr,
        };
        self.store.upsert_set(record.clone())?;

        if pr {
            tracing::info!(
                "PR: {} set {} at {} × {}",
                log.exercise_id,
                log.set_number,
                log.weight,
                log.reps
            );
        }
        Ok(record)
    }
}

pub fn validate_week(week: u8) -> Result<()> {
    if !(1..=PROGRAM_WEEKS).contains(&week) {
        return Err(Error::Validation(format!(
            "Week {} is outside the program (1-{})",
            week, PROGRAM_WEEKS
        )));
    }
    Ok(())
}

/// Validate logs and put them in write order
fn order_logs(logs: &[SetLog]) -> Result<Vec<&SetLog>> {
    if logs.is_empty() {
        return Err(Error::Validation("No sets to save".into()));
    }

    let mut exercise_order: HashMap<&str, usize> = HashMap::new();
    let mut seen = HashSet::new();

    for log in logs {
        log.validate()?;
        if !seen.insert((log.exercise_id.as_str(), log.set_number)) {
            return Err(Error::Validation(format!(
                "Set {} of {} is listed twice",
                log.set_number, log.exercise_id
            )));
        }
        let next = exercise_order.len();
        exercise_order.entry(log.exercise_id.as_str()).or_insert(next);
    }

    let mut ordered: Vec<&SetLog> = logs.iter().collect();
    ordered.sort_by_key(|log| (exercise_order[log.exercise_id.as_str()], log.set_number));
    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::build_default_program;
    use crate::progression::SuggestionReason;
    use crate::store::MemoryStore;
    use crate::{program::Program, HistorySet};

    fn tracker() -> Tracker<MemoryStore> {
        crate::logging::init_test();
        Tracker::new(
            MemoryStore::with_program(build_default_program()),
            ProgressionConfig::default(),
        )
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, d).unwrap()
    }

    fn log(exercise: &str, set_number: u32, weight: f64, reps: u32) -> SetLog {
        SetLog {
            exercise_id: exercise.into(),
            set_number,
            weight,
            reps,
        }
    }

    /// Log `sets` as (weight, reps) for one exercise on one date
    fn log_session(
        tracker: &mut Tracker<MemoryStore>,
        date: NaiveDate,
        day_label: DayLabel,
        exercise: &str,
        sets: &[(f64, u32)],
    ) -> SaveReport {
        let logs: Vec<_> = sets
            .iter()
            .enumerate()
            .map(|(i, &(w, r))| log(exercise, i as u32 + 1, w, r))
            .collect();
        tracker.save_session(date, day_label, &logs).unwrap()
    }

    fn squat_range() -> RepRange {
        RepRange::new(6, 10).unwrap()
    }

    #[test]
    fn test_no_history_gives_absent_suggestion_and_pr() {
        let t = tracker();
        let (summary, suggestion) = t
            .summarize_and_suggest("back_squat", Some(Classification::LowerBody), squat_range())
            .unwrap();

        assert_eq!(summary, PerformanceSummary::absent());
        assert!(suggestion.is_none());
        assert!(t.check_pr("back_squat", 60.0, 8).unwrap());
    }

    #[test]
    fn test_two_sessions_under_floor_deload() {
        let mut t = tracker();
        log_session(&mut t, day(2), DayLabel::LowerA, "back_squat", &[(100.0, 4), (100.0, 3)]);
        log_session(&mut t, day(5), DayLabel::LowerA, "back_squat", &[(100.0, 5), (100.0, 4)]);

        let (summary, suggestion) = t
            .summarize_and_suggest("back_squat", Some(Classification::LowerBody), squat_range())
            .unwrap();
        assert_eq!(summary.under_floor_streak, 2);
        let suggestion = suggestion.unwrap();
        assert_eq!(suggestion.weight, 95.0);
        assert_eq!(suggestion.reason, SuggestionReason::Deload);
    }

    #[test]
    fn test_ceiling_hit_increases_lower_body() {
        let mut t = tracker();
        log_session(&mut t, day(2), DayLabel::LowerA, "back_squat", &[(100.0, 10), (100.0, 11)]);

        let (_, suggestion) = t
            .summarize_and_suggest("back_squat", Some(Classification::LowerBody), squat_range())
            .unwrap();
        assert_eq!(suggestion.unwrap().weight, 105.0);
    }

    #[test]
    fn test_mixed_reps_hold() {
        let mut t = tracker();
        log_session(&mut t, day(2), DayLabel::LowerA, "back_squat", &[(80.0, 10), (80.0, 8)]);

        let (_, suggestion) = t
            .summarize_and_suggest("back_squat", Some(Classification::LowerBody), squat_range())
            .unwrap();
        assert_eq!(suggestion.unwrap().weight, 80.0);
    }

    #[test]
    fn test_long_streak_behaves_like_two() {
        let mut t = tracker();
        for d in [2, 5, 9, 12] {
            log_session(&mut t, day(d), DayLabel::LowerA, "back_squat", &[(100.0, 3)]);
        }

        let (summary, suggestion) = t
            .summarize_and_suggest("back_squat", Some(Classification::LowerBody), squat_range())
            .unwrap();
        assert_eq!(summary.under_floor_streak, 2);
        assert_eq!(suggestion.unwrap().weight, 95.0);
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let t = tracker();
        let result = t.summarize_and_suggest("back_squat", None, RepRange { floor: 10, ceiling: 6 });
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_pr_monotonicity_at_same_weight() {
        let mut t = tracker();
        let report = log_session(&mut t, day(2), DayLabel::LowerA, "back_squat", &[(100.0, 5)]);
        assert!(report.records[0].pr);

        assert!(!t.check_pr("back_squat", 100.0, 4).unwrap());
        assert!(!t.check_pr("back_squat", 100.0, 5).unwrap());
        assert!(t.check_pr("back_squat", 100.0, 6).unwrap());
        assert!(t.check_pr("back_squat", 100.5, 1).unwrap());
        assert!(!t.check_pr("back_squat", 97.5, 12).unwrap());
    }

    #[test]
    fn test_later_sets_pr_against_earlier_sets_of_same_session() {
        let mut t = tracker();
        log_session(&mut t, day(2), DayLabel::UpperA, "incline_db_press", &[(24.0, 8)]);

        let report = log_session(
            &mut t,
            day(5),
            DayLabel::UpperA,
            "incline_db_press",
            &[(26.0, 8), (26.0, 9), (26.0, 9), (24.0, 12)],
        );
        let flags: Vec<bool> = report.records.iter().map(|r| r.pr).collect();
        assert_eq!(flags, vec![true, true, false, false]);
        assert_eq!(report.prs().count(), 2);
    }

    #[test]
    fn test_sets_saved_in_ascending_order_regardless_of_input() {
        let mut t = tracker();
        let logs = vec![
            log("back_squat", 2, 100.0, 6),
            log("romanian_deadlift", 1, 80.0, 8),
            log("back_squat", 1, 100.0, 5),
        ];

        let report = t.save_session(day(2), DayLabel::LowerA, &logs).unwrap();
        let order: Vec<(&str, u32)> = report
            .records
            .iter()
            .map(|r| (r.exercise_id.as_str(), r.set_number))
            .collect();
        assert_eq!(
            order,
            vec![("back_squat", 1), ("back_squat", 2), ("romanian_deadlift", 1)]
        );
        // Set 2 beats set 1 at the same weight
        assert!(report.records[1].pr);
    }

    #[test]
    fn test_resaving_identical_set_is_idempotent() {
        let mut t = tracker();
        log_session(&mut t, day(2), DayLabel::LowerA, "back_squat", &[(90.0, 5)]);

        let first = log_session(&mut t, day(5), DayLabel::LowerA, "back_squat", &[(100.0, 5)]);
        let second = log_session(&mut t, day(5), DayLabel::LowerA, "back_squat", &[(100.0, 5)]);

        assert_eq!(first.workout.id, second.workout.id);
        assert!(first.records[0].pr);
        assert_eq!(first.records[0].pr, second.records[0].pr);
        // One record per key: day 2 set 1 and day 5 set 1
        assert_eq!(t.store().set_count(), 2);
    }

    #[test]
    fn test_resaving_multi_set_session_keeps_flags() {
        let mut t = tracker();
        log_session(&mut t, day(2), DayLabel::LowerB, "deadlift", &[(130.0, 5)]);

        let sets = [(140.0, 5), (140.0, 5), (140.0, 6)];
        let first = log_session(&mut t, day(5), DayLabel::LowerB, "deadlift", &sets);
        let second = log_session(&mut t, day(5), DayLabel::LowerB, "deadlift", &sets);

        let flags = |report: &SaveReport| report.records.iter().map(|r| r.pr).collect::<Vec<_>>();
        assert_eq!(flags(&first), vec![true, false, true]);
        assert_eq!(flags(&first), flags(&second));
    }

    #[test]
    fn test_resaving_non_pr_stays_non_pr() {
        let mut t = tracker();
        log_session(&mut t, day(2), DayLabel::LowerA, "back_squat", &[(120.0, 5)]);

        let first = log_session(&mut t, day(5), DayLabel::LowerA, "back_squat", &[(100.0, 5)]);
        let second = log_session(&mut t, day(5), DayLabel::LowerA, "back_squat", &[(100.0, 5)]);
        assert!(!first.records[0].pr);
        assert!(!second.records[0].pr);
    }

    #[test]
    fn test_invalid_logs_rejected_before_writing() {
        let mut t = tracker();

        let negative = t.save_session(day(2), DayLabel::LowerA, &[log("back_squat", 1, -5.0, 5)]);
        assert!(matches!(negative, Err(Error::Validation(_))));

        let duplicate = t.save_session(
            day(2),
            DayLabel::LowerA,
            &[log("back_squat", 1, 100.0, 5), log("back_squat", 1, 100.0, 6)],
        );
        assert!(matches!(duplicate, Err(Error::Validation(_))));

        let empty = t.save_session(day(2), DayLabel::LowerA, &[]);
        assert!(matches!(empty, Err(Error::Validation(_))));

        assert_eq!(t.store().set_count(), 0);
        assert!(t
            .store()
            .find_workout(day(2), DayLabel::LowerA)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_plan_day_pairs_program_with_suggestions() {
        let mut t = tracker();
        log_session(&mut t, day(2), DayLabel::LowerA, "back_squat", &[(100.0, 12), (100.0, 12), (100.0, 12)]);

        let plan = t.plan_day(1, DayLabel::LowerA).unwrap();
        assert!(!plan.is_empty());

        let squat = plan
            .iter()
            .find(|item| item.exercise.exercise_id == "back_squat")
            .unwrap();
        assert_eq!(squat.exercise.reps, RepRange { floor: 8, ceiling: 12 });
        assert!(squat.summary.met_ceiling);
        assert_eq!(squat.suggestion.unwrap().weight, 105.0);

        let rdl = plan
            .iter()
            .find(|item| item.exercise.exercise_id == "romanian_deadlift")
            .unwrap();
        assert!(rdl.suggestion.is_none());
    }

    #[test]
    fn test_plan_day_rejects_week_outside_program() {
        let t = tracker();
        assert!(matches!(t.plan_day(0, DayLabel::UpperA), Err(Error::Validation(_))));
        assert!(matches!(t.plan_day(13, DayLabel::UpperA), Err(Error::Validation(_))));
    }

    /// Store that fails every write after a number of successful set upserts
    struct FlakyStore {
        inner: MemoryStore,
        writes_left: usize,
    }

    impl WorkoutStore for FlakyStore {
        fn list_sets_for_exercise(&self, exercise_id: &str) -> Result<Vec<HistorySet>> {
            self.inner.list_sets_for_exercise(exercise_id)
        }
        fn find_workout(&self, date: NaiveDate, day: DayLabel) -> Result<Option<Workout>> {
            self.inner.find_workout(date, day)
        }
        fn get_or_create_workout(&mut self, date: NaiveDate, day: DayLabel) -> Result<Workout> {
            self.inner.get_or_create_workout(date, day)
        }
        fn upsert_set(&mut self, record: SetRecord) -> Result<()> {
            if self.writes_left == 0 {
                return Err(Error::Storage("disk full".into()));
            }
            self.writes_left -= 1;
            self.inner.upsert_set(record)
        }
        fn list_sets_for_workout(&self, workout_id: Uuid) -> Result<Vec<SetRecord>> {
            self.inner.list_sets_for_workout(workout_id)
        }
        fn all_sets(&self) -> Result<Vec<(Workout, SetRecord)>> {
            self.inner.all_sets()
        }
        fn program(&self) -> Result<Program> {
            self.inner.program()
        }
        fn save_program(&mut self, program: &Program) -> Result<()> {
            self.inner.save_program(program)
        }
    }

    fn flaky(writes_left: usize) -> Tracker<FlakyStore> {
        Tracker::new(
            FlakyStore {
                inner: MemoryStore::new(),
                writes_left,
            },
            ProgressionConfig::default(),
        )
    }

    fn four_sets() -> Vec<SetLog> {
        (1..=4).map(|n| log("deadlift", n, 140.0, 5)).collect()
    }

    #[test]
    fn test_partial_failure_is_reported_distinctly() {
        let mut t = flaky(2);
        let err = t.save_session(day(2), DayLabel::LowerB, &four_sets()).unwrap_err();

        match &err {
            Error::PartialSave { saved, total, source } => {
                assert_eq!(*saved, 2);
                assert_eq!(*total, 4);
                assert!(source.is_storage());
            }
            other => panic!("Expected PartialSave, got {:?}", other),
        }
        assert!(err.is_storage());
        assert_eq!(t.store().inner.set_count(), 2);
    }

    #[test]
    fn test_total_failure_propagates_storage_error() {
        let mut t = flaky(0);
        let err = t.save_session(day(2), DayLabel::LowerB, &four_sets()).unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }

    #[test]
    fn test_retry_after_partial_failure_keeps_suggestions_valid() {
        let mut t = flaky(2);
        let before = t
            .summarize_and_suggest("deadlift", Some(Classification::LowerBody), squat_range())
            .unwrap();
        let _ = t.save_session(day(2), DayLabel::LowerB, &four_sets());

        t.store_mut().writes_left = 10;
        let report = t.save_session(day(2), DayLabel::LowerB, &four_sets()).unwrap();
        assert_eq!(report.records.len(), 4);
        // Same flags as an uninterrupted save: only the first set is a PR
        let flags: Vec<bool> = report.records.iter().map(|r| r.pr).collect();
        assert_eq!(flags, vec![true, false, false, false]);
        assert_eq!(t.store().inner.set_count(), 4);
        // Nothing was logged before the session, so no suggestion either way
        assert!(before.1.is_none());
    }
}
