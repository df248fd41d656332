//! File-backed [`WorkoutStore`].
//!
//! Layout under the data directory:
//! - `program.json`: exercise catalog + program rows (atomic rewrite)
//! - `journal.wal`: JSONL journal of workouts and set upserts
//!
//! Reads replay the journal on every call; the journal of a single lifter
//! stays small enough for that, and `compact` keeps it tidy.

use crate::program::{get_default_program, Program};
use crate::store::{Ledger, WorkoutStore};
use crate::wal::{self, JournalEntry, JournalSink, JsonlJournal};
use crate::{DayLabel, HistorySet, Result, SetRecord, Workout};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const PROGRAM_FILE: &str = "program.json";
const JOURNAL_FILE: &str = "journal.wal";

/// Store persisting to a data directory
pub struct FileStore {
    data_dir: PathBuf,
    journal: JsonlJournal,
}

impl FileStore {
    /// Open a store rooted at `data_dir`, creating the directory if needed
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;
        let journal = JsonlJournal::new(data_dir.join(JOURNAL_FILE));
        tracing::debug!("Opened file store at {:?}", data_dir);
        Ok(Self { data_dir, journal })
    }

    /// Open a store and seed the default program if none is usable yet
    pub fn open_seeded(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let mut store = Self::open(data_dir)?;
        if store.program()?.entries.is_empty() {
            tracing::info!("No program on disk, seeding the default 12-week program");
            store.seed_default_program()?;
        }
        Ok(store)
    }

    /// Merge the default program into the stored one (replacing by key)
    pub fn seed_default_program(&mut self) -> Result<Program> {
        self.update_program(|program| {
            program.merge(get_default_program());
            Ok(())
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn program_path(&self) -> PathBuf {
        self.data_dir.join(PROGRAM_FILE)
    }

    pub fn journal_path(&self) -> &Path {
        self.journal.path()
    }

    /// Rewrite the journal keeping only live records
    pub fn compact(&self) -> Result<usize> {
        wal::compact_journal(self.journal_path())
    }

    fn ledger(&self) -> Result<Ledger> {
        Ok(wal::replay(wal::read_entries(self.journal_path())?))
    }
}

impl WorkoutStore for FileStore {
    fn list_sets_for_exercise(&self, exercise_id: &str) -> Result<Vec<HistorySet>> {
        Ok(self.ledger()?.history_for(exercise_id))
    }

    fn find_workout(&self, date: NaiveDate, day: DayLabel) -> Result<Option<Workout>> {
        Ok(self.ledger()?.find_workout(date, day).cloned())
    }

    fn get_or_create_workout(&mut self, date: NaiveDate, day: DayLabel) -> Result<Workout> {
        if let Some(existing) = self.find_workout(date, day)? {
            return Ok(existing);
        }

        let workout = Workout::new(date, day);
        self.journal.append(&JournalEntry::Workout(workout.clone()))?;
        tracing::info!("Created workout {} for {} {}", workout.id, date, day);
        Ok(workout)
    }

    fn upsert_set(&mut self, record: SetRecord) -> Result<()> {
        self.journal.append(&JournalEntry::Set(record))
    }

    fn list_sets_for_workout(&self, workout_id: Uuid) -> Result<Vec<SetRecord>> {
        Ok(self.ledger()?.sets_for_workout(workout_id))
    }

    fn all_sets(&self) -> Result<Vec<(Workout, SetRecord)>> {
        Ok(self.ledger()?.joined_sets())
    }

    fn program(&self) -> Result<Program> {
        Program::load(&self.program_path())
    }

    fn save_program(&mut self, program: &Program) -> Result<()> {
        program.save(&self.program_path())
    }
}
