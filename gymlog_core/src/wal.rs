//! Append-only journal of workouts and sets.
//!
//! Every write is one JSON line appended under an exclusive file lock.
//! Reading replays the lines into a [`Ledger`]; a later set line with the
//! same (workout, exercise, set number) key replaces an earlier one, which is
//! how set upserts are expressed on disk.

use crate::store::Ledger;
use crate::{Error, Result, SetRecord, Workout};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use uuid::Uuid;

/// One line of the journal
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JournalEntry {
    Workout(Workout),
    Set(SetRecord),
}

/// Journal sink trait for persisting entries
pub trait JournalSink {
    fn append(&mut self, entry: &JournalEntry) -> Result<()>;
}

/// JSONL-based journal with file locking
pub struct JsonlJournal {
    path: PathBuf,
}

impl JsonlJournal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl JournalSink for JsonlJournal {
    fn append(&mut self, entry: &JournalEntry) -> Result<()> {
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let torn = !ends_with_newline(&file)?;
        if torn {
            tracing::warn!(
                "Journal {:?} ends in a partial line, starting a new one",
                self.path
            );
        }

        let mut writer = BufWriter::new(&file);
        let line = serde_json::to_string(entry)?;
        if torn {
            writer.write_all(b"\n")?;
        }
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        file.unlock()?;

        tracing::debug!("Appended {} entry to journal", entry.kind());
        Ok(())
    }
}

/// True for an empty file or one whose last byte is a newline
fn ends_with_newline(mut file: &File) -> Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

impl JournalEntry {
    fn kind(&self) -> &'static str {
        match self {
            JournalEntry::Workout(_) => "workout",
            JournalEntry::Set(_) => "set",
        }
    }
}

/// Read all entries from a journal file
///
/// Unparseable lines are logged and skipped so one torn write does not hide
/// the rest of the history.
pub fn read_entries(path: &Path) -> Result<Vec<JournalEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut entries = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<JournalEntry>(&line) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                tracing::warn!("Failed to parse journal line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} journal entries", entries.len());
    Ok(entries)
}

/// Replay journal entries into a ledger
///
/// Two processes can both create the workout for the same date + day. The
/// first one in the journal is kept and sets logged against the other are
/// folded into it.
pub fn replay(entries: impl IntoIterator<Item = JournalEntry>) -> Ledger {
    let mut ledger = Ledger::default();
    let mut merged: HashMap<Uuid, Uuid> = HashMap::new();

    for entry in entries {
        match entry {
            JournalEntry::Workout(workout) => {
                let kept = ledger.insert_workout(workout.clone());
                if kept.id != workout.id {
                    tracing::warn!(
                        "Merging duplicate workout {} for {} {} into {}",
                        workout.id,
                        workout.date,
                        workout.day,
                        kept.id
                    );
                    merged.insert(workout.id, kept.id);
                }
            }
            JournalEntry::Set(mut record) => {
                if let Some(&kept) = merged.get(&record.workout_id) {
                    record.workout_id = kept;
                }
                ledger.upsert_set(record);
            }
        }
    }
    ledger
}

/// Rewrite the journal with only the live record per key
///
/// The previous journal is kept next to it as `*.wal.processed` so it can be
/// recovered by hand. Returns the number of entries in the compacted journal.
pub fn compact_journal(path: &Path) -> Result<usize> {
    let entries = read_entries(path)?;
    if entries.is_empty() {
        tracing::info!("Journal is empty, nothing to compact");
        return Ok(0);
    }

    let before = entries.len();
    let ledger = replay(entries);

    let parent = path
        .parent()
        .ok_or_else(|| Error::Storage(format!("journal path {:?} has no parent", path)))?;
    let temp = NamedTempFile::new_in(parent)?;
    temp.as_file().lock_exclusive()?;

    let mut written = 0;
    {
        let mut writer = BufWriter::new(temp.as_file());
        let workouts = ledger.workouts.values().cloned().map(JournalEntry::Workout);
        let sets = ledger.sets.values().cloned().map(JournalEntry::Set);
        for entry in workouts.chain(sets) {
            serde_json::to_writer(&mut writer, &entry)?;
            writer.write_all(b"\n")?;
            written += 1;
        }
        writer.flush()?;
    }

    temp.as_file().sync_all()?;
    temp.as_file().unlock()?;

    let processed_path = path.with_extension("wal.processed");
    std::fs::rename(path, &processed_path)?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    tracing::info!(
        "Compacted journal from {} to {} entries (previous kept at {:?})",
        before,
        written,
        processed_path
    );
    Ok(written)
}

/// Remove `*.wal.processed` files left behind by compaction
pub fn cleanup_processed(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "processed") {
            std::fs::remove_file(&path)?;
            tracing::debug!("Removed processed journal: {:?}", path);
            count += 1;
        }
    }

    if count > 0 {
        tracing::info!("Cleaned up {} processed journal files", count);
    }
    Ok(count)
}
