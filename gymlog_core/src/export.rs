//! CSV export of the full set log.

use crate::store::WorkoutStore;
use crate::{Error, Result, SetRecord, Workout};
use std::path::Path;
use tempfile::NamedTempFile;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    date: String,
    day: String,
    exercise_id: String,
    exercise: String,
    set_no: u32,
    weight: f64,
    reps: u32,
    pr: bool,
}

/// Export every logged set to `path`, sorted by date, day, exercise and set
///
/// The file is written next to the destination, fsynced, then renamed over
/// it so a failed export never leaves a truncated CSV behind. Returns the
/// number of rows written.
pub fn export_sets_csv<S: WorkoutStore>(store: &S, path: &Path) -> Result<usize> {
    let program = store.program()?;
    let mut sets: Vec<(Workout, SetRecord)> = store.all_sets()?;
    sets.sort_by(|(wa, sa), (wb, sb)| {
        (wa.date, wa.day, &sa.exercise_id, sa.set_number)
            .cmp(&(wb.date, wb.day, &sb.exercise_id, sb.set_number))
    });

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let temp = NamedTempFile::new_in(parent)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(temp.as_file());

    for (workout, set) in &sets {
        let exercise = program
            .exercises
            .get(&set.exercise_id)
            .map(|e| e.name.clone())
            .unwrap_or_else(|| set.exercise_id.clone());

        writer.serialize(CsvRow {
            date: workout.date.to_string(),
            day: workout.day.to_string(),
            exercise_id: set.exercise_id.clone(),
            exercise,
            set_no: set.set_number,
            weight: set.weight,
            reps: set.reps,
            pr: set.pr,
        })?;
    }

    writer.flush()?;
    drop(writer);
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    tracing::info!("Exported {} sets to {:?}", sets.len(), path);
    Ok(sets.len())
}
