//! Program state persistence with file locking.
//!
//! The exercise catalog and program rows live in one JSON file that is
//! rewritten atomically on every change.

use crate::program::Program;
use crate::{Error, Result};
use fs2::FileExt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

impl Program {
    /// Load the program from a file with shared locking
    ///
    /// Returns an empty program if the file doesn't exist. If the file is
    /// corrupted, logs a warning and returns an empty program so the caller
    /// can re-seed it.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No program file found at {:?}", path);
            return Ok(Self::default());
        }

        let file = File::open(path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
        file.unlock()?;
        read?;

        match serde_json::from_str::<Program>(&contents) {
            Ok(program) => {
                tracing::debug!(
                    "Loaded program from {:?} ({} exercises, {} rows)",
                    path,
                    program.exercises.len(),
                    program.entries.len()
                );
                Ok(program)
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to parse program file {:?}: {}. Starting from an empty program.",
                    path,
                    e
                );
                Ok(Self::default())
            }
        }
    }

    /// Save the program with exclusive locking
    ///
    /// Atomically writes state by:
    /// 1. Writing to a temp file
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| Error::Storage(format!("program path {:?} has no parent", path)))?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            serde_json::to_writer_pretty(&mut writer, self)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved program to {:?}", path);
        Ok(())
    }
}
