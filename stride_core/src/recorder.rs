//! Session recording: the persistence seam of the session flow.
//!
//! Completed sessions are appended to a JSONL (JSON Lines) write-ahead
//! log with file locking, and the athlete state (session counter,
//! personal bests) is updated in the same call. The session flow only
//! sees the `SessionRecorder` trait.

use crate::{AthleteState, Result, SessionResult};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Recorder trait for persisting completed sessions
///
/// Personal-best writes happen here, not in the decision core.
pub trait SessionRecorder {
    fn record(&mut self, result: &SessionResult) -> Result<()>;
}

/// JSONL-based recorder with file locking
///
/// Appends each result to the WAL, then updates the athlete state file:
/// bumps the session counter and folds in any personal-best improvements
/// from valid (non-zero) times of full sessions.
pub struct JsonlRecorder {
    wal_path: PathBuf,
    state_path: PathBuf,
}

impl JsonlRecorder {
    /// Create a new recorder for the given WAL and state paths
    pub fn new(wal_path: impl Into<PathBuf>, state_path: impl Into<PathBuf>) -> Self {
        Self {
            wal_path: wal_path.into(),
            state_path: state_path.into(),
        }
    }

    /// Ensure the parent directory exists
    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.wal_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    fn append_wal(&self, result: &SessionResult) -> Result<()> {
        self.ensure_parent_dir()?;

        // Open file for appending
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.wal_path)?;

        // Acquire exclusive lock
        file.lock_exclusive()?;

        // Write result as JSON line
        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(result)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        file.unlock()?;

        tracing::debug!("Appended session {} to WAL", result.id);
        Ok(())
    }

    fn update_state(&self, result: &SessionResult) -> Result<()> {
        AthleteState::update(&self.state_path, |state| {
            state.sessions_completed += 1;

            if !result.is_break_day {
                for (key, times) in &result.times {
                    let best = times
                        .iter()
                        .copied()
                        .filter(|t| *t > 0.0)
                        .min_by(|a, b| a.total_cmp(b));

                    if let Some(best) = best {
                        match state.personal_bests.get(key) {
                            Some(&prior) if best >= prior => {}
                            _ => {
                                tracing::info!("New personal best for {}: {:.2}s", key, best);
                                state.personal_bests.insert(key.clone(), best);
                            }
                        }
                    }
                }
            }

            Ok(())
        })?;
        Ok(())
    }
}

impl SessionRecorder for JsonlRecorder {
    fn record(&mut self, result: &SessionResult) -> Result<()> {
        // WAL first: the state update is derivable from the log
        self.append_wal(result)?;
        self.update_state(result)?;
        Ok(())
    }
}

/// Read all session results from a WAL file
pub fn read_results(path: &Path) -> Result<Vec<SessionResult>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    // Acquire shared lock for reading
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut results = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<SessionResult>(&line) {
            Ok(result) => results.push(result),
            Err(e) => {
                tracing::warn!("Failed to parse session at line {}: {}", line_num + 1, e);
                // Continue reading, don't fail completely
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} sessions from WAL", results.len());
    Ok(results)
}
