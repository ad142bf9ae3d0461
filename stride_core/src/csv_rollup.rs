//! CSV rollup functionality for archiving WAL sessions.
//!
//! This module implements atomic WAL-to-CSV conversion with proper error handling
//! to prevent data loss.

use crate::{Result, SessionResult};
use std::fs::OpenOptions;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    id: String,
    performed_at: String,
    session_index: u32,
    readiness: u8,
    is_break_day: bool,
    sleep_rating: u8,
    body_feel_before: String,
    body_feel_after: Option<String>,
    rpe: Option<u8>,
    /// Per-distance times, kept as a JSON object to stay one row per session
    times_json: String,
    notes: Option<String>,
}

impl TryFrom<&SessionResult> for CsvRow {
    type Error = crate::Error;

    fn try_from(result: &SessionResult) -> Result<Self> {
        Ok(CsvRow {
            id: result.id.to_string(),
            performed_at: result.performed_at.to_rfc3339(),
            session_index: result.session_index,
            readiness: result.readiness,
            is_break_day: result.is_break_day,
            sleep_rating: result.sleep_rating,
            body_feel_before: format!("{:?}", result.body_feel_before).to_lowercase(),
            body_feel_after: result
                .body_feel_after
                .map(|f| format!("{:?}", f).to_lowercase()),
            rpe: result.rpe,
            times_json: serde_json::to_string(&result.times)?,
            notes: result.notes.clone(),
        })
    }
}

/// Roll up WAL sessions into CSV and archive the WAL atomically
///
/// This function:
/// 1. Reads all sessions from the WAL
/// 2. Appends them to the CSV file (creates with headers if needed)
/// 3. Syncs the CSV to disk
/// 4. Renames the WAL to .processed
/// 5. Returns the number of sessions processed
///
/// # Safety
/// - CSV is fsynced before WAL is renamed
/// - WAL is renamed (not deleted) to allow manual recovery if needed
/// - Processed WAL files can be cleaned up manually
pub fn results_to_csv_and_archive(wal_path: &Path, csv_path: &Path) -> Result<usize> {
    // Read all sessions from WAL
    let results = crate::recorder::read_results(wal_path)?;

    if results.is_empty() {
        tracing::info!("No sessions in WAL to roll up");
        return Ok(0);
    }

    // Ensure parent directory exists
    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Open CSV file for appending
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;

    // Determine if we need to write headers by checking file size after opening
    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    // Write all sessions to CSV
    for result in &results {
        let row = CsvRow::try_from(result)?;
        writer.serialize(row)?;
    }

    // Flush and sync to disk
    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!("Wrote {} sessions to CSV", results.len());

    // Atomically archive the WAL by renaming it
    let processed_path = wal_path.with_extension("wal.processed");
    std::fs::rename(wal_path, &processed_path)?;

    tracing::info!("Archived WAL to {:?}", processed_path);

    Ok(results.len())
}

/// Clean up old processed WAL files
///
/// This removes all .wal.processed files in the given directory.
pub fn cleanup_processed_wals(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if let Some(extension) = path.extension() {
            if extension == "processed" {
                std::fs::remove_file(&path)?;
                tracing::debug!("Removed processed WAL: {:?}", path);
                count += 1;
            }
        }
    }

    if count > 0 {
        tracing::info!("Cleaned up {} processed WAL files", count);
    }

    Ok(count)
}
