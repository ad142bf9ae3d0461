//! Session history loading.
//!
//! This module loads recent session history from both WAL and CSV files
//! for reporting and trend display.

use crate::{Result, SessionResult};
use chrono::{DateTime, Duration, Utc};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use uuid::Uuid;

/// CSV row format for reading archived sessions
#[derive(Debug, Deserialize)]
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
    times_json: String,
    notes: Option<String>,
}

fn parse_body_feel(s: &str) -> Option<crate::BodyFeel> {
    match s {
        "good" => Some(crate::BodyFeel::Good),
        "okay" => Some(crate::BodyFeel::Okay),
        "tight" => Some(crate::BodyFeel::Tight),
        _ => None,
    }
}

impl TryFrom<CsvRow> for SessionResult {
    type Error = crate::Error;

    fn try_from(row: CsvRow) -> Result<Self> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| crate::Error::Other(format!("Invalid UUID: {}", e)))?;

        let performed_at = DateTime::parse_from_rfc3339(&row.performed_at)
            .map_err(|e| crate::Error::Other(format!("Invalid date: {}", e)))?
            .with_timezone(&Utc);

        let body_feel_before = parse_body_feel(&row.body_feel_before)
            .ok_or_else(|| crate::Error::Other(format!("Invalid body feel: {}", row.body_feel_before)))?;

        let times: HashMap<String, Vec<f64>> = serde_json::from_str(&row.times_json)?;

        Ok(SessionResult {
            id,
            performed_at,
            session_index: row.session_index,
            sleep_rating: row.sleep_rating,
            body_feel_before,
            body_feel_after: row.body_feel_after.as_deref().and_then(parse_body_feel),
            pain_areas: vec![], // Not stored in CSV
            readiness: row.readiness,
            is_break_day: row.is_break_day,
            drill_log: vec![], // Not stored in CSV
            times,
            timing_methods: HashMap::new(),
            rpe: row.rpe,
            notes: row.notes,
        })
    }
}

/// Load sessions from the last N days from both WAL and CSV
///
/// Returns sessions sorted by performed_at (newest first).
/// Automatically deduplicates sessions that appear in both WAL and CSV.
pub fn load_recent_results(
    wal_path: &Path,
    csv_path: &Path,
    days: i64,
) -> Result<Vec<SessionResult>> {
    let cutoff = Utc::now() - Duration::days(days);
    let mut results = Vec::new();
    let mut seen_ids = HashSet::new();

    // Load from WAL first (most recent)
    if wal_path.exists() {
        let wal_results = crate::recorder::read_results(wal_path)?;
        for result in wal_results {
            if result.performed_at >= cutoff {
                seen_ids.insert(result.id);
                results.push(result);
            }
        }
        tracing::debug!("Loaded {} sessions from WAL", results.len());
    }

    // Load from CSV (archived)
    if csv_path.exists() {
        let csv_results = load_results_from_csv(csv_path)?;
        let mut csv_count = 0;
        for result in csv_results {
            if result.performed_at >= cutoff && !seen_ids.contains(&result.id) {
                seen_ids.insert(result.id);
                results.push(result);
                csv_count += 1;
            }
        }
        tracing::debug!("Loaded {} sessions from CSV", csv_count);
    }

    // Sort by performed_at, newest first
    results.sort_by(|a, b| b.performed_at.cmp(&a.performed_at));

    tracing::info!(
        "Loaded {} total sessions from last {} days",
        results.len(),
        days
    );

    Ok(results)
}

/// Load all sessions from a CSV file
fn load_results_from_csv(path: &Path) -> Result<Vec<SessionResult>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;

    let mut results = Vec::new();
    for record in reader.deserialize::<CsvRow>() {
        match record {
            Ok(row) => match SessionResult::try_from(row) {
                Ok(result) => results.push(result),
                Err(e) => {
                    tracing::warn!("Failed to parse CSV row: {}", e);
                    // Continue processing other rows
                }
            },
            Err(e) => {
                tracing::warn!("Failed to deserialize CSV row: {}", e);
            }
        }
    }

    Ok(results)
}
