//! Core domain types for the Stride sprint training system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Readiness check-in inputs (sleep, body feel, pain map)
//! - Exercise load specifications and workout plans
//! - Distance and drill catalog entries
//! - Sprint prescriptions and session results
//! - Persistent athlete state (personal bests, session counter)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

// ============================================================================
// Readiness Check-In Types
// ============================================================================

/// Subjective body feel reported at check-in (and again after the session)
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BodyFeel {
    Good,
    Okay,
    Tight,
}

/// Body areas an athlete can flag as painful during check-in
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PainArea {
    Hamstring,
    Calf,
    Quad,
    Groin,
    Knee,
    Ankle,
    Foot,
    Shin,
    LowerBack,
    Other(String),
}

/// Raw self-report signals collected once at session start
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReadinessInput {
    /// Sleep quality rating, 1 (poor) to 5 (excellent)
    pub sleep_rating: u8,
    pub body_feel: BodyFeel,
    pub pain_areas: Vec<PainArea>,
}

// ============================================================================
// Exercise Load Types
// ============================================================================

/// How an exercise is loaded
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LoadType {
    Bodyweight,
    Loaded,
    Ballistic,
    Isometric,
}

/// Intended movement velocity
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VelocityIntent {
    Slow,
    Controlled,
    Fast,
    Maximal,
}

/// Central-nervous-system demand class of an exercise
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CnsTier {
    Low,
    Moderate,
    High,
    Severe,
}

/// Dominant connective-tissue loading pattern of an exercise
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FasciaBias {
    Compression,
    Elastic,
    Glide,
}

/// Load specification for a single exercise within a workout template
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExerciseLoadSpec {
    pub name: String,
    pub load_type: LoadType,
    pub velocity: VelocityIntent,
    /// External load in kilograms; 0 for bodyweight work
    #[serde(default)]
    pub external_load_kg: f64,
    pub sets: u32,
    pub reps: u32,
    pub cns_tier: CnsTier,
    #[serde(default)]
    pub fascia_bias: Option<FasciaBias>,
    #[serde(default)]
    pub unilateral: bool,
}

/// Weighting class of a workout block
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Activation,
    Accessory,
    StrengthOutput,
    Elastic,
}

/// A named group of exercises inside a block-structured workout
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkoutBlock {
    pub name: String,
    pub kind: BlockKind,
    pub exercises: Vec<ExerciseLoadSpec>,
}

/// A workout template is authored either as a flat exercise list or as
/// structured blocks. The tag keeps the two shapes apart at the type level.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
pub enum WorkoutPlan {
    Flat { exercises: Vec<ExerciseLoadSpec> },
    Blocks { blocks: Vec<WorkoutBlock> },
}

// ============================================================================
// Catalog Types
// ============================================================================

/// A sprint distance the athlete can be prescribed
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DistanceConfig {
    pub key: String,
    pub label: String,
    pub meters: u32,
    /// Per-distance ceiling on prescribed repetitions
    pub max_reps: u32,
}

/// A warm-up/technique drill performed before sprint efforts
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Drill {
    pub id: String,
    pub name: String,
    pub cue: String,
    pub reference_url: Option<String>,
}

/// The complete catalog of distances and drills
#[derive(Clone, Debug)]
pub struct Catalog {
    pub distances: Vec<DistanceConfig>,
    pub drills: Vec<Drill>,
}

// ============================================================================
// Prescription Types
// ============================================================================

/// Per-distance prescription computed at check-in
#[derive(Clone, Debug, PartialEq)]
pub struct SprintPrescription {
    pub distance_key: String,
    pub reps: u32,
    pub barefoot_eligible: bool,
}

// ============================================================================
// Session Result Types
// ============================================================================

/// How a recorded time was measured
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TimingMethod {
    HandTimed,
    Stopwatch,
    TimingGates,
}

/// Completion status of one drill in the session checklist
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DrillEntry {
    pub drill_id: String,
    pub completed: bool,
}

/// The full payload of a completed session, handed to the recorder once
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionResult {
    pub id: Uuid,
    pub performed_at: DateTime<Utc>,
    /// Zero-based count of sessions completed before this one
    pub session_index: u32,
    pub sleep_rating: u8,
    pub body_feel_before: BodyFeel,
    pub body_feel_after: Option<BodyFeel>,
    pub pain_areas: Vec<PainArea>,
    pub readiness: u8,
    pub is_break_day: bool,
    pub drill_log: Vec<DrillEntry>,
    /// Sanitized recorded times per distance key, seconds
    pub times: HashMap<String, Vec<f64>>,
    #[serde(default)]
    pub timing_methods: HashMap<String, TimingMethod>,
    pub rpe: Option<u8>,
    pub notes: Option<String>,
}

/// A newly achieved personal best detected at session completion
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NewBest {
    pub distance_key: String,
    pub seconds: f64,
    pub previous: Option<f64>,
}

// ============================================================================
// Athlete State
// ============================================================================

/// Athlete's persistent state across sessions
///
/// Personal bests are written only by the session recorder; the decision
/// core treats them as read-only input.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct AthleteState {
    /// Best recorded time per distance key, seconds
    pub personal_bests: HashMap<String, f64>,
    /// Total completed sessions, break days included
    pub sessions_completed: u32,
}
