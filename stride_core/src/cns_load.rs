//! CNS load scoring for workout templates.
//!
//! Aggregates per-exercise training stress into block and workout scores,
//! classifies the dominant fascia loading pattern, and maps numeric loads
//! onto severity tiers. Consumed by the workout builder, not by the
//! session flow; the two share the same numeric tier conventions.

use crate::types::{
    BlockKind, CnsTier, ExerciseLoadSpec, FasciaBias, LoadType, VelocityIntent, WorkoutBlock,
    WorkoutPlan,
};
use std::collections::HashMap;

/// Severity classification of a numeric load score
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Low,
    Moderate,
    Elevated,
    High,
}

/// Display tier for a load score: label plus a UI color
#[derive(Clone, Debug, PartialEq)]
pub struct LoadTier {
    pub severity: Severity,
    pub label: &'static str,
    pub color: &'static str,
}

fn load_type_multiplier(load_type: LoadType) -> f64 {
    match load_type {
        LoadType::Bodyweight => 1.0,
        LoadType::Loaded => 1.3,
        LoadType::Ballistic => 1.5,
        LoadType::Isometric => 0.7,
    }
}

fn velocity_multiplier(velocity: VelocityIntent) -> f64 {
    match velocity {
        VelocityIntent::Slow => 0.8,
        VelocityIntent::Controlled => 1.0,
        VelocityIntent::Fast => 1.3,
        VelocityIntent::Maximal => 1.6,
    }
}

fn cns_tier_multiplier(tier: CnsTier) -> f64 {
    match tier {
        CnsTier::Low => 0.6,
        CnsTier::Moderate => 1.0,
        CnsTier::High => 1.5,
        CnsTier::Severe => 2.0,
    }
}

fn block_kind_multiplier(kind: BlockKind) -> f64 {
    match kind {
        BlockKind::Activation => 0.6,
        BlockKind::Accessory => 0.8,
        BlockKind::StrengthOutput => 1.0,
        BlockKind::Elastic => 1.2,
    }
}

/// Training-stress score of a single exercise
///
/// Product of the load-type, velocity-intent, and CNS-tier multipliers,
/// an external load factor (1 + kg/100), a unilateral factor, and the
/// volume (sets x reps).
pub fn exercise_load(spec: &ExerciseLoadSpec) -> f64 {
    let volume = f64::from(spec.sets) * f64::from(spec.reps);
    let load_factor = 1.0 + spec.external_load_kg.max(0.0) / 100.0;
    let unilateral_factor = if spec.unilateral { 1.1 } else { 1.0 };

    load_type_multiplier(spec.load_type)
        * velocity_multiplier(spec.velocity)
        * cns_tier_multiplier(spec.cns_tier)
        * load_factor
        * unilateral_factor
        * volume
}

/// Training-stress score of a block: summed exercise loads scaled by the
/// block-kind weight (activation counts less than strength output)
pub fn block_load(block: &WorkoutBlock) -> f64 {
    let total: f64 = block.exercises.iter().map(exercise_load).sum();
    total * block_kind_multiplier(block.kind)
}

/// Training-stress score of a whole workout
///
/// A flat plan is treated as one neutral-weight block. The sum is
/// order-independent.
pub fn workout_load(plan: &WorkoutPlan) -> f64 {
    match plan {
        WorkoutPlan::Flat { exercises } => exercises.iter().map(exercise_load).sum(),
        WorkoutPlan::Blocks { blocks } => blocks.iter().map(block_load).sum(),
    }
}

/// Dominant fascia loading pattern of a workout
///
/// Weighted majority across tagged exercises, weighted by each exercise's
/// load score. Returns None when no exercise carries a tag.
pub fn fascia_bias(plan: &WorkoutPlan) -> Option<FasciaBias> {
    let exercises: Vec<&ExerciseLoadSpec> = match plan {
        WorkoutPlan::Flat { exercises } => exercises.iter().collect(),
        WorkoutPlan::Blocks { blocks } => {
            blocks.iter().flat_map(|b| b.exercises.iter()).collect()
        }
    };

    let mut weights: HashMap<FasciaBias, f64> = HashMap::new();
    for spec in exercises {
        if let Some(bias) = spec.fascia_bias {
            *weights.entry(bias).or_insert(0.0) += exercise_load(spec);
        }
    }

    weights
        .into_iter()
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(bias, _)| bias)
}

/// Map a numeric load score onto a severity tier
///
/// Monotonic in the load: a strictly larger score never maps to a lower
/// severity.
pub fn tier_of(load: f64) -> LoadTier {
    if load < 120.0 {
        LoadTier {
            severity: Severity::Low,
            label: "Low",
            color: "green",
        }
    } else if load < 240.0 {
        LoadTier {
            severity: Severity::Moderate,
            label: "Moderate",
            color: "yellow",
        }
    } else if load < 400.0 {
        LoadTier {
            severity: Severity::Elevated,
            label: "Elevated",
            color: "orange",
        }
    } else {
        LoadTier {
            severity: Severity::High,
            label: "High",
            color: "red",
        }
    }
}
