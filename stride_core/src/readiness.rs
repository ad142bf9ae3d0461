//! Readiness scoring from daily self-report signals.
//!
//! A single pure function maps the check-in (sleep rating, body feel,
//! pain map) onto a 0-100 score. The score gates everything downstream:
//! break-day decisions, sprint volume, barefoot eligibility.

use crate::types::{BodyFeel, ReadinessInput};

/// Maximum total deduction the pain map can contribute
const PAIN_PENALTY_CAP: i32 = 24;

/// Deduction per reported pain area
const PAIN_PENALTY_PER_AREA: i32 = 8;

/// Score an athlete's readiness from the morning check-in
///
/// Contributions:
/// - Sleep rating 1-5 maps to a rising base of 20/35/50/60/70
/// - Body feel adds 30 (good), 20 (okay), or 10 (tight)
/// - Each pain area subtracts 8, capped at 24 total
///
/// The result is clamped to [0, 100]. Total over all valid inputs; out-of-range
/// sleep ratings are clamped into 1-5 rather than rejected.
pub fn score_readiness(input: &ReadinessInput) -> u8 {
    let sleep_base = match input.sleep_rating.clamp(1, 5) {
        1 => 20,
        2 => 35,
        3 => 50,
        4 => 60,
        _ => 70,
    };

    let feel_bonus = match input.body_feel {
        BodyFeel::Good => 30,
        BodyFeel::Okay => 20,
        BodyFeel::Tight => 10,
    };

    let pain_penalty =
        (input.pain_areas.len() as i32 * PAIN_PENALTY_PER_AREA).min(PAIN_PENALTY_CAP);

    let score = sleep_base + feel_bonus - pain_penalty;
    score.clamp(0, 100) as u8
}
