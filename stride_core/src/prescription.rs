//! Sprint prescription rules.
//!
//! This module turns the readiness score and the athlete's session index
//! into the day's prescription:
//! - Rep counts per distance (progressive overload, capped per distance)
//! - Low-readiness volume reduction
//! - Barefoot eligibility gating
//! - Break-day decision

use crate::config::{PrescriptionConfig, ReadinessConfig};
use crate::readiness::score_readiness;
use crate::types::{DistanceConfig, ReadinessInput, SprintPrescription};

/// Score the check-in. Thin delegation kept so callers depend on the
/// prescriber, not on scoring internals.
pub fn readiness(input: &ReadinessInput) -> u8 {
    score_readiness(input)
}

/// Baseline rep count for a distance at the given session index
///
/// Reps grow by one every `sessions_per_increment` completed sessions,
/// capped at the distance's rep ceiling.
fn baseline_reps(session_index: u32, distance: &DistanceConfig, cfg: &PrescriptionConfig) -> u32 {
    let increments = session_index / cfg.sessions_per_increment.max(1);
    (cfg.base_reps + increments).min(distance.max_reps)
}

/// Prescribe rep counts for each distance
///
/// When readiness is below the reduced-volume threshold the baseline is
/// halved (floor of 1). A reduced prescription can never exceed the
/// normal one for the same session index and distance.
pub fn sprint_reps(
    session_index: u32,
    readiness_score: u8,
    distances: &[DistanceConfig],
    prescription_cfg: &PrescriptionConfig,
    readiness_cfg: &ReadinessConfig,
) -> Vec<SprintPrescription> {
    let reduced = readiness_score < readiness_cfg.reduced_volume_threshold;
    if reduced {
        tracing::info!(
            "Readiness {} below threshold {}, reducing sprint volume",
            readiness_score,
            readiness_cfg.reduced_volume_threshold
        );
    }

    distances
        .iter()
        .map(|distance| {
            let baseline = baseline_reps(session_index, distance, prescription_cfg);
            let reps = if reduced {
                (baseline / 2).max(1)
            } else {
                baseline
            };

            SprintPrescription {
                distance_key: distance.key.clone(),
                reps,
                barefoot_eligible: barefoot_allowed(
                    session_index,
                    readiness_score,
                    distance,
                    prescription_cfg,
                ),
            }
        })
        .collect()
}

/// Whether barefoot work may be offered for a distance today
///
/// Requires all three gates: the athlete has reached the introduction
/// session, readiness is at or above the safety threshold, and the
/// distance is within the short-distance cap.
pub fn barefoot_allowed(
    session_index: u32,
    readiness_score: u8,
    distance: &DistanceConfig,
    cfg: &PrescriptionConfig,
) -> bool {
    session_index >= cfg.barefoot_intro_session
        && readiness_score >= cfg.barefoot_min_readiness
        && distance.meters <= cfg.barefoot_max_distance_m
}

/// Decide whether today is a mandatory recovery day
///
/// An externally supplied flag wins outright. Otherwise the decision is
/// derived from the check-in: readiness below the break threshold, or a
/// pain map wide enough to cross the pain-area threshold. Deterministic;
/// the only way past a `true` here is the explicit override edge of the
/// session flow.
pub fn break_day(
    readiness_score: u8,
    input: &ReadinessInput,
    forced: Option<bool>,
    cfg: &ReadinessConfig,
) -> bool {
    if let Some(flag) = forced {
        tracing::info!("Break-day flag supplied externally: {}", flag);
        return flag;
    }

    if readiness_score < cfg.break_day_threshold {
        tracing::info!(
            "Readiness {} below break threshold {}, forcing recovery day",
            readiness_score,
            cfg.break_day_threshold
        );
        return true;
    }

    if input.pain_areas.len() >= cfg.pain_break_areas {
        tracing::info!(
            "{} pain areas reported (threshold {}), forcing recovery day",
            input.pain_areas.len(),
            cfg.pain_break_areas
        );
        return true;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::build_default_catalog;
    use crate::types::{BodyFeel, PainArea};

    fn configs() -> (PrescriptionConfig, ReadinessConfig) {
        (PrescriptionConfig::default(), ReadinessConfig::default())
    }

    #[test]
    fn test_reps_grow_with_session_index() {
        let catalog = build_default_catalog();
        let (p_cfg, r_cfg) = configs();

        let early = sprint_reps(0, 80, &catalog.distances, &p_cfg, &r_cfg);
        let later = sprint_reps(6, 80, &catalog.distances, &p_cfg, &r_cfg);

        for (e, l) in early.iter().zip(later.iter()) {
            assert!(l.reps >= e.reps, "reps shrank for {}", e.distance_key);
        }
        // 10m ceiling is 6: base 2 + 6/2 increments = 5
        assert_eq!(later[0].reps, 5);
    }

    #[test]
    fn test_reps_capped_at_distance_ceiling() {
        let catalog = build_default_catalog();
        let (p_cfg, r_cfg) = configs();

        let late = sprint_reps(100, 90, &catalog.distances, &p_cfg, &r_cfg);
        for (prescription, distance) in late.iter().zip(catalog.distances.iter()) {
            assert!(prescription.reps <= distance.max_reps);
        }
    }

    #[test]
    fn test_low_readiness_never_exceeds_normal() {
        let catalog = build_default_catalog();
        let (p_cfg, r_cfg) = configs();

        for session_index in [0, 2, 5, 9, 40] {
            let low = sprint_reps(session_index, 45, &catalog.distances, &p_cfg, &r_cfg);
            let normal = sprint_reps(session_index, 85, &catalog.distances, &p_cfg, &r_cfg);

            for (l, n) in low.iter().zip(normal.iter()) {
                assert!(
                    l.reps <= n.reps,
                    "reduced reps {} exceeded normal {} at index {} for {}",
                    l.reps,
                    n.reps,
                    session_index,
                    l.distance_key
                );
            }
        }
    }

    #[test]
    fn test_reduced_reps_floor_at_one() {
        let catalog = build_default_catalog();
        let (p_cfg, r_cfg) = configs();

        let low = sprint_reps(0, 10, &catalog.distances, &p_cfg, &r_cfg);
        for prescription in &low {
            assert!(prescription.reps >= 1);
        }
    }

    #[test]
    fn test_barefoot_blocked_by_low_readiness() {
        let catalog = build_default_catalog();
        let (p_cfg, _) = configs();
        let short = catalog.distance("10m").unwrap();

        for session_index in [0, 3, 10, 50] {
            assert!(!barefoot_allowed(session_index, 69, short, &p_cfg));
        }
    }

    #[test]
    fn test_barefoot_blocked_before_intro_session() {
        let catalog = build_default_catalog();
        let (p_cfg, _) = configs();
        let short = catalog.distance("10m").unwrap();

        assert!(!barefoot_allowed(0, 95, short, &p_cfg));
        assert!(!barefoot_allowed(2, 95, short, &p_cfg));
        assert!(barefoot_allowed(3, 95, short, &p_cfg));
    }

    #[test]
    fn test_barefoot_limited_to_short_distances() {
        let catalog = build_default_catalog();
        let (p_cfg, _) = configs();

        assert!(barefoot_allowed(5, 90, catalog.distance("40m").unwrap(), &p_cfg));
        assert!(!barefoot_allowed(5, 90, catalog.distance("60m").unwrap(), &p_cfg));
    }

    #[test]
    fn test_break_day_forced_flag_wins() {
        let (_, r_cfg) = configs();
        let input = ReadinessInput {
            sleep_rating: 5,
            body_feel: BodyFeel::Good,
            pain_areas: vec![],
        };

        assert!(break_day(100, &input, Some(true), &r_cfg));
        assert!(!break_day(10, &input, Some(false), &r_cfg));
    }

    #[test]
    fn test_break_day_from_low_readiness() {
        let (_, r_cfg) = configs();
        let input = ReadinessInput {
            sleep_rating: 1,
            body_feel: BodyFeel::Tight,
            pain_areas: vec![],
        };

        assert!(break_day(30, &input, None, &r_cfg));
        assert!(!break_day(40, &input, None, &r_cfg));
    }

    #[test]
    fn test_break_day_from_pain_map() {
        let (_, r_cfg) = configs();
        let input = ReadinessInput {
            sleep_rating: 4,
            body_feel: BodyFeel::Okay,
            pain_areas: vec![PainArea::Hamstring, PainArea::Calf, PainArea::Knee],
        };

        assert!(break_day(75, &input, None, &r_cfg));
    }
}
