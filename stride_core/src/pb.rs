//! Personal-best detection.
//!
//! Pure comparison of newly logged times against stored bests. Mutating
//! the stored bests is the recorder's job; this module only reports what
//! was beaten.

use crate::types::NewBest;
use std::collections::HashMap;

/// Normalize a raw time entry to seconds
///
/// Non-numeric, negative, or non-finite input becomes 0.0, which is
/// excluded from personal-best comparison downstream.
pub fn sanitize_time(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => value,
        _ => 0.0,
    }
}

/// Minimum strictly-positive time in a list, if any
fn best_valid_time(times: &[f64]) -> Option<f64> {
    times
        .iter()
        .copied()
        .filter(|t| *t > 0.0)
        .min_by(|a, b| a.total_cmp(b))
}

/// Compare recorded times against stored bests
///
/// A distance is newly bested when it has at least one valid (> 0) time
/// and either no prior best exists or the new minimum is strictly lower.
/// Output order follows ascending distance key for stable display.
pub fn detect_new_bests(
    times: &HashMap<String, Vec<f64>>,
    prior_bests: &HashMap<String, f64>,
) -> Vec<NewBest> {
    let mut bests: Vec<NewBest> = times
        .iter()
        .filter_map(|(key, recorded)| {
            let minimum = best_valid_time(recorded)?;
            let previous = prior_bests.get(key).copied();

            match previous {
                Some(prior) if minimum >= prior => None,
                _ => Some(NewBest {
                    distance_key: key.clone(),
                    seconds: minimum,
                    previous,
                }),
            }
        })
        .collect();

    bests.sort_by(|a, b| a.distance_key.cmp(&b.distance_key));
    bests
}

#[cfg(test)]
mod tests {
    use super::*;

    fn times(entries: &[(&str, &[f64])]) -> HashMap<String, Vec<f64>> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_vec()))
            .collect()
    }

    fn priors(entries: &[(&str, f64)]) -> HashMap<String, f64> {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_new_best_on_strictly_lower_minimum() {
        let recorded = times(&[("60m", &[12.40, 13.00])]);
        let stored = priors(&[("60m", 12.50)]);

        let bests = detect_new_bests(&recorded, &stored);
        assert_eq!(bests.len(), 1);
        assert_eq!(bests[0].distance_key, "60m");
        assert!((bests[0].seconds - 12.40).abs() < f64::EPSILON);
        assert_eq!(bests[0].previous, Some(12.50));
    }

    #[test]
    fn test_no_best_when_slower() {
        let recorded = times(&[("60m", &[13.00, 13.50])]);
        let stored = priors(&[("60m", 12.50)]);

        assert!(detect_new_bests(&recorded, &stored).is_empty());
    }

    #[test]
    fn test_equal_time_is_not_a_best() {
        let recorded = times(&[("30m", &[4.31])]);
        let stored = priors(&[("30m", 4.31)]);

        assert!(detect_new_bests(&recorded, &stored).is_empty());
    }

    #[test]
    fn test_first_valid_time_is_a_best() {
        let recorded = times(&[("20m", &[3.10])]);
        let stored = priors(&[]);

        let bests = detect_new_bests(&recorded, &stored);
        assert_eq!(bests.len(), 1);
        assert_eq!(bests[0].previous, None);
    }

    #[test]
    fn test_zeros_are_ignored() {
        let recorded = times(&[("20m", &[0.0, 0.0])]);
        let stored = priors(&[("20m", 3.20)]);

        // Sanitized-away entries must never look like instant sprints
        assert!(detect_new_bests(&recorded, &stored).is_empty());
    }

    #[test]
    fn test_mixed_zeros_and_valid_times() {
        let recorded = times(&[("20m", &[0.0, 3.05, 0.0])]);
        let stored = priors(&[("20m", 3.20)]);

        let bests = detect_new_bests(&recorded, &stored);
        assert_eq!(bests.len(), 1);
        assert!((bests[0].seconds - 3.05).abs() < f64::EPSILON);
    }

    #[test]
    fn test_sanitize_time() {
        assert_eq!(sanitize_time("4.31"), 4.31);
        assert_eq!(sanitize_time("  4.31  "), 4.31);
        assert_eq!(sanitize_time("-2.0"), 0.0);
        assert_eq!(sanitize_time("0"), 0.0);
        assert_eq!(sanitize_time("fast"), 0.0);
        assert_eq!(sanitize_time(""), 0.0);
        assert_eq!(sanitize_time("NaN"), 0.0);
        assert_eq!(sanitize_time("inf"), 0.0);
    }

    #[test]
    fn test_multiple_distances_sorted() {
        let recorded = times(&[("60m", &[9.0]), ("10m", &[1.8]), ("30m", &[4.2])]);
        let stored = priors(&[]);

        let bests = detect_new_bests(&recorded, &stored);
        let keys: Vec<&str> = bests.iter().map(|b| b.distance_key.as_str()).collect();
        assert_eq!(keys, vec!["10m", "30m", "60m"]);
    }
}
