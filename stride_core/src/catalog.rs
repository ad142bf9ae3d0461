//! Default catalog of sprint distances and warm-up drills.
//!
//! This module provides the built-in distances and drills for the system.
//! Catalogs are static configuration: the engine never computes them.

use crate::types::*;
use once_cell::sync::Lazy;

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog_internal);

/// Get a reference to the cached default catalog
///
/// This function returns a reference to the pre-built catalog, avoiding
/// the overhead of rebuilding it on every operation.
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Builds the default catalog with built-in distances and drills
///
/// **Note**: For production use, prefer `get_default_catalog()` which returns a
/// cached reference. This function is retained for testing and custom catalog creation.
pub fn build_default_catalog() -> Catalog {
    build_default_catalog_internal()
}

/// Internal function that actually builds the catalog
fn build_default_catalog_internal() -> Catalog {
    let distances = vec![
        DistanceConfig {
            key: "10m".into(),
            label: "10 m acceleration".into(),
            meters: 10,
            max_reps: 6,
        },
        DistanceConfig {
            key: "20m".into(),
            label: "20 m acceleration".into(),
            meters: 20,
            max_reps: 5,
        },
        DistanceConfig {
            key: "30m".into(),
            label: "30 m build-up".into(),
            meters: 30,
            max_reps: 4,
        },
        DistanceConfig {
            key: "40m".into(),
            label: "40 m fly".into(),
            meters: 40,
            max_reps: 3,
        },
        DistanceConfig {
            key: "60m".into(),
            label: "60 m max velocity".into(),
            meters: 60,
            max_reps: 3,
        },
    ];

    let drills = vec![
        Drill {
            id: "wall_drive".into(),
            name: "Wall Drive".into(),
            cue: "Lean into the wall, punch the knee through, hold the line".into(),
            reference_url: Some("https://www.youtube.com/watch?v=HkAZ2JMCnJE".into()),
        },
        Drill {
            id: "a_skip".into(),
            name: "A-Skip".into(),
            cue: "Tall posture, knee up, toe up, strike under the hips".into(),
            reference_url: Some("https://www.youtube.com/watch?v=rLLXbGTIdYk".into()),
        },
        Drill {
            id: "b_skip".into(),
            name: "B-Skip".into(),
            cue: "Extend, then paw the ground back; keep the rhythm".into(),
            reference_url: Some("https://www.youtube.com/watch?v=7DLY4g5t4zQ".into()),
        },
        Drill {
            id: "ankle_dribble".into(),
            name: "Ankle Dribble".into(),
            cue: "Quick low steps, stiff ankles, roll off the big toe".into(),
            reference_url: None,
        },
        Drill {
            id: "high_knee_run".into(),
            name: "High-Knee Run".into(),
            cue: "Fast ground contacts, arms driving, hips tall".into(),
            reference_url: None,
        },
    ];

    Catalog { distances, drills }
}

impl Catalog {
    /// Validate the catalog for consistency and completeness
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let mut seen_keys = std::collections::HashSet::new();
        for distance in &self.distances {
            if distance.key.is_empty() {
                errors.push("Distance has empty key".to_string());
            }
            if !seen_keys.insert(&distance.key) {
                errors.push(format!("Duplicate distance key '{}'", distance.key));
            }
            if distance.label.is_empty() {
                errors.push(format!("Distance '{}' has empty label", distance.key));
            }
            if distance.meters == 0 {
                errors.push(format!("Distance '{}' has zero length", distance.key));
            }
            if distance.max_reps == 0 {
                errors.push(format!(
                    "Distance '{}' has a zero rep ceiling",
                    distance.key
                ));
            }
        }

        let mut seen_ids = std::collections::HashSet::new();
        for drill in &self.drills {
            if drill.id.is_empty() {
                errors.push("Drill has empty ID".to_string());
            }
            if !seen_ids.insert(&drill.id) {
                errors.push(format!("Duplicate drill ID '{}'", drill.id));
            }
            if drill.name.is_empty() {
                errors.push(format!("Drill '{}' has empty name", drill.id));
            }
        }

        if self.distances.is_empty() {
            errors.push("Catalog has no distances".to_string());
        }
        if self.drills.is_empty() {
            errors.push("Catalog has no drills".to_string());
        }

        errors
    }

    /// Look up a distance by key
    pub fn distance(&self, key: &str) -> Option<&DistanceConfig> {
        self.distances.iter().find(|d| d.key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_loads() {
        let catalog = build_default_catalog();
        assert_eq!(catalog.distances.len(), 5);
        assert_eq!(catalog.drills.len(), 5);
    }

    #[test]
    fn test_default_catalog_validates() {
        let catalog = build_default_catalog();
        let errors = catalog.validate();
        assert!(
            errors.is_empty(),
            "Default catalog has validation errors: {:?}",
            errors
        );
    }

    #[test]
    fn test_distances_sorted_short_to_long() {
        let catalog = build_default_catalog();
        let meters: Vec<u32> = catalog.distances.iter().map(|d| d.meters).collect();
        let mut sorted = meters.clone();
        sorted.sort_unstable();
        assert_eq!(meters, sorted);
    }

    #[test]
    fn test_distance_lookup() {
        let catalog = build_default_catalog();
        assert!(catalog.distance("30m").is_some());
        assert!(catalog.distance("500m").is_none());
    }

    #[test]
    fn test_duplicate_distance_key_detected() {
        let mut catalog = build_default_catalog();
        let dup = catalog.distances[0].clone();
        catalog.distances.push(dup);

        let errors = catalog.validate();
        assert!(errors.iter().any(|e| e.contains("Duplicate distance key")));
    }
}
