//! Collapse near-duplicate candidates.

use crate::color::delta_e;
use crate::config::MergeConfig;
use crate::recall::Candidate;

impl MergeConfig {
    /// ΔE below which two colors are folded together. Dark shades are hard
    /// to tell apart, so the threshold widens if either side is dark.
    pub fn threshold_for(&self, a: &Candidate, b: &Candidate) -> f32 {
        if a.lab.l < self.dark_lightness || b.lab.l < self.dark_lightness {
            self.dark_threshold
        } else {
            self.threshold
        }
    }
}

/// Merge candidates heaviest-first.
///
/// Each candidate folds its weight into the first already-kept entry within
/// the merge threshold; the kept entry's color is left as is. Otherwise it is
/// kept as a new entry. The result is in descending weight order of the
/// entries' first appearance.
pub fn merge_candidates(mut candidates: Vec<Candidate>, config: &MergeConfig) -> Vec<Candidate> {
    // Stable, so equal weights keep their input order.
    candidates.sort_by(|a, b| b.weight.cmp(&a.weight));

    let mut merged: Vec<Candidate> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        match merged
            .iter_mut()
            .find(|m| delta_e(&candidate.lab, &m.lab) < config.threshold_for(&candidate, m))
        {
            Some(existing) => existing.weight += candidate.weight,
            None => merged.push(candidate),
        }
    }

    tracing::debug!(merged = merged.len(), "merged near-duplicate candidates");
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use palette::{Lab, Srgb};

    fn candidate(l: f32, a: f32, b: f32, weight: u32) -> Candidate {
        Candidate::new(Srgb::new(0.5, 0.5, 0.5), Lab::new(l, a, b), weight)
    }

    #[test]
    fn test_close_colors_collapse() {
        let merged = merge_candidates(
            vec![candidate(50.0, 10.0, 10.0, 5), candidate(52.0, 12.0, 13.0, 20)],
            &MergeConfig::default(),
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].weight, 25);
        // The heavier entry keeps its color.
        assert_eq!(merged[0].lab, Lab::new(52.0, 12.0, 13.0));
    }

    #[test]
    fn test_dark_pair_uses_wider_threshold() {
        // ΔE = 8: between the normal and the dark threshold.
        let dark = vec![candidate(10.0, 0.0, 0.0, 10), candidate(18.0, 0.0, 0.0, 4)];
        let merged = merge_candidates(dark, &MergeConfig::default());
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].weight, 14);

        let light = vec![candidate(40.0, 0.0, 0.0, 10), candidate(48.0, 0.0, 0.0, 4)];
        let merged = merge_candidates(light, &MergeConfig::default());
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_one_dark_side_is_enough() {
        let merged = merge_candidates(
            vec![candidate(25.0, 0.0, 0.0, 10), candidate(15.0, 0.0, 0.0, 4)],
            &MergeConfig::default(),
        );
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn test_folds_into_first_match_without_reaveraging() {
        let merged = merge_candidates(
            vec![
                candidate(60.0, 0.0, 0.0, 100),
                candidate(70.0, 0.0, 0.0, 50),
                candidate(65.5, 0.0, 0.0, 10),
                candidate(64.0, 0.0, 0.0, 5),
            ],
            &MergeConfig::default(),
        );
        // 65.5 is within 6 of both kept entries and goes to the heavier one;
        // 64 then still compares against the unchanged 60.
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].lab.l, 60.0);
        assert_eq!(merged[0].weight, 115);
        assert_eq!(merged[1].weight, 50);
    }

    #[test]
    fn test_distant_colors_kept_in_weight_order() {
        let merged = merge_candidates(
            vec![
                candidate(30.0, 40.0, 0.0, 3),
                candidate(80.0, -20.0, 50.0, 9),
                candidate(50.0, 0.0, -60.0, 6),
            ],
            &MergeConfig::default(),
        );
        let weights: Vec<u32> = merged.iter().map(|c| c.weight).collect();
        assert_eq!(weights, vec![9, 6, 3]);
    }
}
