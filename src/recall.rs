//! Turn a clustering into palette candidates, rescuing vivid colors that
//! were averaged into dull clusters.

use palette::{Lab, Srgb};

use crate::color::chroma;
use crate::config::RecallConfig;
use crate::kmeans::Clustering;
use crate::sample::WeightedColor;

/// A color competing for a palette slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub rgb: Srgb<f32>,
    pub lab: Lab,
    pub weight: u32,
    pub chroma: f32,
}

impl Candidate {
    pub fn new(rgb: Srgb<f32>, lab: Lab, weight: u32) -> Self {
        Self {
            rgb,
            lab,
            weight,
            chroma: chroma(&lab),
        }
    }
}

impl From<WeightedColor> for Candidate {
    fn from(color: WeightedColor) -> Self {
        Self::new(color.rgb, color.lab, color.weight)
    }
}

/// One candidate per non-empty cluster, weighted by its members' total weight.
pub fn centroid_candidates(points: &[WeightedColor], clustering: &Clustering) -> Vec<Candidate> {
    clustering
        .centroids
        .iter()
        .enumerate()
        .filter(|(i, _)| !clustering.clusters[*i].is_empty())
        .map(|(i, c)| Candidate::new(c.rgb, c.lab, clustering.cluster_weight(points, i)))
        .collect()
}

/// Recover vivid members of dull clusters.
///
/// For each cluster, the most saturated member is recalled when its chroma
/// exceeds `point_min_chroma` while the centroid's stays below
/// `centroid_max_chroma`. Its weight is `ceil(weight_fraction × member count)`, at least 1,
/// small enough not to outweigh genuine clusters.
pub fn recall_outliers(
    points: &[WeightedColor],
    clustering: &Clustering,
    config: &RecallConfig,
) -> Vec<Candidate> {
    let mut recalled = Vec::new();

    for (members, centroid) in clustering.clusters.iter().zip(&clustering.centroids) {
        let Some((vivid, vivid_chroma)) = members
            .iter()
            .map(|&i| (&points[i], chroma(&points[i].lab)))
            .fold(None, |best: Option<(&WeightedColor, f32)>, (p, c)| match best {
                Some((_, best_c)) if best_c >= c => best,
                _ => Some((p, c)),
            })
        else {
            continue;
        };

        if vivid_chroma > config.point_min_chroma
            && chroma(&centroid.lab) < config.centroid_max_chroma
        {
            let weight = ((members.len() as f64 * config.weight_fraction).ceil() as u32).max(1);
            recalled.push(Candidate {
                rgb: vivid.rgb,
                lab: vivid.lab,
                weight,
                chroma: vivid_chroma,
            });
        }
    }

    if !recalled.is_empty() {
        tracing::debug!(count = recalled.len(), "recalled vivid outliers");
    }
    recalled
}
