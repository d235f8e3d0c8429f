//! Weighted k-means in Lab space.
//!
//! Seeding is a k-means++ variant: the heaviest color and (when it is far
//! enough away) the most saturated color are always seeds, the rest are drawn
//! with probability proportional to squared ΔE from the nearest seed. Lloyd
//! iteration then weights every point by its pixel count.

use palette::{Lab, Srgb};
use rand::Rng;

use crate::color::{chroma, delta_e};
use crate::sample::WeightedColor;
use crate::{PaletteError, Result};

/// Final centroids and, per centroid, the indices of its member points.
///
/// `centroids[i]` is the update computed from `clusters[i]`, except for
/// clusters that came out empty on the last pass: those hold the random point
/// they were re-seeded with.
#[derive(Debug, Clone)]
pub struct Clustering {
    pub centroids: Vec<WeightedColor>,
    pub clusters: Vec<Vec<usize>>,
    pub iterations: usize,
}

impl Clustering {
    /// Total pixel weight of the points assigned to cluster `index`.
    pub fn cluster_weight(&self, points: &[WeightedColor], index: usize) -> u32 {
        self.clusters[index].iter().map(|&i| points[i].weight).sum()
    }
}

/// Choose `k` initial centroids.
pub fn seed_centroids<R: Rng + ?Sized>(
    points: &[WeightedColor],
    k: usize,
    min_seed_distance: f32,
    rng: &mut R,
) -> Result<Vec<WeightedColor>> {
    if points.is_empty() {
        return Err(PaletteError::EmptyPointSet);
    }
    let mut seeds = Vec::with_capacity(k);
    if k == 0 {
        return Ok(seeds);
    }

    // Heaviest color; first one wins ties.
    let mut heaviest = &points[0];
    for p in &points[1..] {
        if p.weight > heaviest.weight {
            heaviest = p;
        }
    }
    seeds.push(*heaviest);

    if seeds.len() < k {
        if let Some(vivid) = vivid_seed(points, heaviest, min_seed_distance) {
            seeds.push(vivid);
        }
    }

    while seeds.len() < k {
        let distances: Vec<f32> = points
            .iter()
            .map(|p| {
                seeds
                    .iter()
                    .map(|s| {
                        let d = delta_e(&p.lab, &s.lab);
                        d * d
                    })
                    .fold(f32::INFINITY, f32::min)
            })
            .collect();

        let total: f64 = distances.iter().map(|&d| d as f64).sum();
        let mut remaining = rng.random::<f64>() * total;
        let mut chosen = None;
        // Points sitting exactly on a seed are never drawn again.
        for (i, &d) in distances.iter().enumerate() {
            if d <= 0.0 {
                continue;
            }
            remaining -= d as f64;
            if remaining <= 0.0 {
                chosen = Some(i);
                break;
            }
        }
        let index = chosen
            .or_else(|| distances.iter().rposition(|&d| d > 0.0))
            .unwrap_or(points.len() - 1);
        seeds.push(points[index]);
    }

    Ok(seeds)
}

/// The most saturated point, if it lies more than `min_distance` from `first`.
fn vivid_seed(
    points: &[WeightedColor],
    first: &WeightedColor,
    min_distance: f32,
) -> Option<WeightedColor> {
    let mut vivid = points.first()?;
    let mut vivid_chroma = chroma(&vivid.lab);
    for p in &points[1..] {
        let c = chroma(&p.lab);
        if c > vivid_chroma {
            vivid = p;
            vivid_chroma = c;
        }
    }
    (delta_e(&vivid.lab, &first.lab) > min_distance).then_some(*vivid)
}

/// Index of the centroid nearest to `lab`; the lowest index wins ties.
fn nearest_centroid(lab: &Lab, centroids: &[WeightedColor]) -> usize {
    let mut best = 0;
    let mut best_dist = f32::INFINITY;
    for (i, c) in centroids.iter().enumerate() {
        let d = delta_e(lab, &c.lab);
        if d < best_dist {
            best_dist = d;
            best = i;
        }
    }
    best
}

fn assign(points: &[WeightedColor], centroids: &[WeightedColor]) -> Vec<Vec<usize>> {
    let mut clusters = vec![Vec::new(); centroids.len()];
    for (i, p) in points.iter().enumerate() {
        clusters[nearest_centroid(&p.lab, centroids)].push(i);
    }
    clusters
}

/// Weighted mean of the members' Lab and, separately, of their RGB.
///
/// The RGB mean is not re-derived from the Lab mean, so the two may disagree
/// slightly; Lab drives clustering and RGB drives display.
fn weighted_mean(points: &[WeightedColor], members: &[usize]) -> WeightedColor {
    let mut lab = [0.0f64; 3];
    let mut rgb = [0.0f64; 3];
    let mut total = 0u32;
    for &i in members {
        let p = &points[i];
        let w = p.weight as f64;
        lab[0] += p.lab.l as f64 * w;
        lab[1] += p.lab.a as f64 * w;
        lab[2] += p.lab.b as f64 * w;
        rgb[0] += p.rgb.red as f64 * w;
        rgb[1] += p.rgb.green as f64 * w;
        rgb[2] += p.rgb.blue as f64 * w;
        total += p.weight;
    }
    let t = total as f64;
    WeightedColor {
        rgb: Srgb::new((rgb[0] / t) as f32, (rgb[1] / t) as f32, (rgb[2] / t) as f32),
        lab: Lab::new((lab[0] / t) as f32, (lab[1] / t) as f32, (lab[2] / t) as f32),
        weight: total,
    }
}

fn random_point<R: Rng + ?Sized>(points: &[WeightedColor], rng: &mut R) -> Result<WeightedColor> {
    if points.is_empty() {
        return Err(PaletteError::EmptyPointSet);
    }
    Ok(points[rng.random_range(0..points.len())])
}

/// Run weighted Lloyd iteration from k-means++ seeds.
///
/// Stops after `max_iterations` passes or once the summed ΔE movement of all
/// centroids in a pass falls below `convergence_threshold`.
pub fn kmeans<R: Rng + ?Sized>(
    points: &[WeightedColor],
    k: usize,
    max_iterations: usize,
    convergence_threshold: f32,
    min_seed_distance: f32,
    rng: &mut R,
) -> Result<Clustering> {
    if k == 0 {
        return Err(PaletteError::invalid("k", k));
    }
    let mut centroids = seed_centroids(points, k, min_seed_distance, rng)?;
    let mut clusters = vec![Vec::new(); centroids.len()];
    let mut iterations = 0;

    while iterations < max_iterations {
        iterations += 1;
        clusters = assign(points, &centroids);

        let mut updated = Vec::with_capacity(centroids.len());
        for members in &clusters {
            if members.is_empty() {
                updated.push(random_point(points, rng)?);
            } else {
                updated.push(weighted_mean(points, members));
            }
        }

        let movement: f32 = centroids
            .iter()
            .zip(&updated)
            .map(|(old, new)| delta_e(&old.lab, &new.lab))
            .sum();
        centroids = updated;

        tracing::trace!(iteration = iterations, movement, "lloyd pass");
        if movement < convergence_threshold {
            break;
        }
    }

    tracing::debug!(
        points = points.len(),
        k = centroids.len(),
        iterations,
        "k-means finished"
    );

    Ok(Clustering {
        centroids,
        clusters,
        iterations,
    })
}
