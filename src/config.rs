//! Tunable parameters for the extraction pipeline.
//!
//! Every threshold used by sampling, clustering, outlier recall, merging,
//! selection and role assignment lives here. The defaults reproduce the
//! behaviour of the palette tool this crate powers; a JSON file may override
//! any subset of them:
//!
//! ```no_run
//! use image_to_palette_wasm::PaletteConfig;
//! use std::path::Path;
//!
//! let config = PaletteConfig::from_json_file(Path::new("palette.json"))?;
//! # Ok::<(), image_to_palette_wasm::PaletteError>(())
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{PaletteError, Result};

/// Complete pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    /// Long-edge limit applied when downsampling decoded images.
    pub max_sample_side: u32,
    /// Pixels with alpha below this are ignored.
    pub alpha_threshold: u8,
    /// Channel quantization step used as the deduplication key.
    pub quantize_step: u8,
    /// Clusters requested per palette color.
    pub clusters_per_color: usize,
    /// Lower bound on the cluster count (still capped by the point count).
    pub min_clusters: usize,
    pub max_iterations: usize,
    /// Lloyd iteration stops once total centroid movement (ΔE) drops below this.
    pub convergence_threshold: f32,
    /// The most saturated point only becomes the second seed if it is
    /// farther than this from the first.
    pub seed_min_distance: f32,
    pub recall: RecallConfig,
    pub merge: MergeConfig,
    pub selection: SelectionConfig,
    /// Maximum number of entries labelled secondary.
    pub max_secondaries: usize,
}

/// Outlier recall thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecallConfig {
    /// A member must be more saturated than this to be recalled.
    pub point_min_chroma: f32,
    /// ...and its cluster centroid less saturated than this.
    pub centroid_max_chroma: f32,
    /// Recalled weight as a fraction of the cluster's member count (rounded up).
    pub weight_fraction: f64,
}

/// Near-duplicate merging thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    pub threshold: f32,
    /// Wider threshold used when either color is dark.
    pub dark_threshold: f32,
    /// Lightness below which a color counts as dark.
    pub dark_lightness: f32,
}

/// Final selection and primary-role thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// A "balanced" color is more saturated than this...
    pub balanced_min_chroma: f32,
    /// ...and has lightness strictly inside these bounds.
    pub balanced_lightness: (f32, f32),
    pub accent_min_distance: f32,
    pub accent_min_chroma: f32,
    /// Candidates closer than this to the selection are skipped by the greedy fill.
    pub min_distinct_distance: f32,
    /// Chroma divisor in the greedy score's saturation bonus.
    pub chroma_scale: f32,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            max_sample_side: 150,
            alpha_threshold: 128,
            quantize_step: 5,
            clusters_per_color: 5,
            min_clusters: 32,
            max_iterations: 20,
            convergence_threshold: 1.0,
            seed_min_distance: 10.0,
            recall: RecallConfig::default(),
            merge: MergeConfig::default(),
            selection: SelectionConfig::default(),
            max_secondaries: 2,
        }
    }
}

impl Default for RecallConfig {
    fn default() -> Self {
        Self {
            point_min_chroma: 30.0,
            centroid_max_chroma: 20.0,
            weight_fraction: 0.1,
        }
    }
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            threshold: 6.0,
            dark_threshold: 12.0,
            dark_lightness: 20.0,
        }
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            balanced_min_chroma: 10.0,
            balanced_lightness: (15.0, 90.0),
            accent_min_distance: 10.0,
            accent_min_chroma: 15.0,
            min_distinct_distance: 5.0,
            chroma_scale: 20.0,
        }
    }
}

impl PaletteConfig {
    /// Cluster count for a point set: `min(points, max(target * per_color, min_clusters))`.
    pub fn cluster_count(&self, num_points: usize, target_count: usize) -> usize {
        num_points.min(
            target_count
                .saturating_mul(self.clusters_per_color)
                .max(self.min_clusters),
        )
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.max_sample_side == 0 {
            return Err(PaletteError::invalid("max_sample_side", self.max_sample_side));
        }
        if self.quantize_step == 0 {
            return Err(PaletteError::invalid("quantize_step", self.quantize_step));
        }
        if self.clusters_per_color.max(self.min_clusters) == 0 {
            return Err(PaletteError::invalid(
                "clusters_per_color/min_clusters",
                "both 0",
            ));
        }
        if self.max_iterations == 0 {
            return Err(PaletteError::invalid("max_iterations", self.max_iterations));
        }
        let (low, high) = self.selection.balanced_lightness;
        if low >= high {
            return Err(PaletteError::invalid(
                "selection.balanced_lightness",
                format!("({low}, {high})"),
            ));
        }
        let fraction = self.recall.weight_fraction;
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(PaletteError::invalid(
                "recall.weight_fraction",
                self.recall.weight_fraction,
            ));
        }
        Ok(())
    }

    /// Load and validate a configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
