//! Extract a small, role-labelled color palette from an image.
//!
//! Steps performed by [`extract_palette`]:
//! 1. Deduplicate opaque pixels into weighted colors (quantized RGB keys).
//! 2. Run weighted k-means in Lab with `k = max(target × 5, 32)` clusters.
//! 3. Recall vivid colors that were averaged into dull clusters.
//! 4. Merge near-duplicates (ΔE < 6, or < 12 for dark shades).
//! 5. Select the final colors: a balanced primary, an accent, then a greedy
//!    fill that trades off distinctiveness, weight and saturation.
//! 6. Label them primary / neutral / accent / secondary / supplementary.
//!
//! The browser calls [`extract_palette_rgba`] with canvas pixels; native
//! callers can hand an encoded image to [`extract_palette_bytes`].

use js_sys::{Array, Object, Reflect};
use palette::Lab;
use rand::Rng;
use wasm_bindgen::prelude::*;

pub mod color;
pub mod config;
pub mod error;
pub mod image_input;
pub mod kmeans;
pub mod merge;
pub mod recall;
pub mod roles;
pub mod sample;
pub mod select;

pub use config::PaletteConfig;
pub use error::{PaletteError, Result};
pub use recall::Candidate;
pub use roles::{PaletteEntry, Role};
pub use sample::{RgbaBuffer, WeightedColor};

/// Run the full pipeline over an RGBA buffer.
///
/// The buffer is expected to be downsampled already (see
/// [`image_input::downsample`]). Randomness for seeding and empty-cluster
/// re-seeding comes from `rng` only.
pub fn extract_palette<R: Rng + ?Sized>(
    buffer: &RgbaBuffer<'_>,
    target_count: usize,
    config: &PaletteConfig,
    rng: &mut R,
) -> Result<Vec<PaletteEntry>> {
    config.validate()?;
    if target_count == 0 {
        return Ok(Vec::new());
    }

    let points = sample::sample_colors(buffer, config.alpha_threshold, config.quantize_step);
    if points.is_empty() {
        return Ok(Vec::new());
    }
    if points.len() <= target_count {
        return Ok(unclustered_palette(points));
    }

    let k = config.cluster_count(points.len(), target_count);
    let clustering = kmeans::kmeans(
        &points,
        k,
        config.max_iterations,
        config.convergence_threshold,
        config.seed_min_distance,
        rng,
    )?;

    let mut candidates = recall::centroid_candidates(&points, &clustering);
    candidates.extend(recall::recall_outliers(&points, &clustering, &config.recall));
    let merged = merge::merge_candidates(candidates, &config.merge);
    let selection = select::select_colors(merged, target_count, &config.selection);

    tracing::debug!(
        target_count,
        selected = selection.len(),
        "palette selection complete"
    );
    Ok(roles::assign_roles(
        selection,
        config.max_secondaries,
        &config.selection,
    ))
}

/// Palette for images with no more distinct colors than requested: every
/// sampled color as is, heaviest first, each with an equal share.
///
/// Entries are neutral, except that a single-color image yields one primary.
fn unclustered_palette(mut points: Vec<WeightedColor>) -> Vec<PaletteEntry> {
    points.sort_by(|a, b| b.weight.cmp(&a.weight));
    let share = roles::percentage(1, points.len() as u32);
    let role = if points.len() == 1 {
        Role::Primary
    } else {
        Role::Neutral
    };
    points
        .into_iter()
        .map(|p| PaletteEntry::new(p.rgb, p.lab, share, role))
        .collect()
}

/// Decode an encoded image (PNG, JPEG, ...), downsample it and extract a
/// palette using the thread RNG.
#[cfg(not(target_arch = "wasm32"))]
pub fn extract_palette_bytes(
    input: &[u8],
    target_count: usize,
    config: &PaletteConfig,
) -> Result<Vec<PaletteEntry>> {
    extract_palette_bytes_with_rng(input, target_count, config, &mut rand::rng())
}

/// [`extract_palette_bytes`] with an explicit random source.
pub fn extract_palette_bytes_with_rng<R: Rng + ?Sized>(
    input: &[u8],
    target_count: usize,
    config: &PaletteConfig,
    rng: &mut R,
) -> Result<Vec<PaletteEntry>> {
    let img = image::load_from_memory(input)?;
    let small = image_input::downsample(&img, config.max_sample_side);
    let buffer = RgbaBuffer::new(small.as_raw(), small.width(), small.height())?;
    extract_palette(&buffer, target_count, config, rng)
}

// ------------------------------------------------------------
// wasm surface
// ------------------------------------------------------------

fn set(target: &Object, key: &str, value: &JsValue) -> std::result::Result<(), JsValue> {
    Reflect::set(target, &JsValue::from_str(key), value).map(|_| ())
}

fn lab_object(lab: &Lab) -> std::result::Result<JsValue, JsValue> {
    let obj = Object::new();
    set(&obj, "l", &JsValue::from_f64(lab.l as f64))?;
    set(&obj, "a", &JsValue::from_f64(lab.a as f64))?;
    set(&obj, "b", &JsValue::from_f64(lab.b as f64))?;
    Ok(obj.into())
}

fn entry_object(entry: &PaletteEntry) -> std::result::Result<JsValue, JsValue> {
    let rgb = Object::new();
    set(&rgb, "r", &JsValue::from(entry.rgb.red))?;
    set(&rgb, "g", &JsValue::from(entry.rgb.green))?;
    set(&rgb, "b", &JsValue::from(entry.rgb.blue))?;

    let obj = Object::new();
    set(&obj, "hex", &JsValue::from_str(&entry.hex))?;
    set(&obj, "rgb", &rgb)?;
    set(&obj, "lab", &lab_object(&entry.lab)?)?;
    set(&obj, "percentage", &JsValue::from(entry.percentage))?;
    set(&obj, "role", &JsValue::from_str(entry.role.as_str()))?;
    set(&obj, "label", &JsValue::from_str(entry.role.label_zh()))?;
    Ok(obj.into())
}

/// Extract a palette from canvas pixels (`ImageData.data`, RGBA8).
///
/// The caller draws the image at most 150 px on its long edge first. Returns
/// an array of `{ hex, rgb: {r, g, b}, lab: {l, a, b}, percentage, role, label }`.
#[wasm_bindgen]
pub fn extract_palette_rgba(
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    target_count: usize,
) -> std::result::Result<Array, JsValue> {
    let buffer = RgbaBuffer::new(&pixels, width, height)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let entries = extract_palette(&buffer, target_count, &PaletteConfig::default(), &mut rand::rng())
        .map_err(|e| JsValue::from_str(&format!("Palette extraction failed: {e}")))?;

    let result = Array::new();
    for entry in &entries {
        result.push(&entry_object(entry)?);
    }
    Ok(result)
}
