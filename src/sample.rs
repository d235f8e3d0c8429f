//! Reduce an RGBA pixel buffer to a weighted set of distinct colors.

use std::collections::BTreeMap;

use palette::{Lab, Srgb};

use crate::color::rgb_to_lab;
use crate::{PaletteError, Result};

/// Borrowed RGBA8 pixels, row-major, 4 bytes per pixel.
#[derive(Debug, Clone, Copy)]
pub struct RgbaBuffer<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
}

impl<'a> RgbaBuffer<'a> {
    pub fn new(data: &'a [u8], width: u32, height: u32) -> Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4));
        if expected != Some(data.len()) {
            return Err(PaletteError::DimensionMismatch {
                len: data.len(),
                width,
                height,
            });
        }
        Ok(Self { data, width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Iterate pixels as `[r, g, b, a]`.
    pub fn pixels(&self) -> impl Iterator<Item = [u8; 4]> + 'a {
        let data: &'a [u8] = self.data;
        data.chunks_exact(4)
            .map(|px| [px[0], px[1], px[2], px[3]])
    }
}

/// One distinct (quantized) color observed in the image.
///
/// `weight` is the number of source pixels that mapped to it and is never zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedColor {
    /// Channels in 0..=1. Centroids carry unrounded means here.
    pub rgb: Srgb<f32>,
    pub lab: Lab,
    pub weight: u32,
}

impl WeightedColor {
    pub fn from_rgb(rgb: Srgb<u8>, weight: u32) -> Self {
        Self {
            rgb: rgb.into_format(),
            lab: rgb_to_lab(rgb),
            weight,
        }
    }
}

#[inline]
fn quantize(c: u8, step: u8) -> u8 {
    let step = step as f32;
    ((c as f32 / step).round() * step).min(255.0) as u8
}

/// Deduplicate opaque pixels by quantized RGB.
///
/// The first raw color seen for a key becomes that key's representative; the
/// result is ordered by quantized key so it does not depend on pixel order.
pub fn sample_colors(
    buffer: &RgbaBuffer<'_>,
    alpha_threshold: u8,
    quantize_step: u8,
) -> Vec<WeightedColor> {
    let mut buckets: BTreeMap<[u8; 3], WeightedColor> = BTreeMap::new();

    for [r, g, b, a] in buffer.pixels() {
        if a < alpha_threshold {
            continue;
        }
        let key = [
            quantize(r, quantize_step),
            quantize(g, quantize_step),
            quantize(b, quantize_step),
        ];
        buckets
            .entry(key)
            .and_modify(|color| color.weight += 1)
            .or_insert_with(|| WeightedColor::from_rgb(Srgb::new(r, g, b), 1));
    }

    tracing::debug!(
        width = buffer.width(),
        height = buffer.height(),
        distinct = buckets.len(),
        "sampled pixel buffer"
    );

    buckets.into_values().collect()
}
