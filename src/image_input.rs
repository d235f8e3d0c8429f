//! Decoding and downsampling for callers that start from an encoded image.

use image::{DynamicImage, GenericImageView, RgbaImage, imageops::FilterType};

/// Dimensions after shrinking so the long edge is at most `max_side`.
///
/// The short edge is truncated to a whole pixel, never below 1. Images that
/// already fit are left alone.
pub fn sample_dimensions(width: u32, height: u32, max_side: u32) -> (u32, u32) {
    let scale =
        |short: u32, long: u32| ((short as f64 * max_side as f64 / long as f64) as u32).max(1);
    if width > height {
        if width > max_side {
            return (max_side, scale(height, width));
        }
    } else if height > max_side {
        return (scale(width, height), max_side);
    }
    (width, height)
}

/// Shrink an image for sampling, bilinear like a browser canvas draw.
pub fn downsample(img: &DynamicImage, max_side: u32) -> RgbaImage {
    let (w, h) = img.dimensions();
    let (out_w, out_h) = sample_dimensions(w, h, max_side);
    let rgba = img.to_rgba8();
    if (out_w, out_h) == (w, h) {
        return rgba;
    }
    tracing::debug!(from = ?(w, h), to = ?(out_w, out_h), "downsampling image");
    image::imageops::resize(&rgba, out_w, out_h, FilterType::Triangle)
}
