//! Color space helpers: sRGB → CIE Lab, CIE76 ΔE, hex formatting.
//!
//! The Lab conversion is written out instead of going through `palette`'s
//! converters: it uses the 0.04045 gamma and 0.008856 cube-root thresholds
//! with the D65 reference white 95.047 / 100 / 108.883, and the ΔE thresholds
//! in the later stages assume exactly these constants.

use palette::{FromColor, Lab, Lch, Srgb};

const REF_X: f32 = 95.047;
const REF_Y: f32 = 100.0;
const REF_Z: f32 = 108.883;

#[inline]
fn srgb_to_linear(c: u8) -> f32 {
    let c = c as f32 / 255.0;
    if c > 0.04045 {
        ((c + 0.055) / 1.055).powf(2.4)
    } else {
        c / 12.92
    }
}

#[inline]
fn lab_f(t: f32) -> f32 {
    if t > 0.008856 {
        t.cbrt()
    } else {
        7.787 * t + 16.0 / 116.0
    }
}

/// Convert an 8-bit sRGB color to Lab (D65).
pub fn rgb_to_lab(rgb: Srgb<u8>) -> Lab {
    let r = srgb_to_linear(rgb.red);
    let g = srgb_to_linear(rgb.green);
    let b = srgb_to_linear(rgb.blue);

    let x = (r * 0.4124 + g * 0.3576 + b * 0.1805) * 100.0;
    let y = (r * 0.2126 + g * 0.7152 + b * 0.0722) * 100.0;
    let z = (r * 0.0193 + g * 0.1192 + b * 0.9505) * 100.0;

    let fx = lab_f(x / REF_X);
    let fy = lab_f(y / REF_Y);
    let fz = lab_f(z / REF_Z);

    Lab::new(116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz))
}

/// CIE76 color difference: Euclidean distance in Lab.
#[inline]
pub fn delta_e(lab1: &Lab, lab2: &Lab) -> f32 {
    let dl = lab1.l - lab2.l;
    let da = lab1.a - lab2.a;
    let db = lab1.b - lab2.b;
    (dl * dl + da * da + db * db).sqrt()
}

/// `sqrt(a² + b²)`, the saturation proxy used throughout.
#[inline]
pub fn chroma(lab: &Lab) -> f32 {
    Lch::from_color(*lab).chroma
}

/// Hue angle `atan2(b, a)` in degrees, in (-180, 180].
#[inline]
pub fn hue_degrees(lab: &Lab) -> f32 {
    Lch::from_color(*lab).hue.into_degrees()
}

/// Circular distance between two hue angles, at most 180°.
pub fn hue_distance(h1: f32, h2: f32) -> f32 {
    let diff = (h1 - h2).abs();
    if diff > 180.0 { 360.0 - diff } else { diff }
}

/// Round a floating-point color (channels in 0..=1) to 8 bits per channel.
pub fn round_rgb(rgb: Srgb<f32>) -> Srgb<u8> {
    let to_u8 = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    Srgb::new(to_u8(rgb.red), to_u8(rgb.green), to_u8(rgb.blue))
}

/// Lowercase `#rrggbb`.
pub fn rgb_to_hex(rgb: Srgb<u8>) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb.red, rgb.green, rgb.blue)
}
