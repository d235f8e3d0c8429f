use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use image_to_palette_wasm::color::delta_e;
use image_to_palette_wasm::{
    PaletteConfig, PaletteEntry, PaletteError, RgbaBuffer, Role, extract_palette,
    extract_palette_bytes_with_rng,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn pixels(runs: &[([u8; 3], usize)]) -> Vec<u8> {
    runs.iter()
        .flat_map(|&([r, g, b], n)| std::iter::repeat_n([r, g, b, 255], n))
        .flatten()
        .collect()
}

fn run(data: &[u8], width: u32, height: u32, target: usize, seed: u64) -> Vec<PaletteEntry> {
    let buffer = RgbaBuffer::new(data, width, height).unwrap();
    let mut rng = StdRng::seed_from_u64(seed);
    extract_palette(&buffer, target, &PaletteConfig::default(), &mut rng).unwrap()
}

/// 48×48 image of smoothly varying hues and lightness. Channels are
/// multiples of 5 so every quantization key has a single raw color.
fn gradient_image() -> RgbaImage {
    RgbaImage::from_fn(48, 48, |x, y| {
        let r = (x * 5) as u8;
        let g = (y * 5) as u8;
        let b = (255 - 5 * ((x + y) / 2)) as u8;
        Rgba([r, g, b, 255])
    })
}

fn hex_and_percentage(entries: &[PaletteEntry]) -> Vec<(&str, u8)> {
    let mut out: Vec<(&str, u8)> = entries
        .iter()
        .map(|e| (e.hex.as_str(), e.percentage))
        .collect();
    out.sort();
    out
}

#[test]
fn test_single_color_image() {
    let data = pixels(&[([30, 90, 200], 100)]);
    let entries = run(&data, 10, 10, 5, 1);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].hex, "#1e5ac8");
    assert_eq!(entries[0].percentage, 100);
    assert_eq!(entries[0].role, Role::Primary);
}

#[test]
fn test_few_colors_are_returned_unclustered() {
    let data = pixels(&[([10, 10, 10], 30), ([250, 250, 250], 70)]);
    let entries = run(&data, 10, 10, 5, 1);
    let hexes: Vec<&str> = entries.iter().map(|e| e.hex.as_str()).collect();
    assert_eq!(hexes, vec!["#fafafa", "#0a0a0a"]);
    assert!(entries.iter().all(|e| e.role == Role::Neutral));
    assert!(entries.iter().all(|e| e.percentage == 50));
}

#[test]
fn test_gray_red_black_scene() {
    let data = pixels(&[
        ([128, 128, 128], 60),
        ([133, 133, 133], 10),
        ([224, 48, 48], 15),
        ([229, 48, 48], 5),
        ([5, 5, 5], 6),
        ([10, 10, 10], 4),
    ]);
    let entries = run(&data, 10, 10, 3, 7);

    assert_eq!(
        hex_and_percentage(&entries),
        vec![("#050505", 10), ("#808080", 70), ("#e03030", 20)]
    );
    // The saturated red is the only balanced color.
    assert_eq!(entries[0].role, Role::Primary);
    assert_eq!(entries[0].hex, "#e03030");
    let rest: Vec<Role> = entries[1..].iter().map(|e| e.role).collect();
    assert_eq!(rest, vec![Role::Neutral, Role::Accent]);
}

#[test]
fn test_transparent_pixels_ignored() {
    let mut data = pixels(&[([200, 30, 30], 50)]);
    data.extend([0u8, 255, 0, 0].repeat(50));
    let entries = run(&data, 10, 10, 4, 1);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].hex, "#c81e1e");
}

#[test]
fn test_dimension_mismatch() {
    let data = vec![0u8; 10];
    let err = RgbaBuffer::new(&data, 2, 2).unwrap_err();
    assert!(matches!(
        err,
        PaletteError::DimensionMismatch { len: 10, width: 2, height: 2 }
    ));
}

#[test]
fn test_invalid_config_rejected() {
    let data = pixels(&[([1, 2, 3], 4)]);
    let buffer = RgbaBuffer::new(&data, 2, 2).unwrap();
    let config = PaletteConfig {
        quantize_step: 0,
        ..PaletteConfig::default()
    };
    let mut rng = StdRng::seed_from_u64(0);
    let err = extract_palette(&buffer, 3, &config, &mut rng).unwrap_err();
    assert!(matches!(err, PaletteError::InvalidParameter { .. }));
}

#[test]
fn test_zero_cluster_config_is_an_error() {
    let data: Vec<u8> = (0..16u8).flat_map(|i| [i * 15, 255 - i * 15, 80, 255]).collect();
    let buffer = RgbaBuffer::new(&data, 4, 4).unwrap();
    let config: PaletteConfig =
        serde_json::from_str(r#"{ "clusters_per_color": 0, "min_clusters": 0 }"#).unwrap();
    let mut rng = StdRng::seed_from_u64(0);
    let err = extract_palette(&buffer, 3, &config, &mut rng).unwrap_err();
    assert!(matches!(err, PaletteError::InvalidParameter { .. }));
}

#[test]
fn test_gradient_palette_is_distinct_and_ordered() {
    let img = gradient_image();
    let entries = run(img.as_raw(), 48, 48, 6, 42);

    assert!(!entries.is_empty() && entries.len() <= 6);
    assert_eq!(entries[0].role, Role::Primary);
    for pair in entries.windows(2) {
        assert!(pair[0].role <= pair[1].role);
    }
    for (i, a) in entries.iter().enumerate() {
        assert!(a.hex.len() == 7 && a.hex.starts_with('#'));
        assert_eq!(a.hex, a.hex.to_lowercase());
        for b in &entries[i + 1..] {
            assert!(delta_e(&a.lab, &b.lab) >= 5.0);
        }
    }
    let total: i32 = entries.iter().map(|e| e.percentage as i32).sum();
    assert!((total - 100).abs() <= entries.len() as i32);
}

#[test]
fn test_same_seed_same_palette() {
    let img = gradient_image();
    let first = run(img.as_raw(), 48, 48, 5, 9);
    let second = run(img.as_raw(), 48, 48, 5, 9);
    assert_eq!(first, second);
}

#[test]
fn test_pixel_order_does_not_matter() {
    let img = gradient_image();
    let mut reversed: Vec<u8> = img
        .as_raw()
        .chunks_exact(4)
        .rev()
        .flatten()
        .copied()
        .collect();
    let forward = run(img.as_raw(), 48, 48, 5, 3);
    let backward = run(&reversed, 48, 48, 5, 3);
    assert_eq!(forward, backward);

    // Rows rotated by half the image.
    reversed.rotate_left(24 * 48 * 4);
    assert_eq!(run(&reversed, 48, 48, 5, 3), forward);
}

#[test]
fn test_encoded_png_input() {
    let img = RgbaImage::from_fn(300, 200, |x, _| {
        if x < 200 {
            Rgba([40, 120, 220, 255])
        } else {
            Rgba([250, 210, 30, 255])
        }
    });
    let mut png = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .unwrap();

    let mut rng = StdRng::seed_from_u64(5);
    let entries =
        extract_palette_bytes_with_rng(&png, 2, &PaletteConfig::default(), &mut rng).unwrap();
    assert_eq!(entries.len(), 2);
    let near = |e: &&PaletteEntry, [r, g, b]: [u8; 3]| {
        e.rgb.red.abs_diff(r) <= 2 && e.rgb.green.abs_diff(g) <= 2 && e.rgb.blue.abs_diff(b) <= 2
    };
    let blue = entries.iter().find(|e| near(e, [40, 120, 220])).unwrap();
    let yellow = entries.iter().find(|e| near(e, [250, 210, 30])).unwrap();
    assert!(blue.percentage > yellow.percentage);
    assert!(blue.percentage >= 60);
}

#[test]
fn test_undecodable_bytes() {
    let mut rng = StdRng::seed_from_u64(0);
    let err = extract_palette_bytes_with_rng(b"not an image", 3, &PaletteConfig::default(), &mut rng)
        .unwrap_err();
    assert!(matches!(err, PaletteError::Image(_)));
}
