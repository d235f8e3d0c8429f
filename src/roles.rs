//! Label the selected colors with palette roles and compute their shares.

use std::fmt;

use palette::{Lab, Srgb};
use serde::{Deserialize, Serialize};

use crate::color::{hue_degrees, hue_distance, rgb_to_hex, round_rgb};
use crate::config::SelectionConfig;
use crate::recall::Candidate;

/// Semantic role of a palette entry, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Primary,
    Neutral,
    Accent,
    Secondary,
    Supplementary,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Primary => "primary",
            Role::Neutral => "neutral",
            Role::Accent => "accent",
            Role::Secondary => "secondary",
            Role::Supplementary => "supplementary",
        }
    }

    /// Label shown by the palette site.
    pub fn label_zh(self) -> &'static str {
        match self {
            Role::Primary => "主色",
            Role::Neutral => "中性色",
            Role::Accent => "强调色",
            Role::Secondary => "辅助色",
            Role::Supplementary => "补充色",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One color of the extracted palette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaletteEntry {
    /// Lowercase `#rrggbb` of `rgb`.
    pub hex: String,
    pub rgb: Srgb<u8>,
    pub lab: Lab,
    /// Share of the palette's total weight, rounded to a whole percent.
    pub percentage: u8,
    pub role: Role,
}

impl PaletteEntry {
    pub(crate) fn new(rgb: Srgb<f32>, lab: Lab, percentage: u8, role: Role) -> Self {
        let rgb = round_rgb(rgb);
        Self {
            hex: rgb_to_hex(rgb),
            rgb,
            lab,
            percentage,
            role,
        }
    }
}

/// `round(part / total × 100)`.
pub(crate) fn percentage(part: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    (part as f64 / total as f64 * 100.0).round() as u8
}

struct Labeled {
    candidate: Candidate,
    hue: f32,
}

/// Assign roles to the final selection and order it primary, neutral,
/// accent, secondary, supplementary.
///
/// Percentages are relative to the selection's total weight, not the image.
pub fn assign_roles(
    selection: Vec<Candidate>,
    max_secondaries: usize,
    config: &SelectionConfig,
) -> Vec<PaletteEntry> {
    let total: u32 = selection.iter().map(|c| c.weight).sum();
    let mut pool: Vec<Labeled> = selection
        .into_iter()
        .map(|candidate| Labeled {
            hue: hue_degrees(&candidate.lab),
            candidate,
        })
        .collect();
    if pool.is_empty() {
        return Vec::new();
    }
    let mut assigned: Vec<(Candidate, Role)> = Vec::with_capacity(pool.len());

    // Sorts below are stable, so ties keep the pool's current order.
    pool.sort_by(|a, b| b.candidate.weight.cmp(&a.candidate.weight));
    let primary_index = pool
        .iter()
        .position(|c| config.is_balanced(&c.candidate))
        .unwrap_or(0);
    let primary = pool.remove(primary_index);
    let primary_hue = primary.hue;
    assigned.push((primary.candidate, Role::Primary));

    if !pool.is_empty() {
        pool.sort_by(|a, b| a.candidate.chroma.total_cmp(&b.candidate.chroma));
        assigned.push((pool.remove(0).candidate, Role::Neutral));
    }

    if !pool.is_empty() {
        pool.sort_by(|a, b| b.candidate.chroma.total_cmp(&a.candidate.chroma));
        assigned.push((pool.remove(0).candidate, Role::Accent));
    }

    let mut secondaries = 0;
    while !pool.is_empty() && secondaries < max_secondaries {
        pool.sort_by(|a, b| {
            hue_distance(a.hue, primary_hue).total_cmp(&hue_distance(b.hue, primary_hue))
        });
        assigned.push((pool.remove(0).candidate, Role::Secondary));
        secondaries += 1;
    }

    assigned.extend(pool.into_iter().map(|c| (c.candidate, Role::Supplementary)));
    assigned.sort_by_key(|(_, role)| *role);

    assigned
        .into_iter()
        .map(|(c, role)| PaletteEntry::new(c.rgb, c.lab, percentage(c.weight, total), role))
        .collect()
}
