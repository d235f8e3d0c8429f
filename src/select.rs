//! Pick the final palette colors from the merged candidate pool.

use crate::color::delta_e;
use crate::config::SelectionConfig;
use crate::recall::Candidate;

impl SelectionConfig {
    /// Saturated enough and neither near-black nor near-white.
    pub fn is_balanced(&self, candidate: &Candidate) -> bool {
        let (low, high) = self.balanced_lightness;
        candidate.chroma > self.balanced_min_chroma
            && candidate.lab.l > low
            && candidate.lab.l < high
    }
}

/// Candidates sorted by weight, with taken entries flagged instead of removed
/// so iteration order never shifts.
struct Pool {
    candidates: Vec<Candidate>,
    taken: Vec<bool>,
}

impl Pool {
    fn new(mut candidates: Vec<Candidate>) -> Self {
        candidates.sort_by(|a, b| b.weight.cmp(&a.weight));
        let taken = vec![false; candidates.len()];
        Self { candidates, taken }
    }

    fn available(&self) -> impl Iterator<Item = (usize, &Candidate)> {
        self.candidates
            .iter()
            .enumerate()
            .filter(|(i, _)| !self.taken[*i])
    }

    fn take(&mut self, index: usize) -> Candidate {
        self.taken[index] = true;
        self.candidates[index]
    }

    fn has_available(&self) -> bool {
        self.taken.iter().any(|t| !t)
    }
}

fn min_distance(candidate: &Candidate, selected: &[Candidate]) -> f32 {
    selected
        .iter()
        .map(|s| delta_e(&candidate.lab, &s.lab))
        .fold(f32::INFINITY, f32::min)
}

/// Select up to `target_count` colors, in selection order.
///
/// 1. Primary: the heaviest balanced candidate, else the heaviest overall.
/// 2. Accent: the most saturated candidate farther than `accent_min_distance`
///    from the primary, if its chroma beats `accent_min_chroma`.
/// 3. Greedy fill maximizing `min ΔE to selection × ln(weight + 1) ×
///    (1 + chroma / chroma_scale)`, skipping candidates closer than
///    `min_distinct_distance`. When everything left is that close, the
///    candidate farthest from the selection is taken instead.
pub fn select_colors(
    candidates: Vec<Candidate>,
    target_count: usize,
    config: &SelectionConfig,
) -> Vec<Candidate> {
    let mut pool = Pool::new(candidates);
    let mut selected: Vec<Candidate> = Vec::with_capacity(target_count);
    if target_count == 0 || !pool.has_available() {
        return selected;
    }

    let primary = pool
        .available()
        .find(|(_, c)| config.is_balanced(c))
        .map(|(i, _)| i)
        .unwrap_or(0);
    selected.push(pool.take(primary));

    if selected.len() < target_count {
        let mut accent: Option<(usize, f32)> = None;
        for (i, c) in pool.available() {
            if delta_e(&c.lab, &selected[0].lab) > config.accent_min_distance
                && accent.is_none_or(|(_, best)| c.chroma > best)
            {
                accent = Some((i, c.chroma));
            }
        }
        if let Some((i, _)) = accent.filter(|(_, chroma)| *chroma > config.accent_min_chroma) {
            selected.push(pool.take(i));
        }
    }

    while selected.len() < target_count && pool.has_available() {
        let mut best: Option<(usize, f32)> = None;
        for (i, c) in pool.available() {
            let dist = min_distance(c, &selected);
            if dist < config.min_distinct_distance {
                continue;
            }
            let score = dist
                * ((c.weight as f32) + 1.0).ln()
                * (1.0 + c.chroma / config.chroma_scale);
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((i, score));
            }
        }

        let index = match best {
            Some((i, _)) => i,
            None => {
                let mut farthest: Option<(usize, f32)> = None;
                for (i, c) in pool.available() {
                    let dist = min_distance(c, &selected);
                    if farthest.is_none_or(|(_, d)| dist > d) {
                        farthest = Some((i, dist));
                    }
                }
                match farthest {
                    Some((i, _)) => i,
                    None => break,
                }
            }
        };
        selected.push(pool.take(index));
    }

    selected
}
