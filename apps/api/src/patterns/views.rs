use serde::Serialize;

use crate::patterns::models::Pattern;

const HIGH_INTENSITY: u8 = 70;
const MEDIUM_INTENSITY: u8 = 30;

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct IntensityStats {
    pub total: usize,
    /// ≥ 70
    pub high: usize,
    /// 30 – 69
    pub medium: usize,
    /// < 30
    pub low: usize,
}

impl IntensityStats {
    pub fn from_patterns(patterns: &[Pattern]) -> Self {
        patterns.iter().fold(
            IntensityStats {
                total: patterns.len(),
                ..Default::default()
            },
            |mut stats, p| {
                match p.intensity {
                    i if i >= HIGH_INTENSITY => stats.high += 1,
                    i if i >= MEDIUM_INTENSITY => stats.medium += 1,
                    _ => stats.low += 1,
                }
                stats
            },
        )
    }
}

/// Case-insensitive substring match on interaction type or owner. An empty term
/// matches everything.
pub fn filter_patterns<'a>(patterns: &'a [Pattern], term: &str) -> Vec<&'a Pattern> {
    let term = term.trim().to_lowercase();
    patterns
        .iter()
        .filter(|p| {
            term.is_empty()
                || p.interaction_type.as_str().to_lowercase().contains(&term)
                || p.owner.to_lowercase().contains(&term)
        })
        .collect()
}
