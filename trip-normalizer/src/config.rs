//! Normalizer configuration.

/// Default gap between the ranks of consecutive template slots.
pub const DEFAULT_RANK_SPACING: i64 = 1000;

/// Configuration parameters for a normalization run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizerConfig {
    /// Raw headsigns of trips that are dropped before classification,
    /// compared case-insensitively.
    pub excluded_headsigns: Vec<String>,

    /// Rank distance between consecutive template slots. Stops missing from
    /// the template are interpolated inside this gap.
    pub rank_spacing: i64,
}

impl NormalizerConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(excluded_headsigns: Vec<String>, rank_spacing: i64) -> Self {
        Self {
            excluded_headsigns,
            rank_spacing,
        }
    }

    /// Returns true if trips with this raw headsign are dropped.
    pub fn is_excluded(&self, headsign: &str) -> bool {
        let headsign = headsign.trim();
        self.excluded_headsigns
            .iter()
            .any(|excluded| excluded.eq_ignore_ascii_case(headsign))
    }
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            excluded_headsigns: vec!["OFF ONLY".to_string()],
            rank_spacing: DEFAULT_RANK_SPACING,
        }
    }
}
