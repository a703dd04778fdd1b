use super::Archetype;
use crate::core::chemistry::metrics::Metrics;

pub const FEATURE_COUNT: usize = 6;

/// Feature order shared by centroids, weights and [`features`].
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] =
    ["total_solids", "sugars", "fat", "msnf", "sp", "pac"];

/// Composition dimensions count fully; the derived SP/PAC dimensions count half.
pub const DEFAULT_WEIGHTS: [f64; FEATURE_COUNT] = [1.0, 1.0, 1.0, 1.0, 0.5, 0.5];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArchetypeCentroid {
    pub archetype: Archetype,
    pub centroid: [f64; FEATURE_COUNT],
    pub weights: [f64; FEATURE_COUNT],
}

impl ArchetypeCentroid {
    /// Weighted squared Euclidean distance from `point` to this centroid.
    pub fn distance(&self, point: &[f64; FEATURE_COUNT]) -> f64 {
        self.centroid
            .iter()
            .zip(point)
            .zip(&self.weights)
            .map(|((c, p), w)| w * (p - c) * (p - c))
            .sum()
    }
}

/// Reference centroids, in [`Archetype::PRIORITY`] order.
pub static ARCHETYPE_CENTROIDS: [ArchetypeCentroid; 4] = [
    ArchetypeCentroid {
        archetype: Archetype::WhiteBase,
        centroid: [35.0, 17.0, 7.5, 10.0, 18.0, 23.0],
        weights: DEFAULT_WEIGHTS,
    },
    ArchetypeCentroid {
        archetype: Archetype::FinishedGelato,
        centroid: [39.0, 19.0, 9.0, 9.0, 20.0, 27.0],
        weights: DEFAULT_WEIGHTS,
    },
    ArchetypeCentroid {
        archetype: Archetype::FruitGelato,
        centroid: [32.0, 23.0, 3.0, 5.0, 24.0, 30.0],
        weights: DEFAULT_WEIGHTS,
    },
    ArchetypeCentroid {
        archetype: Archetype::Sorbet,
        centroid: [31.0, 28.0, 0.5, 0.0, 27.0, 33.0],
        weights: DEFAULT_WEIGHTS,
    },
];

pub fn centroid_for(archetype: Archetype) -> &'static ArchetypeCentroid {
    &ARCHETYPE_CENTROIDS[archetype.priority()]
}

/// Projects metrics onto the classifier's feature space. Non-finite values read as 0.
pub fn features(metrics: &Metrics) -> [f64; FEATURE_COUNT] {
    [
        metrics.ts_additive_pct,
        metrics.sugars_pct,
        metrics.fat_pct,
        metrics.msnf_pct,
        metrics.sp,
        metrics.pac,
    ]
    .map(|v| if v.is_finite() { v } else { 0.0 })
}
