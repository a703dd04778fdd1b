use crate::core::archetypes::Archetype;
use crate::core::archetypes::centroids::{ARCHETYPE_CENTROIDS, features};
use crate::core::chemistry::metrics::Metrics;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArchetypeDistance {
    pub archetype: Archetype,
    pub distance: f64,
}

/// Every archetype with its distance to `metrics`, nearest first. Equal distances keep
/// [`Archetype::PRIORITY`] order.
pub fn rank(metrics: &Metrics) -> Vec<ArchetypeDistance> {
    let point = features(metrics);
    let mut ranked: Vec<ArchetypeDistance> = ARCHETYPE_CENTROIDS
        .iter()
        .map(|entry| ArchetypeDistance {
            archetype: entry.archetype,
            distance: entry.distance(&point),
        })
        .collect();
    ranked.sort_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then_with(|| a.archetype.priority().cmp(&b.archetype.priority()))
    });
    ranked
}

pub fn classify(metrics: &Metrics) -> Archetype {
    rank(metrics)
        .first()
        .map(|d| d.archetype)
        .unwrap_or(Archetype::PRIORITY[0])
}
