use crate::core::catalog::IngredientCatalog;
use crate::core::chemistry::metrics::Metrics;
use crate::core::models::ingredient::IngredientRecord;
use crate::core::models::recipe::RecipeEntry;
use crate::core::preservation::advice::{Preferences, PreservationAdvice};
use crate::core::preservation::paste::{LabSpecs, PasteFormula};
use crate::core::preservation::rules;
use tracing::{info, instrument};

#[derive(Debug, Clone, PartialEq)]
pub struct PreservationReport {
    pub paste: PasteFormula,
    /// The paste as a single ingredient, ready to be registered in a catalog.
    pub aggregate: IngredientRecord,
    pub metrics: Metrics,
    pub advice: Vec<PreservationAdvice>,
    pub warnings: Vec<String>,
}

/// Builds a paste from catalog references and ranks preservation methods for it.
#[instrument(skip_all, name = "preservation_workflow")]
pub fn run(
    name: &str,
    lab: LabSpecs,
    components: &[RecipeEntry],
    catalog: &IngredientCatalog,
    preferences: &Preferences,
) -> PreservationReport {
    info!(paste = name, components = components.len(), "Aggregating paste formula.");
    let resolution = catalog.resolve_entries(components);
    let paste = resolution
        .lines
        .into_iter()
        .fold(PasteFormula::new(name, lab), |paste, line| {
            paste.with_component(line.ingredient, line.mass_g)
        });

    let aggregate = paste.aggregate();
    let metrics = paste.metrics();
    let advice = rules::advise(&paste, preferences);
    info!(
        category = %aggregate.category,
        methods = advice.len(),
        "Preservation advice ready."
    );

    PreservationReport {
        paste,
        aggregate,
        metrics,
        advice,
        warnings: resolution.warnings,
    }
}
