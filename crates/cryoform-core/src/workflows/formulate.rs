use crate::core::archetypes::Archetype;
use crate::core::archetypes::bands::TargetBandTable;
use crate::core::catalog::IngredientCatalog;
use crate::core::chemistry::metrics::{Metrics, compute_metrics};
use crate::core::evaluation::classifier;
use crate::core::evaluation::validator::{self, ValidationReport};
use crate::core::models::recipe::RecipeEntry;
use crate::engine::config::OptimizationConfig;
use crate::engine::error::EngineError;
use crate::engine::optimizer::{self, FormulationResult};
use crate::engine::progress::ProgressReporter;
use crate::engine::targets::TargetSet;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct FormulationReport {
    pub seed_metrics: Metrics,
    /// Targets actually used. Band midpoints of the archetype when none were given.
    pub targets: TargetSet,
    pub result: FormulationResult,
    pub archetype: Archetype,
    pub validation: ValidationReport,
    pub warnings: Vec<String>,
}

/// Resolves a seed recipe, optimizes it toward `targets` and validates the outcome.
///
/// When `targets` is empty the search aims at the band midpoints of `archetype`, or of the
/// seed's classified archetype when no archetype is given.
#[instrument(skip_all, name = "formulation_workflow")]
pub fn run(
    entries: &[RecipeEntry],
    catalog: &IngredientCatalog,
    targets: &TargetSet,
    archetype: Option<Archetype>,
    bands: &TargetBandTable,
    config: &OptimizationConfig,
    reporter: &ProgressReporter,
) -> Result<FormulationReport, EngineError> {
    info!(lines = entries.len(), "Resolving seed recipe.");
    let resolution = catalog.resolve_entries(entries);
    let mut warnings = resolution.warnings;
    for line in &resolution.lines {
        for issue in line.ingredient.validate() {
            let message = format!("{}: {}", line.ingredient.id, issue);
            warn!("{}", message);
            warnings.push(message);
        }
    }
    let seed_metrics = compute_metrics(&resolution.lines, config.evaporation_percent);

    let seed_archetype = archetype.unwrap_or_else(|| classifier::classify(&seed_metrics));
    let seed_bands = bands.get(seed_archetype).ok_or(EngineError::MissingBands {
        archetype: seed_archetype,
    })?;
    let targets = if targets.is_empty() {
        info!(archetype = %seed_archetype, "No explicit targets; aiming at band midpoints.");
        TargetSet::from_bands(seed_bands)
    } else {
        targets.clone()
    };

    let result = optimizer::run(&resolution.lines, &targets, config, reporter);
    for diagnostic in seed_metrics.diagnostics.iter().chain(&result.metrics.diagnostics) {
        if !warnings.contains(diagnostic) {
            warnings.push(diagnostic.clone());
        }
    }

    let final_archetype = archetype.unwrap_or_else(|| classifier::classify(&result.metrics));
    let final_bands = bands.get(final_archetype).ok_or(EngineError::MissingBands {
        archetype: final_archetype,
    })?;
    let validation = validator::validate(&result.metrics, final_bands);

    info!(
        converged = result.converged,
        evaluations = result.evaluations,
        archetype = %final_archetype,
        passed = validation.all_passed(),
        "Formulation complete."
    );

    Ok(FormulationReport {
        seed_metrics,
        targets,
        result,
        archetype: final_archetype,
        validation,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::ingredient::{IngredientCategory, IngredientRecord};
    use crate::engine::config::OptimizationConfigBuilder;
    use crate::engine::targets::TargetField;

    fn seed() -> Vec<RecipeEntry> {
        vec![
            RecipeEntry::new("whole_milk", 650.0),
            RecipeEntry::new("cream_25", 150.0),
            RecipeEntry::new("sucrose", 150.0),
            RecipeEntry::new("skim_milk_powder", 30.0),
            RecipeEntry::new("stabilizer_blend", 5.0),
        ]
    }

    fn config() -> OptimizationConfig {
        OptimizationConfigBuilder::new()
            .max_iterations(150)
            .step_scale(1.0)
            .convergence_threshold(0.01)
            .lock_ingredient("stabilizer_blend")
            .build()
            .unwrap()
    }

    #[test]
    fn explicit_targets_are_used_as_given() {
        let catalog = IngredientCatalog::builtin().unwrap();
        let bands = TargetBandTable::builtin().unwrap();
        let targets = TargetSet::new().with(TargetField::Fat, 8.0);
        let report = run(
            &seed(),
            &catalog,
            &targets,
            None,
            &bands,
            &config(),
            &ProgressReporter::new(),
        )
        .unwrap();
        assert_eq!(report.targets, targets);
        assert!(report.result.objective <= targets.objective(&report.seed_metrics));
        assert!(report.result.evaluations <= 150);
        assert_eq!(report.result.lines[4].mass_g, 5.0);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn empty_targets_fall_back_to_band_midpoints() {
        let catalog = IngredientCatalog::builtin().unwrap();
        let bands = TargetBandTable::builtin().unwrap();
        let report = run(
            &seed(),
            &catalog,
            &TargetSet::new(),
            Some(Archetype::WhiteBase),
            &bands,
            &config(),
            &ProgressReporter::new(),
        )
        .unwrap();
        let white = bands.get(Archetype::WhiteBase).unwrap();
        assert_eq!(report.targets, TargetSet::from_bands(white));
        assert_eq!(report.archetype, Archetype::WhiteBase);
        assert!(report.result.objective <= report.targets.objective(&report.seed_metrics));
    }

    #[test]
    fn composition_issues_on_seed_lines_are_reported_as_warnings() {
        let mut catalog = IngredientCatalog::builtin().unwrap();
        catalog.insert(
            IngredientRecord::new("house_paste", "House paste", IngredientCategory::Flavor)
                .with_composition(40.0, 5.0, 30.0, 0.0, 10.0),
        );
        let bands = TargetBandTable::builtin().unwrap();
        let mut entries = seed();
        entries.push(RecipeEntry::new("house_paste", 20.0));

        let report = run(
            &entries,
            &catalog,
            &TargetSet::new().with(TargetField::Fat, 8.0),
            Some(Archetype::WhiteBase),
            &bands,
            &config(),
            &ProgressReporter::new(),
        )
        .unwrap();
        assert!(
            report.warnings.iter().any(|w| w.starts_with("house_paste: ")),
            "{:?}",
            report.warnings
        );
    }

    #[test]
    fn missing_bands_for_the_archetype_are_an_error() {
        let catalog = IngredientCatalog::builtin().unwrap();
        let result = run(
            &seed(),
            &catalog,
            &TargetSet::new(),
            Some(Archetype::Sorbet),
            &TargetBandTable::default(),
            &config(),
            &ProgressReporter::new(),
        );
        assert!(matches!(
            result,
            Err(EngineError::MissingBands {
                archetype: Archetype::Sorbet
            })
        ));
    }
}
