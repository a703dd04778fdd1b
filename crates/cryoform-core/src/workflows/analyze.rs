use crate::core::archetypes::Archetype;
use crate::core::archetypes::bands::TargetBandTable;
use crate::core::catalog::IngredientCatalog;
use crate::core::chemistry::metrics::{Metrics, compute_metrics};
use crate::core::evaluation::classifier::{self, ArchetypeDistance};
use crate::core::evaluation::validator::{self, ValidationReport};
use crate::core::models::recipe::{RecipeEntry, RecipeLine};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisConfig {
    pub evaporation_percent: f64,
    /// Validate against this archetype instead of the classified one.
    pub archetype: Option<Archetype>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub lines: Vec<RecipeLine>,
    pub metrics: Metrics,
    pub classified_as: Archetype,
    pub ranking: Vec<ArchetypeDistance>,
    pub validated_against: Archetype,
    pub validation: ValidationReport,
    /// Unresolved ingredient references and composition problems.
    pub warnings: Vec<String>,
}

#[instrument(skip_all, name = "analysis_workflow")]
pub fn run(
    entries: &[RecipeEntry],
    catalog: &IngredientCatalog,
    bands: &TargetBandTable,
    config: &AnalysisConfig,
    reporter: &ProgressReporter,
) -> Result<AnalysisReport, EngineError> {
    reporter.report(Progress::PhaseStart { name: "Analysis" });
    info!(lines = entries.len(), "Resolving recipe against the ingredient catalog.");

    let resolution = catalog.resolve_entries(entries);
    let mut warnings = resolution.warnings;
    for line in &resolution.lines {
        for issue in line.ingredient.validate() {
            let message = format!("{}: {}", line.ingredient.id, issue);
            warn!("{}", message);
            warnings.push(message);
        }
    }

    let metrics = compute_metrics(&resolution.lines, config.evaporation_percent);
    warnings.extend(metrics.diagnostics.iter().cloned());

    let ranking = classifier::rank(&metrics);
    let classified_as = classifier::classify(&metrics);
    let validated_against = config.archetype.unwrap_or(classified_as);
    let archetype_bands = bands
        .get(validated_against)
        .ok_or(EngineError::MissingBands {
            archetype: validated_against,
        })?;
    let validation = validator::validate(&metrics, archetype_bands);

    reporter.report(Progress::PhaseFinish);
    info!(
        total_g = metrics.total_g,
        classified_as = %classified_as,
        validated_against = %validated_against,
        passed = validation.all_passed(),
        "Analysis complete."
    );

    Ok(AnalysisReport {
        lines: resolution.lines,
        metrics,
        classified_as,
        ranking,
        validated_against,
        validation,
        warnings,
    })
}
