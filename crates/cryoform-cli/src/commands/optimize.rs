use super::{load_bands, load_catalog};
use crate::cli::OptimizeArgs;
use crate::config::{CliOverrides, ConfigSources, build_config};
use crate::error::Result;
use crate::input::{RecipeFile, parse_archetype, parse_target_assignment};
use crate::report;
use crate::utils::progress::CliProgressHandler;
use cryoform::core::catalog::IngredientCatalog;
use cryoform::engine::progress::ProgressReporter;
use cryoform::workflows::formulate::{self, FormulationReport};
use std::collections::BTreeSet;
use tracing::{info, warn};

pub fn run(args: OptimizeArgs, sources: &ConfigSources) -> Result<()> {
    info!("Loading seed recipe from {:?}", &args.recipe);
    let recipe = RecipeFile::from_file(&args.recipe)?;

    let overrides = CliOverrides {
        evaporation_percent: recipe.evaporation_percent,
        max_iterations: args.max_iterations,
        step_scale: args.step_scale,
        locked: args.locked.clone(),
        preserve_batch_mass: args.preserve_batch_mass,
        ..Default::default()
    };
    let mut app_config = build_config(sources, &overrides)?;
    let catalog = load_catalog(&app_config)?;
    let bands = load_bands(&app_config)?;
    app_config.optimization.locked_ingredients =
        resolve_locks(&catalog, &app_config.optimization.locked_ingredients);

    let mut targets = recipe.targets()?;
    for assignment in &args.targets {
        let (field, value) = parse_target_assignment(assignment)?;
        targets.insert(field, value);
    }
    let archetype = match &args.archetype {
        Some(name) => Some(parse_archetype(name)?),
        None => recipe.archetype()?,
    };

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Starting formulation search...");
    info!("Invoking the core formulation workflow...");
    let formulation = formulate::run(
        &recipe.lines,
        &catalog,
        &targets,
        archetype,
        &bands,
        &app_config.optimization,
        &reporter,
    )?;

    if !formulation.result.converged {
        warn!(
            "Search stopped after {} evaluation(s) without meeting the convergence threshold.",
            formulation.result.evaluations
        );
    }
    print!("{}", report::formulation(&formulation));

    if let Some(output) = &args.output {
        info!("Writing optimized recipe to {:?}", output);
        optimized_recipe(&recipe, &formulation).write_to(output)?;
        println!("✓ Optimized recipe written to: {}", output.display());
    }
    Ok(())
}

/// Maps lock references (names, aliases) onto catalog ids. Unknown references are kept as given.
fn resolve_locks(catalog: &IngredientCatalog, locked: &BTreeSet<String>) -> BTreeSet<String> {
    locked
        .iter()
        .map(|reference| match catalog.lookup(reference) {
            Some(found) => found.record.id.clone(),
            None => {
                warn!("Locked ingredient '{}' is not in the catalog.", reference);
                reference.clone()
            }
        })
        .collect()
}

fn optimized_recipe(seed: &RecipeFile, formulation: &FormulationReport) -> RecipeFile {
    RecipeFile {
        name: seed.name.as_ref().map(|name| format!("{name} (optimized)")),
        archetype: Some(formulation.archetype.as_str().to_string()),
        evaporation_percent: seed.evaporation_percent,
        targets: formulation
            .targets
            .iter()
            .map(|(field, value)| (field.as_str().to_string(), value))
            .collect(),
        lines: formulation
            .result
            .lines
            .iter()
            .map(|line| line.to_entry())
            .collect(),
    }
}
