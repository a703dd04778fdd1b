use super::{load_bands, load_catalog};
use crate::cli::AnalyzeArgs;
use crate::config::{CliOverrides, ConfigSources, build_config};
use crate::error::Result;
use crate::input::{RecipeFile, parse_archetype};
use crate::report;
use crate::utils::progress::CliProgressHandler;
use cryoform::engine::progress::ProgressReporter;
use cryoform::workflows::analyze::{self, AnalysisConfig};
use tracing::{info, warn};

pub fn run(args: AnalyzeArgs, sources: &ConfigSources) -> Result<()> {
    info!("Loading recipe from {:?}", &args.recipe);
    let recipe = RecipeFile::from_file(&args.recipe)?;

    let overrides = CliOverrides {
        evaporation_percent: args.evaporation.or(recipe.evaporation_percent),
        ..Default::default()
    };
    let app_config = build_config(sources, &overrides)?;
    let catalog = load_catalog(&app_config)?;
    let bands = load_bands(&app_config)?;

    let archetype = match &args.archetype {
        Some(name) => Some(parse_archetype(name)?),
        None => recipe.archetype()?,
    };
    let config = AnalysisConfig {
        evaporation_percent: app_config.evaporation_percent,
        archetype,
    };

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    info!("Invoking the core analysis workflow...");
    let analysis = analyze::run(&recipe.lines, &catalog, &bands, &config, &reporter)?;

    if let Some(name) = &recipe.name {
        println!("{}\n", name);
    }
    print!("{}", report::analysis(&analysis));

    if !analysis.validation.all_passed() {
        warn!(
            "{} band(s) out of range for {}.",
            analysis.validation.failures().len(),
            analysis.validated_against
        );
    }
    Ok(())
}
