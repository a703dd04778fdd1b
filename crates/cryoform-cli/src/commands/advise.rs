use super::load_catalog;
use crate::cli::AdviseArgs;
use crate::config::{CliOverrides, ConfigSources, build_config};
use crate::error::Result;
use crate::input::PasteFile;
use crate::report;
use cryoform::workflows::preserve;
use tracing::info;

pub fn run(args: AdviseArgs, sources: &ConfigSources) -> Result<()> {
    info!("Loading paste from {:?}", &args.paste);
    let paste = PasteFile::from_file(&args.paste)?;

    let overrides = CliOverrides {
        prefer_ambient: args.ambient,
        clean_label: args.clean_label,
        max_particle_mm: args.max_particle_mm,
        ..Default::default()
    };
    let app_config = build_config(sources, &overrides)?;
    let catalog = load_catalog(&app_config)?;

    info!("Invoking the core preservation workflow...");
    let advice = preserve::run(
        &paste.name,
        paste.lab,
        &paste.components,
        &catalog,
        &app_config.preferences,
    );

    print!("{}", report::preservation(&advice));
    Ok(())
}
