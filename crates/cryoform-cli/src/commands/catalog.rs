use super::load_catalog;
use crate::cli::{CatalogArgs, CatalogCommands};
use crate::config::{CliOverrides, ConfigSources, build_config};
use crate::error::{CliError, Result};
use crate::report;
use cryoform::core::catalog::MatchKind;
use cryoform::core::models::ingredient::IngredientCategory;
use tracing::info;

pub fn run(args: CatalogArgs, sources: &ConfigSources) -> Result<()> {
    let app_config = build_config(sources, &CliOverrides::default())?;
    let catalog = load_catalog(&app_config)?;

    match args.command {
        CatalogCommands::List { category } => {
            let category = category
                .map(|c| {
                    c.parse::<IngredientCategory>()
                        .map_err(|e| CliError::Argument(e.to_string()))
                })
                .transpose()?;
            let records = catalog
                .iter()
                .filter(|record| category.is_none_or(|c| record.category == c));
            print!("{}", report::catalog_listing(records));
        }
        CatalogCommands::Show { name } => {
            let found = catalog.lookup(&name).ok_or_else(|| {
                CliError::Argument(format!("No ingredient matches '{}'", name))
            })?;
            if found.kind == MatchKind::Fuzzy {
                info!("'{}' matched '{}' by substring.", name, found.record.id);
            }
            print!("{}", report::ingredient(found.record));
        }
    }
    Ok(())
}
