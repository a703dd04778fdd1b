pub mod advise;
pub mod analyze;
pub mod catalog;
pub mod optimize;

use crate::config::AppConfig;
use crate::error::Result;
use cryoform::core::archetypes::bands::TargetBandTable;
use cryoform::core::catalog::IngredientCatalog;
use tracing::info;

/// The built-in catalog with every configured catalog layered over it, in order.
pub fn load_catalog(config: &AppConfig) -> Result<IngredientCatalog> {
    let mut catalog = IngredientCatalog::builtin()?;
    for path in &config.catalog_paths {
        info!("Loading ingredient catalog from {:?}", path);
        catalog.extend(IngredientCatalog::load(path)?);
    }
    info!("Ingredient catalog holds {} record(s).", catalog.len());
    Ok(catalog)
}

/// The built-in target bands, with the configured override file merged over them.
pub fn load_bands(config: &AppConfig) -> Result<TargetBandTable> {
    let mut bands = TargetBandTable::builtin()?;
    if let Some(path) = &config.bands_path {
        info!("Merging target bands from {:?}", path);
        bands.merge(TargetBandTable::load(path)?);
    }
    Ok(bands)
}
