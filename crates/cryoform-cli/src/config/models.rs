use cryoform::core::preservation::advice::Preferences;
use cryoform::engine::config::OptimizationConfig;
use std::path::PathBuf;

/// Fully merged settings for one invocation.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Extra catalogs layered over the built-in one, in load order.
    pub catalog_paths: Vec<PathBuf>,
    pub bands_path: Option<PathBuf>,
    pub evaporation_percent: f64,
    pub optimization: OptimizationConfig,
    pub preferences: Preferences,
}
