use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::AppConfig;
use crate::error::{CliError, Result};
use cryoform::core::preservation::advice::Preferences;
use cryoform::engine::config::OptimizationConfigBuilder;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Where configuration comes from besides command-specific flags.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigSources<'a> {
    pub config_path: Option<&'a Path>,
    pub set_values: &'a [String],
    pub catalogs: &'a [PathBuf],
    pub bands: Option<&'a Path>,
}

/// Command-line values that win over every other layer.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub evaporation_percent: Option<f64>,
    pub max_iterations: Option<usize>,
    pub step_scale: Option<f64>,
    pub locked: Vec<String>,
    pub preserve_batch_mass: bool,
    pub prefer_ambient: bool,
    pub clean_label: bool,
    pub max_particle_mm: Option<f64>,
}

pub fn build_config(sources: &ConfigSources, overrides: &CliOverrides) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = if let Some(config_path) = sources.config_path {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };

    let mut file_config = apply_set_values(file_config, sources.set_values)?;

    let metrics_file = file_config.metrics.take().unwrap_or_default();
    let evaporation_percent = overrides
        .evaporation_percent
        .or(metrics_file.evaporation_percent)
        .unwrap_or(defaults.evaporation_percent);

    let opt_file = file_config.optimization.take().unwrap_or_default();
    let max_iterations = overrides
        .max_iterations
        .or(opt_file.max_iterations)
        .unwrap_or(defaults.max_iterations);
    let step_scale = overrides
        .step_scale
        .or(opt_file.step_scale)
        .unwrap_or(defaults.step_scale);
    let convergence_threshold = opt_file
        .convergence_threshold
        .unwrap_or(defaults.convergence_threshold);
    let preserve_batch_mass = overrides.preserve_batch_mass
        || opt_file
            .preserve_batch_mass
            .unwrap_or(defaults.preserve_batch_mass);

    let optimization = OptimizationConfigBuilder::new()
        .max_iterations(max_iterations)
        .step_scale(step_scale)
        .convergence_threshold(convergence_threshold)
        .evaporation_percent(evaporation_percent)
        .locked_ingredients(opt_file.locked.unwrap_or_default())
        .locked_ingredients(overrides.locked.iter().cloned())
        .preserve_batch_mass(preserve_batch_mass)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    let pres_file = file_config.preservation.take().unwrap_or_default();
    let max_particle_mm = overrides
        .max_particle_mm
        .or(pres_file.max_particle_mm)
        .unwrap_or(defaults.max_particle_mm);
    if !max_particle_mm.is_finite() || max_particle_mm < 0.0 {
        return Err(CliError::Config(format!(
            "`preservation.max-particle-mm` must be zero or positive, got {}",
            max_particle_mm
        )));
    }
    let preferences = Preferences {
        prefer_ambient: overrides.prefer_ambient
            || pres_file.prefer_ambient.unwrap_or(defaults.prefer_ambient),
        clean_label: overrides.clean_label
            || pres_file.clean_label.unwrap_or(defaults.clean_label),
        max_particle_mm,
    };

    let mut catalog_paths = file_config.catalogs.take().unwrap_or_default();
    catalog_paths.extend(sources.catalogs.iter().cloned());
    let bands_path = sources
        .bands
        .map(Path::to_path_buf)
        .or(file_config.bands.take());

    Ok(AppConfig {
        catalog_paths,
        bands_path,
        evaporation_percent,
        optimization,
        preferences,
    })
}

fn parse_value<T: FromStr>(key: &str, value_str: &str, kind: &str) -> Result<T> {
    value_str
        .trim()
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value_str)))
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value_str)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };
        let key = key.trim();

        match key {
            "bands" => config.bands = Some(PathBuf::from(value_str.trim())),
            "metrics.evaporation-percent" => {
                config
                    .metrics
                    .get_or_insert_with(Default::default)
                    .evaporation_percent = Some(parse_value(key, value_str, "float")?);
            }
            "optimization.max-iterations" => {
                config
                    .optimization
                    .get_or_insert_with(Default::default)
                    .max_iterations = Some(parse_value(key, value_str, "integer")?);
            }
            "optimization.step-scale" => {
                config
                    .optimization
                    .get_or_insert_with(Default::default)
                    .step_scale = Some(parse_value(key, value_str, "float")?);
            }
            "optimization.convergence-threshold" => {
                config
                    .optimization
                    .get_or_insert_with(Default::default)
                    .convergence_threshold = Some(parse_value(key, value_str, "float")?);
            }
            "optimization.preserve-batch-mass" => {
                config
                    .optimization
                    .get_or_insert_with(Default::default)
                    .preserve_batch_mass = Some(parse_value(key, value_str, "boolean")?);
            }
            "preservation.prefer-ambient" => {
                config
                    .preservation
                    .get_or_insert_with(Default::default)
                    .prefer_ambient = Some(parse_value(key, value_str, "boolean")?);
            }
            "preservation.clean-label" => {
                config
                    .preservation
                    .get_or_insert_with(Default::default)
                    .clean_label = Some(parse_value(key, value_str, "boolean")?);
            }
            "preservation.max-particle-mm" => {
                config
                    .preservation
                    .get_or_insert_with(Default::default)
                    .max_particle_mm = Some(parse_value(key, value_str, "float")?);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}
