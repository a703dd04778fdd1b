use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileMetricsConfig {
    pub evaporation_percent: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileOptimizationConfig {
    pub max_iterations: Option<usize>,
    pub step_scale: Option<f64>,
    pub convergence_threshold: Option<f64>,
    pub preserve_batch_mass: Option<bool>,
    pub locked: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FilePreservationConfig {
    pub prefer_ambient: Option<bool>,
    pub clean_label: Option<bool>,
    pub max_particle_mm: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileConfig {
    pub catalogs: Option<Vec<PathBuf>>,
    pub bands: Option<PathBuf>,
    pub metrics: Option<FileMetricsConfig>,
    pub optimization: Option<FileOptimizationConfig>,
    pub preservation: Option<FilePreservationConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn parses_every_section() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cryoform.toml");
        fs::write(
            &path,
            r#"
            catalogs = ["house.toml"]
            bands = "bands.toml"

            [metrics]
            evaporation-percent = 4.0

            [optimization]
            max-iterations = 300
            step-scale = 0.5
            convergence-threshold = 0.001
            preserve-batch-mass = true
            locked = ["stabilizer_blend"]

            [preservation]
            prefer-ambient = true
            max-particle-mm = 3.0
            "#,
        )
        .unwrap();

        let config = FileConfig::from_file(&path).unwrap();
        assert_eq!(config.catalogs, Some(vec![PathBuf::from("house.toml")]));
        assert_eq!(config.metrics.unwrap().evaporation_percent, Some(4.0));
        let optimization = config.optimization.unwrap();
        assert_eq!(optimization.max_iterations, Some(300));
        assert_eq!(optimization.locked, Some(vec!["stabilizer_blend".to_string()]));
        let preservation = config.preservation.unwrap();
        assert_eq!(preservation.prefer_ambient, Some(true));
        assert_eq!(preservation.clean_label, None);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("typo.toml");
        fs::write(&path, "[optimization]\nmax-iteration = 10\n").unwrap();

        let result = FileConfig::from_file(&path);
        assert!(matches!(result, Err(CliError::FileParsing { .. })));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempdir().unwrap();
        let result = FileConfig::from_file(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(CliError::Io(_))));
    }
}
