use crate::error::{CliError, Result};
use cryoform::core::archetypes::Archetype;
use cryoform::core::models::recipe::RecipeEntry;
use cryoform::core::preservation::paste::LabSpecs;
use cryoform::engine::targets::{TargetField, TargetSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// A recipe as written on disk. Also the format `optimize` writes back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct RecipeFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archetype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaporation_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub targets: BTreeMap<String, f64>,
    #[serde(default)]
    pub lines: Vec<RecipeEntry>,
}

impl RecipeFile {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading recipe from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| CliError::Other(anyhow::Error::new(e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn archetype(&self) -> Result<Option<Archetype>> {
        self.archetype.as_deref().map(parse_archetype).transpose()
    }

    pub fn targets(&self) -> Result<TargetSet> {
        self.targets
            .iter()
            .map(|(key, &value)| {
                let field: TargetField = key
                    .parse()
                    .map_err(|e: cryoform::engine::targets::ParseTargetFieldError| {
                        CliError::Argument(e.to_string())
                    })?;
                Ok((field, value))
            })
            .collect()
    }
}

/// A flavor paste as written on disk.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct PasteFile {
    pub name: String,
    pub lab: LabSpecs,
    #[serde(default)]
    pub components: Vec<RecipeEntry>,
}

impl PasteFile {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading paste from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}

pub fn parse_archetype(text: &str) -> Result<Archetype> {
    text.parse()
        .map_err(|e: cryoform::core::archetypes::ParseArchetypeError| {
            CliError::Argument(e.to_string())
        })
}

/// Parses a `FIELD=VALUE` target given on the command line.
pub fn parse_target_assignment(text: &str) -> Result<(TargetField, f64)> {
    let Some((key, value)) = text.split_once('=') else {
        return Err(CliError::Argument(format!(
            "Invalid target format: '{}'. Expected FIELD=VALUE.",
            text
        )));
    };
    let field: TargetField = key
        .parse()
        .map_err(|e: cryoform::engine::targets::ParseTargetFieldError| {
            CliError::Argument(e.to_string())
        })?;
    let value: f64 = value.trim().parse().map_err(|_| {
        CliError::Argument(format!("Invalid number for target '{}': {}", key, value))
    })?;
    if !value.is_finite() {
        return Err(CliError::Argument(format!(
            "Target '{}' must be a finite number",
            key
        )));
    }
    Ok((field, value))
}
