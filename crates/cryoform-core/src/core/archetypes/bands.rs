use super::Archetype;
use crate::core::chemistry::metrics::Metrics;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use thiserror::Error;

const BUILTIN_BANDS: &str = include_str!("../../../data/bands.toml");

#[derive(Debug, Error)]
pub enum BandLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Unknown archetype '{name}' in '{path}'")]
    UnknownArchetype { path: String, name: String },
    #[error("Invalid band for {archetype} {field} in '{path}': min {min} exceeds max {max}")]
    InvalidBand {
        path: String,
        archetype: Archetype,
        field: BandField,
        min: f64,
        max: f64,
    },
}

/// A parameter tracked by target bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BandField {
    TotalSolids,
    Fat,
    Sugars,
    Msnf,
    Sp,
    Pac,
    Stabilizer,
    Fruit,
}

impl BandField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TotalSolids => "total_solids_pct",
            Self::Fat => "fat_pct",
            Self::Sugars => "sugars_pct",
            Self::Msnf => "msnf_pct",
            Self::Sp => "sp",
            Self::Pac => "pac",
            Self::Stabilizer => "stabilizer_pct",
            Self::Fruit => "fruit_pct",
        }
    }

    pub fn value(&self, metrics: &Metrics) -> f64 {
        match self {
            Self::TotalSolids => metrics.ts_additive_pct,
            Self::Fat => metrics.fat_pct,
            Self::Sugars => metrics.sugars_pct,
            Self::Msnf => metrics.msnf_pct,
            Self::Sp => metrics.sp,
            Self::Pac => metrics.pac,
            Self::Stabilizer => metrics.stabilizer_pct,
            Self::Fruit => metrics.fruit_pct,
        }
    }
}

impl fmt::Display for BandField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed range `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetBand {
    pub min: f64,
    pub max: f64,
}

impl TargetBand {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Signed distance outside the band: negative below `min`, positive above `max`, zero inside.
    pub fn gap(&self, value: f64) -> f64 {
        if value < self.min {
            value - self.min
        } else if value > self.max {
            value - self.max
        } else {
            0.0
        }
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct TargetBands {
    pub total_solids: TargetBand,
    pub fat: TargetBand,
    pub sugars: TargetBand,
    pub msnf: TargetBand,
    pub sp: TargetBand,
    pub pac: TargetBand,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stabilizer: Option<TargetBand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fruit: Option<TargetBand>,
}

impl TargetBands {
    /// Every configured band, in [`BandField`] order.
    pub fn entries(&self) -> Vec<(BandField, TargetBand)> {
        let mut entries = vec![
            (BandField::TotalSolids, self.total_solids),
            (BandField::Fat, self.fat),
            (BandField::Sugars, self.sugars),
            (BandField::Msnf, self.msnf),
            (BandField::Sp, self.sp),
            (BandField::Pac, self.pac),
        ];
        entries.extend(self.stabilizer.map(|b| (BandField::Stabilizer, b)));
        entries.extend(self.fruit.map(|b| (BandField::Fruit, b)));
        entries
    }

    pub fn get(&self, field: BandField) -> Option<TargetBand> {
        self.entries()
            .into_iter()
            .find(|(f, _)| *f == field)
            .map(|(_, b)| b)
    }
}

/// Target bands for every archetype.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetBandTable {
    bands: BTreeMap<Archetype, TargetBands>,
}

impl TargetBandTable {
    pub fn builtin() -> Result<Self, BandLoadError> {
        Self::from_toml_str(BUILTIN_BANDS, "<builtin>")
    }

    pub fn load(path: &Path) -> Result<Self, BandLoadError> {
        let path_str = path.to_string_lossy().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| BandLoadError::Io {
            path: path_str.clone(),
            source: e,
        })?;
        Self::from_toml_str(&content, &path_str)
    }

    pub fn from_toml_str(content: &str, origin: &str) -> Result<Self, BandLoadError> {
        let raw: BTreeMap<String, TargetBands> =
            toml::from_str(content).map_err(|e| BandLoadError::Toml {
                path: origin.to_string(),
                source: e,
            })?;
        let mut bands = BTreeMap::new();
        for (name, archetype_bands) in raw {
            let archetype: Archetype =
                name.parse().map_err(|_| BandLoadError::UnknownArchetype {
                    path: origin.to_string(),
                    name: name.clone(),
                })?;
            for (field, band) in archetype_bands.entries() {
                if band.min.is_nan() || band.max.is_nan() || band.min > band.max {
                    return Err(BandLoadError::InvalidBand {
                        path: origin.to_string(),
                        archetype,
                        field,
                        min: band.min,
                        max: band.max,
                    });
                }
            }
            bands.insert(archetype, archetype_bands);
        }
        Ok(Self { bands })
    }

    pub fn get(&self, archetype: Archetype) -> Option<&TargetBands> {
        self.bands.get(&archetype)
    }

    pub fn insert(&mut self, archetype: Archetype, bands: TargetBands) {
        self.bands.insert(archetype, bands);
    }

    /// Replaces this table's bands with those defined in `overrides`, archetype by archetype.
    pub fn merge(&mut self, overrides: TargetBandTable) {
        self.bands.extend(overrides.bands);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn builtin_table_covers_every_archetype() {
        let table = TargetBandTable::builtin().unwrap();
        for archetype in Archetype::PRIORITY {
            let bands = table.get(archetype).unwrap();
            for (_, band) in bands.entries() {
                assert!(band.min <= band.max);
            }
        }
        assert!(table.get(Archetype::Sorbet).unwrap().fruit.is_some());
        assert!(table.get(Archetype::WhiteBase).unwrap().fruit.is_none());
    }

    #[test]
    fn band_gap_is_signed() {
        let band = TargetBand::new(10.0, 20.0);
        assert_eq!(band.gap(5.0), -5.0);
        assert_eq!(band.gap(25.0), 5.0);
        assert_eq!(band.gap(15.0), 0.0);
        assert!(band.contains(10.0) && band.contains(20.0));
        assert!(!band.contains(f64::NAN));
    }

    #[test]
    fn load_overrides_and_merge() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bands.toml");
        fs::write(
            &path,
            r#"
            [sorbet]
            total-solids = { min = 26.0, max = 32.0 }
            fat = { min = 0.0, max = 0.5 }
            sugars = { min = 24.0, max = 30.0 }
            msnf = { min = 0.0, max = 0.1 }
            sp = { min = 22.0, max = 28.0 }
            pac = { min = 30.0, max = 38.0 }
            "#,
        )
        .unwrap();
        let overrides = TargetBandTable::load(&path).unwrap();
        let mut table = TargetBandTable::builtin().unwrap();
        table.merge(overrides);
        let sorbet = table.get(Archetype::Sorbet).unwrap();
        assert_eq!(sorbet.total_solids, TargetBand::new(26.0, 32.0));
        assert!(sorbet.fruit.is_none());
        assert!(table.get(Archetype::WhiteBase).is_some());
    }

    #[test]
    fn inverted_band_is_rejected() {
        let content = r#"
            [white_base]
            total-solids = { min = 38.0, max = 32.0 }
            fat = { min = 6.0, max = 10.0 }
            sugars = { min = 16.0, max = 20.0 }
            msnf = { min = 8.0, max = 12.0 }
            sp = { min = 16.0, max = 20.0 }
            pac = { min = 20.0, max = 28.0 }
        "#;
        assert!(matches!(
            TargetBandTable::from_toml_str(content, "inline"),
            Err(BandLoadError::InvalidBand {
                field: BandField::TotalSolids,
                ..
            })
        ));
    }

    #[test]
    fn load_fails_for_missing_file_and_unknown_archetype() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            TargetBandTable::load(&dir.path().join("missing.toml")),
            Err(BandLoadError::Io { .. })
        ));
        assert!(matches!(
            TargetBandTable::from_toml_str(
                "[semifreddo]\ntotal-solids = { min = 1.0, max = 2.0 }\nfat = { min = 1.0, max = 2.0 }\nsugars = { min = 1.0, max = 2.0 }\nmsnf = { min = 1.0, max = 2.0 }\nsp = { min = 1.0, max = 2.0 }\npac = { min = 1.0, max = 2.0 }\n",
                "inline"
            ),
            Err(BandLoadError::UnknownArchetype { .. })
        ));
    }
}
