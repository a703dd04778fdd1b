use crate::core::archetypes::bands::{BandField, TargetBands};
use crate::core::chemistry::metrics::{IngredientProfile, Metrics};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A metric the optimizer can be asked to hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetField {
    TotalSolids,
    Sugars,
    Fat,
    Msnf,
    Sp,
    Pac,
}

impl TargetField {
    pub const ALL: [TargetField; 6] = [
        Self::TotalSolids,
        Self::Sugars,
        Self::Fat,
        Self::Msnf,
        Self::Sp,
        Self::Pac,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TotalSolids => "total-solids",
            Self::Sugars => "sugars",
            Self::Fat => "fat",
            Self::Msnf => "msnf",
            Self::Sp => "sp",
            Self::Pac => "pac",
        }
    }

    /// Objective weight. SP and PAC are derived quantities and count half.
    pub fn weight(&self) -> f64 {
        match self {
            Self::Sp | Self::Pac => 0.5,
            _ => 1.0,
        }
    }

    pub fn band_field(&self) -> BandField {
        match self {
            Self::TotalSolids => BandField::TotalSolids,
            Self::Sugars => BandField::Sugars,
            Self::Fat => BandField::Fat,
            Self::Msnf => BandField::Msnf,
            Self::Sp => BandField::Sp,
            Self::Pac => BandField::Pac,
        }
    }

    pub fn value(&self, metrics: &Metrics) -> f64 {
        match self {
            Self::TotalSolids => metrics.ts_additive_pct,
            Self::Sugars => metrics.sugars_pct,
            Self::Fat => metrics.fat_pct,
            Self::Msnf => metrics.msnf_pct,
            Self::Sp => metrics.sp,
            Self::Pac => metrics.pac,
        }
    }

    /// What one gram of the ingredient carries of this field, on the field's own scale.
    pub fn density(&self, profile: &IngredientProfile) -> f64 {
        match self {
            Self::TotalSolids => profile.total_solids_pct,
            Self::Sugars => profile.sugars_pct,
            Self::Fat => profile.fat_pct,
            Self::Msnf => profile.msnf_pct,
            Self::Sp => profile.sp,
            Self::Pac => profile.pac,
        }
    }
}

impl fmt::Display for TargetField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown target field '{0}'. Expected one of: ts, sugars, fat, msnf, sp, pac.")]
pub struct ParseTargetFieldError(String);

impl FromStr for TargetField {
    type Err = ParseTargetFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('_', "-");
        let key = key.strip_suffix("-pct").unwrap_or(&key);
        match key {
            "ts" | "total-solids" => Ok(Self::TotalSolids),
            "sugars" => Ok(Self::Sugars),
            "fat" => Ok(Self::Fat),
            "msnf" => Ok(Self::Msnf),
            "sp" => Ok(Self::Sp),
            "pac" => Ok(Self::Pac),
            _ => Err(ParseTargetFieldError(s.to_string())),
        }
    }
}

/// A sparse set of target values. Fields without a target do not affect the objective.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetSet(BTreeMap<TargetField, f64>);

impl TargetSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Targets the midpoint of every band an archetype defines for a targetable field.
    pub fn from_bands(bands: &TargetBands) -> Self {
        TargetField::ALL
            .into_iter()
            .filter_map(|field| bands.get(field.band_field()).map(|b| (field, b.midpoint())))
            .collect()
    }

    pub fn with(mut self, field: TargetField, value: f64) -> Self {
        self.insert(field, value);
        self
    }

    /// Non-finite targets are ignored.
    pub fn insert(&mut self, field: TargetField, value: f64) {
        if value.is_finite() {
            self.0.insert(field, value);
        }
    }

    pub fn get(&self, field: TargetField) -> Option<f64> {
        self.0.get(&field).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TargetField, f64)> + '_ {
        self.0.iter().map(|(f, v)| (*f, *v))
    }

    /// Signed error `value - target` for every targeted field.
    pub fn errors(&self, metrics: &Metrics) -> Vec<(TargetField, f64)> {
        self.iter()
            .map(|(field, target)| (field, field.value(metrics) - target))
            .collect()
    }

    /// Weighted sum of squared errors.
    pub fn objective(&self, metrics: &Metrics) -> f64 {
        let total: f64 = self
            .errors(metrics)
            .into_iter()
            .map(|(field, err)| field.weight() * err * err)
            .sum();
        if total.is_finite() { total } else { f64::MAX }
    }
}

impl FromIterator<(TargetField, f64)> for TargetSet {
    fn from_iter<I: IntoIterator<Item = (TargetField, f64)>>(iter: I) -> Self {
        let mut set = TargetSet::new();
        for (field, value) in iter {
            set.insert(field, value);
        }
        set
    }
}
