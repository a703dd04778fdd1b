use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Tolerance, in percentage points, for a composition to count as summing to 100.
pub const COMPOSITION_SUM_TOLERANCE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngredientCategory {
    Dairy,
    Sugar,
    Stabilizer,
    Fruit,
    Flavor,
    Fat,
    Other,
}

impl IngredientCategory {
    pub const ALL: [IngredientCategory; 7] = [
        Self::Dairy,
        Self::Sugar,
        Self::Stabilizer,
        Self::Fruit,
        Self::Flavor,
        Self::Fat,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dairy => "dairy",
            Self::Sugar => "sugar",
            Self::Stabilizer => "stabilizer",
            Self::Fruit => "fruit",
            Self::Flavor => "flavor",
            Self::Fat => "fat",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for IngredientCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown ingredient category: '{0}'")]
pub struct ParseCategoryError(String);

impl FromStr for IngredientCategory {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseCategoryError(s.to_string()))
    }
}

/// Reference sugars with tabulated sweetening (SP) and anti-freezing (PAC) power.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SugarKind {
    Sucrose,
    Dextrose,
    Fructose,
    InvertSugar,
    Lactose,
    GlucoseSyrup,
}

impl SugarKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sucrose => "sucrose",
            Self::Dextrose => "dextrose",
            Self::Fructose => "fructose",
            Self::InvertSugar => "invert_sugar",
            Self::Lactose => "lactose",
            Self::GlucoseSyrup => "glucose_syrup",
        }
    }
}

impl fmt::Display for SugarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Glucose / fructose / sucrose shares of a fruit's sugar, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SugarSplit {
    pub glucose: f64,
    pub fructose: f64,
    pub sucrose: f64,
}

impl SugarSplit {
    /// Rescales the split so it sums to 100. Returns `None` when the split carries no usable mass.
    pub fn normalized(&self) -> Option<SugarSplit> {
        let parts = [self.glucose, self.fructose, self.sucrose].map(|p| p.max(0.0));
        let sum: f64 = parts.iter().sum();
        if !sum.is_finite() || sum <= 0.0 {
            return None;
        }
        Some(SugarSplit {
            glucose: parts[0] / sum * 100.0,
            fructose: parts[1] / sum * 100.0,
            sucrose: parts[2] / sum * 100.0,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientRecord {
    pub id: String,
    pub name: String,
    pub category: IngredientCategory,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub water: f64,
    #[serde(default)]
    pub fat: f64,
    #[serde(default)]
    pub sugars: f64,
    #[serde(default)]
    pub msnf: f64,
    #[serde(default)]
    pub other_solids: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pac: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sugar_kind: Option<SugarKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sugar_split: Option<SugarSplit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_per_kg: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CompositionWarning {
    SumOutOfTolerance { ingredient: String, sum: f64 },
    NegativeFraction {
        ingredient: String,
        field: &'static str,
        value: f64,
    },
    NonFiniteFraction {
        ingredient: String,
        field: &'static str,
    },
}

impl fmt::Display for CompositionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SumOutOfTolerance { ingredient, sum } => write!(
                f,
                "Composition of '{}' sums to {:.2}% (expected 100 ± {:.1})",
                ingredient, sum, COMPOSITION_SUM_TOLERANCE
            ),
            Self::NegativeFraction {
                ingredient,
                field,
                value,
            } => write!(
                f,
                "Composition of '{}' has negative {} fraction ({:.2})",
                ingredient, field, value
            ),
            Self::NonFiniteFraction { ingredient, field } => write!(
                f,
                "Composition of '{}' has a non-finite {} fraction",
                ingredient, field
            ),
        }
    }
}

impl IngredientRecord {
    pub fn new(id: &str, name: &str, category: IngredientCategory) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            category,
            aliases: Vec::new(),
            water: 0.0,
            fat: 0.0,
            sugars: 0.0,
            msnf: 0.0,
            other_solids: 0.0,
            sp: None,
            pac: None,
            sugar_kind: None,
            sugar_split: None,
            cost_per_kg: None,
        }
    }

    /// Sets the five composition fractions (water, fat, sugars, MSNF, other solids), in percent.
    pub fn with_composition(
        mut self,
        water: f64,
        fat: f64,
        sugars: f64,
        msnf: f64,
        other_solids: f64,
    ) -> Self {
        self.water = water;
        self.fat = fat;
        self.sugars = sugars;
        self.msnf = msnf;
        self.other_solids = other_solids;
        self
    }

    pub fn with_coefficients(mut self, sp: Option<f64>, pac: Option<f64>) -> Self {
        self.sp = sp;
        self.pac = pac;
        self
    }

    pub fn with_sugar_kind(mut self, kind: SugarKind) -> Self {
        self.sugar_kind = Some(kind);
        self
    }

    pub fn with_sugar_split(mut self, glucose: f64, fructose: f64, sucrose: f64) -> Self {
        self.sugar_split = Some(SugarSplit {
            glucose,
            fructose,
            sucrose,
        });
        self
    }

    pub fn with_cost_per_kg(mut self, cost: f64) -> Self {
        self.cost_per_kg = Some(cost);
        self
    }

    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|a| a.to_string()).collect();
        self
    }

    /// Stand-in composition for a reference the catalog cannot resolve:
    /// 80% water and 20% other solids, no sugar, no fat.
    pub fn unknown(reference: &str) -> Self {
        Self::new(reference, reference, IngredientCategory::Other).with_composition(
            80.0, 0.0, 0.0, 0.0, 20.0,
        )
    }

    pub fn composition_sum(&self) -> f64 {
        self.water + self.fat + self.sugars + self.msnf + self.other_solids
    }

    pub fn solids(&self) -> f64 {
        self.fat + self.sugars + self.msnf + self.other_solids
    }

    fn fractions(&self) -> [(&'static str, f64); 5] {
        [
            ("water", self.water),
            ("fat", self.fat),
            ("sugars", self.sugars),
            ("msnf", self.msnf),
            ("other_solids", self.other_solids),
        ]
    }

    pub fn validate(&self) -> Vec<CompositionWarning> {
        let mut warnings = Vec::new();
        for (field, value) in self.fractions() {
            if !value.is_finite() {
                warnings.push(CompositionWarning::NonFiniteFraction {
                    ingredient: self.id.clone(),
                    field,
                });
            } else if value < 0.0 {
                warnings.push(CompositionWarning::NegativeFraction {
                    ingredient: self.id.clone(),
                    field,
                    value,
                });
            }
        }
        let sum = self.composition_sum();
        if sum.is_finite() && (sum - 100.0).abs() > COMPOSITION_SUM_TOLERANCE {
            warnings.push(CompositionWarning::SumOutOfTolerance {
                ingredient: self.id.clone(),
                sum,
            });
        }
        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn whole_milk() -> IngredientRecord {
        IngredientRecord::new("whole_milk", "Whole milk", IngredientCategory::Dairy)
            .with_composition(87.4, 3.6, 0.0, 9.0, 0.0)
    }

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!(
            "Dairy".parse::<IngredientCategory>(),
            Ok(IngredientCategory::Dairy)
        );
        assert_eq!(
            " fruit ".parse::<IngredientCategory>(),
            Ok(IngredientCategory::Fruit)
        );
        assert!("cheese".parse::<IngredientCategory>().is_err());
    }

    #[test]
    fn well_formed_composition_has_no_warnings() {
        assert!(whole_milk().validate().is_empty());
    }

    #[test]
    fn composition_outside_tolerance_is_reported_not_rejected() {
        let record = whole_milk().with_composition(80.0, 3.6, 0.0, 9.0, 0.0);
        let warnings = record.validate();
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            warnings[0],
            CompositionWarning::SumOutOfTolerance { sum, .. } if (sum - 92.6).abs() < 1e-9
        ));
    }

    #[test]
    fn negative_and_non_finite_fractions_are_reported() {
        let record = whole_milk().with_composition(f64::NAN, -1.0, 0.0, 9.0, 0.0);
        let warnings = record.validate();
        assert!(warnings.iter().any(|w| matches!(
            w,
            CompositionWarning::NonFiniteFraction { field: "water", .. }
        )));
        assert!(warnings.iter().any(|w| matches!(
            w,
            CompositionWarning::NegativeFraction { field: "fat", .. }
        )));
    }

    #[test]
    fn sugar_split_normalizes_to_one_hundred() {
        let split = SugarSplit {
            glucose: 2.0,
            fructose: 3.0,
            sucrose: 5.0,
        };
        let normalized = split.normalized().unwrap();
        assert!((normalized.glucose - 20.0).abs() < 1e-12);
        assert!((normalized.fructose - 30.0).abs() < 1e-12);
        assert!((normalized.sucrose - 50.0).abs() < 1e-12);
    }

    #[test]
    fn empty_sugar_split_cannot_be_normalized() {
        let split = SugarSplit {
            glucose: 0.0,
            fructose: 0.0,
            sucrose: 0.0,
        };
        assert!(split.normalized().is_none());
    }

    #[test]
    fn unknown_record_uses_default_composition() {
        let record = IngredientRecord::unknown("mystery");
        assert_eq!(record.category, IngredientCategory::Other);
        assert_eq!(record.water, 80.0);
        assert_eq!(record.other_solids, 20.0);
        assert!(record.validate().is_empty());
    }
}
