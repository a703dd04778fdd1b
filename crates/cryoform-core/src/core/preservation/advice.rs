use serde::{Deserialize, Serialize};
use std::fmt;

/// Preservation methods, in the order used to break confidence ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreservationMethod {
    HotFill,
    Retort,
    Frozen,
    FreezeDry,
}

impl PreservationMethod {
    pub const ALL: [PreservationMethod; 4] =
        [Self::HotFill, Self::Retort, Self::Frozen, Self::FreezeDry];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HotFill => "hot_fill",
            Self::Retort => "retort",
            Self::Frozen => "frozen",
            Self::FreezeDry => "freeze_dry",
        }
    }
}

impl fmt::Display for PreservationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageClass {
    Ambient,
    Chilled,
    Frozen,
}

impl fmt::Display for StorageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ambient => "ambient",
            Self::Chilled => "chilled",
            Self::Frozen => "frozen",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        })
    }
}

/// Qualitative effect of a method on the paste once it is used in gelato.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GelatoImpact {
    pub aroma_retention: ImpactLevel,
    pub browning: ImpactLevel,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

/// Numeric process targets. `None` means the method sets no limit for that value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessTargets {
    pub brix_min: Option<f64>,
    pub ph_max: Option<f64>,
    pub water_activity_max: Option<f64>,
    pub particle_size_max_mm: Option<f64>,
}

/// Non-binding guidance. Every recommendation must be confirmed by an external process
/// authority, which `requires_process_validation` records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreservationAdvice {
    pub method: PreservationMethod,
    pub confidence: f64,
    pub rationale: Vec<String>,
    pub targets: ProcessTargets,
    pub packaging: Vec<String>,
    pub storage: StorageClass,
    pub shelf_life_hint: String,
    pub gelato_impact: GelatoImpact,
    pub requires_process_validation: bool,
}

pub const DEFAULT_MAX_PARTICLE_MM: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Preferences {
    pub prefer_ambient: bool,
    pub clean_label: bool,
    /// Largest particle (inclusions, seeds, fruit pieces) the paste will carry, in millimetres.
    pub max_particle_mm: f64,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            prefer_ambient: false,
            clean_label: false,
            max_particle_mm: DEFAULT_MAX_PARTICLE_MM,
        }
    }
}
