//! # Archetypes Module
//!
//! Reference product archetypes (white base, finished gelato, fruit gelato, sorbet) and the
//! numeric data attached to each of them.
//!
//! - [`centroids`] - One reference centroid and weight vector per archetype, used for
//!   nearest-match classification.
//! - [`bands`] - Closed target ranges per tracked parameter, used for validation.

pub mod bands;
pub mod centroids;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Product archetypes, declared in tie-break priority order: when two archetypes are equally
/// close to a recipe, the one declared first wins.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    WhiteBase,
    FinishedGelato,
    FruitGelato,
    Sorbet,
}

impl Archetype {
    /// Every archetype, in tie-break priority order.
    pub const PRIORITY: [Archetype; 4] = [
        Self::WhiteBase,
        Self::FinishedGelato,
        Self::FruitGelato,
        Self::Sorbet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WhiteBase => "white_base",
            Self::FinishedGelato => "finished_gelato",
            Self::FruitGelato => "fruit_gelato",
            Self::Sorbet => "sorbet",
        }
    }

    pub fn priority(&self) -> usize {
        Self::PRIORITY
            .iter()
            .position(|a| a == self)
            .unwrap_or(usize::MAX)
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error(
    "Unknown archetype '{0}'. Expected one of: white_base, finished_gelato, fruit_gelato, sorbet."
)]
pub struct ParseArchetypeError(String);

impl FromStr for Archetype {
    type Err = ParseArchetypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::PRIORITY
            .into_iter()
            .find(|a| a.as_str() == normalized)
            .ok_or_else(|| ParseArchetypeError(s.to_string()))
    }
}
