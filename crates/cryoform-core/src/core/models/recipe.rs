use super::ingredient::IngredientRecord;
use serde::{Deserialize, Serialize};

/// An unresolved recipe line: an ingredient reference (id, name or alias) and a mass in grams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RecipeEntry {
    pub ingredient: String,
    pub mass_g: f64,
}

impl RecipeEntry {
    pub fn new(ingredient: &str, mass_g: f64) -> Self {
        Self {
            ingredient: ingredient.to_string(),
            mass_g,
        }
    }
}

/// A recipe line whose ingredient has been resolved against a catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeLine {
    pub ingredient: IngredientRecord,
    pub mass_g: f64,
}

impl RecipeLine {
    pub fn new(ingredient: IngredientRecord, mass_g: f64) -> Self {
        Self { ingredient, mass_g }
    }

    /// Line mass with negative and non-finite values read as zero.
    #[inline]
    pub fn effective_mass(&self) -> f64 {
        if self.mass_g.is_finite() && self.mass_g > 0.0 {
            self.mass_g
        } else {
            0.0
        }
    }

    pub fn to_entry(&self) -> RecipeEntry {
        RecipeEntry {
            ingredient: self.ingredient.id.clone(),
            mass_g: self.mass_g,
        }
    }
}

pub fn total_mass(lines: &[RecipeLine]) -> f64 {
    lines.iter().map(RecipeLine::effective_mass).sum()
}
