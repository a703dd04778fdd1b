use crate::core::catalog::normalize_key;
use crate::core::chemistry::coefficients::{LACTOSE, LACTOSE_FRACTION_OF_MSNF};
use crate::core::chemistry::metrics::{Metrics, compute_metrics};
use crate::core::models::ingredient::{IngredientCategory, IngredientRecord};
use crate::core::models::recipe::RecipeLine;
use serde::{Deserialize, Serialize};

/// Measured laboratory values for a paste.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LabSpecs {
    pub brix: f64,
    pub ph: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water_activity: Option<f64>,
}

impl LabSpecs {
    pub fn new(brix: f64, ph: f64) -> Self {
        Self {
            brix,
            ph,
            water_activity: None,
        }
    }

    pub fn with_water_activity(mut self, aw: f64) -> Self {
        self.water_activity = Some(aw);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PasteComponent {
    pub ingredient: IngredientRecord,
    pub mass_g: f64,
}

impl PasteComponent {
    pub fn new(ingredient: IngredientRecord, mass_g: f64) -> Self {
        Self { ingredient, mass_g }
    }
}

/// A named blend of sub-ingredients, with the lab values measured on the finished paste.
#[derive(Debug, Clone, PartialEq)]
pub struct PasteFormula {
    pub name: String,
    pub components: Vec<PasteComponent>,
    pub lab: LabSpecs,
}

impl PasteFormula {
    pub fn new(name: &str, lab: LabSpecs) -> Self {
        Self {
            name: name.to_string(),
            components: Vec::new(),
            lab,
        }
    }

    pub fn with_component(mut self, ingredient: IngredientRecord, mass_g: f64) -> Self {
        self.components.push(PasteComponent::new(ingredient, mass_g));
        self
    }

    fn lines(&self) -> Vec<RecipeLine> {
        self.components
            .iter()
            .map(|c| RecipeLine::new(c.ingredient.clone(), c.mass_g))
            .collect()
    }

    pub fn metrics(&self) -> Metrics {
        compute_metrics(&self.lines(), 0.0)
    }

    pub fn has_dairy(&self) -> bool {
        self.lines()
            .iter()
            .any(|l| l.ingredient.category == IngredientCategory::Dairy && l.effective_mass() > 0.0)
    }

    /// Collapses the blend into a single ingredient record.
    ///
    /// Composition fractions are the blend's mass percentages. The blend's SP and PAC are folded
    /// into override coefficients on the aggregate sugars, excluding the lactose the aggregate's
    /// MSNF will contribute again on its own, so a line of the aggregate reproduces the blend.
    pub fn aggregate(&self) -> IngredientRecord {
        let metrics = self.metrics();
        let category = if self.has_dairy() {
            IngredientCategory::Dairy
        } else {
            IngredientCategory::Flavor
        };

        let mut record = IngredientRecord::new(&normalize_key(&self.name), &self.name, category)
            .with_composition(
                metrics.water_pct,
                metrics.fat_pct,
                metrics.sugars_pct,
                metrics.msnf_pct,
                metrics.other_solids_pct,
            );

        if metrics.sugars_pct > 0.0 {
            let lactose_share = metrics.msnf_pct / 100.0 * LACTOSE_FRACTION_OF_MSNF;
            let declared_sp = metrics.sp - lactose_share * LACTOSE.sp * 100.0;
            let declared_pac = metrics.pac - lactose_share * LACTOSE.pac;
            let sp = declared_sp / metrics.sugars_pct;
            let pac = declared_pac / (metrics.sugars_pct / 100.0);
            if sp.is_finite() && pac.is_finite() {
                record = record.with_coefficients(Some(sp.max(0.0)), Some(pac.max(0.0)));
            }
        }

        if let Some(per_kg) = metrics.cost_per_kg.filter(|_| metrics.total_g > 0.0) {
            record = record.with_cost_per_kg(per_kg);
        }
        record
    }
}
