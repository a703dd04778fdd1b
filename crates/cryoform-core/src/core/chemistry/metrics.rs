use super::coefficients::{self, WeightedSugar};
use crate::core::models::ingredient::{IngredientCategory, IngredientRecord};
use crate::core::models::recipe::RecipeLine;
use serde::Serialize;
use tracing::{trace, warn};

/// Threshold, in percentage points, above which the two total-solids values are reported as
/// inconsistent.
pub const TS_DISCREPANCY_THRESHOLD_PCT: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    pub total_mass_g: f64,
    pub evaporated_water_g: f64,
    pub total_g: f64,

    pub water_g: f64,
    pub sugars_g: f64,
    pub fat_g: f64,
    pub msnf_g: f64,
    pub other_solids_g: f64,

    pub water_pct: f64,
    pub sugars_pct: f64,
    pub fat_pct: f64,
    pub msnf_pct: f64,
    pub other_solids_pct: f64,

    pub ts_additive_pct: f64,
    pub ts_mass_balance_pct: f64,

    pub sp: f64,
    pub pac: f64,

    pub stabilizer_pct: f64,
    pub fruit_pct: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_per_kg: Option<f64>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<String>,
}

impl Metrics {
    /// Absolute difference between the additive and mass-balance total solids, in points.
    pub fn ts_discrepancy(&self) -> f64 {
        (self.ts_additive_pct - self.ts_mass_balance_pct).abs()
    }

    pub fn has_ts_discrepancy(&self) -> bool {
        self.ts_discrepancy() > TS_DISCREPANCY_THRESHOLD_PCT
    }

    /// Rescales every extensive quantity by `factor`. Percentages, SP and PAC are intensive and
    /// stay unchanged.
    pub fn scaled(&self, factor: f64) -> Metrics {
        let k = if factor.is_finite() && factor > 0.0 {
            factor
        } else {
            0.0
        };
        Metrics {
            total_mass_g: self.total_mass_g * k,
            evaporated_water_g: self.evaporated_water_g * k,
            total_g: self.total_g * k,
            water_g: self.water_g * k,
            sugars_g: self.sugars_g * k,
            fat_g: self.fat_g * k,
            msnf_g: self.msnf_g * k,
            other_solids_g: self.other_solids_g * k,
            cost: self.cost.map(|c| c * k),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct ComponentMasses {
    water: f64,
    sugars: f64,
    fat: f64,
    msnf: f64,
    other_solids: f64,
}

impl ComponentMasses {
    fn of_line(record: &IngredientRecord, mass_g: f64) -> Self {
        let part = |fraction: f64| {
            let m = mass_g * fraction / 100.0;
            if m.is_finite() { m.max(0.0) } else { 0.0 }
        };
        Self {
            water: part(record.water),
            sugars: part(record.sugars),
            fat: part(record.fat),
            msnf: part(record.msnf),
            other_solids: part(record.other_solids),
        }
    }

    fn add(&mut self, other: &ComponentMasses) {
        self.water += other.water;
        self.sugars += other.sugars;
        self.fat += other.fat;
        self.msnf += other.msnf;
        self.other_solids += other.other_solids;
    }
}

#[inline]
fn pct(part: f64, total: f64) -> f64 {
    if total > 0.0 {
        let value = part / total * 100.0;
        if value.is_finite() { value } else { 0.0 }
    } else {
        0.0
    }
}

fn clamp_evaporation(evaporation_percent: f64) -> f64 {
    if evaporation_percent.is_finite() {
        evaporation_percent.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Every weighted sugar a line carries: its declared sugars plus the lactose inside its MSNF.
fn line_sugars(record: &IngredientRecord, masses: &ComponentMasses) -> Vec<WeightedSugar> {
    let source = coefficients::resolve_sugar_source(record);
    let mut sugars = coefficients::weighted_sugars(&source, masses.sugars);
    sugars.extend(coefficients::implicit_lactose(masses.msnf));
    sugars
}

pub fn compute_metrics(lines: &[RecipeLine], evaporation_percent: f64) -> Metrics {
    let evaporation = clamp_evaporation(evaporation_percent);

    let mut totals = ComponentMasses::default();
    let mut total_mass_g = 0.0;
    let mut stabilizer_g = 0.0;
    let mut fruit_g = 0.0;
    let mut cost = Some(0.0);

    let per_line: Vec<(&RecipeLine, ComponentMasses)> = lines
        .iter()
        .map(|line| {
            let mass = line.effective_mass();
            (line, ComponentMasses::of_line(&line.ingredient, mass))
        })
        .collect();

    for (line, masses) in &per_line {
        let mass = line.effective_mass();
        total_mass_g += mass;
        totals.add(masses);
        match line.ingredient.category {
            IngredientCategory::Stabilizer => stabilizer_g += mass,
            IngredientCategory::Fruit => fruit_g += mass,
            _ => {}
        }
        if mass > 0.0 {
            cost = match (cost, line.ingredient.cost_per_kg) {
                (Some(acc), Some(per_kg)) if per_kg.is_finite() => Some(acc + mass / 1000.0 * per_kg),
                _ => None,
            };
        }
    }

    let evaporated_water_g = (totals.water * evaporation / 100.0).max(0.0);
    let water_g = (totals.water - evaporated_water_g).max(0.0);
    let total_g = (total_mass_g - evaporated_water_g).max(0.0);

    let mut sp = 0.0;
    let mut pac = 0.0;
    let mut diagnostics = Vec::new();

    if total_g > 0.0 {
        for (line, masses) in &per_line {
            for sugar in line_sugars(&line.ingredient, masses) {
                let share = sugar.mass_g / total_g;
                let sp_part = share * sugar.coefficients.sp * 100.0;
                let pac_part = share * sugar.coefficients.pac;
                if !sp_part.is_finite() || !pac_part.is_finite() {
                    let message = format!(
                        "Discarded non-finite SP/PAC contribution from '{}' (sp={}, pac={})",
                        line.ingredient.id, sp_part, pac_part
                    );
                    warn!("{}", message);
                    diagnostics.push(message);
                    continue;
                }
                trace!(
                    ingredient = %line.ingredient.id,
                    mass_g = sugar.mass_g,
                    sp = sp_part,
                    pac = pac_part,
                    "Sugar contribution"
                );
                sp += sp_part;
                pac += pac_part;
            }
        }
    }

    if !sp.is_finite() {
        sp = 0.0;
    }
    if !pac.is_finite() {
        pac = 0.0;
    }

    let sugars_pct = pct(totals.sugars, total_g);
    let fat_pct = pct(totals.fat, total_g);
    let msnf_pct = pct(totals.msnf, total_g);
    let other_solids_pct = pct(totals.other_solids, total_g);
    let water_pct = pct(water_g, total_g);
    let ts_mass_balance_pct = if total_g > 0.0 {
        pct(total_g - water_g, total_g)
    } else {
        0.0
    };

    let cost_per_kg = cost.map(|c| if total_g > 0.0 { c / (total_g / 1000.0) } else { 0.0 });

    Metrics {
        total_mass_g,
        evaporated_water_g,
        total_g,
        water_g,
        sugars_g: totals.sugars,
        fat_g: totals.fat,
        msnf_g: totals.msnf,
        other_solids_g: totals.other_solids,
        water_pct,
        sugars_pct,
        fat_pct,
        msnf_pct,
        other_solids_pct,
        ts_additive_pct: sugars_pct + fat_pct + msnf_pct + other_solids_pct,
        ts_mass_balance_pct,
        sp,
        pac,
        stabilizer_pct: pct(stabilizer_g, total_g),
        fruit_pct: pct(fruit_g, total_g),
        cost,
        cost_per_kg,
        diagnostics,
    }
}

/// Per-gram contribution of one ingredient to a mix, after evaporation.
///
/// For a recipe with post-evaporation total `T`, the percentage of a component is
/// `Σ mᵢ·componentᵢ / T` and SP is `Σ mᵢ·spᵢ / T`, so these values give analytic
/// sensitivities: `∂value/∂mᵢ = (densityᵢ − value·retainedᵢ) / T`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IngredientProfile {
    /// Grams of mix left per gram of ingredient once evaporation is applied.
    pub retained: f64,
    pub sugars_pct: f64,
    pub fat_pct: f64,
    pub msnf_pct: f64,
    pub total_solids_pct: f64,
    pub sp: f64,
    pub pac: f64,
}

pub fn ingredient_profile(record: &IngredientRecord, evaporation_percent: f64) -> IngredientProfile {
    let evaporation = clamp_evaporation(evaporation_percent);
    let masses = ComponentMasses::of_line(record, 1.0);
    let retained = (1.0 - masses.water * evaporation / 100.0).max(0.0);

    let (sp, pac) = line_sugars(record, &masses)
        .iter()
        .fold((0.0, 0.0), |(sp, pac), sugar| {
            let sp_part = sugar.mass_g * sugar.coefficients.sp * 100.0;
            let pac_part = sugar.mass_g * sugar.coefficients.pac;
            if sp_part.is_finite() && pac_part.is_finite() {
                (sp + sp_part, pac + pac_part)
            } else {
                (sp, pac)
            }
        });

    IngredientProfile {
        retained,
        sugars_pct: masses.sugars * 100.0,
        fat_pct: masses.fat * 100.0,
        msnf_pct: masses.msnf * 100.0,
        total_solids_pct: (masses.sugars + masses.fat + masses.msnf + masses.other_solids) * 100.0,
        sp,
        pac,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::ingredient::SugarKind;

    const EPS: f64 = 1e-9;

    fn whole_milk() -> IngredientRecord {
        IngredientRecord::new("whole_milk", "Whole milk", IngredientCategory::Dairy)
            .with_composition(87.4, 3.6, 0.0, 9.0, 0.0)
            .with_cost_per_kg(1.2)
    }

    fn cream() -> IngredientRecord {
        IngredientRecord::new("cream_25", "Cream 25%", IngredientCategory::Dairy)
            .with_composition(69.0, 25.0, 0.0, 6.0, 0.0)
            .with_cost_per_kg(4.0)
    }

    fn sucrose() -> IngredientRecord {
        IngredientRecord::new("sucrose", "Sucrose", IngredientCategory::Sugar)
            .with_composition(0.0, 0.0, 100.0, 0.0, 0.0)
            .with_cost_per_kg(1.0)
    }

    fn dextrose() -> IngredientRecord {
        IngredientRecord::new("dextrose", "Dextrose", IngredientCategory::Sugar)
            .with_composition(0.0, 0.0, 100.0, 0.0, 0.0)
            .with_cost_per_kg(1.5)
    }

    fn skim_milk_powder() -> IngredientRecord {
        IngredientRecord::new("skim_milk_powder", "Skim milk powder", IngredientCategory::Dairy)
            .with_composition(3.5, 0.8, 0.0, 95.7, 0.0)
            .with_cost_per_kg(3.5)
    }

    fn stabilizer() -> IngredientRecord {
        IngredientRecord::new("stabilizer_blend", "Stabilizer blend", IngredientCategory::Stabilizer)
            .with_composition(8.0, 0.0, 0.0, 0.0, 92.0)
            .with_cost_per_kg(20.0)
    }

    fn strawberry(split: (f64, f64, f64)) -> IngredientRecord {
        IngredientRecord::new("strawberry", "Strawberry", IngredientCategory::Fruit)
            .with_composition(90.0, 0.3, 6.0, 0.0, 3.7)
            .with_sugar_split(split.0, split.1, split.2)
    }

    fn fior_di_latte() -> Vec<RecipeLine> {
        vec![
            RecipeLine::new(whole_milk(), 580.0),
            RecipeLine::new(cream(), 200.0),
            RecipeLine::new(sucrose(), 170.0),
            RecipeLine::new(skim_milk_powder(), 45.0),
            RecipeLine::new(stabilizer(), 5.0),
        ]
    }

    #[test]
    fn classic_white_base_falls_in_expected_ranges() {
        let m = compute_metrics(&fior_di_latte(), 0.0);
        assert!((m.total_g - 1000.0).abs() < EPS);
        assert!(m.ts_additive_pct > 32.0 && m.ts_additive_pct < 38.0, "ts {}", m.ts_additive_pct);
        assert!(m.fat_pct > 7.0 && m.fat_pct < 10.0, "fat {}", m.fat_pct);
        assert!(m.sugars_pct > 16.0 && m.sugars_pct < 20.0, "sugars {}", m.sugars_pct);
        assert!(m.msnf_pct > 8.0 && m.msnf_pct < 12.0, "msnf {}", m.msnf_pct);
        assert!(m.sp > 14.0 && m.sp < 22.0, "sp {}", m.sp);
        assert!(m.pac > 20.0 && m.pac < 30.0, "pac {}", m.pac);
        assert!(m.diagnostics.is_empty());
    }

    #[test]
    fn dextrose_substitution_lowers_sp_and_raises_pac() {
        let with_sucrose = compute_metrics(
            &[
                RecipeLine::new(whole_milk(), 850.0),
                RecipeLine::new(sucrose(), 150.0),
            ],
            0.0,
        );
        let with_dextrose = compute_metrics(
            &[
                RecipeLine::new(whole_milk(), 850.0),
                RecipeLine::new(dextrose(), 150.0),
            ],
            0.0,
        );
        assert!(with_dextrose.sp < with_sucrose.sp);
        assert!(with_dextrose.pac > with_sucrose.pac);
    }

    #[test]
    fn mass_is_conserved_under_evaporation() {
        for evaporation in [0.0, 10.0, 37.5, 100.0] {
            let lines = fior_di_latte();
            let m = compute_metrics(&lines, evaporation);
            let sum: f64 = lines.iter().map(|l| l.mass_g).sum();
            assert!((m.total_g - (sum - m.evaporated_water_g)).abs() < EPS);
            assert!((m.total_mass_g - sum).abs() < EPS);
        }
    }

    #[test]
    fn evaporation_is_clamped_to_valid_range() {
        let lines = fior_di_latte();
        assert_eq!(compute_metrics(&lines, -20.0), compute_metrics(&lines, 0.0));
        assert_eq!(compute_metrics(&lines, 250.0), compute_metrics(&lines, 100.0));
        assert_eq!(compute_metrics(&lines, f64::NAN), compute_metrics(&lines, 0.0));
    }

    #[test]
    fn evaporation_concentrates_solids() {
        let lines = fior_di_latte();
        let fresh = compute_metrics(&lines, 0.0);
        let reduced = compute_metrics(&lines, 20.0);
        assert!((reduced.water_g - fresh.water_g * 0.8).abs() < EPS);
        assert!(reduced.fat_pct > fresh.fat_pct);
        assert!(reduced.sp > fresh.sp);
        assert!((reduced.fat_g - fresh.fat_g).abs() < EPS);
    }

    #[test]
    fn total_solids_agree_for_well_formed_data() {
        let m = compute_metrics(&fior_di_latte(), 0.0);
        assert!(m.ts_discrepancy() < 1e-6);
        assert!(!m.has_ts_discrepancy());
    }

    #[test]
    fn inconsistent_data_shows_up_as_ts_discrepancy() {
        let broken = whole_milk().with_composition(80.0, 3.6, 0.0, 9.0, 0.0);
        let m = compute_metrics(&[RecipeLine::new(broken, 1000.0)], 0.0);
        assert!(m.has_ts_discrepancy());
    }

    #[test]
    fn sp_and_pac_are_scale_invariant() {
        let base = compute_metrics(&fior_di_latte(), 5.0);
        for k in [0.01, 0.5, 3.0, 1234.0] {
            let scaled_lines: Vec<RecipeLine> = fior_di_latte()
                .into_iter()
                .map(|l| RecipeLine::new(l.ingredient, l.mass_g * k))
                .collect();
            let scaled = compute_metrics(&scaled_lines, 5.0);
            assert!((scaled.sp - base.sp).abs() < 1e-9);
            assert!((scaled.pac - base.pac).abs() < 1e-9);
            assert!((scaled.total_g - base.total_g * k).abs() < 1e-6 * k.max(1.0));
        }
    }

    #[test]
    fn scaled_metrics_match_recomputation() {
        let base = compute_metrics(&fior_di_latte(), 0.0);
        let doubled_lines: Vec<RecipeLine> = fior_di_latte()
            .into_iter()
            .map(|l| RecipeLine::new(l.ingredient, l.mass_g * 2.0))
            .collect();
        let recomputed = compute_metrics(&doubled_lines, 0.0);
        let scaled = base.scaled(2.0);
        assert!((scaled.total_g - recomputed.total_g).abs() < 1e-9);
        assert!((scaled.fat_g - recomputed.fat_g).abs() < 1e-9);
        assert_eq!(scaled.fat_pct, base.fat_pct);
        assert_eq!(scaled.sp, base.sp);
    }

    #[test]
    fn fruit_split_is_renormalized() {
        let raw = compute_metrics(&[RecipeLine::new(strawberry((10.0, 12.0, 3.0)), 400.0)], 0.0);
        let normalized =
            compute_metrics(&[RecipeLine::new(strawberry((40.0, 48.0, 12.0)), 400.0)], 0.0);
        assert!((raw.sp - normalized.sp).abs() < 1e-12);
        assert!((raw.pac - normalized.pac).abs() < 1e-12);
    }

    #[test]
    fn fruit_split_is_not_collapsed_into_sucrose() {
        let fruit = compute_metrics(&[RecipeLine::new(strawberry((50.0, 50.0, 0.0)), 100.0)], 0.0);
        // 6 g sugar per 100 g: 3 g dextrose + 3 g fructose.
        let expected_sp = 3.0 * 0.74 + 3.0 * 1.73;
        let expected_pac = 0.03 * 190.0 + 0.03 * 190.0;
        assert!((fruit.sp - expected_sp).abs() < 1e-9);
        assert!((fruit.pac - expected_pac).abs() < 1e-9);
        assert!((fruit.fruit_pct - 100.0).abs() < EPS);
    }

    #[test]
    fn empty_or_zero_mass_recipe_yields_zeroes() {
        let empty = compute_metrics(&[], 0.0);
        assert_eq!(empty.total_g, 0.0);
        assert_eq!(empty.sp, 0.0);
        assert_eq!(empty.fat_pct, 0.0);
        assert_eq!(empty.ts_mass_balance_pct, 0.0);

        let zero = compute_metrics(&[RecipeLine::new(sucrose(), 0.0)], 0.0);
        assert_eq!(zero.sugars_pct, 0.0);
        assert_eq!(zero.pac, 0.0);
    }

    #[test]
    fn pure_water_fully_evaporated_yields_zeroes_not_nan() {
        let water = IngredientRecord::new("water", "Water", IngredientCategory::Other)
            .with_composition(100.0, 0.0, 0.0, 0.0, 0.0);
        let m = compute_metrics(&[RecipeLine::new(water, 500.0)], 100.0);
        assert_eq!(m.total_g, 0.0);
        assert_eq!(m.water_pct, 0.0);
        assert!(m.sp.is_finite() && m.pac.is_finite());
    }

    #[test]
    fn non_finite_contributions_are_discarded_with_diagnostic() {
        let poisoned = sucrose().with_coefficients(Some(f64::INFINITY), Some(100.0));
        let m = compute_metrics(
            &[
                RecipeLine::new(poisoned, 100.0),
                RecipeLine::new(dextrose(), 100.0),
            ],
            0.0,
        );
        assert_eq!(m.diagnostics.len(), 1);
        assert!((m.sp - 50.0 * 0.74).abs() < 1e-9);
        assert!((m.pac - 0.5 * 190.0).abs() < 1e-9);
    }

    #[test]
    fn sugar_kind_tag_selects_coefficients() {
        let tagged = IngredientRecord::new("syrup", "House syrup", IngredientCategory::Sugar)
            .with_composition(20.0, 0.0, 80.0, 0.0, 0.0)
            .with_sugar_kind(SugarKind::InvertSugar);
        let m = compute_metrics(&[RecipeLine::new(tagged, 100.0)], 0.0);
        assert!((m.sp - 80.0 * 1.30).abs() < 1e-9);
        assert!((m.pac - 0.8 * 190.0).abs() < 1e-9);
    }

    #[test]
    fn cost_is_reported_only_when_every_line_is_priced() {
        let priced = compute_metrics(&fior_di_latte(), 0.0);
        let expected = 0.58 * 1.2 + 0.2 * 4.0 + 0.17 * 1.0 + 0.045 * 3.5 + 0.005 * 20.0;
        assert!((priced.cost.unwrap() - expected).abs() < 1e-9);
        assert!((priced.cost_per_kg.unwrap() - expected).abs() < 1e-9);

        let unpriced = IngredientRecord::new("vanilla", "Vanilla", IngredientCategory::Flavor)
            .with_composition(50.0, 0.0, 0.0, 0.0, 50.0);
        let mut lines = fior_di_latte();
        lines.push(RecipeLine::new(unpriced, 2.0));
        assert!(compute_metrics(&lines, 0.0).cost.is_none());
    }

    #[test]
    fn category_shares_use_post_evaporation_total() {
        let m = compute_metrics(&fior_di_latte(), 0.0);
        assert!((m.stabilizer_pct - 0.5).abs() < EPS);
        assert_eq!(m.fruit_pct, 0.0);
    }

    #[test]
    fn profile_predicts_single_ingredient_metrics() {
        let profile = ingredient_profile(&whole_milk(), 0.0);
        let m = compute_metrics(&[RecipeLine::new(whole_milk(), 250.0)], 0.0);
        assert!((profile.fat_pct - m.fat_pct).abs() < 1e-9);
        assert!((profile.sp - m.sp).abs() < 1e-9);
        assert!((profile.pac - m.pac).abs() < 1e-9);
        assert!((profile.retained - 1.0).abs() < EPS);
    }

    #[test]
    fn profile_accounts_for_evaporated_water() {
        let profile = ingredient_profile(&whole_milk(), 50.0);
        assert!((profile.retained - (1.0 - 0.874 * 0.5)).abs() < 1e-12);
    }
}
