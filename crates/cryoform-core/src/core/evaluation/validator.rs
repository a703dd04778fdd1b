use crate::core::archetypes::bands::{BandField, TargetBand, TargetBands};
use crate::core::chemistry::metrics::{Metrics, TS_DISCREPANCY_THRESHOLD_PCT};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub passed: BTreeMap<BandField, bool>,
    pub messages: Vec<String>,
}

impl ValidationReport {
    pub fn all_passed(&self) -> bool {
        self.passed.values().all(|ok| *ok)
    }

    pub fn failures(&self) -> Vec<BandField> {
        self.passed
            .iter()
            .filter(|(_, ok)| !**ok)
            .map(|(field, _)| *field)
            .collect()
    }
}

/// One corrective move: an ingredient adjustment and its approximate yield, in grams per
/// percentage point (or SP/PAC point) per kilogram of mix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correction {
    pub action: &'static str,
    pub grams_per_point_per_kg: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct CorrectionRule {
    field: BandField,
    raise: Correction,
    lower: Correction,
}

const fn rule(
    field: BandField,
    raise: (&'static str, f64),
    lower: (&'static str, f64),
) -> CorrectionRule {
    CorrectionRule {
        field,
        raise: Correction {
            action: raise.0,
            grams_per_point_per_kg: raise.1,
        },
        lower: Correction {
            action: lower.0,
            grams_per_point_per_kg: lower.1,
        },
    }
}

static CORRECTIONS: [CorrectionRule; 8] = [
    rule(
        BandField::TotalSolids,
        ("add skim milk powder", 10.5),
        ("add water", 30.0),
    ),
    rule(
        BandField::Fat,
        ("add cream 35%", 29.0),
        ("replace cream with whole milk", 32.0),
    ),
    rule(
        BandField::Sugars,
        ("add sucrose", 10.0),
        ("remove sucrose", 10.0),
    ),
    rule(
        BandField::Msnf,
        ("add skim milk powder", 10.5),
        ("remove skim milk powder", 10.5),
    ),
    rule(
        BandField::Sp,
        ("add sucrose", 10.0),
        ("replace sucrose with dextrose", 38.0),
    ),
    rule(
        BandField::Pac,
        ("replace sucrose with dextrose", 11.0),
        ("replace dextrose with sucrose", 11.0),
    ),
    rule(
        BandField::Stabilizer,
        ("add stabilizer blend", 10.0),
        ("remove stabilizer blend", 10.0),
    ),
    rule(
        BandField::Fruit,
        ("add fruit", 10.0),
        ("remove fruit", 10.0),
    ),
];

/// The corrective move for `field` in the direction of a signed `gap` (negative means the value
/// sits below the band).
pub fn correction_for(field: BandField, gap: f64) -> Correction {
    let entry = CORRECTIONS
        .iter()
        .find(|r| r.field == field)
        .unwrap_or(&CORRECTIONS[0]);
    if gap < 0.0 { entry.raise } else { entry.lower }
}

/// Grams of the corrective ingredient needed to close `gap` in a mix of `total_g` grams.
pub fn corrective_grams(field: BandField, gap: f64, total_g: f64) -> f64 {
    let kg = if total_g.is_finite() { total_g.max(0.0) / 1000.0 } else { 0.0 };
    let grams = gap.abs() * correction_for(field, gap).grams_per_point_per_kg * kg;
    if grams.is_finite() { grams } else { 0.0 }
}

fn failure_message(field: BandField, band: &TargetBand, value: f64, total_g: f64) -> String {
    if !value.is_finite() {
        return format!("{field} is not a finite number; check ingredient data");
    }
    let gap = band.gap(value);
    let correction = correction_for(field, gap);
    let (relation, bound) = if gap < 0.0 {
        ("below minimum", band.min)
    } else {
        ("above maximum", band.max)
    };
    format!(
        "{field} {value:.2} {relation} {bound:.2}: {} (~{:.0} g)",
        correction.action,
        corrective_grams(field, gap, total_g)
    )
}

/// Checks every band in `bands` against `metrics`. A recipe passes a band when its value lies in
/// the closed range. Additive and mass-balance total solids that disagree produce a warning,
/// never a failure.
pub fn validate(metrics: &Metrics, bands: &TargetBands) -> ValidationReport {
    let mut report = ValidationReport::default();

    for (field, band) in bands.entries() {
        let value = field.value(metrics);
        let ok = band.contains(value);
        report.passed.insert(field, ok);
        if !ok {
            report
                .messages
                .push(failure_message(field, &band, value, metrics.total_g));
        }
    }

    if metrics.has_ts_discrepancy() {
        report.messages.push(format!(
            "Warning: additive total solids ({:.2}%) and mass-balance total solids ({:.2}%) differ by more than {TS_DISCREPANCY_THRESHOLD_PCT} points; check ingredient compositions",
            metrics.ts_additive_pct, metrics.ts_mass_balance_pct
        ));
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::archetypes::Archetype;
    use crate::core::archetypes::bands::TargetBandTable;
    use crate::core::chemistry::metrics::compute_metrics;

    fn metrics_with(total_g: f64, setter: impl FnOnce(&mut Metrics)) -> Metrics {
        let mut m = compute_metrics(&[], 0.0);
        m.total_g = total_g;
        m.ts_additive_pct = 35.0;
        m.ts_mass_balance_pct = 35.0;
        m.fat_pct = 8.0;
        m.sugars_pct = 18.0;
        m.msnf_pct = 10.0;
        m.sp = 18.0;
        m.pac = 24.0;
        m.stabilizer_pct = 0.4;
        setter(&mut m);
        m
    }

    fn white_base() -> TargetBands {
        TargetBandTable::builtin()
            .unwrap()
            .get(Archetype::WhiteBase)
            .unwrap()
            .clone()
    }

    #[test]
    fn in_band_recipe_passes_without_messages() {
        let report = validate(&metrics_with(1000.0, |_| {}), &white_base());
        assert!(report.all_passed());
        assert!(report.messages.is_empty());
        assert_eq!(report.passed.len(), 7);
    }

    #[test]
    fn low_fat_fails_with_cream_correction() {
        let report = validate(&metrics_with(1000.0, |m| m.fat_pct = 4.0), &white_base());
        assert!(!report.passed[&BandField::Fat]);
        assert_eq!(report.failures(), vec![BandField::Fat]);
        assert_eq!(report.messages.len(), 1);
        assert!(report.messages[0].contains("add cream 35%"));
        assert!(report.messages[0].contains("(~58 g)"));
    }

    #[test]
    fn corrective_grams_scale_with_gap_and_batch() {
        let one = corrective_grams(BandField::Sugars, -1.0, 1000.0);
        let two = corrective_grams(BandField::Sugars, -2.0, 1000.0);
        let big_batch = corrective_grams(BandField::Sugars, -1.0, 5000.0);
        assert!((two - 2.0 * one).abs() < 1e-9);
        assert!((big_batch - 5.0 * one).abs() < 1e-9);
        assert_eq!(corrective_grams(BandField::Sugars, 0.0, 1000.0), 0.0);
        assert_eq!(corrective_grams(BandField::Sugars, -1.0, 0.0), 0.0);
    }

    #[test]
    fn direction_selects_correction() {
        assert_eq!(correction_for(BandField::Pac, -2.0).action, "replace sucrose with dextrose");
        assert_eq!(correction_for(BandField::Pac, 2.0).action, "replace dextrose with sucrose");
    }

    #[test]
    fn ts_discrepancy_is_a_warning_not_a_failure() {
        let m = metrics_with(1000.0, |m| m.ts_mass_balance_pct = 36.0);
        let report = validate(&m, &white_base());
        assert!(report.all_passed());
        assert_eq!(report.messages.len(), 1);
        assert!(report.messages[0].starts_with("Warning"));
    }

    #[test]
    fn empty_recipe_fails_without_panicking() {
        let m = compute_metrics(&[], 0.0);
        let report = validate(&m, &white_base());
        assert!(!report.all_passed());
        assert!(report.messages.iter().all(|msg| msg.contains("(~0 g)")));
    }
}
