use super::advice::{
    GelatoImpact, ImpactLevel, Preferences, PreservationAdvice, PreservationMethod,
    ProcessTargets, StorageClass,
};
use super::paste::PasteFormula;
use crate::core::models::ingredient::{IngredientCategory, IngredientRecord};
use tracing::debug;

pub const ACID_PH_LIMIT: f64 = 4.6;
pub const HOT_FILL_MIN_BRIX: f64 = 55.0;
pub const HOT_FILL_MAX_MSNF_PCT: f64 = 1.0;
pub const HOT_FILL_MAX_PARTICLE_MM: f64 = 5.0;
pub const HOT_FILL_MAX_WATER_ACTIVITY: f64 = 0.93;
pub const RETORT_MAX_PARTICLE_MM: f64 = 10.0;
pub const FREEZE_DRY_MAX_WATER_ACTIVITY: f64 = 0.3;

const HOT_FILL_CONFIDENCE: f64 = 0.7;
const RETORT_CONFIDENCE: f64 = 0.7;
const FROZEN_CONFIDENCE: f64 = 0.8;
const FREEZE_DRY_CONFIDENCE: f64 = 0.8;

const SUCROSE_MOLAR_MASS: f64 = 342.3;
const MONEY_BORN_CONSTANT: f64 = 0.27;
const MAX_ESTIMABLE_BRIX: f64 = 95.0;

/// Water activity of a sucrose-equivalent solution at `brix` °Bx, by the Money-Born relation
/// `aw = 1 / (1 + 0.27·n)` with `n` the moles of solute per 100 g of water.
pub fn estimate_water_activity(brix: f64) -> f64 {
    if !brix.is_finite() {
        return 1.0;
    }
    let b = brix.clamp(0.0, MAX_ESTIMABLE_BRIX);
    let moles_per_100g_water = (b / SUCROSE_MOLAR_MASS) * 100.0 / (100.0 - b);
    1.0 / (1.0 + MONEY_BORN_CONSTANT * moles_per_100g_water)
}

struct PasteFacts {
    dairy: bool,
    msnf_pct: f64,
    brix: f64,
    ph: f64,
    water_activity: f64,
    aw_note: String,
}

impl PasteFacts {
    fn gather(paste: &PasteFormula, aggregate: &IngredientRecord) -> Self {
        let (water_activity, aw_note) = match paste.lab.water_activity {
            Some(aw) if aw.is_finite() => (aw, format!("Measured water activity {aw:.2}")),
            _ => {
                let aw = estimate_water_activity(paste.lab.brix);
                (
                    aw,
                    format!(
                        "Water activity estimated at {aw:.2} from {:.1} °Brix (sucrose equivalent)",
                        paste.lab.brix
                    ),
                )
            }
        };
        Self {
            dairy: aggregate.category == IngredientCategory::Dairy,
            msnf_pct: aggregate.msnf,
            brix: paste.lab.brix,
            ph: paste.lab.ph,
            water_activity,
            aw_note,
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn hot_fill(facts: &PasteFacts, prefs: &Preferences) -> Option<PreservationAdvice> {
    let qualifies = !facts.dairy
        && facts.msnf_pct <= HOT_FILL_MAX_MSNF_PCT
        && facts.ph <= ACID_PH_LIMIT
        && facts.brix >= HOT_FILL_MIN_BRIX
        && prefs.max_particle_mm <= HOT_FILL_MAX_PARTICLE_MM;
    if !qualifies {
        return None;
    }
    Some(PreservationAdvice {
        method: PreservationMethod::HotFill,
        confidence: HOT_FILL_CONFIDENCE,
        rationale: vec![
            format!(
                "High-acid (pH {:.2} ≤ {ACID_PH_LIMIT}) and high-sugar ({:.1} °Brix ≥ {HOT_FILL_MIN_BRIX}) non-dairy paste",
                facts.ph, facts.brix
            ),
            format!(
                "Particles up to {:.1} mm allow uniform heat penetration during filling",
                prefs.max_particle_mm
            ),
            facts.aw_note.clone(),
        ],
        targets: ProcessTargets {
            brix_min: Some(HOT_FILL_MIN_BRIX),
            ph_max: Some(ACID_PH_LIMIT),
            water_activity_max: Some(HOT_FILL_MAX_WATER_ACTIVITY),
            particle_size_max_mm: Some(HOT_FILL_MAX_PARTICLE_MM),
        },
        packaging: strings(&["glass jar", "bottle"]),
        storage: StorageClass::Ambient,
        shelf_life_hint: "Up to 12 months sealed at ambient; refrigerate after opening".to_string(),
        gelato_impact: GelatoImpact {
            aroma_retention: ImpactLevel::Medium,
            browning: ImpactLevel::Medium,
            notes: strings(&["Cooked notes possible on delicate fruit"]),
        },
        requires_process_validation: true,
    })
}

fn retort(facts: &PasteFacts, prefs: &Preferences) -> Option<PreservationAdvice> {
    let qualifies = (facts.dairy || facts.ph > ACID_PH_LIMIT) && prefs.prefer_ambient;
    if !qualifies {
        return None;
    }
    let reason = if facts.dairy {
        "Dairy-containing paste needs a validated sterilization step for ambient storage".to_string()
    } else {
        format!(
            "Low-acid paste (pH {:.2} > {ACID_PH_LIMIT}) needs commercial sterility for ambient storage",
            facts.ph
        )
    };
    Some(PreservationAdvice {
        method: PreservationMethod::Retort,
        confidence: RETORT_CONFIDENCE,
        rationale: vec![reason, facts.aw_note.clone()],
        targets: ProcessTargets {
            particle_size_max_mm: Some(RETORT_MAX_PARTICLE_MM),
            ..ProcessTargets::default()
        },
        packaging: strings(&["retort pouch", "can", "glass jar"]),
        storage: StorageClass::Ambient,
        shelf_life_hint: "18 to 24 months sealed at ambient".to_string(),
        gelato_impact: GelatoImpact {
            aroma_retention: ImpactLevel::Low,
            browning: ImpactLevel::High,
            notes: strings(&["Expect caramelized and cooked-milk notes"]),
        },
        requires_process_validation: true,
    })
}

fn frozen(facts: &PasteFacts, prefs: &Preferences) -> PreservationAdvice {
    let mut rationale = vec![
        "Minimal thermal impact; frozen logistics required".to_string(),
        facts.aw_note.clone(),
    ];
    if prefs.clean_label {
        rationale.push("No additives required, compatible with a clean label".to_string());
    }
    PreservationAdvice {
        method: PreservationMethod::Frozen,
        confidence: FROZEN_CONFIDENCE,
        rationale,
        targets: ProcessTargets::default(),
        packaging: strings(&["food-grade tub", "vacuum bag"]),
        storage: StorageClass::Frozen,
        shelf_life_hint: "6 to 12 months at -18 °C or below".to_string(),
        gelato_impact: GelatoImpact {
            aroma_retention: ImpactLevel::High,
            browning: ImpactLevel::Low,
            notes: Vec::new(),
        },
        requires_process_validation: true,
    }
}

fn freeze_dry(facts: &PasteFacts, prefs: &Preferences) -> PreservationAdvice {
    let mut rationale = vec![
        "Removes water without heat; no water is added back to the mix".to_string(),
        facts.aw_note.clone(),
    ];
    if prefs.clean_label {
        rationale.push("No additives required, compatible with a clean label".to_string());
    }
    PreservationAdvice {
        method: PreservationMethod::FreezeDry,
        confidence: FREEZE_DRY_CONFIDENCE,
        rationale,
        targets: ProcessTargets {
            water_activity_max: Some(FREEZE_DRY_MAX_WATER_ACTIVITY),
            ..ProcessTargets::default()
        },
        packaging: strings(&["moisture-barrier pouch with desiccant"]),
        storage: StorageClass::Ambient,
        shelf_life_hint: "12 to 24 months sealed with desiccant".to_string(),
        gelato_impact: GelatoImpact {
            aroma_retention: ImpactLevel::High,
            browning: ImpactLevel::Low,
            notes: strings(&[
                "Raises total solids without raising PAC; rebalance sugars in the base",
            ]),
        },
        requires_process_validation: true,
    }
}

/// Ranks preservation methods for a paste, highest confidence first. Frozen and freeze-dried
/// storage are always offered.
pub fn advise(paste: &PasteFormula, preferences: &Preferences) -> Vec<PreservationAdvice> {
    let aggregate = paste.aggregate();
    let facts = PasteFacts::gather(paste, &aggregate);
    debug!(
        paste = %paste.name,
        dairy = facts.dairy,
        msnf_pct = facts.msnf_pct,
        brix = facts.brix,
        ph = facts.ph,
        water_activity = facts.water_activity,
        "Evaluating preservation rules"
    );

    let mut advice: Vec<PreservationAdvice> = [
        hot_fill(&facts, preferences),
        retort(&facts, preferences),
        Some(frozen(&facts, preferences)),
        Some(freeze_dry(&facts, preferences)),
    ]
    .into_iter()
    .flatten()
    .collect();

    advice.sort_by(|a, b| {
        b.confidence
            .total_cmp(&a.confidence)
            .then_with(|| a.method.cmp(&b.method))
    });
    debug!(
        methods = ?advice.iter().map(|a| a.method.as_str()).collect::<Vec<_>>(),
        "Preservation advice ranked"
    );
    advice
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::preservation::paste::LabSpecs;

    fn fruit() -> IngredientRecord {
        IngredientRecord::new("raspberry", "Raspberry", IngredientCategory::Fruit)
            .with_composition(86.0, 0.6, 4.4, 0.0, 9.0)
            .with_sugar_split(45.0, 50.0, 5.0)
    }

    fn sucrose() -> IngredientRecord {
        IngredientRecord::new("sucrose", "Sucrose", IngredientCategory::Sugar)
            .with_composition(0.0, 0.0, 100.0, 0.0, 0.0)
    }

    fn cream() -> IngredientRecord {
        IngredientRecord::new("cream_35", "Cream 35%", IngredientCategory::Dairy)
            .with_composition(58.0, 35.0, 0.0, 7.0, 0.0)
    }

    fn methods(advice: &[PreservationAdvice]) -> Vec<PreservationMethod> {
        advice.iter().map(|a| a.method).collect()
    }

    fn fruit_paste(brix: f64, ph: f64) -> PasteFormula {
        PasteFormula::new("Raspberry paste", LabSpecs::new(brix, ph))
            .with_component(fruit(), 450.0)
            .with_component(sucrose(), 550.0)
    }

    #[test]
    fn acid_sugary_fruit_paste_gets_hot_fill() {
        let advice = advise(&fruit_paste(60.0, 3.3), &Preferences::default());
        assert_eq!(
            methods(&advice),
            vec![
                PreservationMethod::Frozen,
                PreservationMethod::FreezeDry,
                PreservationMethod::HotFill
            ]
        );
        assert!(advice.iter().all(|a| a.requires_process_validation));
        let hot = &advice[2];
        assert_eq!(hot.confidence, 0.7);
        assert_eq!(hot.storage, StorageClass::Ambient);
        assert_eq!(hot.targets.ph_max, Some(4.6));
    }

    #[test]
    fn oversized_particles_rule_out_hot_fill() {
        let prefs = Preferences {
            max_particle_mm: 8.0,
            ..Preferences::default()
        };
        let advice = advise(&fruit_paste(60.0, 3.3), &prefs);
        assert!(!methods(&advice).contains(&PreservationMethod::HotFill));
    }

    #[test]
    fn dairy_paste_with_ambient_preference_gets_retort() {
        let paste = PasteFormula::new("Caramel", LabSpecs::new(72.0, 6.5))
            .with_component(cream(), 400.0)
            .with_component(sucrose(), 600.0);
        let prefs = Preferences {
            prefer_ambient: true,
            ..Preferences::default()
        };
        let advice = advise(&paste, &prefs);
        assert_eq!(
            methods(&advice),
            vec![
                PreservationMethod::Frozen,
                PreservationMethod::FreezeDry,
                PreservationMethod::Retort
            ]
        );
        assert_eq!(advice[2].gelato_impact.browning, ImpactLevel::High);

        let without_ambient = advise(&paste, &Preferences::default());
        assert_eq!(without_ambient.len(), 2);
    }

    #[test]
    fn output_is_sorted_and_always_has_the_floor() {
        for (brix, ph) in [(0.0, 7.0), (80.0, 2.0), (f64::NAN, f64::NAN)] {
            let advice = advise(&fruit_paste(brix, ph), &Preferences::default());
            assert!(advice.windows(2).all(|w| w[0].confidence >= w[1].confidence));
            let found = methods(&advice);
            assert!(found.contains(&PreservationMethod::Frozen));
            assert!(found.contains(&PreservationMethod::FreezeDry));
        }
    }

    #[test]
    fn clean_label_adds_rationale_to_additive_free_methods() {
        let prefs = Preferences {
            clean_label: true,
            ..Preferences::default()
        };
        let advice = advise(&fruit_paste(40.0, 3.5), &prefs);
        for a in &advice {
            assert!(a.rationale.iter().any(|r| r.contains("clean label")));
        }
    }

    #[test]
    fn water_activity_falls_with_brix() {
        assert_eq!(estimate_water_activity(0.0), 1.0);
        let aw_60 = estimate_water_activity(60.0);
        assert!((aw_60 - 0.894).abs() < 0.005);
        assert!(estimate_water_activity(70.0) < aw_60);
        assert_eq!(estimate_water_activity(f64::NAN), 1.0);
    }

    #[test]
    fn measured_water_activity_is_reported() {
        let mut paste = fruit_paste(60.0, 3.3);
        paste.lab = paste.lab.with_water_activity(0.81);
        let advice = advise(&paste, &Preferences::default());
        assert!(advice[0].rationale.iter().any(|r| r.contains("Measured water activity 0.81")));
    }
}
