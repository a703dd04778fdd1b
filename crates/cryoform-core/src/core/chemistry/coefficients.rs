use crate::core::models::ingredient::{IngredientCategory, IngredientRecord, SugarKind, SugarSplit};
use phf::{Map, phf_map};

/// Fraction of milk-solids-non-fat that is lactose.
pub const LACTOSE_FRACTION_OF_MSNF: f64 = 0.545;

/// Sweetening power (sucrose = 1.00) and anti-freezing power (sucrose = 100).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    pub sp: f64,
    pub pac: f64,
}

impl Coefficients {
    pub const fn new(sp: f64, pac: f64) -> Self {
        Self { sp, pac }
    }
}

pub const SUCROSE: Coefficients = Coefficients::new(1.00, 100.0);
pub const DEXTROSE: Coefficients = Coefficients::new(0.74, 190.0);
pub const FRUCTOSE: Coefficients = Coefficients::new(1.73, 190.0);
pub const INVERT_SUGAR: Coefficients = Coefficients::new(1.30, 190.0);
pub const LACTOSE: Coefficients = Coefficients::new(0.16, 100.0);
pub const GLUCOSE_SYRUP: Coefficients = Coefficients::new(0.50, 90.0);

impl SugarKind {
    pub fn coefficients(&self) -> Coefficients {
        match self {
            SugarKind::Sucrose => SUCROSE,
            SugarKind::Dextrose => DEXTROSE,
            SugarKind::Fructose => FRUCTOSE,
            SugarKind::InvertSugar => INVERT_SUGAR,
            SugarKind::Lactose => LACTOSE,
            SugarKind::GlucoseSyrup => GLUCOSE_SYRUP,
        }
    }
}

// Keys are normalized tokens; two-word keys are joined with '_' and are tried before single words.
static SUGAR_ALIASES: Map<&'static str, SugarKind> = phf_map! {
    "glucose_syrup" => SugarKind::GlucoseSyrup,
    "corn_syrup" => SugarKind::GlucoseSyrup,
    "glucose_powder" => SugarKind::GlucoseSyrup,
    "atomized_glucose" => SugarKind::GlucoseSyrup,
    "invert_sugar" => SugarKind::InvertSugar,
    "inverted_sugar" => SugarKind::InvertSugar,
    "invert_syrup" => SugarKind::InvertSugar,
    "sucrose" => SugarKind::Sucrose,
    "saccharose" => SugarKind::Sucrose,
    "dextrose" => SugarKind::Dextrose,
    "glucose" => SugarKind::Dextrose,
    "fructose" => SugarKind::Fructose,
    "levulose" => SugarKind::Fructose,
    "invert" => SugarKind::InvertSugar,
    "trimoline" => SugarKind::InvertSugar,
    "lactose" => SugarKind::Lactose,
    "dse" => SugarKind::GlucoseSyrup,
};

/// Where a line's SP/PAC comes from, in order of precedence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SugarSource {
    /// Coefficients declared on the ingredient itself.
    Override(Coefficients),
    /// Fruit sugar split into glucose, fructose and sucrose (normalized to 100).
    FruitSplit(SugarSplit),
    /// A fruit split where one coefficient is declared on the ingredient. The declared value
    /// applies to every sub-mass; the other comes from each sub-mass's reference sugar.
    PartialSplit {
        split: SugarSplit,
        sp: Option<f64>,
        pac: Option<f64>,
    },
    /// A reference sugar, from an explicit tag or a match on id/name.
    Tagged(SugarKind),
    /// No information: sucrose baseline.
    Baseline,
}

/// A sugar sub-mass paired with the coefficients that weight it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedSugar {
    pub mass_g: f64,
    pub coefficients: Coefficients,
}

fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_ascii_lowercase())
        .collect()
}

fn match_alias(text: &str) -> Option<SugarKind> {
    let tokens = tokens(text);
    let bigram = tokens.windows(2).find_map(|pair| {
        let key = format!("{}_{}", pair[0], pair[1]);
        SUGAR_ALIASES.get(key.as_str()).copied()
    });
    bigram.or_else(|| {
        tokens
            .iter()
            .find_map(|t| SUGAR_ALIASES.get(t.as_str()).copied())
    })
}

/// Tagged-variant lookup: explicit `sugar_kind`, then the id, then the display name.
pub fn tagged_kind(record: &IngredientRecord) -> Option<SugarKind> {
    record
        .sugar_kind
        .or_else(|| match_alias(&record.id))
        .or_else(|| match_alias(&record.name))
}

fn fallback_coefficients(record: &IngredientRecord) -> Coefficients {
    tagged_kind(record)
        .map(|k| k.coefficients())
        .unwrap_or(SUCROSE)
}

fn fruit_split(record: &IngredientRecord) -> Option<SugarSplit> {
    if record.category != IngredientCategory::Fruit {
        return None;
    }
    record.sugar_split.as_ref().and_then(SugarSplit::normalized)
}

pub fn resolve_sugar_source(record: &IngredientRecord) -> SugarSource {
    let split = fruit_split(record);
    match (record.sp, record.pac, split) {
        (Some(sp), Some(pac), _) => SugarSource::Override(Coefficients::new(sp, pac)),
        (None, None, Some(split)) => SugarSource::FruitSplit(split),
        (sp, pac, Some(split)) => SugarSource::PartialSplit { split, sp, pac },
        (Some(sp), None, None) => {
            let base = fallback_coefficients(record);
            SugarSource::Override(Coefficients::new(sp, base.pac))
        }
        (None, Some(pac), None) => {
            let base = fallback_coefficients(record);
            SugarSource::Override(Coefficients::new(base.sp, pac))
        }
        (None, None, None) => match tagged_kind(record) {
            Some(kind) => SugarSource::Tagged(kind),
            None => SugarSource::Baseline,
        },
    }
}

fn split_sugars(
    split: &SugarSplit,
    sugar_mass_g: f64,
    sp: Option<f64>,
    pac: Option<f64>,
) -> Vec<WeightedSugar> {
    [
        (split.glucose, DEXTROSE),
        (split.fructose, FRUCTOSE),
        (split.sucrose, SUCROSE),
    ]
    .into_iter()
    .filter(|(share, _)| *share > 0.0)
    .map(|(share, base)| WeightedSugar {
        mass_g: sugar_mass_g * share / 100.0,
        coefficients: Coefficients::new(sp.unwrap_or(base.sp), pac.unwrap_or(base.pac)),
    })
    .collect()
}

/// Splits a line's sugar mass into weighted sub-masses according to its resolved source.
pub fn weighted_sugars(source: &SugarSource, sugar_mass_g: f64) -> Vec<WeightedSugar> {
    if sugar_mass_g <= 0.0 {
        return Vec::new();
    }
    match source {
        SugarSource::Override(coefficients) => vec![WeightedSugar {
            mass_g: sugar_mass_g,
            coefficients: *coefficients,
        }],
        SugarSource::FruitSplit(split) => split_sugars(split, sugar_mass_g, None, None),
        SugarSource::PartialSplit { split, sp, pac } => {
            split_sugars(split, sugar_mass_g, *sp, *pac)
        }
        SugarSource::Tagged(kind) => vec![WeightedSugar {
            mass_g: sugar_mass_g,
            coefficients: kind.coefficients(),
        }],
        SugarSource::Baseline => vec![WeightedSugar {
            mass_g: sugar_mass_g,
            coefficients: SUCROSE,
        }],
    }
}

/// Lactose carried inside a line's MSNF.
pub fn implicit_lactose(msnf_mass_g: f64) -> Option<WeightedSugar> {
    (msnf_mass_g > 0.0).then(|| WeightedSugar {
        mass_g: msnf_mass_g * LACTOSE_FRACTION_OF_MSNF,
        coefficients: LACTOSE,
    })
}
