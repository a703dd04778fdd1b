//! # Catalog Module
//!
//! The ingredient catalog: composition records for raw materials and flavor pastes, looked up by
//! id, display name, alias, or a fuzzy token match.
//!
//! A built-in catalog is embedded in the library; user catalogs are loaded from TOML
//! (`[[ingredients]]` tables) or CSV (one row per ingredient). Composition problems found while
//! loading are logged as warnings and never reject a record.

use crate::core::models::ingredient::{
    IngredientCategory, IngredientRecord, SugarKind, SugarSplit,
};
use crate::core::models::recipe::{RecipeEntry, RecipeLine};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

const BUILTIN_CATALOG: &str = include_str!("../../../data/ingredients.toml");

#[derive(Debug, Error)]
pub enum CatalogLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("Duplicate ingredient id '{id}' in '{path}'")]
    DuplicateId { path: String, id: String },
    #[error("Unsupported catalog format for '{path}' (expected .toml or .csv)")]
    UnsupportedFormat { path: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Id,
    Name,
    Alias,
    Fuzzy,
}

#[derive(Debug, Clone, Copy)]
pub struct LookupMatch<'a> {
    pub record: &'a IngredientRecord,
    pub kind: MatchKind,
}

/// Recipe lines resolved against a catalog, with a warning for every reference that had to fall
/// back to [`IngredientRecord::unknown`].
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub lines: Vec<RecipeLine>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    ingredients: Vec<IngredientRecord>,
}

#[derive(Debug, Deserialize)]
struct CsvIngredientRow {
    id: String,
    name: String,
    category: IngredientCategory,
    #[serde(default)]
    aliases: Option<String>,
    water: f64,
    fat: f64,
    sugars: f64,
    msnf: f64,
    other_solids: f64,
    #[serde(default)]
    sp: Option<f64>,
    #[serde(default)]
    pac: Option<f64>,
    #[serde(default)]
    sugar_kind: Option<SugarKind>,
    #[serde(default)]
    glucose: Option<f64>,
    #[serde(default)]
    fructose: Option<f64>,
    #[serde(default)]
    sucrose: Option<f64>,
    #[serde(default)]
    cost_per_kg: Option<f64>,
}

impl From<CsvIngredientRow> for IngredientRecord {
    fn from(row: CsvIngredientRow) -> Self {
        let sugar_split = match (row.glucose, row.fructose, row.sucrose) {
            (None, None, None) => None,
            (g, f, s) => Some(SugarSplit {
                glucose: g.unwrap_or(0.0),
                fructose: f.unwrap_or(0.0),
                sucrose: s.unwrap_or(0.0),
            }),
        };
        let aliases = row
            .aliases
            .map(|a| {
                a.split(';')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();
        IngredientRecord {
            id: row.id,
            name: row.name,
            category: row.category,
            aliases,
            water: row.water,
            fat: row.fat,
            sugars: row.sugars,
            msnf: row.msnf,
            other_solids: row.other_solids,
            sp: row.sp,
            pac: row.pac,
            sugar_kind: row.sugar_kind,
            sugar_split,
            cost_per_kg: row.cost_per_kg,
        }
    }
}

/// Lowercases and collapses every run of non-alphanumeric characters into a single '_'.
pub fn normalize_key(text: &str) -> String {
    text.trim()
        .to_ascii_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

#[derive(Debug, Clone, Default)]
pub struct IngredientCatalog {
    records: BTreeMap<String, IngredientRecord>,
    names: HashMap<String, String>,
    aliases: HashMap<String, String>,
}

impl IngredientCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin() -> Result<Self, CatalogLoadError> {
        Self::from_toml_str(BUILTIN_CATALOG, "<builtin>")
    }

    pub fn load(path: &Path) -> Result<Self, CatalogLoadError> {
        let path_str = path.to_string_lossy().to_string();
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("toml") => {
                let content = std::fs::read_to_string(path).map_err(|e| CatalogLoadError::Io {
                    path: path_str.clone(),
                    source: e,
                })?;
                Self::from_toml_str(&content, &path_str)
            }
            Some("csv") => Self::load_csv(path),
            _ => Err(CatalogLoadError::UnsupportedFormat { path: path_str }),
        }
    }

    pub fn from_toml_str(content: &str, origin: &str) -> Result<Self, CatalogLoadError> {
        let file: CatalogFile = toml::from_str(content).map_err(|e| CatalogLoadError::Toml {
            path: origin.to_string(),
            source: e,
        })?;
        Self::from_records(file.ingredients, origin)
    }

    fn load_csv(path: &Path) -> Result<Self, CatalogLoadError> {
        let path_str = path.to_string_lossy().to_string();
        let mut reader = csv::Reader::from_path(path).map_err(|e| CatalogLoadError::Csv {
            path: path_str.clone(),
            source: e,
        })?;

        let mut records = Vec::new();
        for result in reader.deserialize::<CsvIngredientRow>() {
            let row = result.map_err(|e| CatalogLoadError::Csv {
                path: path_str.clone(),
                source: e,
            })?;
            records.push(row.into());
        }
        Self::from_records(records, &path_str)
    }

    fn from_records(
        records: Vec<IngredientRecord>,
        origin: &str,
    ) -> Result<Self, CatalogLoadError> {
        let mut catalog = Self::new();
        for record in records {
            if catalog.records.contains_key(&record.id) {
                return Err(CatalogLoadError::DuplicateId {
                    path: origin.to_string(),
                    id: record.id,
                });
            }
            catalog.insert(record);
        }
        debug!(
            "Loaded {} ingredient(s) from {}.",
            catalog.records.len(),
            origin
        );
        Ok(catalog)
    }

    /// Adds or replaces a record, returning the previous record with the same id.
    pub fn insert(&mut self, record: IngredientRecord) -> Option<IngredientRecord> {
        for warning in record.validate() {
            warn!("{}", warning);
        }
        let id = record.id.clone();
        self.names.insert(normalize_key(&record.name), id.clone());
        for alias in &record.aliases {
            self.aliases.insert(normalize_key(alias), id.clone());
        }
        self.records.insert(id, record)
    }

    /// Adds every record of `other`, overriding records that share an id.
    pub fn extend(&mut self, other: IngredientCatalog) {
        for (_, record) in other.records {
            self.insert(record);
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in id order.
    pub fn iter(&self) -> impl Iterator<Item = &IngredientRecord> {
        self.records.values()
    }

    pub fn get(&self, id: &str) -> Option<&IngredientRecord> {
        self.records.get(id)
    }

    /// Resolves a free-form reference: exact id, then display name, then alias (both compared
    /// after normalization), then a fuzzy token match.
    pub fn lookup(&self, reference: &str) -> Option<LookupMatch<'_>> {
        if let Some(record) = self.records.get(reference.trim()) {
            return Some(LookupMatch {
                record,
                kind: MatchKind::Id,
            });
        }

        let key = normalize_key(reference);
        if key.is_empty() {
            return None;
        }
        if let Some(record) = self.records.get(&key) {
            return Some(LookupMatch {
                record,
                kind: MatchKind::Id,
            });
        }
        if let Some(record) = self.names.get(&key).and_then(|id| self.records.get(id)) {
            return Some(LookupMatch {
                record,
                kind: MatchKind::Name,
            });
        }
        if let Some(record) = self.aliases.get(&key).and_then(|id| self.records.get(id)) {
            return Some(LookupMatch {
                record,
                kind: MatchKind::Alias,
            });
        }

        self.fuzzy_lookup(&key).map(|record| LookupMatch {
            record,
            kind: MatchKind::Fuzzy,
        })
    }

    /// The record whose id, name or alias contains every token of `key`. Among several, the one
    /// with the shortest matching label wins; equal lengths fall back to id order.
    fn fuzzy_lookup(&self, key: &str) -> Option<&IngredientRecord> {
        let wanted: Vec<&str> = key.split('_').collect();
        self.records
            .values()
            .filter_map(|record| {
                std::iter::once(record.id.clone())
                    .chain(std::iter::once(normalize_key(&record.name)))
                    .chain(record.aliases.iter().map(|a| normalize_key(a)))
                    .filter(|label| {
                        let tokens: Vec<&str> = label.split('_').collect();
                        wanted.iter().all(|w| tokens.contains(w))
                    })
                    .map(|label| label.len())
                    .min()
                    .map(|len| (len, record))
            })
            .min_by(|(len_a, rec_a), (len_b, rec_b)| {
                len_a.cmp(len_b).then_with(|| rec_a.id.cmp(&rec_b.id))
            })
            .map(|(_, record)| record)
    }

    /// Resolves recipe entries into lines. Unknown references never fail: they fall back to
    /// [`IngredientRecord::unknown`] and are reported in [`Resolution::warnings`].
    pub fn resolve_entries(&self, entries: &[RecipeEntry]) -> Resolution {
        let mut resolution = Resolution::default();
        for entry in entries {
            let record = match self.lookup(&entry.ingredient) {
                Some(found) => {
                    if found.kind == MatchKind::Fuzzy {
                        debug!(
                            "Fuzzy-matched ingredient '{}' to '{}'.",
                            entry.ingredient, found.record.id
                        );
                    }
                    found.record.clone()
                }
                None => {
                    let message = format!(
                        "Unknown ingredient '{}'; using default composition (80% water, 20% other solids).",
                        entry.ingredient
                    );
                    warn!("{}", message);
                    resolution.warnings.push(message);
                    IngredientRecord::unknown(&entry.ingredient)
                }
            };
            resolution.lines.push(RecipeLine::new(record, entry.mass_g));
        }
        resolution
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn catalog() -> IngredientCatalog {
        IngredientCatalog::builtin().unwrap()
    }

    #[test]
    fn builtin_catalog_loads_and_is_well_formed() {
        let catalog = catalog();
        assert!(catalog.len() >= 20);
        for record in catalog.iter() {
            assert!(
                record.validate().is_empty(),
                "{} has composition warnings: {:?}",
                record.id,
                record.validate()
            );
        }
    }

    #[test]
    fn lookup_by_id_name_and_alias() {
        let catalog = catalog();
        assert_eq!(catalog.lookup("whole_milk").unwrap().kind, MatchKind::Id);
        let by_name = catalog.lookup("Cream 25% fat").unwrap();
        assert_eq!(by_name.record.id, "cream_25");
        assert_eq!(by_name.kind, MatchKind::Name);
        let by_alias = catalog.lookup("SMP").unwrap();
        assert_eq!(by_alias.record.id, "skim_milk_powder");
        assert_eq!(by_alias.kind, MatchKind::Alias);
        assert_eq!(catalog.lookup("Whole-Milk").unwrap().record.id, "whole_milk");
    }

    #[test]
    fn fuzzy_lookup_prefers_shortest_label() {
        let catalog = catalog();
        let found = catalog.lookup("glucose syrup").unwrap();
        assert_eq!(found.kind, MatchKind::Fuzzy);
        assert_eq!(found.record.id, "glucose_syrup_de40");

        let cream = catalog.lookup("35 cream").unwrap();
        assert_eq!(cream.record.id, "cream_35");
    }

    #[test]
    fn lookup_of_unknown_or_blank_reference_is_none() {
        let catalog = catalog();
        assert!(catalog.lookup("unobtainium").is_none());
        assert!(catalog.lookup("  ").is_none());
    }

    #[test]
    fn resolve_entries_substitutes_default_for_unknown_ingredient() {
        let catalog = catalog();
        let resolution = catalog.resolve_entries(&[
            RecipeEntry::new("milk", 500.0),
            RecipeEntry::new("dragon fruit essence", 10.0),
        ]);
        assert_eq!(resolution.lines.len(), 2);
        assert_eq!(resolution.lines[0].ingredient.id, "whole_milk");
        assert_eq!(resolution.lines[1].ingredient.water, 80.0);
        assert_eq!(resolution.warnings.len(), 1);
        assert!(resolution.warnings[0].contains("dragon fruit essence"));
    }

    #[test]
    fn load_toml_catalog_succeeds() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("catalog.toml");
        fs::write(
            &path,
            r#"
            [[ingredients]]
            id = "oat_milk"
            name = "Oat drink"
            category = "other"
            water = 89.0
            fat = 1.5
            sugars = 4.0
            other_solids = 5.5
            sp = 0.6
            "#,
        )
        .unwrap();
        let catalog = IngredientCatalog::load(&path).unwrap();
        let record = catalog.get("oat_milk").unwrap();
        assert_eq!(record.sp, Some(0.6));
        assert_eq!(record.pac, None);
    }

    #[test]
    fn load_csv_catalog_succeeds() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("catalog.csv");
        fs::write(
            &path,
            "id,name,category,aliases,water,fat,sugars,msnf,other_solids,sp,pac,sugar_kind,glucose,fructose,sucrose,cost_per_kg\n\
             apricot,Apricot,fruit,albicocca;apricots,86.3,0.4,9.2,0,4.1,,,,25,12,63,3.2\n\
             maple,Maple syrup,sugar,,32,0,67,0,1,,,sucrose,,,,12\n",
        )
        .unwrap();
        let catalog = IngredientCatalog::load(&path).unwrap();
        assert_eq!(catalog.len(), 2);
        let apricot = catalog.get("apricot").unwrap();
        assert_eq!(
            apricot.sugar_split,
            Some(SugarSplit {
                glucose: 25.0,
                fructose: 12.0,
                sucrose: 63.0
            })
        );
        assert_eq!(catalog.lookup("albicocca").unwrap().record.id, "apricot");
        let maple = catalog.get("maple").unwrap();
        assert_eq!(maple.sugar_kind, Some(SugarKind::Sucrose));
        assert!(maple.sugar_split.is_none());
    }

    #[test]
    fn load_fails_for_missing_file() {
        let dir = tempdir().unwrap();
        let result = IngredientCatalog::load(&dir.path().join("missing.toml"));
        assert!(matches!(result, Err(CatalogLoadError::Io { .. })));
    }

    #[test]
    fn load_fails_for_malformed_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "this is not toml").unwrap();
        assert!(matches!(
            IngredientCatalog::load(&path),
            Err(CatalogLoadError::Toml { .. })
        ));
    }

    #[test]
    fn load_fails_for_malformed_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "id,name\nfoo").unwrap();
        assert!(matches!(
            IngredientCatalog::load(&path),
            Err(CatalogLoadError::Csv { .. })
        ));
    }

    #[test]
    fn load_rejects_unknown_extension_and_duplicate_ids() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        fs::write(&path, "{}").unwrap();
        assert!(matches!(
            IngredientCatalog::load(&path),
            Err(CatalogLoadError::UnsupportedFormat { .. })
        ));

        let dup = r#"
            [[ingredients]]
            id = "a"
            name = "A"
            category = "other"
            water = 100.0
            [[ingredients]]
            id = "a"
            name = "A again"
            category = "other"
            water = 100.0
        "#;
        assert!(matches!(
            IngredientCatalog::from_toml_str(dup, "inline"),
            Err(CatalogLoadError::DuplicateId { .. })
        ));
    }

    #[test]
    fn composition_problems_do_not_reject_records() {
        let content = r#"
            [[ingredients]]
            id = "odd"
            name = "Odd"
            category = "other"
            water = 50.0
        "#;
        let catalog = IngredientCatalog::from_toml_str(content, "inline").unwrap();
        assert_eq!(catalog.get("odd").unwrap().validate().len(), 1);
    }

    #[test]
    fn extend_overrides_existing_ids() {
        let mut base = catalog();
        let mut extra = IngredientCatalog::new();
        extra.insert(
            IngredientRecord::new("sucrose", "Beet sugar", IngredientCategory::Sugar)
                .with_composition(0.0, 0.0, 100.0, 0.0, 0.0),
        );
        let before = base.len();
        base.extend(extra);
        assert_eq!(base.len(), before);
        assert_eq!(base.get("sucrose").unwrap().name, "Beet sugar");
    }
}
