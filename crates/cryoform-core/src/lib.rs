//! # Cryoform Core Library
//!
//! A formulation-chemistry engine for frozen desserts: it computes the physicochemical metrics
//! of ice cream, gelato and sorbet recipes, classifies recipes against reference archetypes,
//! solves for ingredient quantities that meet numeric targets, and advises on preservation
//! methods for flavor pastes.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`IngredientRecord`, `RecipeLine`),
//!   the ingredient catalog, the metrics calculator with its sugar coefficient resolver,
//!   archetype data, evaluation and the preservation rules.
//!
//! - **[`engine`]: The Logic Core.** The stateful formulation optimizer, its configuration,
//!   targets, progress reporting and error types.
//!
//! - **[`workflows`]: The Public API.** Complete procedures (analysis, formulation,
//!   preservation) that resolve inputs through the catalog and return reports.

pub mod core;
pub mod engine;
pub mod workflows;

pub use crate::core::archetypes::Archetype;
pub use crate::core::archetypes::bands::{BandField, TargetBand, TargetBandTable, TargetBands};
pub use crate::core::catalog::IngredientCatalog;
pub use crate::core::chemistry::metrics::{Metrics, compute_metrics};
pub use crate::core::evaluation::classifier::classify;
pub use crate::core::evaluation::validator::{ValidationReport, validate};
pub use crate::core::models::ingredient::{IngredientCategory, IngredientRecord, SugarKind};
pub use crate::core::models::recipe::{RecipeEntry, RecipeLine};
pub use crate::core::preservation::advice::{Preferences, PreservationAdvice, PreservationMethod};
pub use crate::core::preservation::paste::{LabSpecs, PasteFormula};
pub use crate::core::preservation::rules::advise;
pub use crate::engine::optimizer::{FormulationResult, optimize};
pub use crate::engine::targets::{TargetField, TargetSet};
