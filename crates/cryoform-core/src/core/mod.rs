//! # Core Module
//!
//! Stateless building blocks of the formulation engine. Everything here is a pure function of
//! its inputs: no I/O happens inside a computation, and the only fallible operations are the
//! loaders that read catalogs and band tables from disk.
//!
//! ## Architecture
//!
//! - **Data Models** ([`models`]) - Ingredient records, recipe entries and resolved recipe lines
//! - **Ingredient Catalog** ([`catalog`]) - Built-in and user-supplied composition records with
//!   id, name, alias and fuzzy lookup
//! - **Chemistry** ([`chemistry`]) - Sugar coefficient resolution and the metrics calculator
//! - **Archetypes** ([`archetypes`]) - Reference products, their centroids and target bands
//! - **Evaluation** ([`evaluation`]) - Classification and band validation of computed metrics
//! - **Preservation** ([`preservation`]) - Flavor-paste aggregation and the preservation advisor
//!
//! ## Scientific Foundation
//!
//! - **Weighted composition** arithmetic over water, fat, sugars, MSNF and other solids
//! - **Sweetening power (SP)** and **anti-freezing power (PAC)** from empirical per-sugar
//!   coefficients, with sucrose as the reference
//! - **Water activity** of sugar solutions from the Money-Born relation

pub mod archetypes;
pub mod catalog;
pub mod chemistry;
pub mod evaluation;
pub mod models;
pub mod preservation;
