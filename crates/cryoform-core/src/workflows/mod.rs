//! # Workflows Module
//!
//! High-level entry points that tie the catalog, the chemistry and the engine together. Each
//! workflow takes unresolved recipe entries, resolves them against an ingredient catalog,
//! reports progress and returns a self-contained report.
//!
//! - **Analysis** ([`analyze`]) - Metrics, classification and band validation of a recipe
//! - **Formulation** ([`formulate`]) - Target-driven optimization of a seed recipe
//! - **Preservation** ([`preserve`]) - Paste aggregation and preservation advice

pub mod analyze;
pub mod formulate;
pub mod preserve;
