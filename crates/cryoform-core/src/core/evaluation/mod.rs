//! # Evaluation Module
//!
//! Judges a computed [`Metrics`](crate::core::chemistry::metrics::Metrics) record against
//! the reference archetypes.
//!
//! - [`classifier`] - Nearest-centroid assignment of a recipe to an archetype.
//! - [`validator`] - Band checks with proportional corrective suggestions.

pub mod classifier;
pub mod validator;
