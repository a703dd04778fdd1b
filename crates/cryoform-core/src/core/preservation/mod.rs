//! # Preservation Module
//!
//! Rule-based guidance for shelf-stabilizing auxiliary flavor pastes (fruit pastes, caramels,
//! nut and chocolate bases) before they are dosed into a gelato mix.
//!
//! - [`paste`] - Paste formulas, lab measurements and aggregation into a single ingredient.
//! - [`advice`] - Advice records, preferences and the qualitative descriptors they carry.
//! - [`rules`] - The advisor itself and the water-activity estimate it relies on.
//!
//! The advice is indicative only. Every record is flagged as requiring validation by a
//! qualified process authority.

pub mod advice;
pub mod paste;
pub mod rules;
