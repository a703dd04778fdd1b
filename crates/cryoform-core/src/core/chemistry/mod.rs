//! # Chemistry Module
//!
//! Weighted-composition arithmetic for frozen-dessert mixes.
//!
//! - [`coefficients`] - Sweetening (SP) and anti-freezing (PAC) power of reference sugars, and the
//!   precedence-ordered resolver that decides which coefficients weight each line's sugar.
//! - [`metrics`] - The metrics calculator: component masses and percentages after evaporation,
//!   both total-solids values, aggregate SP/PAC, category shares and cost.
//!
//! Freezing-point behavior is approximated through empirical PAC coefficients; no thermodynamic
//! model is attempted.

pub mod coefficients;
pub mod metrics;
