//! # Engine Module
//!
//! The stateful part of the library: the formulation optimizer and everything it needs to run.
//!
//! ## Overview
//!
//! The optimizer takes a seed recipe and a sparse set of numeric targets and searches for
//! ingredient masses that bring the recipe's metrics onto those targets. Each run owns a private
//! copy of the seed lines, is fully deterministic and never performs more metrics evaluations
//! than its configured budget.
//!
//! ## Architecture
//!
//! - **Targets** ([`targets`]) - Targetable fields and the weighted squared-error objective
//! - **Configuration** ([`config`]) - Evaluation budget, step multiplier, convergence threshold,
//!   locked ingredients and batch-mass preservation
//! - **State Tracking** ([`state`]) - Evaluated candidates and best-so-far bookkeeping
//! - **Search** ([`optimizer`]) - Analytic-sensitivity local search with backtracking
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events for host UIs
//! - **Error Handling** ([`error`]) - Failures surfaced by the workflows built on the engine

pub mod config;
pub mod error;
pub mod optimizer;
pub mod progress;
pub mod state;
pub mod targets;
