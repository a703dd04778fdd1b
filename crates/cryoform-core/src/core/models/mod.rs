//! # Models Module
//!
//! Plain data types shared by every other part of the library.
//!
//! - [`ingredient`] - Ingredient composition records, categories and sugar descriptors.
//! - [`recipe`] - Unresolved recipe entries and catalog-resolved recipe lines.

pub mod ingredient;
pub mod recipe;
