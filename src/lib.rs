//! Deterministic comparable-sale selection for real-estate valuation.
//!
//! `valuation-core` scores candidate comps against a subject property,
//! filters and de-outliers them, ranks them with a total tie-break order,
//! and aggregates the winners into a suggested ARV with a range. Two frozen
//! algorithm versions (`selection_v1_1`, `selection_v1_3`) are selected by
//! tag. All operations are pure: identical inputs always produce identical
//! outputs, regardless of comp order, and the [`determinism`] module hashes
//! canonical JSON to prove it.

pub mod confidence;
pub mod determinism;
pub mod numeric;
pub mod selection;
pub mod types;

pub use determinism::{stable_hash, stable_stringify};
pub use selection::run_valuation_selection;
