//! Character aggregation.
//!
//! One `Character` per live entity: it owns that entity's active status
//! effects, merges their movement contributions by priority on every
//! change, and writes the result to the entity's movement sub-object.
//! The `CharacterRegistry` enforces the one-character-per-entity
//! invariant and exposes the class-level lifecycle signals.

pub mod aggregator;
mod merge;
pub mod registry;

#[cfg(test)]
mod aggregator_tests;

pub use aggregator::{Character, CharacterError};
pub use registry::CharacterRegistry;
