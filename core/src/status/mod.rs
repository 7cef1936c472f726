//! Status effects and their registry.
//!
//! This module provides:
//! - **`StatusEffect`**: the polymorphic unit a character aggregates —
//!   identity, an optional movement contribution, change/destroyed signals
//! - **`StatusBase`**: embeddable plumbing for concrete effect types
//! - **`BasicStatus`**: a minimal concrete effect, used for observer-side
//!   shadow instances and in tests
//! - **`StatusRegistry`**: type-name -> constructor lookup, used only for
//!   remote reconstruction

mod basic;
mod effect;
mod registry;

pub use basic::BasicStatus;
pub use effect::{StatusBase, StatusEffect};
pub use registry::{RegistryError, StatusFactory, StatusRegistry};
