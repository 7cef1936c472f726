//! Shared data model for the AEGIS status-effect replication core.
//!
//! Everything in this crate is serializable and identical on both sides of
//! the authority/observer boundary: movement properties, humanoid data
//! (an effect's declared movement contribution), and the snapshot types
//! that travel through the character store.

pub mod movement;
pub mod snapshot;

pub use movement::{HumanoidData, MergeMode, MovementProps, Prop, PropValue};
pub use snapshot::{CharacterData, CharacterPatch, StatusData};
