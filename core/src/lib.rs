//! AEGIS core: status-effect aggregation and replication.
//!
//! One `Character` per live entity aggregates its active status effects
//! into a merged movement-property set; the authority mirrors every
//! character into a shared store, and observers reconcile shadow copies
//! from the incoming snapshots.
//!
//! ```text
//!   authority                               observer
//!   ─────────                               ────────
//!   Character ──snapshot──► CharacterStore ──subscribe──► ReplicationBridge
//!      ▲                                                        │
//!      │ add/remove/change                        reconcile by id-set diff
//!      │                                                        ▼
//!   StatusEffect                                      shadow Character
//! ```
//!
//! Everything is single-threaded and synchronous: signals deliver within
//! the call stack that fired them, and recomputation always observes the
//! fully-updated effect map.

pub mod character;
pub mod events;
pub mod platform;
pub mod replication;
pub mod status;

// Re-exports for convenience
pub use character::{Character, CharacterError, CharacterRegistry};
pub use events::{Connection, Signal};
pub use platform::{EntityId, Mover, Role, SimpleMover};
pub use replication::{CharacterStore, MemoryStore, ReplicationBridge, ReplicationError};
pub use status::{BasicStatus, RegistryError, StatusBase, StatusEffect, StatusFactory, StatusRegistry};
