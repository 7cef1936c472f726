//! One-way state replication from the authority to observers.
//!
//! The authority mirrors each character into a shared store keyed by
//! entity; observers subscribe per entity and reconcile their local
//! effect set against every incoming snapshot — purely additive and
//! subtractive by id-set difference. Matched effects are never mutated
//! here: each effect syncs its own internal state out of band.

pub mod bridge;
pub mod store;


pub use bridge::{ReplicationBridge, ReplicationError};
pub use store::{CharacterStore, MemoryStore, StoreSubscription};
