//! Seam to the hosting entity platform.
//!
//! The engine that owns the live object graph is a collaborator, not part
//! of this core. It supplies entity handles, the movement-capable
//! sub-object each character writes merged properties to, and the role of
//! the current process.

use std::fmt;

use serde::{Deserialize, Serialize};

use aegis_types::MovementProps;

/// Opaque handle to one live entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

/// Role of the current process in the replication topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Source of truth for character and effect state.
    Authority,
    /// Mirrors authoritative state for local use.
    Observer,
}

/// The movement-capable sub-object of an entity: four mutable properties
/// this core writes merged values to.
pub trait Mover {
    /// Write the merged property set onto the entity.
    fn apply(&mut self, props: &MovementProps);

    /// Current live properties.
    fn props(&self) -> MovementProps;
}

/// Plain in-memory `Mover` for headless servers and tests.
#[derive(Debug, Clone, Default)]
pub struct SimpleMover {
    props: MovementProps,
    applies: u64,
}

impl SimpleMover {
    pub fn new(props: MovementProps) -> Self {
        Self { props, applies: 0 }
    }

    /// How many times `apply` has been called. Used by tests asserting the
    /// no-humanoid-data fast path leaves live properties untouched.
    pub fn apply_count(&self) -> u64 {
        self.applies
    }
}

impl Mover for SimpleMover {
    fn apply(&mut self, props: &MovementProps) {
        self.props = *props;
        self.applies += 1;
    }

    fn props(&self) -> MovementProps {
        self.props
    }
}
