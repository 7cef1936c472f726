//! Type-name -> constructor registry for remote reconstruction.
//!
//! Observers never see concrete effect types over the wire, only the
//! `type_name` carried in each `StatusData`. Every remote type must be
//! registered here before any snapshot referencing it arrives; an
//! unresolved name is a caller-visible failure, never a silent skip.

use std::cell::RefCell;
use std::rc::Rc;

use hashbrown::HashMap;
use thiserror::Error;

use crate::character::Character;

use super::effect::StatusEffect;

/// Construction capability for one effect type. Receives the owning
/// character and the exact id to assign (the authoritative id, so local
/// and remote ids stay identical).
pub type StatusFactory = Rc<dyn Fn(&Character, &str) -> Rc<dyn StatusEffect>>;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("no status type registered under '{0}'")]
    UnknownType(String),
}

/// Process-wide mapping from type name to construction capability.
#[derive(Clone, Default)]
pub struct StatusRegistry {
    factories: Rc<RefCell<HashMap<String, StatusFactory>>>,
}

impl StatusRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under `name`, replacing any previous entry.
    pub fn register(&self, name: impl Into<String>, factory: StatusFactory) {
        let name = name.into();
        if self
            .factories
            .borrow_mut()
            .insert(name.clone(), factory)
            .is_some()
        {
            tracing::warn!("[REGISTRY] replaced status factory for '{name}'");
        }
    }

    /// Look up the factory for `name`.
    pub fn resolve(&self, name: &str) -> Result<StatusFactory, RegistryError> {
        self.factories
            .borrow()
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownType(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.borrow().contains_key(name)
    }
}
