//! Process-wide character registry.
//!
//! One registry per logical process, owned by the top-level orchestrator
//! and handed (cheaply cloned) to whatever needs character lookup. It
//! enforces the single-character-per-entity invariant and carries the
//! process role plus the optional character store the authority mirrors
//! state into. Reads go through cloned snapshots so callers can never
//! mutate internal state.

use std::cell::RefCell;
use std::rc::Rc;

use hashbrown::HashMap;

use crate::events::Signal;
use crate::platform::{EntityId, Role};
use crate::replication::CharacterStore;

use super::aggregator::{Character, CharacterError};

struct RegistryInner {
    role: Role,
    store: Option<Rc<dyn CharacterStore>>,
    characters: RefCell<HashMap<EntityId, Character>>,
    on_created: Signal<Character>,
    on_destroyed: Signal<Character>,
}

/// Cheaply clonable handle to the per-process character map.
#[derive(Clone)]
pub struct CharacterRegistry {
    inner: Rc<RegistryInner>,
}

impl CharacterRegistry {
    pub fn new(role: Role, store: Option<Rc<dyn CharacterStore>>) -> Self {
        Self {
            inner: Rc::new(RegistryInner {
                role,
                store,
                characters: RefCell::new(HashMap::new()),
                on_created: Signal::new(),
                on_destroyed: Signal::new(),
            }),
        }
    }

    pub fn role(&self) -> Role {
        self.inner.role
    }

    pub(crate) fn store(&self) -> Option<Rc<dyn CharacterStore>> {
        self.inner.store.clone()
    }

    /// Look up the character for an entity.
    pub fn get(&self, entity: EntityId) -> Option<Character> {
        self.inner.characters.borrow().get(&entity).cloned()
    }

    /// Cloned snapshot of the entity -> character map. Mutating the
    /// returned map never affects the registry.
    pub fn characters(&self) -> HashMap<EntityId, Character> {
        self.inner.characters.borrow().clone()
    }

    pub fn count(&self) -> usize {
        self.inner.characters.borrow().len()
    }

    /// Fired after a character is registered.
    pub fn on_character_created(&self) -> &Signal<Character> {
        &self.inner.on_created
    }

    /// Fired after a character is destroyed and deregistered.
    pub fn on_character_destroyed(&self) -> &Signal<Character> {
        &self.inner.on_destroyed
    }

    /// Register a freshly built character. Fails, leaving the existing
    /// entry untouched, if the entity already has one.
    pub(crate) fn insert(&self, character: &Character) -> Result<(), CharacterError> {
        let entity = character.entity();
        let mut characters = self.inner.characters.borrow_mut();
        if characters.contains_key(&entity) {
            return Err(CharacterError::AlreadyRegistered(entity));
        }
        characters.insert(entity, character.clone());
        Ok(())
    }

    pub(crate) fn remove(&self, entity: EntityId) {
        self.inner.characters.borrow_mut().remove(&entity);
    }

    pub(crate) fn notify_created(&self, character: &Character) {
        self.inner.on_created.fire(character);
    }

    pub(crate) fn notify_destroyed(&self, character: &Character) {
        self.inner.on_destroyed.fire(character);
    }
}
