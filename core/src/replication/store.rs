//! The character store: the channel between authority and observers.
//!
//! The store itself is a collaborator (a central state store with
//! pub/sub); this module defines the contract the core needs from it and
//! an in-process implementation with synchronous delivery, used by tests
//! and single-process setups.

use std::cell::RefCell;
use std::rc::Rc;

use hashbrown::HashMap;

use aegis_types::{CharacterData, CharacterPatch};

use crate::events::{Connection, Signal};
use crate::platform::EntityId;

/// Callback invoked with the stored data for one entity, or `None` once
/// the entity's data is deleted upstream.
pub type StoreCallback = Box<dyn FnMut(Option<Rc<CharacterData>>)>;

/// Push-based, eventually-consistent one-way channel from the authority
/// to observers.
pub trait CharacterStore {
    /// Replace the stored snapshot for an entity.
    fn set_character_data(&self, entity: EntityId, data: CharacterData);

    /// Apply an incremental update; fields absent from the patch are left
    /// untouched.
    fn patch_character_data(&self, entity: EntityId, patch: CharacterPatch);

    /// Drop the stored snapshot (entity removed upstream).
    fn delete_character_data(&self, entity: EntityId);

    /// Current snapshot, if any.
    fn get_character_data(&self, entity: EntityId) -> Option<Rc<CharacterData>>;

    /// Subscribe to one entity's snapshots. The current value is
    /// delivered immediately; the subscription ends when the returned
    /// handle is dropped.
    fn subscribe(&self, entity: EntityId, callback: StoreCallback) -> StoreSubscription;
}

/// Handle to an active store subscription. Dropping it unsubscribes.
pub struct StoreSubscription {
    _conn: Connection,
}

#[derive(Default)]
struct MemoryStoreInner {
    data: RefCell<HashMap<EntityId, Rc<CharacterData>>>,
    channels: RefCell<HashMap<EntityId, Rc<Signal<Option<Rc<CharacterData>>>>>>,
}

/// In-process store with synchronous delivery.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Rc<MemoryStoreInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn channel(&self, entity: EntityId) -> Rc<Signal<Option<Rc<CharacterData>>>> {
        Rc::clone(
            self.inner
                .channels
                .borrow_mut()
                .entry(entity)
                .or_insert_with(|| Rc::new(Signal::new())),
        )
    }

    fn publish(&self, entity: EntityId, value: Option<Rc<CharacterData>>) {
        let channel = self.inner.channels.borrow().get(&entity).cloned();
        if let Some(channel) = channel {
            channel.fire(&value);
        }
    }
}

impl CharacterStore for MemoryStore {
    fn set_character_data(&self, entity: EntityId, data: CharacterData) {
        let data = Rc::new(data);
        self.inner.data.borrow_mut().insert(entity, Rc::clone(&data));
        self.publish(entity, Some(data));
    }

    fn patch_character_data(&self, entity: EntityId, patch: CharacterPatch) {
        let patched = {
            let data = self.inner.data.borrow();
            let mut merged = data
                .get(&entity)
                .map(|d| (**d).clone())
                .unwrap_or_else(|| CharacterData::new(Rc::new(Default::default())));
            if let Some(statuses) = patch.statuses {
                merged.statuses = statuses;
            }
            if let Some(defaults) = patch.defaults {
                merged.defaults = defaults;
            }
            Rc::new(merged)
        };
        self.inner
            .data
            .borrow_mut()
            .insert(entity, Rc::clone(&patched));
        self.publish(entity, Some(patched));
    }

    fn delete_character_data(&self, entity: EntityId) {
        self.inner.data.borrow_mut().remove(&entity);
        self.publish(entity, None);
    }

    fn get_character_data(&self, entity: EntityId) -> Option<Rc<CharacterData>> {
        self.inner.data.borrow().get(&entity).cloned()
    }

    fn subscribe(&self, entity: EntityId, mut callback: StoreCallback) -> StoreSubscription {
        callback(self.get_character_data(entity));
        let conn = self
            .channel(entity)
            .connect(move |value: &Option<Rc<CharacterData>>| callback(value.clone()));
        StoreSubscription { _conn: conn }
    }
}
