//! The per-entity status-effect aggregator.
//!
//! A `Character` owns the set of active status effects for one entity,
//! recomputes the merged movement properties on every add/remove/change,
//! and (on the authority) mirrors its state into the character store.
//! All mutation is synchronous: the effect map is updated before any
//! signal observing it fires, so recomputation always sees the final map.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use hashbrown::HashMap;
use indexmap::IndexMap;
use thiserror::Error;

use aegis_types::{CharacterData, CharacterPatch, HumanoidData, MovementProps};

use crate::events::{Connection, Signal};
use crate::platform::{EntityId, Mover, Role};
use crate::status::StatusEffect;

use super::merge::merge_props;
use super::registry::CharacterRegistry;

#[derive(Debug, Error)]
pub enum CharacterError {
    #[error("a character already exists for {0}")]
    AlreadyRegistered(EntityId),
    #[error("characters can only be constructed on the authority")]
    NotAuthority,
    #[error("no character store configured; replication handler not ready")]
    ReplicationNotReady,
}

struct CharacterState {
    /// Active effects, keyed by id. Insertion order is the merge iteration
    /// order, kept explicit so recomputation is deterministic.
    statuses: IndexMap<String, Rc<dyn StatusEffect>>,
    /// Changed/destroyed connections per effect id.
    subscriptions: HashMap<String, Vec<Connection>>,
}

struct CharacterShared {
    entity: EntityId,
    mover: Rc<RefCell<dyn Mover>>,
    registry: CharacterRegistry,
    state: RefCell<CharacterState>,
    /// Baseline movement properties. Reference-counted so snapshots share
    /// one identity until the baseline is replaced wholesale.
    defaults: RefCell<Rc<MovementProps>>,
    next_status_seq: Cell<u64>,
    destroyed: Cell<bool>,
    /// Whether the previous recomputation wrote effect-contributed values.
    /// Lets the no-humanoid-data fast path skip the mover while still
    /// restoring the baseline once when the last contribution expires.
    applied_effect_props: Cell<bool>,
    on_status_added: Signal<Rc<dyn StatusEffect>>,
    on_status_removed: Signal<Rc<dyn StatusEffect>>,
    on_damage_taken: Signal<f32>,
    on_destroyed: Signal<()>,
}

/// Cheap handle to one entity's aggregator state.
#[derive(Clone)]
pub struct Character {
    shared: Rc<CharacterShared>,
}

impl Character {
    /// Construct the authoritative character for an entity.
    ///
    /// Preconditions (all fatal, logged, and returned as errors): the
    /// process must be the authority, the store must be ready, and the
    /// entity must not already have a character. The observing side never
    /// calls this; the replication bridge builds shadow copies through an
    /// internal constructor instead.
    pub fn new(
        registry: &CharacterRegistry,
        entity: EntityId,
        mover: Rc<RefCell<dyn Mover>>,
    ) -> Result<Self, CharacterError> {
        if registry.role() != Role::Authority {
            tracing::error!("[CHARACTER] refusing to construct {entity}: not the authority");
            return Err(CharacterError::NotAuthority);
        }
        if registry.store().is_none() {
            tracing::error!(
                "[CHARACTER] refusing to construct {entity}: no character store configured"
            );
            return Err(CharacterError::ReplicationNotReady);
        }
        Self::build(registry, entity, mover)
    }

    /// Internal capability used by the replication bridge to build shadow
    /// copies on observers, bypassing the authority-role check.
    pub(crate) fn new_replicated(
        registry: &CharacterRegistry,
        entity: EntityId,
        mover: Rc<RefCell<dyn Mover>>,
    ) -> Result<Self, CharacterError> {
        Self::build(registry, entity, mover)
    }

    fn build(
        registry: &CharacterRegistry,
        entity: EntityId,
        mover: Rc<RefCell<dyn Mover>>,
    ) -> Result<Self, CharacterError> {
        let defaults = mover.borrow().props();
        let character = Self {
            shared: Rc::new(CharacterShared {
                entity,
                mover,
                registry: registry.clone(),
                state: RefCell::new(CharacterState {
                    statuses: IndexMap::new(),
                    subscriptions: HashMap::new(),
                }),
                defaults: RefCell::new(Rc::new(defaults)),
                next_status_seq: Cell::new(0),
                destroyed: Cell::new(false),
                applied_effect_props: Cell::new(false),
                on_status_added: Signal::new(),
                on_status_removed: Signal::new(),
                on_damage_taken: Signal::new(),
                on_destroyed: Signal::new(),
            }),
        };

        // Registered before anyone is told about it, so lookups from
        // created-handlers already succeed.
        registry.insert(&character).inspect_err(|err| {
            tracing::error!("[CHARACTER] construction failed: {err}");
        })?;

        tracing::info!("[CHARACTER] created for {entity}");
        registry.notify_created(&character);
        character.push_snapshot();
        Ok(character)
    }

    pub fn entity(&self) -> EntityId {
        self.shared.entity
    }

    pub fn is_destroyed(&self) -> bool {
        self.shared.destroyed.get()
    }

    /// True if both handles point at the same character.
    pub fn same(&self, other: &Character) -> bool {
        Rc::ptr_eq(&self.shared, &other.shared)
    }

    // --- Signals ---

    pub fn on_status_added(&self) -> &Signal<Rc<dyn StatusEffect>> {
        &self.shared.on_status_added
    }

    pub fn on_status_removed(&self) -> &Signal<Rc<dyn StatusEffect>> {
        &self.shared.on_status_removed
    }

    pub fn on_damage_taken(&self) -> &Signal<f32> {
        &self.shared.on_damage_taken
    }

    /// Fired once, when this character is destroyed.
    pub fn on_destroyed(&self) -> &Signal<()> {
        &self.shared.on_destroyed
    }

    // --- Status management ---

    /// Next free per-character status id. Ids are assigned on the
    /// authority and replicated verbatim to observers.
    pub fn generate_status_id(&self) -> String {
        let seq = self.shared.next_status_seq.get();
        self.shared.next_status_seq.set(seq + 1);
        seq.to_string()
    }

    /// Attach an effect under its id. Uniqueness of the id is the
    /// caller's responsibility. The effect map is updated, the added
    /// notification fires, properties recompute, and the character
    /// subscribes to the effect's changed/destroyed signals so it never
    /// holds a reference to a destroyed effect.
    pub fn add_status(&self, status: Rc<dyn StatusEffect>) {
        if self.shared.destroyed.get() {
            tracing::warn!("[CHARACTER] add_status on destroyed {}", self.shared.entity);
            return;
        }
        let id = status.id().to_string();
        self.shared
            .state
            .borrow_mut()
            .statuses
            .insert(id.clone(), Rc::clone(&status));
        self.connect_status(&id, &status);

        tracing::debug!(
            "[CHARACTER] {} gained status '{}' ({})",
            self.shared.entity,
            id,
            status.type_name()
        );
        self.shared.on_status_added.fire(&status);
        self.sync();
    }

    /// Insert a reconstructed effect without firing the added
    /// notification. Used by the replication bridge: a reconstruction is
    /// not a new event.
    pub(crate) fn adopt_status(&self, status: Rc<dyn StatusEffect>) {
        if self.shared.destroyed.get() {
            return;
        }
        let id = status.id().to_string();
        self.shared
            .state
            .borrow_mut()
            .statuses
            .insert(id.clone(), Rc::clone(&status));
        self.connect_status(&id, &status);
        tracing::debug!(
            "[CHARACTER] {} adopted replicated status '{}'",
            self.shared.entity,
            id
        );
        self.sync();
    }

    fn connect_status(&self, id: &str, status: &Rc<dyn StatusEffect>) {
        let weak = Rc::downgrade(&self.shared);
        let changed = status.changed().connect(move |_| {
            if let Some(character) = Character::upgrade(&weak) {
                character.sync();
            }
        });

        let weak = Rc::downgrade(&self.shared);
        let owned_id = id.to_string();
        let destroyed = status.destroyed().connect(move |_| {
            if let Some(character) = Character::upgrade(&weak) {
                character.handle_status_destroyed(&owned_id);
            }
        });

        self.shared
            .state
            .borrow_mut()
            .subscriptions
            .insert(id.to_string(), vec![changed, destroyed]);
    }

    fn upgrade(weak: &Weak<CharacterShared>) -> Option<Character> {
        weak.upgrade().map(|shared| Character { shared })
    }

    /// One-time destruction handler: detach subscriptions, drop the map
    /// entry, fire the removed notification, recompute.
    fn handle_status_destroyed(&self, id: &str) {
        if self.shared.destroyed.get() {
            return;
        }
        let removed = {
            let mut state = self.shared.state.borrow_mut();
            state.subscriptions.remove(id);
            state.statuses.shift_remove(id)
        };
        let Some(status) = removed else {
            return;
        };
        tracing::debug!("[CHARACTER] {} lost status '{}'", self.shared.entity, id);
        self.shared.on_status_removed.fire(&status);
        self.sync();
    }

    /// Cloned id -> effect map. Mutating the result never affects the
    /// character.
    pub fn statuses(&self) -> IndexMap<String, Rc<dyn StatusEffect>> {
        self.shared.state.borrow().statuses.clone()
    }

    pub fn get_status(&self, id: &str) -> Option<Rc<dyn StatusEffect>> {
        self.shared.state.borrow().statuses.get(id).cloned()
    }

    pub fn status_count(&self) -> usize {
        self.shared.state.borrow().statuses.len()
    }

    // --- Properties ---

    /// Copy of the baseline movement properties.
    pub fn default_props(&self) -> MovementProps {
        **self.shared.defaults.borrow()
    }

    /// Replace the baseline properties wholesale (no partial merge) and
    /// recompute. On the authority this pushes an incremental update
    /// carrying only the new defaults.
    pub fn set_default_props(&self, props: MovementProps) {
        if self.shared.destroyed.get() {
            return;
        }
        *self.shared.defaults.borrow_mut() = Rc::new(props);
        tracing::debug!("[CHARACTER] {} baseline replaced", self.shared.entity);
        self.recompute();
        if !self.shared.applied_effect_props.get() {
            // No effect contributions are live; keep the mover tracking
            // the new baseline.
            self.shared.mover.borrow_mut().apply(&props);
        }
        if self.shared.registry.role() == Role::Authority {
            if let Some(store) = self.shared.registry.store() {
                store.patch_character_data(
                    self.shared.entity,
                    CharacterPatch {
                        statuses: None,
                        defaults: Some(Rc::clone(&self.shared.defaults.borrow())),
                    },
                );
            }
        }
    }

    /// Report damage against this character. This core only fans the
    /// event out to subscribers; health is the entity platform's concern.
    pub fn take_damage(&self, amount: f32) {
        if self.shared.destroyed.get() {
            return;
        }
        self.shared.on_damage_taken.fire(&amount);
    }

    /// Recompute merged properties and, on the authority, mirror the full
    /// snapshot into the store.
    fn sync(&self) {
        self.recompute();
        self.push_snapshot();
    }

    fn recompute(&self) {
        let defaults = self.default_props();
        let datas: Vec<HumanoidData> = {
            let state = self.shared.state.borrow();
            state
                .statuses
                .values()
                .filter_map(|status| status.humanoid_data())
                .collect()
        };

        if datas.is_empty() {
            // Nothing contributes movement data. Live properties already
            // reflect the baseline unless the previous pass applied effect
            // values, in which case restore the baseline once.
            if self.shared.applied_effect_props.replace(false) {
                self.shared.mover.borrow_mut().apply(&defaults);
            }
            return;
        }

        let merged = merge_props(&defaults, &datas);
        self.shared.applied_effect_props.set(true);
        self.shared.mover.borrow_mut().apply(&merged);
    }

    // --- Replication (authority side) ---

    /// Serializable projection of this character, derived on demand.
    pub fn snapshot(&self) -> CharacterData {
        let state = self.shared.state.borrow();
        let mut statuses = IndexMap::with_capacity(state.statuses.len());
        for (id, status) in &state.statuses {
            statuses.insert(id.clone(), status.serialize_data());
        }
        CharacterData {
            statuses,
            defaults: Rc::clone(&self.shared.defaults.borrow()),
        }
    }

    fn push_snapshot(&self) {
        if self.shared.registry.role() != Role::Authority {
            return;
        }
        let Some(store) = self.shared.registry.store() else {
            return;
        };
        let snapshot = self.snapshot();
        store.set_character_data(self.shared.entity, snapshot);
    }

    // --- Teardown ---

    /// Tear the character down: destroy owned effects, drop all
    /// subscriptions, deregister, delete authority-side shared state, and
    /// fire the instance-level then class-level destroyed notifications.
    /// Idempotent, and safe while effects are mid-destruction.
    pub fn destroy(&self) {
        if self.shared.destroyed.replace(true) {
            return;
        }

        let (statuses, subscriptions) = {
            let mut state = self.shared.state.borrow_mut();
            let statuses: Vec<Rc<dyn StatusEffect>> = state.statuses.values().cloned().collect();
            state.statuses.clear();
            (statuses, std::mem::take(&mut state.subscriptions))
        };
        // Detach before destroying effects so their destroyed signals
        // don't call back into this character.
        drop(subscriptions);
        for status in statuses {
            status.destroy();
        }

        self.shared.registry.remove(self.shared.entity);
        if self.shared.registry.role() == Role::Authority {
            if let Some(store) = self.shared.registry.store() {
                store.delete_character_data(self.shared.entity);
            }
        }

        tracing::info!("[CHARACTER] destroyed for {}", self.shared.entity);
        self.shared.on_destroyed.fire(&());
        self.shared.registry.notify_destroyed(self);
    }
}
