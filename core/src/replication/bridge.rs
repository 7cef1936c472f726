//! Observer-side reconciliation of replicated character state.
//!
//! The bridge subscribes to the character store per entity and reconciles
//! the local (shadow) character's effect set against every incoming
//! snapshot:
//!
//! 1. absent snapshot -> nothing to do this cycle
//! 2. remote-only ids -> reconstruct via the status registry, under the
//!    exact authoritative id
//! 3. local-only ids -> destroy the local effect
//! 4. baseline properties -> reapply only when the snapshot's defaults
//!    differ **by pointer identity** from the last applied ones

use std::cell::RefCell;
use std::rc::Rc;

use hashbrown::HashMap;
use thiserror::Error;

use aegis_types::{CharacterData, MovementProps};

use crate::character::{Character, CharacterError, CharacterRegistry};
use crate::platform::{EntityId, Mover, Role};
use crate::status::{RegistryError, StatusEffect, StatusRegistry};

use super::store::{CharacterStore, StoreSubscription};

#[derive(Debug, Error)]
pub enum ReplicationError {
    #[error("the replication bridge requires the observer role")]
    WrongRole,
    #[error("{0} is already attached to the replication bridge")]
    AlreadyAttached(EntityId),
    #[error(transparent)]
    UnknownStatusType(#[from] RegistryError),
    #[error(transparent)]
    Character(#[from] CharacterError),
}

struct EntitySync {
    character: Character,
    /// Defaults from the last applied snapshot. Compared by `Rc` identity
    /// against incoming snapshots: equal-but-distinct defaults reapply.
    last_defaults: Option<Rc<MovementProps>>,
}

/// Observer-side half of the replication protocol. Holds one store
/// subscription per attached entity.
pub struct ReplicationBridge {
    registry: CharacterRegistry,
    statuses: StatusRegistry,
    store: Rc<dyn CharacterStore>,
    entities: RefCell<HashMap<EntityId, (Rc<RefCell<EntitySync>>, StoreSubscription)>>,
}

impl ReplicationBridge {
    /// Construct the bridge. Only meaningful on an observing process with
    /// a live store; on the authority this is a hard error.
    pub fn new(
        registry: CharacterRegistry,
        statuses: StatusRegistry,
        store: Rc<dyn CharacterStore>,
    ) -> Result<Self, ReplicationError> {
        if registry.role() != Role::Observer {
            tracing::error!("[REPLICATION] bridge refused: process is not an observer");
            return Err(ReplicationError::WrongRole);
        }
        Ok(Self {
            registry,
            statuses,
            store,
            entities: RefCell::new(HashMap::new()),
        })
    }

    /// Start mirroring an entity: build its shadow character and
    /// subscribe to its snapshots. The current stored snapshot (if any)
    /// is reconciled before this returns.
    pub fn attach_entity(
        &self,
        entity: EntityId,
        mover: Rc<RefCell<dyn Mover>>,
    ) -> Result<Character, ReplicationError> {
        if self.entities.borrow().contains_key(&entity) {
            tracing::error!("[REPLICATION] {entity} attached twice");
            return Err(ReplicationError::AlreadyAttached(entity));
        }

        let character = Character::new_replicated(&self.registry, entity, mover)?;
        tracing::info!("[REPLICATION] mirroring {entity}");

        let sync = Rc::new(RefCell::new(EntitySync {
            character: character.clone(),
            last_defaults: None,
        }));

        let statuses = self.statuses.clone();
        let sync_for_sub = Rc::clone(&sync);
        let subscription = self.store.subscribe(
            entity,
            Box::new(move |snapshot| {
                if let Err(err) = reconcile(&sync_for_sub, &statuses, snapshot.as_deref()) {
                    tracing::error!("[REPLICATION] reconciliation failed for {entity}: {err}");
                }
            }),
        );

        self.entities
            .borrow_mut()
            .insert(entity, (sync, subscription));
        Ok(character)
    }

    /// Stop mirroring an entity and destroy its shadow character.
    pub fn detach_entity(&self, entity: EntityId) {
        let Some((sync, subscription)) = self.entities.borrow_mut().remove(&entity) else {
            return;
        };
        drop(subscription);
        sync.borrow().character.destroy();
        tracing::info!("[REPLICATION] stopped mirroring {entity}");
    }

    pub fn is_attached(&self, entity: EntityId) -> bool {
        self.entities.borrow().contains_key(&entity)
    }
}

/// One reconciliation cycle for one entity.
fn reconcile(
    sync: &RefCell<EntitySync>,
    registry: &StatusRegistry,
    snapshot: Option<&CharacterData>,
) -> Result<(), ReplicationError> {
    // Entity removed upstream: nothing further this cycle.
    let Some(snapshot) = snapshot else {
        return Ok(());
    };

    let (character, last_defaults) = {
        let sync = sync.borrow();
        (sync.character.clone(), sync.last_defaults.clone())
    };
    if character.is_destroyed() {
        return Ok(());
    }

    let local = character.statuses();

    // Remote-only ids: reconstruct. An unregistered type name means the
    // observer cannot safely mirror this snapshot at all.
    for (id, data) in &snapshot.statuses {
        if local.contains_key(id) {
            continue;
        }
        let factory = registry.resolve(&data.type_name)?;
        let status = factory(&character, id);
        character.adopt_status(status);
    }

    // Local-only ids: stale, destroy. The effect's own destruction
    // handler removes it from the map and recomputes.
    for (id, status) in &local {
        if !snapshot.statuses.contains_key(id) {
            status.destroy();
        }
    }

    // Baseline properties: identity comparison, not content equality.
    let defaults_changed = match &last_defaults {
        Some(applied) => !Rc::ptr_eq(applied, &snapshot.defaults),
        None => true,
    };
    if defaults_changed {
        character.set_default_props(*snapshot.defaults);
        sync.borrow_mut().last_defaults = Some(Rc::clone(&snapshot.defaults));
    }

    Ok(())
}
