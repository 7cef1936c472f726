//! Tests for the character aggregator.
//!
//! Covers the construction preconditions, the merge semantics as seen
//! through live characters, copy-on-read accessors, and teardown.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use aegis_types::{HumanoidData, MergeMode, MovementProps, Prop, PropValue};

use crate::character::{Character, CharacterError, CharacterRegistry};
use crate::platform::{EntityId, Mover, Role, SimpleMover};
use crate::replication::{CharacterStore, MemoryStore};
use crate::status::{BasicStatus, StatusEffect};

fn make_world() -> (CharacterRegistry, MemoryStore) {
    let store = MemoryStore::new();
    let registry = CharacterRegistry::new(Role::Authority, Some(Rc::new(store.clone())));
    (registry, store)
}

fn make_mover() -> Rc<RefCell<SimpleMover>> {
    Rc::new(RefCell::new(SimpleMover::new(MovementProps::default())))
}

fn make_character(registry: &CharacterRegistry, id: u64) -> (Character, Rc<RefCell<SimpleMover>>) {
    let mover = make_mover();
    let character = Character::new(registry, EntityId(id), mover.clone()).unwrap();
    (character, mover)
}

fn incr(id: &str, priority: i32, speed: f32) -> Rc<BasicStatus> {
    BasicStatus::with_humanoid_data(
        id,
        "Speed",
        HumanoidData::new(MergeMode::Increment, priority)
            .with(Prop::WalkSpeed, PropValue::Num(speed)),
    )
}

fn set(id: &str, priority: i32, speed: f32) -> Rc<BasicStatus> {
    BasicStatus::with_humanoid_data(
        id,
        "Speed",
        HumanoidData::new(MergeMode::Set, priority).with(Prop::WalkSpeed, PropValue::Num(speed)),
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Construction preconditions
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_duplicate_entity_fails_without_touching_existing() {
    let (registry, _store) = make_world();
    let (first, _mover) = make_character(&registry, 1);
    first.add_status(incr("a", 1, 5.0));

    let result = Character::new(&registry, EntityId(1), make_mover());
    assert!(matches!(result, Err(CharacterError::AlreadyRegistered(_))));

    // The registered character is untouched.
    let current = registry.get(EntityId(1)).unwrap();
    assert!(current.same(&first));
    assert_eq!(current.status_count(), 1);
}

#[test]
fn test_construction_requires_authority_role() {
    let store: Rc<dyn CharacterStore> = Rc::new(MemoryStore::new());
    let registry = CharacterRegistry::new(Role::Observer, Some(store));
    let result = Character::new(&registry, EntityId(1), make_mover());
    assert!(matches!(result, Err(CharacterError::NotAuthority)));
    assert_eq!(registry.count(), 0);
}

#[test]
fn test_construction_requires_live_store() {
    let registry = CharacterRegistry::new(Role::Authority, None);
    let result = Character::new(&registry, EntityId(1), make_mover());
    assert!(matches!(result, Err(CharacterError::ReplicationNotReady)));
}

#[test]
fn test_created_handler_sees_registered_character() {
    let (registry, _store) = make_world();
    let seen = Rc::new(Cell::new(false));

    let seen2 = Rc::clone(&seen);
    let registry2 = registry.clone();
    let _conn = registry.on_character_created().connect(move |character| {
        seen2.set(registry2.get(character.entity()).is_some());
    });

    make_character(&registry, 1);
    assert!(seen.get());
}

// ─────────────────────────────────────────────────────────────────────────────
// Merge semantics through live characters
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_increments_sum_onto_baseline() {
    let (registry, _store) = make_world();
    let (character, mover) = make_character(&registry, 1);

    character.add_status(incr("a", 1, 5.0));
    character.add_status(incr("b", 2, 3.0));
    assert_eq!(mover.borrow().props().walk_speed, 24.0);
}

#[test]
fn test_higher_set_priority_wins_regardless_of_arrival_order() {
    let (registry, _store) = make_world();
    let (character, mover) = make_character(&registry, 1);
    character.add_status(set("a", 1, 10.0));
    character.add_status(set("b", 5, 20.0));
    assert_eq!(mover.borrow().props().walk_speed, 20.0);

    let (character, mover) = make_character(&registry, 2);
    character.add_status(set("b", 5, 20.0));
    character.add_status(set("a", 1, 10.0));
    assert_eq!(mover.borrow().props().walk_speed, 20.0);
}

#[test]
fn test_set_before_increment_suppresses_the_increment() {
    let (registry, _store) = make_world();
    let (character, mover) = make_character(&registry, 1);

    character.add_status(set("a", 3, 10.0));
    character.add_status(incr("b", 10, 5.0));
    assert_eq!(mover.borrow().props().walk_speed, 10.0);
}

#[test]
fn test_destroying_status_removes_its_contribution() {
    let (registry, _store) = make_world();
    let (character, mover) = make_character(&registry, 1);

    let boost = incr("a", 1, 5.0);
    character.add_status(boost.clone());
    assert_eq!(mover.borrow().props().walk_speed, 21.0);

    boost.destroy();
    assert!(character.get_status("a").is_none());
    assert_eq!(character.status_count(), 0);
    assert_eq!(mover.borrow().props().walk_speed, 16.0);
}

#[test]
fn test_result_depends_only_on_current_effect_set() {
    let (registry, _store) = make_world();

    // History: add a, add b, destroy a.
    let (with_history, mover_a) = make_character(&registry, 1);
    let a = incr("a", 1, 5.0);
    with_history.add_status(a.clone());
    with_history.add_status(incr("b", 2, 3.0));
    a.destroy();

    // Fresh character with only b.
    let (fresh, mover_b) = make_character(&registry, 2);
    fresh.add_status(incr("b", 2, 3.0));

    assert_eq!(mover_a.borrow().props(), mover_b.borrow().props());
}

#[test]
fn test_changed_data_recomputes_before_call_returns() {
    let (registry, _store) = make_world();
    let (character, mover) = make_character(&registry, 1);

    let status = incr("a", 1, 5.0);
    character.add_status(status.clone());
    assert_eq!(mover.borrow().props().walk_speed, 21.0);

    status.set_humanoid_data(Some(
        HumanoidData::new(MergeMode::Increment, 1).with(Prop::WalkSpeed, PropValue::Num(8.0)),
    ));
    assert_eq!(mover.borrow().props().walk_speed, 24.0);
}

#[test]
fn test_statuses_without_humanoid_data_leave_mover_untouched() {
    let (registry, _store) = make_world();
    let (character, mover) = make_character(&registry, 1);

    character.add_status(BasicStatus::new("dot", "Burn"));
    assert_eq!(mover.borrow().apply_count(), 0);

    character.get_status("dot").unwrap().destroy();
    assert_eq!(mover.borrow().apply_count(), 0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Signals and accessors
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_added_handler_observes_updated_map() {
    let (registry, _store) = make_world();
    let (character, _mover) = make_character(&registry, 1);

    let observed = Rc::new(Cell::new(false));
    let observed2 = Rc::clone(&observed);
    let character2 = character.clone();
    let _conn = character.on_status_added().connect(move |status| {
        observed2.set(character2.get_status(status.id()).is_some());
    });

    character.add_status(incr("a", 1, 5.0));
    assert!(observed.get());
}

#[test]
fn test_removed_fires_after_map_update() {
    let (registry, _store) = make_world();
    let (character, _mover) = make_character(&registry, 1);

    let gone = Rc::new(Cell::new(false));
    let gone2 = Rc::clone(&gone);
    let character2 = character.clone();
    let _conn = character.on_status_removed().connect(move |status| {
        gone2.set(character2.get_status(status.id()).is_none());
    });

    let status = incr("a", 1, 5.0);
    character.add_status(status.clone());
    status.destroy();
    assert!(gone.get());
}

#[test]
fn test_take_damage_fans_out() {
    let (registry, _store) = make_world();
    let (character, _mover) = make_character(&registry, 1);

    let received = Rc::new(Cell::new(0.0_f32));
    let received2 = Rc::clone(&received);
    let _conn = character
        .on_damage_taken()
        .connect(move |amount| received2.set(*amount));

    character.take_damage(12.5);
    assert_eq!(received.get(), 12.5);
}

#[test]
fn test_statuses_accessor_returns_a_copy() {
    let (registry, _store) = make_world();
    let (character, _mover) = make_character(&registry, 1);
    character.add_status(incr("a", 1, 5.0));

    let mut copy = character.statuses();
    copy.shift_remove("a");
    assert_eq!(character.status_count(), 1);
}

#[test]
fn test_registry_map_accessor_returns_a_copy() {
    let (registry, _store) = make_world();
    make_character(&registry, 1);

    let mut copy = registry.characters();
    copy.remove(&EntityId(1));
    assert_eq!(registry.count(), 1);
}

#[test]
fn test_generate_status_id_is_monotonic() {
    let (registry, _store) = make_world();
    let (character, _mover) = make_character(&registry, 1);
    let first = character.generate_status_id();
    let second = character.generate_status_id();
    assert_ne!(first, second);
}

// ─────────────────────────────────────────────────────────────────────────────
// Baseline mutation and authority-side mirroring
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_set_default_props_replaces_wholesale() {
    let (registry, store) = make_world();
    let (character, mover) = make_character(&registry, 1);

    let new_defaults = MovementProps {
        walk_speed: 10.0,
        ..MovementProps::default()
    };
    character.set_default_props(new_defaults);
    assert_eq!(character.default_props(), new_defaults);
    assert_eq!(mover.borrow().props(), new_defaults);

    // The incremental patch reached the store.
    let stored = store.get_character_data(EntityId(1)).unwrap();
    assert_eq!(*stored.defaults, new_defaults);
}

#[test]
fn test_new_baseline_feeds_active_merge() {
    let (registry, _store) = make_world();
    let (character, mover) = make_character(&registry, 1);
    character.add_status(incr("a", 1, 5.0));

    character.set_default_props(MovementProps {
        walk_speed: 20.0,
        ..MovementProps::default()
    });
    assert_eq!(mover.borrow().props().walk_speed, 25.0);
}

#[test]
fn test_snapshot_mirrors_status_set() {
    let (registry, store) = make_world();
    let (character, _mover) = make_character(&registry, 1);

    character.add_status(incr("a", 1, 5.0));
    let stored = store.get_character_data(EntityId(1)).unwrap();
    assert!(stored.statuses.contains_key("a"));

    character.get_status("a").unwrap().destroy();
    let stored = store.get_character_data(EntityId(1)).unwrap();
    assert!(stored.statuses.is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Teardown
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_destroy_is_idempotent_and_cascades() {
    let (registry, store) = make_world();
    let (character, _mover) = make_character(&registry, 1);
    let status = incr("a", 1, 5.0);
    character.add_status(status.clone());

    let fired = Rc::new(Cell::new(0));
    let fired2 = Rc::clone(&fired);
    let _conn = character
        .on_destroyed()
        .connect(move |_| fired2.set(fired2.get() + 1));

    character.destroy();
    character.destroy();

    assert_eq!(fired.get(), 1);
    assert!(character.is_destroyed());
    assert!(status.is_destroyed());
    assert_eq!(registry.count(), 0);
    assert!(store.get_character_data(EntityId(1)).is_none());
}

#[test]
fn test_class_level_destroyed_fires_after_deregistration() {
    let (registry, _store) = make_world();
    let (character, _mover) = make_character(&registry, 1);

    let seen = Rc::new(Cell::new(false));
    let seen2 = Rc::clone(&seen);
    let registry2 = registry.clone();
    let _conn = registry.on_character_destroyed().connect(move |character| {
        seen2.set(registry2.get(character.entity()).is_none());
    });

    character.destroy();
    assert!(seen.get());
}

#[test]
fn test_destroy_mid_status_destruction_is_safe() {
    let (registry, _store) = make_world();
    let (character, _mover) = make_character(&registry, 1);

    let status = incr("a", 1, 5.0);
    character.add_status(status.clone());

    // A status destruction handler that tears the whole character down.
    let character2 = character.clone();
    let _conn = status.destroyed().connect(move |_| character2.destroy());

    status.destroy();
    assert!(character.is_destroyed());
    assert_eq!(registry.count(), 0);
}

#[test]
fn test_entity_can_be_recreated_after_destroy() {
    let (registry, _store) = make_world();
    let (character, _mover) = make_character(&registry, 1);
    character.destroy();

    assert!(Character::new(&registry, EntityId(1), make_mover()).is_ok());
}
