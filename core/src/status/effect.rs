//! The status-effect interface and shared lifecycle plumbing.

use std::cell::Cell;

use aegis_types::{HumanoidData, StatusData};

use crate::events::Signal;

/// A polymorphic status effect owned by exactly one character for its
/// lifetime.
///
/// Concrete implementations (damage-over-time, sprints, stuns, visual
/// auras) live outside this core; the aggregator only needs identity, the
/// optional movement contribution, and the two lifecycle signals.
pub trait StatusEffect {
    /// Unique id, scoped per character. Ids are assigned by the authority
    /// and preserved verbatim on observers.
    fn id(&self) -> &str;

    /// Registry key used to reconstruct this effect on observers.
    fn type_name(&self) -> &str;

    /// The effect's declared movement contribution, if any. Effects
    /// without humanoid data are ignored by property recomputation.
    fn humanoid_data(&self) -> Option<HumanoidData>;

    /// Serializable projection of this effect for snapshots.
    fn serialize_data(&self) -> StatusData;

    /// Fired whenever the effect's humanoid data (or other replicated
    /// state) changes.
    fn changed(&self) -> &Signal<()>;

    /// Fired exactly once, on destruction.
    fn destroyed(&self) -> &Signal<()>;

    /// Destroy the effect. Must be a no-op after the first call.
    fn destroy(&self);

    fn is_destroyed(&self) -> bool;
}

/// Common state every concrete effect embeds: the id and the two lifecycle
/// signals, with single-fire destruction semantics.
pub struct StatusBase {
    id: String,
    changed: Signal<()>,
    destroyed_signal: Signal<()>,
    destroyed: Cell<bool>,
}

impl StatusBase {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            changed: Signal::new(),
            destroyed_signal: Signal::new(),
            destroyed: Cell::new(false),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn changed(&self) -> &Signal<()> {
        &self.changed
    }

    pub fn destroyed(&self) -> &Signal<()> {
        &self.destroyed_signal
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }

    /// Raise the change notification.
    pub fn notify_changed(&self) {
        if !self.destroyed.get() {
            self.changed.fire(&());
        }
    }

    /// Fire the destroyed signal. Single-fire: every call after the first
    /// is a no-op, so attach/detach handlers run exactly once per effect.
    pub fn destroy(&self) {
        if !self.destroyed.replace(true) {
            self.destroyed_signal.fire(&());
        }
    }
}
