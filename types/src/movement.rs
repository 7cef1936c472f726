//! Movement properties and per-effect override records.
//!
//! A character exposes exactly four mutable movement properties. Status
//! effects contribute partial overrides (`HumanoidData`) that the aggregator
//! merges by priority; the merged result is what gets written to the
//! entity's movement sub-object.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The four movement properties managed by this core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Prop {
    WalkSpeed,
    JumpPower,
    AutoRotate,
    JumpHeight,
}

impl Prop {
    /// All properties, in canonical order.
    pub const ALL: [Prop; 4] = [
        Prop::WalkSpeed,
        Prop::JumpPower,
        Prop::AutoRotate,
        Prop::JumpHeight,
    ];
}

/// A single property value. Numeric properties accumulate under
/// `Increment` merges; flags replace by priority.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PropValue {
    Num(f32),
    Flag(bool),
}

/// How an effect's overrides combine with the running property set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MergeMode {
    /// Numeric overrides add to the running total; flag overrides replace
    /// by per-property priority. Only considered before any `Set` applies.
    Increment,
    /// Replaces every present override unconditionally, if this effect's
    /// priority beats the highest `Set` priority applied so far.
    Set,
}

/// An effect's declared movement contribution: a partial override record
/// tagged with a merge mode and a priority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HumanoidData {
    pub props: HashMap<Prop, PropValue>,
    pub mode: MergeMode,
    pub priority: i32,
}

impl HumanoidData {
    pub fn new(mode: MergeMode, priority: i32) -> Self {
        Self {
            props: HashMap::new(),
            mode,
            priority,
        }
    }

    /// Builder-style helper for adding one override.
    pub fn with(mut self, prop: Prop, value: PropValue) -> Self {
        self.props.insert(prop, value);
        self
    }
}

/// The baseline movement property set for one character.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementProps {
    pub walk_speed: f32,
    pub jump_power: f32,
    pub auto_rotate: bool,
    pub jump_height: f32,
}

impl Default for MovementProps {
    fn default() -> Self {
        Self {
            walk_speed: 16.0,
            jump_power: 50.0,
            auto_rotate: true,
            jump_height: 7.2,
        }
    }
}

impl MovementProps {
    /// Read one property as a `PropValue`.
    pub fn get(&self, prop: Prop) -> PropValue {
        match prop {
            Prop::WalkSpeed => PropValue::Num(self.walk_speed),
            Prop::JumpPower => PropValue::Num(self.jump_power),
            Prop::AutoRotate => PropValue::Flag(self.auto_rotate),
            Prop::JumpHeight => PropValue::Num(self.jump_height),
        }
    }

    /// Write one property. A value of the wrong kind for the property
    /// (e.g. a flag for `WalkSpeed`) is ignored.
    pub fn set(&mut self, prop: Prop, value: PropValue) {
        match (prop, value) {
            (Prop::WalkSpeed, PropValue::Num(n)) => self.walk_speed = n,
            (Prop::JumpPower, PropValue::Num(n)) => self.jump_power = n,
            (Prop::AutoRotate, PropValue::Flag(b)) => self.auto_rotate = b,
            (Prop::JumpHeight, PropValue::Num(n)) => self.jump_height = n,
            _ => {}
        }
    }
}
