//! Snapshot types for authority -> observer replication.
//!
//! These types define the contract pushed through the character store,
//! ensuring both sides use identical definitions for serialization.
//! A `CharacterData` is always derived from a live character on demand;
//! it has no lifecycle of its own.

use std::rc::Rc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::movement::MovementProps;

/// Serialized projection of one status effect.
///
/// `type_name` is the key observers use to look up a constructor in the
/// status registry; `payload` is effect-specific state this core treats as
/// opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusData {
    pub type_name: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl StatusData {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            payload: serde_json::Value::Null,
        }
    }
}

/// Serializable projection of a character: serialized statuses keyed by
/// effect id, plus the baseline movement properties.
///
/// `statuses` is insertion-ordered so observers merge effects in the same
/// order as the authority. `defaults` is reference-counted: within a
/// process, observers compare snapshots' defaults by pointer identity to
/// decide whether to reapply them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterData {
    pub statuses: IndexMap<String, StatusData>,
    pub defaults: Rc<MovementProps>,
}

impl CharacterData {
    pub fn new(defaults: Rc<MovementProps>) -> Self {
        Self {
            statuses: IndexMap::new(),
            defaults,
        }
    }
}

/// Incremental update to stored character data. `None` fields are left
/// untouched by the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CharacterPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statuses: Option<IndexMap<String, StatusData>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<Rc<MovementProps>>,
}

impl CharacterPatch {
    /// A patch carrying only new baseline properties.
    pub fn defaults(props: MovementProps) -> Self {
        Self {
            statuses: None,
            defaults: Some(Rc::new(props)),
        }
    }
}
