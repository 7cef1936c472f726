//! A minimal concrete status effect.
//!
//! `BasicStatus` carries a type name, an optional humanoid data record,
//! and an opaque payload. It is the shadow instance the replication bridge
//! builds on observers for effect types that need no custom local
//! behavior, and the workhorse of this crate's tests.

use std::cell::RefCell;
use std::rc::Rc;

use aegis_types::{HumanoidData, StatusData};

use super::effect::{StatusBase, StatusEffect};
use super::registry::StatusFactory;

pub struct BasicStatus {
    base: StatusBase,
    type_name: String,
    data: RefCell<Option<HumanoidData>>,
    payload: RefCell<serde_json::Value>,
}

impl BasicStatus {
    pub fn new(id: impl Into<String>, type_name: impl Into<String>) -> Rc<Self> {
        Rc::new(Self {
            base: StatusBase::new(id),
            type_name: type_name.into(),
            data: RefCell::new(None),
            payload: RefCell::new(serde_json::Value::Null),
        })
    }

    pub fn with_humanoid_data(
        id: impl Into<String>,
        type_name: impl Into<String>,
        data: HumanoidData,
    ) -> Rc<Self> {
        let status = Self::new(id, type_name);
        *status.data.borrow_mut() = Some(data);
        status
    }

    /// Replace the humanoid data and raise the change notification.
    pub fn set_humanoid_data(&self, data: Option<HumanoidData>) {
        *self.data.borrow_mut() = data;
        self.base.notify_changed();
    }

    /// Replace the opaque payload and raise the change notification.
    pub fn set_payload(&self, payload: serde_json::Value) {
        *self.payload.borrow_mut() = payload;
        self.base.notify_changed();
    }

    /// Factory for observer-side reconstruction under `type_name`.
    pub fn factory(type_name: impl Into<String>) -> StatusFactory {
        let type_name = type_name.into();
        Rc::new(
            move |_character: &crate::character::Character, id: &str| -> Rc<dyn StatusEffect> {
                BasicStatus::new(id, type_name.clone())
            },
        )
    }
}

impl StatusEffect for BasicStatus {
    fn id(&self) -> &str {
        self.base.id()
    }

    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn humanoid_data(&self) -> Option<HumanoidData> {
        self.data.borrow().clone()
    }

    fn serialize_data(&self) -> StatusData {
        StatusData {
            type_name: self.type_name.clone(),
            payload: self.payload.borrow().clone(),
        }
    }

    fn changed(&self) -> &crate::events::Signal<()> {
        self.base.changed()
    }

    fn destroyed(&self) -> &crate::events::Signal<()> {
        self.base.destroyed()
    }

    fn destroy(&self) {
        self.base.destroy();
    }

    fn is_destroyed(&self) -> bool {
        self.base.is_destroyed()
    }
}
