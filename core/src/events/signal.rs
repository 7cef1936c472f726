//! Synchronous observer-list signals.
//!
//! All notification fan-out in this core goes through `Signal<T>`: an
//! explicit observer list with synchronous, same-thread delivery. Handlers
//! run inside the call stack that fired the signal, so state mutated before
//! a `fire` is always visible to every handler, and recomputation triggered
//! by a handler completes before the triggering call returns.
//!
//! Delivery is re-entrant-safe: firing walks a clone of the handler list,
//! so handlers may connect or disconnect (including their own connection)
//! without invalidating the iteration.

use std::cell::RefCell;
use std::rc::Rc;

type Handler<T> = Rc<RefCell<dyn FnMut(&T)>>;

struct SignalInner<T> {
    next_id: u64,
    handlers: Vec<(u64, Handler<T>)>,
}

/// An observer list for one event type.
pub struct Signal<T> {
    inner: Rc<RefCell<SignalInner<T>>>,
}

impl<T: 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> Signal<T> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(SignalInner {
                next_id: 0,
                handlers: Vec::new(),
            })),
        }
    }

    /// Attach a handler. It stays connected until the returned `Connection`
    /// is dropped or explicitly disconnected.
    pub fn connect(&self, handler: impl FnMut(&T) + 'static) -> Connection {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.handlers.push((id, Rc::new(RefCell::new(handler))));

        let weak = Rc::downgrade(&self.inner);
        Connection {
            detach: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.borrow_mut().handlers.retain(|(hid, _)| *hid != id);
                }
            })),
        }
    }

    /// Deliver `value` to every currently connected handler, synchronously.
    pub fn fire(&self, value: &T) {
        // Snapshot the handler list so handlers can mutate it mid-fire.
        let handlers: Vec<Handler<T>> = self
            .inner
            .borrow()
            .handlers
            .iter()
            .map(|(_, h)| Rc::clone(h))
            .collect();

        for handler in handlers {
            (handler.borrow_mut())(value);
        }
    }

    /// Number of connected handlers.
    pub fn handler_count(&self) -> usize {
        self.inner.borrow().handlers.len()
    }
}

/// Handle to one attached handler. Dropping it detaches the handler;
/// `disconnect` is idempotent.
pub struct Connection {
    detach: Option<Box<dyn FnOnce()>>,
}

impl Connection {
    pub fn disconnect(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.disconnect();
    }
}
