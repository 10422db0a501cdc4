//! Small subscription helper used by the polling service.
//!
//! Single-threaded (GLib main loop); callbacks are plain `Fn(&T)` closures.
//! Registration hands back an id so a subscriber can detach on drop.

use std::cell::RefCell;
use std::rc::Rc;

/// Identifies one registered callback for later removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallbackId(u64);

/// A list of subscriber callbacks invoked with a shared value.
pub struct Callbacks<T> {
    entries: RefCell<Vec<(CallbackId, Rc<dyn Fn(&T)>)>>,
    next_id: RefCell<u64>,
}

impl<T> Callbacks<T> {
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
            next_id: RefCell::new(0),
        }
    }

    /// Register a callback and return its id.
    pub fn register<F>(&self, callback: F) -> CallbackId
    where
        F: Fn(&T) + 'static,
    {
        let mut next = self.next_id.borrow_mut();
        let id = CallbackId(*next);
        *next += 1;

        self.entries.borrow_mut().push((id, Rc::new(callback)));
        id
    }

    /// Remove a previously registered callback.
    pub fn remove(&self, id: CallbackId) {
        self.entries.borrow_mut().retain(|(cid, _)| *cid != id);
    }

    /// Invoke every registered callback with `value`.
    ///
    /// The list is snapshotted first so a callback may register or remove
    /// entries without poisoning the borrow.
    pub fn notify(&self, value: &T) {
        let snapshot: Vec<Rc<dyn Fn(&T)>> = self
            .entries
            .borrow()
            .iter()
            .map(|(_, cb)| cb.clone())
            .collect();

        for callback in snapshot {
            callback(value);
        }
    }

    /// Number of registered callbacks.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl<T> Default for Callbacks<T> {
    fn default() -> Self {
        Self::new()
    }
}
