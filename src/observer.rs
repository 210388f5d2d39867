use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::{ChangeEvent, StorageUpdate};

/// Receives the change batches produced by a [`crate::Storage`].
///
/// A UI binding translates each update into its native animation calls. Events arrive in the
/// order the storage emitted them and should be applied in that order.
pub trait ChangeObserver {
    fn storage_did_update(&mut self, update: &StorageUpdate);
}

impl<F: FnMut(&StorageUpdate)> ChangeObserver for F {
    fn storage_did_update(&mut self, update: &StorageUpdate) {
        self(update)
    }
}

/// A shared, recording observer.
///
/// Clones share the same log, so one handle can be installed on a storage while another is
/// inspected by the binding (or a test).
#[derive(Clone, Debug, Default)]
pub struct UpdateLog {
    updates: Rc<RefCell<Vec<StorageUpdate>>>,
}

impl UpdateLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of updates received.
    pub fn len(&self) -> usize {
        self.updates.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.borrow().is_empty()
    }

    pub fn updates(&self) -> Vec<StorageUpdate> {
        self.updates.borrow().clone()
    }

    pub fn last(&self) -> Option<StorageUpdate> {
        self.updates.borrow().last().cloned()
    }

    /// All received changes, flattened in delivery order.
    pub fn changes(&self) -> Vec<ChangeEvent> {
        self.updates
            .borrow()
            .iter()
            .flat_map(|u| u.iter().cloned())
            .collect()
    }

    /// Drains the log.
    pub fn take(&self) -> Vec<StorageUpdate> {
        core::mem::take(&mut *self.updates.borrow_mut())
    }

    pub fn clear(&self) {
        self.updates.borrow_mut().clear();
    }
}

impl ChangeObserver for UpdateLog {
    fn storage_did_update(&mut self, update: &StorageUpdate) {
        self.updates.borrow_mut().push(update.clone());
    }
}
