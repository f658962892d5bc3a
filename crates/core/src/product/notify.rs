//! Change notifications fanned out to product listeners.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::models::Coords;

/// Snapshot of a product emitted after every mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeNotification {
    /// Name of the mutated product.
    pub entity_name: String,
    /// Year the snapshot describes.
    pub year: usize,
    /// `(performance, size)` at `year`.
    pub coords: Coords,
    /// Product age at `year`.
    pub age: f64,
    /// True for a bulk year advance across all products, false for a single edit.
    ///
    /// Views can defer their redraw until the whole advance is done when set.
    pub is_time_change: bool,
}

/// Handle returned by `subscribe`, used to detach the listener again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);

/// Callback invoked synchronously for every notification.
pub type Listener = Box<dyn FnMut(&ChangeNotification) + Send>;

/// Ordered set of listeners owned by a single product.
#[derive(Default)]
pub(crate) struct Listeners {
    next_id: u64,
    entries: Vec<(SubscriptionId, Listener)>,
}

impl Listeners {
    pub(crate) fn add(&mut self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn publish(&mut self, notification: &ChangeNotification) {
        for (_, listener) in self.entries.iter_mut() {
            listener(notification);
        }
    }
}

/// Cloneable recorder that keeps every notification it receives.
///
/// Useful both for tests and for views that batch their redraws.
#[derive(Debug, Clone, Default)]
pub struct NotificationLog {
    inner: Arc<Mutex<Vec<ChangeNotification>>>,
}

impl NotificationLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// A listener appending into this log.
    pub fn listener(&self) -> Listener {
        let inner = Arc::clone(&self.inner);
        Box::new(move |notification: &ChangeNotification| inner.lock().push(notification.clone()))
    }

    /// Copy of everything recorded so far.
    pub fn snapshot(&self) -> Vec<ChangeNotification> {
        self.inner.lock().clone()
    }

    /// Remove and return everything recorded so far.
    pub fn drain(&self) -> Vec<ChangeNotification> {
        std::mem::take(&mut *self.inner.lock())
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}
