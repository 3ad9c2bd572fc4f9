//! Update subscriber registry
//!
//! Holds weak references only; a subscriber lives as long as its owner keeps
//! the `Arc`. Dispatch copies the live set out under the lock and invokes it
//! with the lock released, so callbacks may register or unregister freely.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Callback invoked after every status update
///
/// Carries no payload; read the new snapshot from the session.
pub type UpdateCallback = dyn Fn() + Send + Sync;

/// Handle returned by registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
pub struct Subscribers {
    entries: Mutex<Vec<(SubscriptionId, Weak<UpdateCallback>)>>,
    next_id: AtomicU64,
}

impl Subscribers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, callback: &Arc<UpdateCallback>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries().push((id, Arc::downgrade(callback)));
        id
    }

    /// Returns `false` if `id` was not registered
    pub fn unregister(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|(entry, _)| *entry != id);
        entries.len() != before
    }

    /// Invoke every live subscriber in registration order
    ///
    /// Returns how many were invoked.
    pub fn dispatch(&self) -> usize {
        let live: Vec<Arc<UpdateCallback>> = {
            let mut entries = self.entries();
            entries.retain(|(_, callback)| callback.strong_count() > 0);
            entries
                .iter()
                .filter_map(|(_, callback)| callback.upgrade())
                .collect()
        };

        for callback in &live {
            callback();
        }
        live.len()
    }

    /// Registered entries, including any not yet pruned
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entries(&self) -> MutexGuard<'_, Vec<(SubscriptionId, Weak<UpdateCallback>)>> {
        // A panicking subscriber never holds this lock
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
