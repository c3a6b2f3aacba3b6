use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tracing::warn;

pub type ProgressListener = Arc<dyn Fn(&str) + Send + Sync>;

#[derive(Default)]
struct ListenerRegistry {
    next_id: AtomicU64,
    entries: Mutex<Vec<(u64, ProgressListener)>>,
}

impl ListenerRegistry {
    fn entries(&self) -> MutexGuard<'_, Vec<(u64, ProgressListener)>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Listeners told about new progress, owned by one progress store and
/// dropped with it.
#[derive(Default)]
pub struct ProgressListeners {
    registry: Arc<ListenerRegistry>,
}

impl ProgressListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, listener: F) -> ProgressSubscription
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        let listener: ProgressListener = Arc::new(listener);
        self.registry.entries().push((id, listener));
        ProgressSubscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Calls every listener in registration order. A panicking listener is
    /// logged and skipped; returns how many listeners failed.
    pub fn emit(&self, device_id: &str) -> usize {
        let snapshot: Vec<(u64, ProgressListener)> = self.registry.entries().clone();
        let mut failures = 0;
        for (id, listener) in snapshot {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| listener(device_id)));
            if outcome.is_err() {
                failures += 1;
                warn!(target: "app::progress", listener_id = id, %device_id, "progress listener panicked");
            }
        }
        failures
    }

    pub fn len(&self) -> usize {
        self.registry.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle returned by [`ProgressListeners::subscribe`]. Dropping it leaves
/// the listener registered; call [`ProgressSubscription::unsubscribe`].
#[derive(Debug, Clone)]
pub struct ProgressSubscription {
    id: u64,
    registry: Weak<ListenerRegistry>,
}

impl ProgressSubscription {
    /// Returns `false` when the listener was already removed or the store
    /// is gone.
    pub fn unsubscribe(&self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        let mut entries = registry.entries();
        let before = entries.len();
        entries.retain(|(id, _)| *id != self.id);
        entries.len() != before
    }
}
