//! Server-side session storage.
//!
//! Sessions live in-process, keyed by the opaque id the client carries in its
//! cookie. Each entry sits behind its own async mutex so two requests for the
//! same session are serialized (no lost-update race on the window) while
//! different sessions proceed concurrently. The map lock is synchronous and
//! is never held across an await.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use uuid::Uuid;

use maum_core::history::HistoryWindow;

/// Mutable per-session state. Grows by one field per concern; today the
/// transcript window is the whole of it.
#[derive(Debug, Default)]
pub struct SessionEntry {
    pub window: HistoryWindow,
}

struct Slot {
    entry: Arc<tokio::sync::Mutex<SessionEntry>>,
    created_at: Instant,
    last_seen: Instant,
}

impl Slot {
    fn fresh() -> Self {
        let now = Instant::now();
        Slot {
            entry: Arc::new(tokio::sync::Mutex::new(SessionEntry::default())),
            created_at: now,
            last_seen: now,
        }
    }

    fn is_live(&self, ttl: Duration) -> bool {
        self.last_seen.elapsed() <= ttl
    }
}

/// In-process session map with TTL eviction.
pub struct SessionStore {
    slots: Mutex<HashMap<Uuid, Slot>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        SessionStore {
            slots: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up the entry for `id`, creating a fresh one when the id is
    /// unknown or its entry has expired but not yet been swept. Refreshes
    /// the liveness stamp.
    pub fn resolve_or_create(&self, id: Uuid) -> Arc<tokio::sync::Mutex<SessionEntry>> {
        let mut slots = self.slots.lock();
        match slots.get_mut(&id) {
            Some(slot) if slot.is_live(self.ttl) => {
                slot.last_seen = Instant::now();
                Arc::clone(&slot.entry)
            }
            _ => {
                let slot = Slot::fresh();
                let entry = Arc::clone(&slot.entry);
                slots.insert(id, slot);
                entry
            }
        }
    }

    /// Drop the session, if present. In-flight requests holding the entry
    /// Arc finish against the detached entry; the id simply no longer maps
    /// to it.
    pub fn remove(&self, id: Uuid) -> bool {
        self.slots.lock().remove(&id).is_some()
    }

    /// Drop every expired entry. Returns how many were evicted.
    pub fn sweep_expired(&self) -> usize {
        let mut slots = self.slots.lock();
        let before = slots.len();
        slots.retain(|id, slot| {
            let live = slot.is_live(self.ttl);
            if !live {
                tracing::debug!(
                    session_id = %id,
                    age_secs = slot.created_at.elapsed().as_secs(),
                    "session expired"
                );
            }
            live
        });
        before - slots.len()
    }

    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }
}

/// Spawn the periodic eviction task. Detached; runs for the life of the
/// process.
pub fn spawn_sweeper(store: Arc<SessionStore>) {
    let interval = store.ttl().min(Duration::from_secs(60));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            if store.is_empty() {
                continue;
            }
            let evicted = store.sweep_expired();
            if evicted > 0 {
                tracing::debug!(evicted, "swept expired sessions");
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONG_TTL: Duration = Duration::from_secs(60);
    const SHORT_TTL: Duration = Duration::from_millis(50);

    #[test]
    fn same_id_resolves_to_same_entry() {
        let store = SessionStore::new(LONG_TTL);
        let id = Uuid::now_v7();

        let first = store.resolve_or_create(id);
        let second = store.resolve_or_create(id);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn distinct_ids_get_distinct_entries() {
        let store = SessionStore::new(LONG_TTL);
        let first = store.resolve_or_create(Uuid::now_v7());
        let second = store.resolve_or_create(Uuid::now_v7());

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn remove_forgets_session_state() {
        let store = SessionStore::new(LONG_TTL);
        let id = Uuid::now_v7();

        let entry = store.resolve_or_create(id);
        entry
            .try_lock()
            .expect("uncontended lock")
            .window
            .ensure_greeting("인사말");

        assert!(store.remove(id));
        assert!(!store.remove(id));

        let fresh = store.resolve_or_create(id);
        assert!(fresh.try_lock().expect("uncontended lock").window.is_empty());
    }

    #[test]
    fn expired_entry_is_replaced_on_access() {
        let store = SessionStore::new(SHORT_TTL);
        let id = Uuid::now_v7();

        let stale = store.resolve_or_create(id);
        stale
            .try_lock()
            .expect("uncontended lock")
            .window
            .ensure_greeting("인사말");

        std::thread::sleep(SHORT_TTL * 2);

        let replacement = store.resolve_or_create(id);
        assert!(!Arc::ptr_eq(&stale, &replacement));
        assert!(
            replacement
                .try_lock()
                .expect("uncontended lock")
                .window
                .is_empty()
        );
    }

    #[test]
    fn sweep_evicts_only_stale_entries() {
        let store = SessionStore::new(SHORT_TTL);
        let stale_id = Uuid::now_v7();
        let live_id = Uuid::now_v7();
        store.resolve_or_create(stale_id);
        store.resolve_or_create(live_id);

        std::thread::sleep(SHORT_TTL * 2);
        // Touch one session; its stamp refreshes, the other stays stale.
        store.resolve_or_create(live_id);

        assert_eq!(store.sweep_expired(), 1);
        assert_eq!(store.len(), 1);

        // The surviving entry must be the refreshed one.
        let entry = store.resolve_or_create(live_id);
        store.remove(live_id);
        assert_eq!(store.len(), 0);
        drop(entry);
    }

    #[test]
    fn sweep_on_empty_store_is_a_no_op() {
        let store = SessionStore::new(SHORT_TTL);
        assert_eq!(store.sweep_expired(), 0);
        assert!(store.is_empty());
    }
}
