//! Split materialisation cache.
//!
//! Splits consumed by two or more downstream splits are materialised once and
//! served from here on every subsequent pull. Each entry carries a one-shot
//! gate so that however many tasks demand the same split concurrently,
//! exactly one of them runs the producer; the rest block until the vector is
//! stored.
//!
//! Entries are type-erased (`Arc<dyn Any>`): the cache does not know element
//! types, callers downcast on retrieval. A mismatched downcast is a
//! programmer error and aborts the action, the same way a bad partition
//! downcast does in the operator layer.
//!
//! Entry life cycle: **Absent -> Building -> Ready**. There is no transition
//! back. If the producer panics while building, the entry moves to a terminal
//! `Failed` state instead of `Ready`; the builder's panic propagates and
//! every waiter observes the same failure.

use crate::ids::SplitId;
use std::any::Any;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex};

/// A materialised split, stored without its element type.
type Payload = Arc<dyn Any + Send + Sync>;

enum GateState {
    /// The gate is installed and one caller is running the producer.
    Building,
    /// The vector is stored; readers may iterate it directly.
    Ready(Payload),
    /// The producer panicked; the message is replayed to every waiter.
    Failed(String),
}

struct CacheEntry {
    state: Mutex<GateState>,
    done: Condvar,
}

impl CacheEntry {
    fn new() -> Self {
        Self {
            state: Mutex::new(GateState::Building),
            done: Condvar::new(),
        }
    }
}

/// Fingerprint-keyed cache of materialised splits with per-entry gates.
#[derive(Default)]
pub(crate) struct SplitCache {
    entries: Mutex<HashMap<SplitId, Arc<CacheEntry>>>,
}

impl SplitCache {
    /// Whether the entry for `id` exists and is fully built.
    pub(crate) fn is_ready(&self, id: SplitId) -> bool {
        let entries = self.entries.lock().unwrap();
        match entries.get(&id) {
            Some(entry) => matches!(*entry.state.lock().unwrap(), GateState::Ready(_)),
            None => false,
        }
    }

    /// The materialised vector for `id`, if it is fully built.
    ///
    /// # Panics
    ///
    /// If the entry exists but was stored with a different element type.
    pub(crate) fn get<T: Send + Sync + 'static>(&self, id: SplitId) -> Option<Arc<Vec<T>>> {
        let entry = self.entries.lock().unwrap().get(&id).cloned()?;
        let state = entry.state.lock().unwrap();
        match &*state {
            GateState::Ready(payload) => Some(downcast_payload(Arc::clone(payload), id)),
            _ => None,
        }
    }

    /// Read the cached vector for `id`, building it with `produce` if no one
    /// has yet.
    ///
    /// At most one caller ever runs `produce` for a given `id`; concurrent
    /// callers block on the entry's gate and share the stored vector. If the
    /// building caller panics, the panic resumes on that caller and every
    /// waiter panics with the same message.
    pub(crate) fn read_or_build<T, F>(&self, id: SplitId, produce: F) -> Arc<Vec<T>>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Vec<T>,
    {
        let (entry, is_builder) = {
            let mut entries = self.entries.lock().unwrap();
            match entries.entry(id) {
                Entry::Occupied(e) => (Arc::clone(e.get()), false),
                Entry::Vacant(v) => {
                    let entry = Arc::new(CacheEntry::new());
                    v.insert(Arc::clone(&entry));
                    (entry, true)
                }
            }
        };

        if is_builder {
            tracing::debug!(target: "ironpark::cache", split = id.raw(), "building split cache entry");
            match panic::catch_unwind(AssertUnwindSafe(produce)) {
                Ok(data) => {
                    let payload: Payload = Arc::new(data);
                    let result = downcast_payload(Arc::clone(&payload), id);
                    *entry.state.lock().unwrap() = GateState::Ready(payload);
                    entry.done.notify_all();
                    result
                }
                Err(cause) => {
                    *entry.state.lock().unwrap() = GateState::Failed(panic_message(&*cause));
                    entry.done.notify_all();
                    panic::resume_unwind(cause)
                }
            }
        } else {
            let mut state = entry.state.lock().unwrap();
            while matches!(*state, GateState::Building) {
                state = entry.done.wait(state).unwrap();
            }
            match &*state {
                GateState::Ready(payload) => downcast_payload(Arc::clone(payload), id),
                GateState::Failed(msg) => {
                    panic!("cache build for split {id:?} failed in another task: {msg}")
                }
                GateState::Building => unreachable!("gate resolved while still building"),
            }
        }
    }
}

fn downcast_payload<T: Send + Sync + 'static>(payload: Payload, id: SplitId) -> Arc<Vec<T>> {
    match payload.downcast::<Vec<T>>() {
        Ok(data) => data,
        Err(_) => panic!("cache element type mismatch for split {id:?}"),
    }
}

fn panic_message(cause: &(dyn Any + Send)) -> String {
    if let Some(s) = cause.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = cause.downcast_ref::<String>() {
        s.clone()
    } else {
        "split producer panicked".to_string()
    }
}
