//! The execution context: the process-local coordinator every dataset and
//! split hangs off.
//!
//! An [`ExecutionContext`] is responsible for:
//!
//! - issuing unique, monotonically increasing [`DatasetId`]s and [`SplitId`]s,
//!   safely under concurrent construction;
//! - recording which splits depend on which (the shared-reference table), so
//!   the engine can tell when a split is consumed by two or more downstream
//!   splits and is worth caching;
//! - owning the split cache and its one-shot build gates.
//!
//! Contexts are shared: every handle created against one holds an `Arc` to
//! it, so datasets and splits structurally cannot outlive their context. The
//! cache lives exactly as long as the context does.

use crate::cache::SplitCache;
use crate::config::Config;
use crate::ids::{DatasetId, SplitId};
use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Process-local coordinator for a family of datasets.
///
/// # Example
/// ```ignore
/// use ironpark::{from_vec, Config, ExecutionContext};
///
/// let ctx = ExecutionContext::with_config(Config::default().parallelism(4));
/// let data = from_vec(&ctx, vec![1u64, 2, 3, 4]);
/// assert_eq!(data.split_count(), 4);
/// ```
pub struct ExecutionContext {
    config: Config,
    next_dataset_id: AtomicU64,
    next_split_id: AtomicU64,
    /// SplitId -> the set of splits that declared it as a dependency.
    dependents: RwLock<HashMap<SplitId, HashSet<SplitId>>>,
    cache: SplitCache,
}

impl ExecutionContext {
    /// Create a context with the default [`Config`].
    #[must_use]
    pub fn new() -> Arc<Self> {
        Self::with_config(Config::default())
    }

    /// Create a context with an explicit [`Config`].
    #[must_use]
    pub fn with_config(config: Config) -> Arc<Self> {
        Arc::new(Self {
            config,
            next_dataset_id: AtomicU64::new(0),
            next_split_id: AtomicU64::new(0),
            dependents: RwLock::new(HashMap::new()),
            cache: SplitCache::default(),
        })
    }

    /// The configuration this context was created with.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The effective worker count and default split count.
    #[must_use]
    pub fn parallelism(&self) -> usize {
        self.config.parallelism_level()
    }

    /// Issue a fresh dataset id. Thread-safe; ids never repeat within a
    /// context.
    pub fn next_dataset_id(&self) -> DatasetId {
        DatasetId::new(self.next_dataset_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Issue a fresh split id. Thread-safe; ids never repeat within a
    /// context.
    pub fn next_split_id(&self) -> SplitId {
        SplitId::new(self.next_split_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Record that `child` reads from `parent`.
    ///
    /// Derived splits call this before their dataset is handed back to user
    /// code, so by the time an action runs the shared-reference table is
    /// complete for the lineage it walks.
    pub fn register_dependency(&self, parent: SplitId, child: SplitId) {
        let mut dependents = self.dependents.write().unwrap();
        dependents.entry(parent).or_default().insert(child);
    }

    /// Whether `split` is consumed by two or more distinct downstream splits
    /// and should therefore be materialised through the cache.
    #[must_use]
    pub fn should_cache(&self, split: SplitId) -> bool {
        let dependents = self.dependents.read().unwrap();
        dependents.get(&split).is_some_and(|d| d.len() >= 2)
    }

    /// Whether the cache entry for `split` is fully built.
    #[must_use]
    pub fn cached(&self, split: SplitId) -> bool {
        self.cache.is_ready(split)
    }

    /// The materialised vector for `split`, if [`cached`](Self::cached)
    /// holds.
    ///
    /// # Panics
    ///
    /// If the entry was stored with a different element type.
    #[must_use]
    pub fn get_cache<T: Send + Sync + 'static>(&self, split: SplitId) -> Option<Arc<Vec<T>>> {
        self.cache.get(split)
    }

    /// Read the cache entry for `split`, running `produce` to build it if no
    /// entry exists yet.
    ///
    /// `produce` runs at most once per split for the lifetime of the
    /// context; concurrent callers join the in-progress build and share the
    /// stored vector.
    pub fn build_or_wait<T, F>(&self, split: SplitId, produce: F) -> Arc<Vec<T>>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Vec<T>,
    {
        self.cache.read_or_build(split, produce)
    }

    /// Write one line to the configured log sink, prefixed with the debug
    /// name. Discarded when no sink is set; sink errors are ignored.
    pub(crate) fn log(&self, line: impl AsRef<str>) {
        if let Some(sink) = self.config.sink() {
            let mut sink = sink.lock().unwrap();
            let name = self.config.name();
            if name.is_empty() {
                let _ = writeln!(sink, "{}", line.as_ref());
            } else {
                let _ = writeln!(sink, "[{}] {}", name, line.as_ref());
            }
        }
    }
}
