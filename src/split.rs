//! Splits: the unit of parallel work and of caching.
//!
//! A [`Split`] is one logical partition of a dataset: a [`SplitId`], the ids
//! of the upstream splits it reads from, and a lazy element producer. The
//! producer is *restartable* -- [`Split::iter`] may be called any number of
//! times, from any thread, and (non-deterministic operators aside) yields the
//! same elements every time, because each call re-creates the iterator chain
//! from the split's state instead of consuming a one-shot stream.
//!
//! `iter()` is where caching is woven in: a split that the shared-reference
//! table marks as consumed by two or more downstream splits is materialised
//! through the context's build-or-wait gate on first demand, and every later
//! pull (including concurrent ones) reads the stored vector.

use crate::context::ExecutionContext;
use crate::dataset::Element;
use crate::ids::SplitId;
use std::sync::Arc;

/// The runtime interface between operator plumbing and element iteration.
///
/// Operators implement `Produce<T>` once per split shape; the returned
/// iterator borrows the producer, so producing twice is always possible and
/// never observes a half-consumed stream.
pub(crate) trait Produce<T>: Send + Sync {
    /// Create a fresh pass over this split's elements.
    fn produce(&self) -> Box<dyn Iterator<Item = T> + Send + '_>;
}

/// One partition of a [`Dataset`](crate::Dataset).
///
/// Cloning a split is cheap and preserves its id; clones share the producer.
pub struct Split<T> {
    id: SplitId,
    ctx: Arc<ExecutionContext>,
    deps: Vec<SplitId>,
    producer: Arc<dyn Produce<T>>,
}

impl<T> Clone for Split<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            ctx: Arc::clone(&self.ctx),
            deps: self.deps.clone(),
            producer: Arc::clone(&self.producer),
        }
    }
}

impl<T: Element> Split<T> {
    /// Construct a split over `producer`, issuing a fresh id and registering
    /// every dependency edge with the context.
    pub(crate) fn new(
        ctx: &Arc<ExecutionContext>,
        deps: Vec<SplitId>,
        producer: Arc<dyn Produce<T>>,
    ) -> Self {
        let id = ctx.next_split_id();
        for &parent in &deps {
            ctx.register_dependency(parent, id);
        }
        Self {
            id,
            ctx: Arc::clone(ctx),
            deps,
            producer,
        }
    }

    /// The unique id of this split within its context.
    #[must_use]
    pub fn id(&self) -> SplitId {
        self.id
    }

    /// The ids of the upstream splits this split reads from.
    #[must_use]
    pub fn dependencies(&self) -> &[SplitId] {
        &self.deps
    }

    /// Pull this split's elements.
    ///
    /// When the split is shared (two or more downstream consumers), the
    /// elements are served from the context's cache; the first pull builds
    /// the cache entry and concurrent pulls join that one build. Otherwise
    /// the producer is run directly.
    pub fn iter(&self) -> Box<dyn Iterator<Item = T> + Send + '_> {
        if self.ctx.should_cache(self.id) {
            let data = self
                .ctx
                .build_or_wait(self.id, || self.producer.produce().collect());
            Box::new(CacheIter { data, pos: 0 })
        } else {
            self.producer.produce()
        }
    }
}

/// Iterator over a materialised split, handing out element clones.
struct CacheIter<T> {
    data: Arc<Vec<T>>,
    pos: usize,
}

impl<T: Clone> Iterator for CacheIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let item = self.data.get(self.pos).cloned();
        self.pos += 1;
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.data.len().saturating_sub(self.pos);
        (rest, Some(rest))
    }
}
