//! Key-value operators: `partition_by` and `group_by_key`.
//!
//! Both are defined on datasets of pairs `(K, V)` where the key is hashable
//! and equality-comparable.
//!
//! `partition_by` performs the engine's only shuffle. Rather than giving each
//! of the P output splits its own filtered pass over the whole input (which
//! would read every source element P times), the shuffle streams the input
//! once, bucket-appending into P buffers behind a shared once-gate; each
//! output split then serves its bucket. Relative order within a partition is
//! preserved.
//!
//! `group_by_key` groups *within* each split. It therefore requires input
//! that is already partitioned by key (each key present in exactly one
//! split) -- compose it with `partition_by` when that does not already hold.

use crate::dataset::{Dataset, Element};
use crate::ids::SplitId;
use crate::split::{Produce, Split};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

type Partitioner<K> = Arc<dyn Fn(&K) -> u64 + Send + Sync>;

/// Producer for one output split of a shuffle.
///
/// All P producers of a `partition_by` dataset share `buckets`; whichever
/// split is pulled first pays for the single streaming pass, the rest (and
/// every re-pull) read their bucket directly.
struct ShuffleOp<K, V> {
    inputs: Vec<Split<(K, V)>>,
    buckets: Arc<OnceLock<Vec<Vec<(K, V)>>>>,
    index: usize,
    parts: usize,
    partitioner: Partitioner<K>,
}

impl<K, V> Produce<(K, V)> for ShuffleOp<K, V>
where
    K: Element + Eq + Hash,
    V: Element,
{
    fn produce(&self) -> Box<dyn Iterator<Item = (K, V)> + Send + '_> {
        let buckets = self.buckets.get_or_init(|| {
            let partitioner = &*self.partitioner;
            let mut buckets: Vec<Vec<(K, V)>> = (0..self.parts).map(|_| Vec::new()).collect();
            for split in &self.inputs {
                for (k, v) in split.iter() {
                    let slot = (partitioner(&k) as usize) % self.parts;
                    buckets[slot].push((k, v));
                }
            }
            buckets
        });
        Box::new(buckets[self.index].iter().cloned())
    }
}

/// Producer for one output split of `group_by_key`.
///
/// The grouped map is built once per split behind a once-gate; concurrent
/// pulls share the build, later pulls iterate the materialised groups.
struct GroupByKeyOp<K, V> {
    input: Split<(K, V)>,
    groups: OnceLock<Vec<(K, Vec<V>)>>,
}

impl<K, V> Produce<(K, Vec<V>)> for GroupByKeyOp<K, V>
where
    K: Element + Eq + Hash,
    V: Element,
{
    fn produce(&self) -> Box<dyn Iterator<Item = (K, Vec<V>)> + Send + '_> {
        let groups = self.groups.get_or_init(|| {
            let mut order: Vec<(K, Vec<V>)> = Vec::new();
            let mut index: HashMap<K, usize> = HashMap::new();
            for (k, v) in self.input.iter() {
                if let Some(&at) = index.get(&k) {
                    order[at].1.push(v);
                } else {
                    index.insert(k.clone(), order.len());
                    order.push((k, vec![v]));
                }
            }
            order
        });
        Box::new(groups.iter().cloned())
    }
}

/// Hash a key with the standard library's default hasher.
fn default_partitioner<K: Hash>(key: &K) -> u64 {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    hasher.finish()
}

impl<T: Element> Dataset<T> {
    /// Derive a key for each element, producing `(K, T)` pairs.
    ///
    /// A convenience in front of the key-value operators:
    ///
    /// ```ignore
    /// use ironpark::{from_vec, ExecutionContext};
    ///
    /// let ctx = ExecutionContext::new();
    /// let words = from_vec(&ctx, vec!["a".to_string(), "bb".to_string()]);
    /// let by_len = words.key_by(|w| w.len() as u64).partition_by().group_by_key();
    /// # let _ = by_len;
    /// ```
    pub fn key_by<K, F>(&self, key_fn: F) -> Dataset<(K, T)>
    where
        K: Element + Eq + Hash,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        self.map(move |t| (key_fn(t), t.clone()))
    }
}

impl<K, V> Dataset<(K, V)>
where
    K: Element + Eq + Hash,
    V: Element,
{
    /// Re-partition by key with the default hasher.
    ///
    /// Equivalent to [`partition_by_with`](Self::partition_by_with) using the
    /// standard library's default hash.
    #[must_use]
    pub fn partition_by(&self) -> Dataset<(K, V)> {
        self.partition_by_with(default_partitioner)
    }

    /// Re-partition by key: element `(k, v)` lands in split
    /// `partitioner(k) mod P`, where P is the context's configured
    /// parallelism.
    ///
    /// Relative order is preserved within each output partition. Every
    /// output split depends on every input split, so on multi-consumer
    /// lineages the inputs are served through the cache.
    #[must_use]
    pub fn partition_by_with<H>(&self, partitioner: H) -> Dataset<(K, V)>
    where
        H: Fn(&K) -> u64 + Send + Sync + 'static,
    {
        let parts = self.context().parallelism();
        let partitioner: Partitioner<K> = Arc::new(partitioner);
        let buckets = Arc::new(OnceLock::new());
        let dep_ids: Vec<SplitId> = self.splits().map(Split::id).collect();
        let splits = (0..parts)
            .map(|i| {
                let op = ShuffleOp {
                    inputs: self.splits_slice().to_vec(),
                    buckets: Arc::clone(&buckets),
                    index: i,
                    parts,
                    partitioner: Arc::clone(&partitioner),
                };
                Split::new(self.context(), dep_ids.clone(), Arc::new(op))
            })
            .collect();
        Dataset::from_splits(self.context(), splits)
    }

    /// Group values by key within each split: `(K, V) -> (K, Vec<V>)`.
    ///
    /// Split `i` of the result yields one pair per distinct key in input
    /// split `i`, keys in first-seen order and values in insertion order.
    ///
    /// The input must already be partitioned by key (each key present in
    /// exactly one split), e.g. by [`partition_by`](Self::partition_by);
    /// grouping an unpartitioned dataset yields per-split partial groups.
    #[must_use]
    pub fn group_by_key(&self) -> Dataset<(K, Vec<V>)> {
        let splits = self
            .splits()
            .map(|s| {
                let op = GroupByKeyOp {
                    input: s.clone(),
                    groups: OnceLock::new(),
                };
                Split::new(self.context(), vec![s.id()], Arc::new(op))
            })
            .collect();
        Dataset::from_splits(self.context(), splits)
    }
}
