//! Multi-input operators: `union`, `zip`, and `merge`.
//!
//! These are the only operators whose split count differs from their
//! (first) input's: `union` yields P1 + P2 splits, `zip` requires both
//! inputs to share one split count and keeps it, `merge` collapses
//! everything into a single split.

use crate::dataset::{Dataset, Element};
use crate::split::{Produce, Split};
use std::sync::Arc;

/// Pass-through producer wrapping one upstream split. Used by `union`, where
/// the output split's only job is to carry its own id and dependency edge.
struct PassOp<T> {
    input: Split<T>,
}

impl<T: Element> Produce<T> for PassOp<T> {
    fn produce(&self) -> Box<dyn Iterator<Item = T> + Send + '_> {
        self.input.iter()
    }
}

/// Producer pairing two upstream splits elementwise. Stops at the shorter
/// side.
struct ZipOp<A, B> {
    left: Split<A>,
    right: Split<B>,
}

impl<A, B> Produce<(A, B)> for ZipOp<A, B>
where
    A: Element,
    B: Element,
{
    fn produce(&self) -> Box<dyn Iterator<Item = (A, B)> + Send + '_> {
        Box::new(self.left.iter().zip(self.right.iter()))
    }
}

/// Producer concatenating all upstream splits in split order.
struct ConcatOp<T> {
    inputs: Vec<Split<T>>,
}

impl<T: Element> Produce<T> for ConcatOp<T> {
    fn produce(&self) -> Box<dyn Iterator<Item = T> + Send + '_> {
        Box::new(self.inputs.iter().flat_map(|s| s.iter()))
    }
}

impl<T: Element> Dataset<T> {
    /// Concatenate two datasets of the same element type.
    ///
    /// The result has `P1 + P2` splits: splits `0..P1` pass through `self`'s
    /// splits, splits `P1..P1+P2` pass through `other`'s. Collecting the
    /// union therefore yields `self`'s elements followed by `other`'s.
    #[must_use]
    pub fn union(&self, other: &Dataset<T>) -> Dataset<T> {
        let splits = self
            .splits()
            .chain(other.splits())
            .map(|s| {
                let op = PassOp { input: s.clone() };
                Split::new(self.context(), vec![s.id()], Arc::new(op))
            })
            .collect();
        Dataset::from_splits(self.context(), splits)
    }

    /// Pair this dataset's elements with `other`'s, split by split.
    ///
    /// Split `i` of the result pairs element `k` of `self.split(i)` with
    /// element `k` of `other.split(i)` and ends when either side is
    /// exhausted. Both parents are recorded as dependencies.
    ///
    /// # Panics
    ///
    /// If the two datasets are not partitioned into the same number of
    /// splits.
    #[must_use]
    pub fn zip<U: Element>(&self, other: &Dataset<U>) -> Dataset<(T, U)> {
        assert_eq!(
            self.split_count(),
            other.split_count(),
            "zip requires equally partitioned datasets ({} vs {} splits)",
            self.split_count(),
            other.split_count()
        );
        let splits = self
            .splits()
            .zip(other.splits())
            .map(|(l, r)| {
                let deps = vec![l.id(), r.id()];
                let op = ZipOp {
                    left: l.clone(),
                    right: r.clone(),
                };
                Split::new(self.context(), deps, Arc::new(op))
            })
            .collect();
        Dataset::from_splits(self.context(), splits)
    }

    /// Collapse the dataset into a single split that concatenates the
    /// upstream splits `0, 1, .., P-1` in order.
    ///
    /// Useful ahead of actions that want one sequential iterator.
    #[must_use]
    pub fn merge(&self) -> Dataset<T> {
        let deps = self.splits().map(Split::id).collect();
        let op = ConcatOp {
            inputs: self.splits_slice().to_vec(),
        };
        let split = Split::new(self.context(), deps, Arc::new(op));
        Dataset::from_splits(self.context(), vec![split])
    }
}
