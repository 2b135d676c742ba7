//! Core dataset handle and the element trait bound.
//!
//! This module defines:
//!
//! - [`Element`]: the blanket trait bound for data elements carried by
//!   datasets.
//! - [`Dataset<T>`]: the typed, logical handle of a partitioned collection.
//!
//! A `Dataset` is a *description*, not a buffer: constructing one computes
//! nothing. Transformations (in `ops/*`) plan new datasets whose splits wrap
//! the inputs' splits; actions (in `runner`) are the only operations that
//! pull elements.

use crate::context::ExecutionContext;
use crate::ids::DatasetId;
use crate::split::Split;
use std::sync::Arc;

/// The standard trait bound for elements carried by a [`Dataset`].
///
/// The runtime moves elements across threads and clones them into split
/// caches, so all element types must be:
///
/// - `'static` (no non-`'static` borrows inside elements),
/// - `Send + Sync` (safe to pass/share across worker threads),
/// - `Clone` (cached splits hand out copies; several operators duplicate
///   values).
///
/// This blanket impl allows any type fitting these constraints to be used.
pub trait Element: 'static + Send + Sync + Clone {}
impl<T> Element for T where T: 'static + Send + Sync + Clone {}

/// A typed handle to a partitioned, lazily produced collection.
///
/// A `Dataset<T>` carries a [`DatasetId`], a shared reference to its
/// [`ExecutionContext`], and exactly `split_count()` ordered [`Split`]s,
/// numbered `0..P`. Cloning a handle is cheap and preserves the id.
///
/// # Example
/// ```ignore
/// use ironpark::{from_vec, ExecutionContext};
///
/// let ctx = ExecutionContext::new();
/// let squares = from_vec(&ctx, vec![1i64, 2, 3]).map(|x| x * x);
/// assert_eq!(squares.collect()?, vec![1, 4, 9]);
/// # anyhow::Result::<()>::Ok(())
/// ```
#[derive(Clone)]
pub struct Dataset<T> {
    id: DatasetId,
    ctx: Arc<ExecutionContext>,
    splits: Vec<Split<T>>,
}

impl<T: Element> Dataset<T> {
    /// Assemble a dataset from already-constructed splits, issuing a fresh
    /// dataset id.
    pub(crate) fn from_splits(ctx: &Arc<ExecutionContext>, splits: Vec<Split<T>>) -> Self {
        Self {
            id: ctx.next_dataset_id(),
            ctx: Arc::clone(ctx),
            splits,
        }
    }

    /// The unique id of this dataset within its context.
    #[must_use]
    pub fn id(&self) -> DatasetId {
        self.id
    }

    /// The context this dataset belongs to.
    #[must_use]
    pub fn context(&self) -> &Arc<ExecutionContext> {
        &self.ctx
    }

    /// The number of splits (the planned partition count P).
    #[must_use]
    pub fn split_count(&self) -> usize {
        self.splits.len()
    }

    /// The `i`-th split.
    ///
    /// # Panics
    ///
    /// If `i >= split_count()`.
    #[must_use]
    pub fn split(&self, i: usize) -> &Split<T> {
        assert!(
            i < self.splits.len(),
            "split index {i} out of range for dataset with {} splits",
            self.splits.len()
        );
        &self.splits[i]
    }

    /// Iterate the splits in order `0..P`.
    pub fn splits(&self) -> impl Iterator<Item = &Split<T>> {
        self.splits.iter()
    }

    pub(crate) fn splits_slice(&self) -> &[Split<T>] {
        &self.splits
    }
}
