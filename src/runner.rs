//! Action runtime.
//!
//! Actions are the terminal operations that actually pull elements: one task
//! per split, partial results combined into a single value. Under the
//! default [`Policy::Threaded`] the tasks run on a rayon pool sized to the
//! context's parallelism; [`Policy::Sequential`] runs them on the caller
//! thread in split order.
//!
//! Tasks pull through [`Split::iter`], so splits shared by several
//! downstream consumers are served from the context's cache with exactly one
//! build regardless of how many tasks demand them concurrently.
//!
//! Determinism: `collect` re-assembles per-split vectors in split order
//! `0..P`, so its output is independent of task completion order. `reduce`
//! assumes an associative combiner and folds in an unspecified but valid
//! order. A panic in a user callable aborts the action: sibling tasks are
//! joined and the panic resurfaces on the caller. Failing to size the worker
//! pool is reported as a fatal error.

use crate::config::Policy;
use crate::dataset::{Dataset, Element};
use crate::split::Split;
use anyhow::{anyhow, Result};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::time::Instant;

/// Run one task per split and return the partial results in split order.
fn run_tasks<T, R, F>(ds: &Dataset<T>, action: &str, task: F) -> Result<Vec<R>>
where
    T: Element,
    R: Send,
    F: Fn(&Split<T>) -> R + Send + Sync,
{
    let ctx = ds.context();
    let workers = ctx.parallelism();
    let splits = ds.split_count();
    ctx.log(format!("{action}: {splits} tasks over {workers} workers"));
    let started = Instant::now();

    let partials = match ctx.config().scheduling_policy() {
        Policy::Sequential => ds.splits().map(|s| task(s)).collect(),
        Policy::Threaded => {
            let pool = ThreadPoolBuilder::new()
                .num_threads(workers)
                .build()
                .map_err(|e| anyhow!("failed to size worker pool to {workers}: {e}"))?;
            pool.install(|| ds.splits_slice().par_iter().map(|s| task(s)).collect())
        }
    };

    tracing::debug!(
        target: "ironpark::runner",
        action,
        dataset = ds.id().raw(),
        splits,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "action finished"
    );
    Ok(partials)
}

impl<T: Element> Dataset<T> {
    /// Materialise the dataset into a vector.
    ///
    /// Each task materialises its split; the partial vectors are
    /// concatenated in split order `0..P`, regardless of which tasks finish
    /// first.
    ///
    /// # Errors
    ///
    /// If the worker pool could not be sized.
    pub fn collect(&self) -> Result<Vec<T>> {
        let partials = run_tasks(self, "collect", |s| s.iter().collect::<Vec<T>>())?;
        Ok(partials.into_iter().flatten().collect())
    }

    /// Count the elements of the dataset.
    ///
    /// # Errors
    ///
    /// If the worker pool could not be sized.
    pub fn count(&self) -> Result<u64> {
        let partials = run_tasks(self, "count", |s| s.iter().count() as u64)?;
        Ok(partials.into_iter().sum())
    }

    /// Fold the dataset with an associative combiner.
    ///
    /// `f` must be associative; the engine chooses the fold order. Each task
    /// folds its split seeded with `T::default()`, and the partials are
    /// folded the same way, so empty splits (and an empty dataset)
    /// contribute the identity.
    ///
    /// # Example
    /// ```ignore
    /// use ironpark::{generator, ExecutionContext};
    ///
    /// let ctx = ExecutionContext::new();
    /// let sum = generator(&ctx, 1, 101, |i| i).reduce(|a, b| a + b)?;
    /// assert_eq!(sum, 5050);
    /// # anyhow::Result::<()>::Ok(())
    /// ```
    ///
    /// # Errors
    ///
    /// If the worker pool could not be sized.
    pub fn reduce<F>(&self, f: F) -> Result<T>
    where
        T: Default,
        F: Fn(T, T) -> T + Send + Sync,
    {
        let partials = run_tasks(self, "reduce", |s| {
            s.iter().fold(T::default(), |acc, x| f(acc, x))
        })?;
        Ok(partials.into_iter().fold(T::default(), |acc, x| f(acc, x)))
    }
}
