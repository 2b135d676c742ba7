//! Source operators: the roots of every lineage graph.
//!
//! Both sources split their input contiguously into P near-equal blocks,
//! where P is the context's configured parallelism: block `i` spans
//! `[i * ceil(n / P), min(n, (i + 1) * ceil(n / P)))`. Short inputs leave the
//! trailing blocks empty; every downstream operator handles empty splits.

use crate::context::ExecutionContext;
use crate::dataset::{Dataset, Element};
use crate::split::{Produce, Split};
use std::marker::PhantomData;
use std::sync::Arc;

/// Block bounds for split `i` of `n` elements over `parts` splits.
fn block_bounds(n: usize, parts: usize, i: usize) -> (usize, usize) {
    let block = n.div_ceil(parts).max(1);
    ((i * block).min(n), ((i + 1) * block).min(n))
}

/// Producer over a contiguous slice of a shared source vector.
struct VecBlockOp<T> {
    data: Arc<Vec<T>>,
    start: usize,
    end: usize,
}

impl<T: Element> Produce<T> for VecBlockOp<T> {
    fn produce(&self) -> Box<dyn Iterator<Item = T> + Send + '_> {
        Box::new(self.data[self.start..self.end].iter().cloned())
    }
}

/// Create a dataset over `data`, partitioned into the context's configured
/// number of contiguous blocks.
///
/// The vector is stored once and shared by all splits; elements are produced
/// in their natural order within each block.
///
/// # Example
/// ```ignore
/// use ironpark::{from_vec, ExecutionContext};
///
/// let ctx = ExecutionContext::new();
/// let evens = from_vec(&ctx, (0..10).collect::<Vec<_>>())
///     .filter(|x| x % 2 == 0)
///     .collect()?;
/// assert_eq!(evens, vec![0, 2, 4, 6, 8]);
/// # anyhow::Result::<()>::Ok(())
/// ```
pub fn from_vec<T: Element>(ctx: &Arc<ExecutionContext>, data: Vec<T>) -> Dataset<T> {
    let parts = ctx.parallelism();
    let n = data.len();
    let data = Arc::new(data);
    let splits = (0..parts)
        .map(|i| {
            let (start, end) = block_bounds(n, parts, i);
            let op = VecBlockOp {
                data: Arc::clone(&data),
                start,
                end,
            };
            Split::new(ctx, Vec::new(), Arc::new(op))
        })
        .collect();
    Dataset::from_splits(ctx, splits)
}

/// Producer that applies `f` to a block of an integer range on demand.
struct GeneratorOp<T, F> {
    lo: i64,
    hi: i64,
    f: Arc<F>,
    _t: PhantomData<fn() -> T>,
}

impl<T, F> Produce<T> for GeneratorOp<T, F>
where
    T: Element,
    F: Fn(i64) -> T + Send + Sync + 'static,
{
    fn produce(&self) -> Box<dyn Iterator<Item = T> + Send + '_> {
        let f = &*self.f;
        Box::new((self.lo..self.hi).map(move |i| f(i)))
    }
}

/// Create a dataset equivalent to `from_vec` over `f(lo), f(lo+1), ..,
/// f(hi-1)`, without materialising the range.
///
/// Blocks are computed on the integer range itself; each split evaluates `f`
/// lazily as it is pulled.
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
pub fn generator<T, F>(ctx: &Arc<ExecutionContext>, lo: i64, hi: i64, f: F) -> Dataset<T>
where
    T: Element,
    F: Fn(i64) -> T + Send + Sync + 'static,
{
    let parts = ctx.parallelism();
    let n = usize::try_from(hi.saturating_sub(lo).max(0)).unwrap_or(usize::MAX);
    let f = Arc::new(f);
    let splits = (0..parts)
        .map(|i| {
            let (start, end) = block_bounds(n, parts, i);
            let op = GeneratorOp {
                lo: lo + start as i64,
                hi: lo + end as i64,
                f: Arc::clone(&f),
                _t: PhantomData,
            };
            Split::new(ctx, Vec::new(), Arc::new(op))
        })
        .collect();
    Dataset::from_splits(ctx, splits)
}
