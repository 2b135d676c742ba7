//! Test utilities: collection assertions and instrumentation probes.
//!
//! The assertion helpers compare action outputs against expected
//! collections with detailed panic messages; the [`InvocationCounter`] probe
//! counts how often a user callable actually ran, which is how the
//! cache-deduplication guarantees are verified.

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Assert that two collections are equal in order and content.
///
/// # Panics
///
/// Panics with a detailed message if the collections differ in length or
/// content.
pub fn assert_collections_equal<T: Debug + PartialEq>(actual: &[T], expected: &[T]) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "Collection length mismatch:\n  Expected length: {}\n  Actual length: {}\n  Expected: {expected:?}\n  Actual: {actual:?}",
        expected.len(),
        actual.len()
    );

    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        assert_eq!(
            a, e,
            "Collection mismatch at index {i}:\n  Expected: {e:?}\n  Actual: {a:?}\n  Full expected: {expected:?}\n  Full actual: {actual:?}"
        );
    }
}

/// Assert that two collections contain the same elements, ignoring order.
///
/// Useful for outputs whose cross-split order is unspecified (e.g. grouped
/// or re-partitioned data).
///
/// # Panics
///
/// Panics if the collections differ as multisets.
pub fn assert_collections_unordered_equal<T: Debug + Ord + Clone>(actual: &[T], expected: &[T]) {
    let mut actual_sorted: Vec<T> = actual.to_vec();
    let mut expected_sorted: Vec<T> = expected.to_vec();
    actual_sorted.sort();
    expected_sorted.sort();
    assert_eq!(
        actual_sorted, expected_sorted,
        "Collection content mismatch (order ignored):\n  Expected: {expected:?}\n  Actual: {actual:?}"
    );
}

/// Assert that two collections of key-value pairs are equal after sorting by
/// key.
///
/// # Panics
///
/// Panics if the collections differ after sorting by key.
pub fn assert_kv_collections_equal<K, V>(actual: &[(K, V)], expected: &[(K, V)])
where
    K: Debug + Ord + Hash + Clone,
    V: Debug + PartialEq + Clone,
{
    let mut actual_sorted: Vec<(K, V)> = actual.to_vec();
    let mut expected_sorted: Vec<(K, V)> = expected.to_vec();
    actual_sorted.sort_by(|a, b| a.0.cmp(&b.0));
    expected_sorted.sort_by(|a, b| a.0.cmp(&b.0));
    assert_eq!(
        actual_sorted.len(),
        expected_sorted.len(),
        "Key-value collection length mismatch:\n  Expected: {expected:?}\n  Actual: {actual:?}"
    );
    for (a, e) in actual_sorted.iter().zip(expected_sorted.iter()) {
        assert!(
            a.0 == e.0 && a.1 == e.1,
            "Key-value mismatch:\n  Expected: {e:?}\n  Actual: {a:?}\n  Full expected: {expected:?}\n  Full actual: {actual:?}"
        );
    }
}

/// A cheap, cloneable probe counting how many times a callable ran.
///
/// Clone it into a `map`/`filter` closure and read the count afterwards:
///
/// ```ignore
/// use ironpark::testing::InvocationCounter;
/// use ironpark::{from_vec, ExecutionContext};
///
/// let ctx = ExecutionContext::new();
/// let calls = InvocationCounter::new();
/// let probe = calls.clone();
/// let data = from_vec(&ctx, vec![1, 2, 3]).map(move |x| {
///     probe.record();
///     x * 2
/// });
/// data.collect()?;
/// assert_eq!(calls.count(), 3);
/// # anyhow::Result::<()>::Ok(())
/// ```
#[derive(Clone, Default)]
pub struct InvocationCounter(Arc<AtomicUsize>);

impl InvocationCounter {
    /// Create a counter starting at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one invocation.
    pub fn record(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    /// The number of invocations recorded so far.
    #[must_use]
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}
