//! Execution-context contracts: id issuance, the shared-reference table,
//! and the split cache gate.

use ironpark::{ExecutionContext, SplitId};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

#[test]
fn dataset_ids_are_monotonic_and_unique() {
    let ctx = ExecutionContext::new();
    let a = ctx.next_dataset_id();
    let b = ctx.next_dataset_id();
    let c = ctx.next_dataset_id();
    assert!(a < b && b < c);
    assert_eq!(
        [a, b, c].iter().collect::<HashSet<_>>().len(),
        3,
        "ids must be distinct"
    );
}

#[test]
fn split_ids_unique_under_concurrent_issuance() {
    let ctx = ExecutionContext::new();
    let mut handles = Vec::new();
    for _ in 0..8 {
        let ctx = Arc::clone(&ctx);
        handles.push(thread::spawn(move || {
            (0..200).map(|_| ctx.next_split_id()).collect::<Vec<_>>()
        }));
    }

    let mut all = Vec::new();
    for h in handles {
        all.extend(h.join().unwrap());
    }
    let distinct: HashSet<SplitId> = all.iter().copied().collect();
    assert_eq!(distinct.len(), all.len(), "concurrent ids must not collide");
}

#[test]
fn should_cache_requires_two_distinct_dependents() {
    let ctx = ExecutionContext::new();
    let parent = ctx.next_split_id();
    let child_a = ctx.next_split_id();
    let child_b = ctx.next_split_id();

    assert!(!ctx.should_cache(parent), "no dependents yet");

    ctx.register_dependency(parent, child_a);
    assert!(!ctx.should_cache(parent), "a single consumer is not shared");

    // Re-registering the same child must not count twice.
    ctx.register_dependency(parent, child_a);
    assert!(!ctx.should_cache(parent));

    ctx.register_dependency(parent, child_b);
    assert!(ctx.should_cache(parent), "two consumers make it shared");
}

#[test]
fn build_or_wait_stores_and_serves_the_vector() {
    let ctx = ExecutionContext::new();
    let split = ctx.next_split_id();

    assert!(!ctx.cached(split));
    assert!(ctx.get_cache::<i64>(split).is_none());

    let data = ctx.build_or_wait(split, || vec![1i64, 2, 3]);
    assert_eq!(*data, vec![1, 2, 3]);

    assert!(ctx.cached(split));
    let again = ctx.get_cache::<i64>(split).expect("entry is ready");
    assert_eq!(*again, vec![1, 2, 3]);
}

#[test]
fn build_or_wait_runs_the_producer_at_most_once() {
    let ctx = ExecutionContext::new();
    let split = ctx.next_split_id();
    let builds = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let ctx = Arc::clone(&ctx);
        let builds = Arc::clone(&builds);
        handles.push(thread::spawn(move || {
            let data = ctx.build_or_wait(split, move || {
                builds.fetch_add(1, Ordering::SeqCst);
                (0i64..100).collect()
            });
            data.len()
        }));
    }
    for h in handles {
        assert_eq!(h.join().unwrap(), 100);
    }

    assert_eq!(
        builds.load(Ordering::SeqCst),
        1,
        "exactly one caller may run the producer"
    );
}

#[test]
fn second_build_or_wait_reuses_the_first_result() {
    let ctx = ExecutionContext::new();
    let split = ctx.next_split_id();

    let first = ctx.build_or_wait(split, || vec![1i64]);
    let second = ctx.build_or_wait(split, || vec![9i64, 9, 9]);
    assert_eq!(*first, *second, "later producers are never run");
}

#[test]
#[should_panic(expected = "cache element type mismatch")]
fn mismatched_cache_type_is_fatal() {
    let ctx = ExecutionContext::new();
    let split = ctx.next_split_id();
    ctx.build_or_wait(split, || vec![1i64, 2]);
    let _ = ctx.get_cache::<String>(split);
}

#[test]
fn failed_build_is_observed_by_later_consumers() {
    let ctx = ExecutionContext::new();
    let split = ctx.next_split_id();

    let builder = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        ctx.build_or_wait::<i64, _>(split, || panic!("bad record"));
    }));
    assert!(builder.is_err(), "the building caller sees the panic");

    let waiter = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        ctx.build_or_wait(split, || vec![1i64]);
    }));
    assert!(waiter.is_err(), "the gate stays resolved to the failure");
    assert!(!ctx.cached(split));
}
