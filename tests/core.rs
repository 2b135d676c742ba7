//! End-to-end transformation chains over the programmatic surface.

use anyhow::Result;
use ironpark::testing::*;
use ironpark::{from_vec, generator, Config, ExecutionContext};

#[test]
fn square_filter_chain() -> Result<()> {
    let ctx = ExecutionContext::with_config(Config::default().parallelism(4));
    let out = from_vec(&ctx, (1i64..=10).collect())
        .map(|x| x * x)
        .filter(|x| x % 5 == 0)
        .map(|x| x + 2)
        .filter(|x| x % 3 == 0)
        .collect()?;

    assert_collections_equal(&out, &[27, 102]);
    Ok(())
}

#[test]
fn generator_sum_of_first_hundred() -> Result<()> {
    let ctx = ExecutionContext::new();
    let sum = generator(&ctx, 1, 101, |i| i).reduce(|a, b| a + b)?;
    assert_eq!(sum, 5050);
    Ok(())
}

#[test]
fn filter_even_count() -> Result<()> {
    let ctx = ExecutionContext::new();
    let count = from_vec(&ctx, (0i64..1000).collect())
        .filter(|x| x % 2 == 0)
        .count()?;
    assert_eq!(count, 500);
    Ok(())
}

#[test]
fn map_filter_flatmap_chain() -> Result<()> {
    let ctx = ExecutionContext::with_config(Config::default().parallelism(2));
    let lines = from_vec(
        &ctx,
        vec![
            "The quick brown fox".to_string(),
            "jumps over the lazy dog".to_string(),
        ],
    );

    let words = lines.flat_map(|s| {
        s.split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
    });
    let filtered = words.filter(|w| w.len() >= 4);

    let out = filtered.collect()?;
    assert_collections_equal(
        &out,
        &[
            "quick".to_string(),
            "brown".to_string(),
            "jumps".to_string(),
            "over".to_string(),
            "lazy".to_string(),
        ],
    );
    Ok(())
}

#[test]
fn flat_map_skips_empty_expansions() -> Result<()> {
    let ctx = ExecutionContext::with_config(Config::default().parallelism(3));
    let out = from_vec(&ctx, vec![1i64, 2, 3, 4, 5, 6])
        .flat_map(|x| if x % 2 == 0 { vec![*x, *x] } else { vec![] })
        .collect()?;
    assert_collections_equal(&out, &[2, 2, 4, 4, 6, 6]);
    Ok(())
}

#[test]
fn empty_source_every_split_empty() -> Result<()> {
    let ctx = ExecutionContext::with_config(Config::default().parallelism(4));
    let data = from_vec(&ctx, Vec::<i64>::new());

    assert_eq!(data.split_count(), 4);
    for split in data.splits() {
        assert_eq!(split.iter().count(), 0);
    }
    assert_eq!(data.count()?, 0);
    assert_eq!(data.reduce(|a, b| a + b)?, 0);
    Ok(())
}

#[test]
fn empty_generator_range() -> Result<()> {
    let ctx = ExecutionContext::with_config(Config::default().parallelism(4));
    let data = generator(&ctx, 7, 7, |i| i);
    assert_eq!(data.count()?, 0);
    assert_eq!(data.reduce(|a, b| a + b)?, 0);
    Ok(())
}

#[test]
fn source_shorter_than_split_count() -> Result<()> {
    let ctx = ExecutionContext::with_config(Config::default().parallelism(8));
    let data = from_vec(&ctx, vec![10i64, 20, 30]);

    assert_eq!(data.split_count(), 8);
    assert_collections_equal(&data.collect()?, &[10, 20, 30]);
    assert_eq!(data.map(|x| x + 1).count()?, 3);
    Ok(())
}

#[test]
fn source_blocks_partition_without_gaps_or_overlaps() -> Result<()> {
    let ctx = ExecutionContext::with_config(Config::default().parallelism(3));
    let data = from_vec(&ctx, (0i64..10).collect());

    let mut seen = Vec::new();
    for split in data.splits() {
        seen.extend(split.iter());
    }
    assert_collections_equal(&seen, &(0i64..10).collect::<Vec<_>>());
    Ok(())
}

#[test]
fn generator_blocks_match_vector_source() -> Result<()> {
    let ctx = ExecutionContext::with_config(Config::default().parallelism(4));
    let from_range = generator(&ctx, 0, 11, |i| i * 3).collect()?;
    let from_data = from_vec(&ctx, (0i64..11).map(|i| i * 3).collect()).collect()?;
    assert_collections_equal(&from_range, &from_data);
    Ok(())
}

#[test]
fn nothing_runs_before_an_action() -> Result<()> {
    let ctx = ExecutionContext::with_config(Config::default().parallelism(2));
    let calls = InvocationCounter::new();
    let probe = calls.clone();

    let planned = from_vec(&ctx, vec![1i64, 2, 3]).map(move |x| {
        probe.record();
        x * 2
    });
    assert_eq!(calls.count(), 0, "composition must not iterate data");

    planned.collect()?;
    assert_eq!(calls.count(), 3);
    Ok(())
}
