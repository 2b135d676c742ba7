//! Larger pipelines exercising several operators and actions together.

use anyhow::Result;
use ironpark::testing::*;
use ironpark::{from_vec, generator, Config, ExecutionContext, Policy};

#[test]
fn word_count_pipeline() -> Result<()> {
    let ctx = ExecutionContext::with_config(Config::default().parallelism(4));
    let lines = from_vec(
        &ctx,
        vec![
            "the quick brown fox".to_string(),
            "the lazy dog and the quick cat".to_string(),
            "a dog and a fox".to_string(),
        ],
    );

    let counts = lines
        .flat_map(|line| line.split_whitespace().map(String::from).collect())
        .key_by(|word| word.clone())
        .map(|(word, _)| (word.clone(), 1u64))
        .partition_by()
        .group_by_key()
        .map(|(word, ones)| (word.clone(), ones.len() as u64));

    let mut out = counts.collect()?;
    out.sort();

    let expected = vec![
        ("a".to_string(), 2),
        ("and".to_string(), 2),
        ("brown".to_string(), 1),
        ("cat".to_string(), 1),
        ("dog".to_string(), 2),
        ("fox".to_string(), 2),
        ("lazy".to_string(), 1),
        ("quick".to_string(), 2),
        ("the".to_string(), 3),
    ];
    assert_collections_equal(&out, &expected);

    // The pair totals are consistent with a straight count of the words.
    let total: u64 = out.iter().map(|(_, n)| n).sum();
    let words = lines
        .flat_map(|line| line.split_whitespace().map(String::from).collect())
        .count()?;
    assert_eq!(total, words);
    Ok(())
}

#[test]
fn leibniz_series_approximates_pi() -> Result<()> {
    let ctx = ExecutionContext::with_config(Config::default().parallelism(8));
    let pi = generator(&ctx, 0, 200_000, |i| {
        4.0 / (2 * i + 1) as f64 * if i % 2 == 1 { -1.0 } else { 1.0 }
    })
    .reduce(|a, b| a + b)?;

    assert!((pi - std::f64::consts::PI).abs() < 1e-4, "pi came out as {pi}");
    Ok(())
}

#[test]
fn square_filter_chain_matches_plain_ranges() -> Result<()> {
    let n = 30_000i64;
    let plain: i64 = (1..=n)
        .map(|x| x * x)
        .filter(|x| x % 5 == 0)
        .map(|x| x + 2)
        .filter(|x| x % 3 == 0)
        .sum();

    let ctx = ExecutionContext::with_config(Config::default().debug_name("speed-check"));
    let engine = generator(&ctx, 1, n + 1, |i| i)
        .map(|x| x * x)
        .filter(|x| x % 5 == 0)
        .map(|x| x + 2)
        .filter(|x| x % 3 == 0)
        .reduce(|a, b| a + b)?;

    assert_eq!(engine, plain);
    Ok(())
}

#[test]
fn reused_stage_feeds_zip_union_and_merge() -> Result<()> {
    let ctx = ExecutionContext::with_config(Config::default().parallelism(3));
    let calls = InvocationCounter::new();
    let probe = calls.clone();

    let base = from_vec(&ctx, (0i64..30).collect()).map(move |x| {
        probe.record();
        x + 1
    });

    let pairs = base.zip(&base);
    let doubled = base.union(&base);

    assert_eq!(pairs.count()?, 30);
    assert_eq!(doubled.count()?, 60);
    assert_eq!(doubled.merge().count()?, 60);
    assert_eq!(
        calls.count(),
        30,
        "four consumers of the shared stage still build it once"
    );

    for (a, b) in pairs.collect()? {
        assert_eq!(a, b);
    }
    Ok(())
}

#[test]
fn sequential_policy_runs_full_pipelines_too() -> Result<()> {
    let ctx = ExecutionContext::with_config(
        Config::default().parallelism(4).policy(Policy::Sequential),
    );

    let grouped = generator(&ctx, 0, 60, |i| i)
        .key_by(|x| x % 6)
        .partition_by_with(|k| *k as u64)
        .group_by_key();

    let groups = grouped.collect()?;
    assert_eq!(groups.len(), 6);
    for (_, values) in &groups {
        assert_eq!(values.len(), 10);
    }
    Ok(())
}
