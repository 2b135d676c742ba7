//! Bernoulli sampling.
//!
//! `sample(p)` keeps each element independently with probability `p`. Every
//! pull of a sampled split seeds a fresh RNG from the thread's entropy
//! source, so re-pulling yields a *different* subset and the sampled element
//! count is a binomial random variable. Splits derived from `sample` are the
//! one exception to the restartable-pull determinism the rest of the engine
//! guarantees.

use crate::dataset::{Dataset, Element};
use crate::split::{Produce, Split};
use rand::distributions::{Bernoulli, Distribution};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

/// Producer for `sample`. The RNG is created per pull, never shared between
/// tasks.
struct SampleOp<T> {
    input: Split<T>,
    dist: Bernoulli,
}

impl<T: Element> Produce<T> for SampleOp<T> {
    fn produce(&self) -> Box<dyn Iterator<Item = T> + Send + '_> {
        let dist = self.dist;
        let mut rng = StdRng::from_entropy();
        Box::new(self.input.iter().filter(move |_| dist.sample(&mut rng)))
    }
}

impl<T: Element> Dataset<T> {
    /// Keep each element independently with probability `probability`.
    ///
    /// Partitioning is preserved. The result is non-deterministic across
    /// pulls; see the module docs.
    ///
    /// # Panics
    ///
    /// If `probability` is not within `[0, 1]`.
    #[must_use]
    pub fn sample(&self, probability: f64) -> Dataset<T> {
        let dist =
            Bernoulli::new(probability).expect("sample probability must be within [0, 1]");
        let splits = self
            .splits()
            .map(|s| {
                let op = SampleOp {
                    input: s.clone(),
                    dist,
                };
                Split::new(self.context(), vec![s.id()], Arc::new(op))
            })
            .collect();
        Dataset::from_splits(self.context(), splits)
    }
}
