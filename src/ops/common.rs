//! Common elementwise transforms for [`Dataset`].
//!
//! This module defines the core functional operators:
//!
//! - [`Dataset::map`] -- one-to-one element transformation.
//! - [`Dataset::filter`] -- element selection by predicate.
//! - [`Dataset::flat_map`] -- one-to-many expansion.
//!
//! All three preserve the partitioning: output split `i` wraps input split
//! `i` and declares it as its single dependency. Nothing is buffered; every
//! operator adapts the upstream pull lazily.

use crate::dataset::{Dataset, Element};
use crate::split::{Produce, Split};
use std::marker::PhantomData;
use std::sync::Arc;

/// Producer for `map`.
struct MapOp<I, O, F> {
    input: Split<I>,
    f: Arc<F>,
    _o: PhantomData<fn() -> O>,
}

impl<I, O, F> Produce<O> for MapOp<I, O, F>
where
    I: Element,
    O: Element,
    F: Fn(&I) -> O + Send + Sync + 'static,
{
    fn produce(&self) -> Box<dyn Iterator<Item = O> + Send + '_> {
        let f = &*self.f;
        Box::new(self.input.iter().map(move |x| f(&x)))
    }
}

/// Producer for `filter`. Advances to the next matching element on demand;
/// no intermediate buffer.
struct FilterOp<T, P> {
    input: Split<T>,
    pred: Arc<P>,
}

impl<T, P> Produce<T> for FilterOp<T, P>
where
    T: Element,
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    fn produce(&self) -> Box<dyn Iterator<Item = T> + Send + '_> {
        let pred = &*self.pred;
        Box::new(self.input.iter().filter(move |x| pred(x)))
    }
}

/// Producer for `flat_map`. Keeps a current inner sequence, advances the
/// outer pull when it is exhausted, and skips empty inner sequences.
struct FlatMapOp<I, O, F> {
    input: Split<I>,
    f: Arc<F>,
    _o: PhantomData<fn() -> O>,
}

impl<I, O, F> Produce<O> for FlatMapOp<I, O, F>
where
    I: Element,
    O: Element,
    F: Fn(&I) -> Vec<O> + Send + Sync + 'static,
{
    fn produce(&self) -> Box<dyn Iterator<Item = O> + Send + '_> {
        let f = &*self.f;
        Box::new(self.input.iter().flat_map(move |x| f(&x)))
    }
}

impl<T: Element> Dataset<T> {
    /// Apply a function to each element of the dataset.
    ///
    /// Split `i` of the result produces `f(x)` for each `x` in split `i` of
    /// the input, lazily.
    ///
    /// # Example
    /// ```ignore
    /// use ironpark::{from_vec, ExecutionContext};
    ///
    /// let ctx = ExecutionContext::new();
    /// let doubled = from_vec(&ctx, vec![1, 2, 3]).map(|x| x * 2).collect()?;
    /// assert_eq!(doubled, vec![2, 4, 6]);
    /// # anyhow::Result::<()>::Ok(())
    /// ```
    pub fn map<O, F>(&self, f: F) -> Dataset<O>
    where
        O: Element,
        F: Fn(&T) -> O + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        let splits = self
            .splits()
            .map(|s| {
                let op = MapOp {
                    input: s.clone(),
                    f: Arc::clone(&f),
                    _o: PhantomData,
                };
                Split::new(self.context(), vec![s.id()], Arc::new(op))
            })
            .collect();
        Dataset::from_splits(self.context(), splits)
    }

    /// Retain only elements that satisfy `pred`.
    ///
    /// Split `i` of the result is the subsequence of input split `i` for
    /// which the predicate holds, in the original order.
    #[must_use]
    pub fn filter<P>(&self, pred: P) -> Dataset<T>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let pred = Arc::new(pred);
        let splits = self
            .splits()
            .map(|s| {
                let op = FilterOp {
                    input: s.clone(),
                    pred: Arc::clone(&pred),
                };
                Split::new(self.context(), vec![s.id()], Arc::new(op))
            })
            .collect();
        Dataset::from_splits(self.context(), splits)
    }

    /// Expand each element into zero or more outputs and flatten the result.
    ///
    /// # Example
    /// ```ignore
    /// use ironpark::{from_vec, ExecutionContext};
    ///
    /// let ctx = ExecutionContext::new();
    /// let words = from_vec(&ctx, vec!["a b".to_string(), "c".to_string()]);
    /// let split = words.flat_map(|s| s.split_whitespace().map(String::from).collect());
    /// assert_eq!(split.count()?, 3);
    /// # anyhow::Result::<()>::Ok(())
    /// ```
    pub fn flat_map<O, F>(&self, f: F) -> Dataset<O>
    where
        O: Element,
        F: Fn(&T) -> Vec<O> + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        let splits = self
            .splits()
            .map(|s| {
                let op = FlatMapOp {
                    input: s.clone(),
                    f: Arc::clone(&f),
                    _o: PhantomData,
                };
                Split::new(self.context(), vec![s.id()], Arc::new(op))
            })
            .collect();
        Dataset::from_splits(self.context(), splits)
    }
}
