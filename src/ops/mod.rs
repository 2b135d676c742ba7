//! Operators: pure planners over datasets.
//!
//! Every operator here takes one or more input [`Dataset`](crate::Dataset)s
//! (or, for sources, raw data) and returns a new dataset whose splits wrap
//! the inputs' splits. No operator iterates any data -- element work happens
//! only when an action pulls.
//!
//! - [`source`]: `from_vec`, `generator`.
//! - [`common`]: `map`, `filter`, `flat_map`.
//! - [`sample`]: Bernoulli sampling.
//! - [`multi`]: `union`, `zip`, `merge`.
//! - [`keyed`]: `partition_by`, `group_by_key`.

pub mod common;
pub mod keyed;
pub mod multi;
pub mod sample;
pub mod source;
