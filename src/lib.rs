//! # ironpark
//!
//! An in-process, single-machine parallel data-processing engine built
//! around resilient-distributed-dataset-style lineage.
//!
//! A [`Dataset`] is a lazy, partitioned description of a collection:
//! composing transformations (`map`, `filter`, `flat_map`, `union`, `zip`,
//! `partition_by`, `group_by_key`, ..) plans a DAG of [`Split`]s without
//! touching any data. A terminal action (`collect`, `reduce`, `count`)
//! schedules one task per split on a worker pool, pulls the elements, and
//! combines the partial results. Splits consumed by two or more downstream
//! splits are materialised once in the context's cache and shared by every
//! consumer.
//!
//! ```ignore
//! use ironpark::{from_vec, Config, ExecutionContext};
//!
//! let ctx = ExecutionContext::with_config(Config::default().parallelism(4));
//! let out = from_vec(&ctx, (1i64..=10).collect())
//!     .map(|x| x * x)
//!     .filter(|x| x % 5 == 0)
//!     .map(|x| x + 2)
//!     .filter(|x| x % 3 == 0)
//!     .collect()?;
//! assert_eq!(out, vec![27, 102]);
//! # anyhow::Result::<()>::Ok(())
//! ```

pub mod config;
pub mod context;
pub mod dataset;
pub mod ids;
pub mod ops;
pub mod runner;
pub mod split;
pub mod testing;

mod cache;

pub use config::{Config, Policy};
pub use context::ExecutionContext;
pub use dataset::{Dataset, Element};
pub use ids::{DatasetId, SplitId};
pub use ops::source::{from_vec, generator};
pub use split::Split;
