//! Per-context configuration.
//!
//! A [`Config`] describes how an [`ExecutionContext`](crate::ExecutionContext)
//! runs actions: how many worker threads and splits to use, whether to run
//! tasks on a thread pool or on the caller thread, and where (if anywhere)
//! to write the engine's log lines.
//!
//! All options have defaults; setters chain:
//!
//! ```ignore
//! use ironpark::{Config, Policy};
//!
//! let cfg = Config::default()
//!     .parallelism(4)
//!     .debug_name("wordcount")
//!     .policy(Policy::Sequential);
//! ```

use std::io::Write;
use std::sync::{Arc, Mutex};

/// How action tasks are scheduled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Policy {
    /// Run every task on the calling thread, in split order.
    Sequential,
    /// Run tasks on a worker pool sized to the configured parallelism.
    #[default]
    Threaded,
}

/// A shared, line-oriented log sink.
///
/// The engine writes one line per event through the mutex; when no sink is
/// configured the lines are discarded.
pub(crate) type LogSink = Arc<Mutex<Box<dyn Write + Send>>>;

/// Configuration for an execution context.
///
/// `parallelism` doubles as the worker count and the default split count of
/// source datasets. The default is the hardware thread count; an explicit
/// zero falls back the same way, bottoming out at 8.
#[derive(Clone)]
pub struct Config {
    parallelism: usize,
    debug_name: String,
    policy: Policy,
    logger: Option<LogSink>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            parallelism: detect_parallelism(),
            debug_name: String::new(),
            policy: Policy::default(),
            logger: None,
        }
    }
}

impl Config {
    /// Set the worker count and default split count.
    ///
    /// Passing `0` selects the hardware thread count.
    #[must_use]
    pub fn parallelism(mut self, n: usize) -> Self {
        self.parallelism = if n == 0 { detect_parallelism() } else { n };
        self
    }

    /// Set the name used to prefix log lines for this context.
    #[must_use]
    pub fn debug_name(mut self, name: impl Into<String>) -> Self {
        self.debug_name = name.into();
        self
    }

    /// Set the scheduling policy.
    #[must_use]
    pub fn policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    /// Set a line-oriented log sink. Without one, log output is discarded.
    #[must_use]
    pub fn logger(mut self, sink: Box<dyn Write + Send>) -> Self {
        self.logger = Some(Arc::new(Mutex::new(sink)));
        self
    }

    /// The configured worker count / default split count.
    #[must_use]
    pub fn parallelism_level(&self) -> usize {
        self.parallelism
    }

    /// The configured debug name (empty by default).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.debug_name
    }

    /// The configured scheduling policy.
    #[must_use]
    pub fn scheduling_policy(&self) -> Policy {
        self.policy
    }

    pub(crate) fn sink(&self) -> Option<&LogSink> {
        self.logger.as_ref()
    }
}

fn detect_parallelism() -> usize {
    match num_cpus::get() {
        0 => 8,
        n => n,
    }
}
