//! Index launch engine for fanout.
//!
//! An [`IndexLauncher`] enumerates a [`Domain`](fanout_domain::Domain) in
//! row-major order and submits one [`Invocation`] per point to a
//! [`Substrate`], returning a [`FutureMap`] that pairs every point with the
//! future for its result. Launching never waits for task completion.
//!
//! Two substrates are provided: [`ThreadPool`] (worker threads fed by a
//! crossbeam channel) and [`InlineSubstrate`] (runs each invocation on the
//! submitting thread). [`Runtime`] bundles a pool with a frozen
//! [`TaskRegistry`] and hands out the [`Context`] that task bodies use for
//! nested launches and cooperative waiting.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod argmap;
pub mod config;
pub mod context;
pub mod inline;
pub mod invocation;
pub mod launcher;
pub mod metrics;
pub mod pool;
pub mod registry;
pub mod runtime;
pub mod substrate;

pub use argmap::ArgumentMap;
pub use config::{ConfigError, PoolConfig};
pub use context::{Context, ErasedTaskContext, TaskContext};
pub use inline::InlineSubstrate;
pub use invocation::{submit_point, Completion, Invocation, InvocationMeta};
pub use launcher::{FutureMap, IndexLauncher};
pub use metrics::{LaunchMetrics, PoolMetrics};
pub use pool::{ShutdownMode, ShutdownReport, ThreadPool};
pub use registry::{ArgShape, RegisteredTask, TaskRegistry, TaskRegistryBuilder};
pub use runtime::Runtime;
pub use substrate::{Rejected, Substrate};
