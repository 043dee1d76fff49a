//! fanout: launch one task per point of a multi-dimensional index space.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all fanout sub-crates. For most users, adding `fanout` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use fanout::prelude::*;
//!
//! let runtime = Runtime::new(PoolConfig::with_workers(2), TaskRegistry::empty()).unwrap();
//! let ctx = runtime.context();
//!
//! let domain = Domain::create([3, 3]).unwrap();
//! let futures = ctx.launch(&domain, |tc| Ok(tc.point().clone()));
//!
//! // The k-th future belongs to the k-th point in row-major order.
//! for ((point, future), expected) in futures.iter().zip(domain.iter()) {
//!     assert_eq!(point, &expected);
//!     assert_eq!(future.get().unwrap(), expected);
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `fanout-core` | `Point`, ids, error types |
//! | [`domain`] | `fanout-domain` | `Domain`, `Bounds`, row-major iteration |
//! | [`future`] | `fanout-future` | Write-once `Future`/`Promise`, `AnyValue` |
//! | [`engine`] | `fanout-engine` | Launcher, substrates, registry, runtime |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Points, identifiers, and error types (`fanout-core`).
pub use fanout_core as types;

/// Rectangular index domains (`fanout-domain`).
///
/// [`domain::Domain::create`] accepts a scalar extent, a list of extents,
/// or explicit inclusive bounds.
pub use fanout_domain as domain;

/// Write-once futures (`fanout-future`).
pub use fanout_future as future;

/// Launching, substrates, and runtime (`fanout-engine`).
///
/// [`engine::IndexLauncher`] submits one invocation per point;
/// [`engine::ThreadPool`] and [`engine::InlineSubstrate`] run them.
pub use fanout_engine as engine;

/// Common imports for typical fanout usage.
///
/// ```rust
/// use fanout::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use fanout_core::{LaunchId, Point, TaskId};

    // Errors
    pub use fanout_core::{DomainError, RegistryError, SubmissionError, TaskError};

    // Domain
    pub use fanout_domain::{Bounds, Domain};

    // Futures
    pub use fanout_future::{AnyValue, Future};

    // Engine
    pub use fanout_engine::{
        ArgumentMap, Context, FutureMap, IndexLauncher, InlineSubstrate, PoolConfig,
        RegisteredTask, Runtime, ShutdownMode, Substrate, TaskContext, TaskRegistry, ThreadPool,
    };
}
