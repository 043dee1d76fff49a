//! Core types and errors for the fanout workspace.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the [`Point`] coordinate type, strongly-typed identifiers, and the
//! error enums shared by domains, futures, and the launch engine.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod point;

pub use error::{DomainError, DoubleResolution, RegistryError, SubmissionError, TaskError};
pub use id::{LaunchId, TaskId};
pub use point::{Point, MAX_DIM};
