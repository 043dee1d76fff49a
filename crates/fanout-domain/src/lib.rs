//! Rectangular index domains for fanout launches.
//!
//! A [`Domain`] is an immutable N-dimensional box of integer [`Point`]s
//! with inclusive bounds. Enumeration is row-major (last axis fastest) and
//! is a pure function of the bounds: every call to [`Domain::iter`] replays
//! the same sequence from the first point.
//!
//! Domains are built from a [`Bounds`] spec: a single extent, a list of
//! extents, or an explicit `(lo, hi)` rectangle.
//!
//! [`Point`]: fanout_core::Point

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod bounds;
pub mod domain;
pub mod iter;

#[cfg(test)]
pub(crate) mod compliance;

pub use bounds::Bounds;
pub use domain::Domain;
pub use iter::DomainIter;
