//! Write-once, read-many result handles.
//!
//! A [`Future`] is the reader side of a single result slot; a [`Promise`]
//! is the one writer. The slot moves from pending to ready or failed
//! exactly once and never changes afterwards, so any number of readers
//! may call [`Future::get`] and all observe the same outcome.
//!
//! Type-erased results ([`AnyValue`]) are extracted with
//! [`Future::get_as`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod any;
pub mod future;

pub use any::{erase, AnyValue};
pub use future::{promise, Future, Promise};
