//! Benchmark profiles for fanout.
//!
//! - [`line_domain`]: 1-D domain of 10K points
//! - [`grid_domain`]: 100x100 2-D domain (10K points)
//! - [`volume_domain`]: 22x22x22 3-D domain (~10K points)
//! - [`bench_runtime`]: thread pool runtime with a fixed worker count

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use fanout_core::DomainError;
use fanout_domain::Domain;
use fanout_engine::{ConfigError, PoolConfig, Runtime, TaskRegistry};

/// 1-D domain with 10K points.
pub fn line_domain() -> Result<Domain, DomainError> {
    Domain::create(10_000)
}

/// 100x100 2-D domain (10K points).
pub fn grid_domain() -> Result<Domain, DomainError> {
    Domain::create([100, 100])
}

/// 22x22x22 3-D domain (10,648 points).
pub fn volume_domain() -> Result<Domain, DomainError> {
    Domain::create([22, 22, 22])
}

/// A runtime with `workers` pool threads and no registered tasks.
pub fn bench_runtime(workers: usize) -> Result<Runtime, ConfigError> {
    Runtime::new(PoolConfig::with_workers(workers), TaskRegistry::empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_have_expected_volumes() {
        assert_eq!(line_domain().unwrap().volume(), 10_000);
        assert_eq!(grid_domain().unwrap().volume(), 10_000);
        assert_eq!(volume_domain().unwrap().volume(), 10_648);
    }
}
