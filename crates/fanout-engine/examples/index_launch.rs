//! Launch an identity task over a 1-D and a 2-D domain and check that every
//! future lines up with its point.
//!
//! ```text
//! RUST_LOG=fanout_engine=debug cargo run -p fanout-engine --example index_launch
//! ```

use std::error::Error;

use fanout_core::{Point, TaskError};
use fanout_domain::Domain;
use fanout_engine::{Context, PoolConfig, Runtime, TaskContext, TaskRegistry};
use tracing_subscriber::EnvFilter;

fn identity(tc: &TaskContext<'_, (), ()>) -> Result<Point, TaskError> {
    Ok(tc.point().clone())
}

fn check(ctx: &Context, domain: &Domain) -> Result<(), Box<dyn Error>> {
    let futures = ctx.launch(domain, identity);
    for ((point, future), expected) in futures.iter().zip(domain.iter()) {
        let value = future.get()?;
        assert_eq!(point, &expected);
        assert_eq!(value, expected);
        println!("{domain}: {point} -> {value}");
    }
    println!(
        "{} points, submitted in {} us",
        futures.len(),
        futures.metrics().submit_us
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let runtime = Runtime::new(PoolConfig::default(), TaskRegistry::empty())?;
    let ctx = runtime.context();

    check(&ctx, &Domain::create(10)?)?;
    check(&ctx, &Domain::create([3, 3])?)?;

    let report = runtime.shutdown(fanout_engine::ShutdownMode::Drain);
    println!("{} workers joined", report.workers_joined);
    Ok(())
}
