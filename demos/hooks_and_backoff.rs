//! Combining stop conditions, a computed wait and lifecycle hooks.
//!
//! Gives up after 5 attempts or on the first permanent error, waiting 2^(n-1) x 10ms before
//! attempt n.

use mule::prelude::*;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
enum JobError {
    #[error("worker busy")]
    Busy,
    #[error("job rejected")]
    Rejected,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Mule: hooks and backoff ===\n");

    let rejected = FailureMatches::new(|e: &JobError| matches!(e, JobError::Rejected));
    let until = Stop(AttemptsExhausted::new(5)?) | Stop(rejected);

    let config = RetryConfig::<u32, JobError>::builder()
        .until(until)
        .wait_fn(|_, next| Some(Duration::from_millis(10 << (next.attempt() - 1))))
        .before_attempt(|s| println!("-> attempt {}", s.attempt()))
        .on_failure(|s| println!("   failed: {:?}", s.failure()))
        .on_success(|s| println!("   succeeded: {:?}", s.result()))
        .before_wait(|s| println!("   sleeping before attempt {}", s.attempt()))
        .after_wait(|s| println!("   woke up for attempt {}", s.attempt()))
        .build()?;

    let mut n = 0;
    let outcome = retry(config, || {
        n += 1;
        match n {
            1 | 2 => Err(JobError::Busy),
            3 => Err(JobError::Rejected),
            _ => Ok(n),
        }
    });

    match outcome {
        Ok(v) => println!("\njob accepted: {}", v),
        Err(RetryError::Inner(e)) => println!("\ngave up: {}", e),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
