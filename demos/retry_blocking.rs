//! Blocking retry loop with a scripted flaky operation.
//!
//! Shows the attempt scope capturing failures until the stop condition gives up.

use mule::prelude::*;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
enum FetchError {
    #[error("connection reset (attempt {0})")]
    Reset(usize),
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();
    println!("=== Mule: blocking attempts ===\n");

    let config = RetryConfig::<String, FetchError>::builder()
        .max_attempts(4)
        .wait(Duration::from_millis(200))
        .build()?;

    let mut attempts = Attempting::new(config);
    while let Some(attempt) = attempts.next_attempt()? {
        let n = attempt.attempt();
        println!("attempt {}", n);
        attempt.run(|| {
            if n < 3 {
                Err(FetchError::Reset(n))
            } else {
                Ok(format!("payload #{}", n))
            }
        })?;
    }

    let phase = attempts.phase();
    let body = attempts.into_last_attempt().and_then(AttemptState::into_result);
    println!("\nresult: {:?} ({:?})", body, phase);
    Ok(())
}
