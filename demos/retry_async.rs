//! Async wrapper around an operation that fails for a while, then succeeds.

use mule::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    println!("=== Mule: async wrapper ===\n");

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let config = RetryConfig::<&'static str, std::io::Error>::builder()
        .max_attempts(5)
        .wait(Wait::backoff(Backoff::exponential(Duration::from_millis(50)), Jitter::full()))
        .on_failure(|state| println!("  attempt {} failed: {:?}", state.attempt(), state.failure()))
        .build()?;

    let connect = Retriable::new(
        move || {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n < 3 {
                    let kind = std::io::ErrorKind::ConnectionRefused;
                    Err(std::io::Error::new(kind, "not listening yet"))
                } else {
                    Ok("connected")
                }
            }
        },
        config,
    );

    let status = connect.call_async().await?;
    println!("\n{} after {} calls to {}", status, calls.load(Ordering::SeqCst), connect.name());
    Ok(())
}
