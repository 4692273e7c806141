#![forbid(unsafe_code)]
#![cfg_attr(not(test), deny(clippy::all))]

//! # Mule
//!
//! Retry primitive for Rust: run an operation as a sequence of attempts until a stop condition
//! says the sequence is over.
//!
//! ## Features
//!
//! - **Stop-condition algebra**: leaves (`NoFailure`, `AttemptsExhausted`, `FailureMatches`) and
//!   combinators (`AllOf`, `AnyOf`, `Not`, plus `|`, `&`, `!` on [`Stop`])
//! - **Scoped attempts** that capture failures instead of propagating them
//! - **Blocking and async drivers** sharing one set of transition rules
//! - **Wait scheduling** with fixed, backoff (with jitter) or computed delays
//! - **Lifecycle hooks** around attempts and waits
//! - **Tower middleware** for retrying services
//!
//! ## Quick Start
//!
//! ```rust
//! use mule::{Attempting, RetryConfig};
//! use std::time::Duration;
//!
//! let config = RetryConfig::<String, std::io::Error>::builder()
//!     .max_attempts(3)
//!     .wait(Duration::from_millis(1))
//!     .build()
//!     .unwrap();
//!
//! let mut attempts = Attempting::new(config);
//! while let Some(attempt) = attempts.next_attempt().unwrap() {
//!     attempt.run(|| Ok("fetched".to_string())).unwrap();
//! }
//! let body = attempts.into_last_attempt().and_then(|state| state.into_result());
//! assert_eq!(body.as_deref(), Some("fetched"));
//! ```
//!
//! The failure of the last attempt is handed back only once the stop condition gives up; until
//! then every failure is captured by its attempt scope and the loop carries on.

pub mod aio;
pub mod attempting;
pub mod backoff;
pub mod config;
pub mod context;
mod engine;
pub mod error;
pub mod hooks;
pub mod jitter;
pub mod layer;
pub mod prelude;
pub mod retriable;
pub mod sleeper;
pub mod state;
pub mod stop;
pub mod wait;

// Re-exports
pub use aio::AsyncAttempting;
pub use attempting::Attempting;
pub use backoff::{Backoff, BackoffError, MAX_BACKOFF};
pub use config::{RetryConfig, RetryConfigBuilder};
pub use context::AttemptContext;
pub use error::{BoxError, BuildError, RetryError, NO_ATTEMPTS_MESSAGE};
pub use hooks::{Hook, HookPoint, Hooks};
pub use jitter::Jitter;
pub use layer::{RetryLayer, RetryService};
pub use retriable::{retry, retry_async, Retriable};
pub use sleeper::{
    BlockingSleeper, InstantSleeper, Sleeper, ThreadSleeper, TokioSleeper, TrackingSleeper,
};
pub use state::{AttemptState, Phase};
pub use stop::{
    AllOf, Always, And, AnyOf, AttemptsExhausted, FailureMatches, NoFailure, Not, Or, Stop,
    StopCondition,
};
pub use wait::{Wait, WaitFn, WaitResult};
