//! Convenient re-exports for common Mule types.
pub use crate::{
    aio::AsyncAttempting,
    attempting::Attempting,
    backoff::{Backoff, BackoffError, MAX_BACKOFF},
    config::{RetryConfig, RetryConfigBuilder},
    context::AttemptContext,
    error::{BuildError, RetryError},
    hooks::HookPoint,
    jitter::Jitter,
    layer::RetryLayer,
    retriable::{retry, retry_async, Retriable},
    sleeper::{InstantSleeper, Sleeper, TokioSleeper, TrackingSleeper},
    state::{AttemptState, Phase},
    stop::{AllOf, AnyOf, AttemptsExhausted, FailureMatches, NoFailure, Not, Stop, StopCondition},
    wait::Wait,
};
