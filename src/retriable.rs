//! Wrapping a callable so every call runs through an attempt driver.
//!
//! [`Retriable::call`] drives a blocking operation with [`Attempting`], [`Retriable::call_async`]
//! drives an async one with [`AsyncAttempting`]. Each call starts a fresh sequence from the shared
//! configuration, so one wrapper can be called any number of times, from any number of threads.
//!
//! ```rust
//! use mule::{retry, RetryConfig};
//!
//! let config = RetryConfig::<u32, String>::builder().max_attempts(2).build().unwrap();
//! let result = retry(config, || Err::<u32, _>("unreachable".to_string()));
//! assert_eq!(result.unwrap_err().into_inner(), Some("unreachable".to_string()));
//! ```

use crate::aio::AsyncAttempting;
use crate::attempting::Attempting;
use crate::config::RetryConfig;
use crate::error::RetryError;
use crate::state::AttemptState;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// A callable paired with the configuration used to retry it.
pub struct Retriable<F, T, E> {
    op: F,
    config: Arc<RetryConfig<T, E>>,
}

impl<F, T, E> Retriable<F, T, E> {
    pub fn new(op: F, config: impl Into<Arc<RetryConfig<T, E>>>) -> Self {
        Self { op, config: config.into() }
    }

    /// The wrapped callable.
    pub fn get_ref(&self) -> &F {
        &self.op
    }

    pub fn into_inner(self) -> F {
        self.op
    }

    /// Type name of the wrapped callable, for logs and diagnostics.
    pub fn name(&self) -> &'static str {
        std::any::type_name::<F>()
    }

    pub fn config(&self) -> &RetryConfig<T, E> {
        &self.config
    }
}

impl<F, T, E> Retriable<F, T, E>
where
    F: Fn() -> Result<T, E>,
{
    /// Call the operation until it succeeds or the stop condition gives up.
    ///
    /// Returns [`RetryError::NoAttempts`] when the stop condition holds before the first attempt.
    pub fn call(&self) -> Result<T, RetryError<E>> {
        tracing::trace!(operation = self.name(), "blocking call");
        drive(Attempting::new(self.config.clone()), || (self.op)())
    }
}

impl<F, Fut, T, E> Retriable<F, T, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    /// Await the operation until it succeeds or the stop condition gives up.
    pub async fn call_async(&self) -> Result<T, RetryError<E>> {
        tracing::trace!(operation = self.name(), "async call");
        drive_async(AsyncAttempting::new(self.config.clone()), || (self.op)()).await
    }
}

impl<F: Clone, T, E> Clone for Retriable<F, T, E> {
    fn clone(&self) -> Self {
        Self { op: self.op.clone(), config: self.config.clone() }
    }
}

impl<F, T, E> fmt::Debug for Retriable<F, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retriable")
            .field("op", &self.name())
            .field("config", &self.config)
            .finish()
    }
}

/// Run `op` once through a fresh blocking driver.
pub fn retry<T, E, F>(
    config: impl Into<Arc<RetryConfig<T, E>>>,
    op: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Result<T, E>,
{
    drive(Attempting::new(config), op)
}

/// Run `op` once through a fresh suspending driver.
pub async fn retry_async<T, E, F, Fut>(
    config: impl Into<Arc<RetryConfig<T, E>>>,
    op: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    drive_async(AsyncAttempting::new(config), op).await
}

fn drive<T, E, F>(mut attempts: Attempting<T, E>, mut op: F) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Result<T, E>,
{
    while let Some(attempt) = attempts.next_attempt()? {
        attempt.run(&mut op)?;
    }
    attempts.into_last_attempt().and_then(AttemptState::into_result).ok_or(RetryError::NoAttempts)
}

async fn drive_async<T, E, F, Fut>(
    mut attempts: AsyncAttempting<T, E>,
    mut op: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    while let Some(attempt) = attempts.next_attempt().await? {
        attempt.run_async(op()).await?;
    }
    attempts.into_last_attempt().and_then(AttemptState::into_result).ok_or(RetryError::NoAttempts)
}
