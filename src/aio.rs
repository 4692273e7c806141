//! Suspending sequential attempt driver.
//!
//! Same transition rules as [`Attempting`](crate::Attempting); the wait between attempts goes
//! through the configured [`Sleeper`](crate::Sleeper) and suspends only the calling task.
//!
//! ```rust
//! use mule::{AsyncAttempting, InstantSleeper, RetryConfig};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let config = RetryConfig::<&str, std::io::Error>::builder()
//!     .max_attempts(2)
//!     .with_sleeper(InstantSleeper)
//!     .build()
//!     .unwrap();
//! let mut attempts = AsyncAttempting::new(config);
//! while let Some(attempt) = attempts.next_attempt().await.unwrap() {
//!     attempt.run_async(async { Ok("pong") }).await.unwrap();
//! }
//! let reply = attempts.into_last_attempt().and_then(|s| s.into_result());
//! assert_eq!(reply, Some("pong"));
//! # }
//! ```

use crate::config::RetryConfig;
use crate::context::AttemptContext;
use crate::engine::{Engine, Step};
use crate::error::RetryError;
use crate::hooks::HookPoint;
use crate::state::{AttemptState, Phase};
use std::fmt;
use std::sync::Arc;

/// Asynchronous counterpart of [`Attempting`](crate::Attempting).
///
/// Dropping the future returned by [`AsyncAttempting::next_attempt`] while it sleeps simply
/// abandons the wait; dropping a scope while [`AttemptContext::run_async`] awaits the operation
/// aborts the sequence.
pub struct AsyncAttempting<T, E> {
    engine: Engine<T, E>,
}

impl<T, E> AsyncAttempting<T, E> {
    pub fn new(config: impl Into<Arc<RetryConfig<T, E>>>) -> Self {
        Self { engine: Engine::new(config.into()) }
    }

    /// Produce the next attempt scope, suspending for the resolved wait first.
    ///
    /// Returns the same values as [`Attempting::next_attempt`](crate::Attempting::next_attempt).
    pub async fn next_attempt(
        &mut self,
    ) -> Result<Option<AttemptContext<'_, T, E>>, RetryError<E>> {
        let (next, delay) = match self.engine.step()? {
            Step::Attempt { next, delay } => (next, delay),
            Step::Halt => return Ok(None),
        };
        if let Some(delay) = delay {
            self.engine.notify(HookPoint::BeforeWait, &next)?;
            let sleep = self.engine.config().sleeper().sleep(delay);
            sleep.await;
            self.engine.notify(HookPoint::AfterWait, &next)?;
        }
        let next = self.engine.begin(next)?;
        Ok(Some(AttemptContext::new(&mut self.engine, next)))
    }

    /// See [`Attempting::last_attempt`](crate::Attempting::last_attempt).
    pub fn last_attempt(&self) -> Option<&AttemptState<T, E>> {
        self.engine.last()
    }

    pub fn into_last_attempt(self) -> Option<AttemptState<T, E>> {
        self.engine.into_last()
    }

    pub fn phase(&self) -> Phase {
        self.engine.phase()
    }

    pub fn config(&self) -> &RetryConfig<T, E> {
        self.engine.config()
    }
}

impl<T, E> fmt::Debug for AsyncAttempting<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncAttempting")
            .field("phase", &self.engine.phase())
            .field("last_attempt", &self.engine.last().map(AttemptState::attempt))
            .finish()
    }
}
