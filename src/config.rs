//! Retry configuration shared by both attempt drivers.
//!
//! Semantics:
//! - The *effective* stop condition is `AnyOf(user condition, NoFailure)` when a user condition
//!   is supplied and plain `NoFailure` otherwise. A successful attempt therefore always ends the
//!   sequence, and with no user condition a failing operation is retried without bound.
//! - `max_attempts(n)` adds `AttemptsExhausted(n)` to the user condition (any-of with `until`).
//! - Hooks and the wait specification are fixed once `build()` returns.
//!
//! Example
//! ```rust
//! use std::time::Duration;
//! use mule::{Backoff, Jitter, RetryConfig, Wait};
//!
//! let config = RetryConfig::<u32, std::io::Error>::builder()
//!     .max_attempts(5)
//!     .wait(Wait::backoff(Backoff::exponential(Duration::from_millis(100)), Jitter::full()))
//!     .on_failure(|state| eprintln!("attempt {} failed", state.attempt()))
//!     .build()
//!     .unwrap();
//! # let _ = config;
//! ```

use crate::error::{BoxError, BuildError};
use crate::hooks::{Hook, HookPoint, Hooks};
use crate::sleeper::{BlockingSleeper, Sleeper, ThreadSleeper, TokioSleeper};
use crate::state::AttemptState;
use crate::stop::{AnyOf, AttemptsExhausted, NoFailure, StopCondition};
use crate::wait::{Wait, WaitResult};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Immutable retry configuration: effective stop condition, wait specification, hooks, sleepers.
pub struct RetryConfig<T, E> {
    stop: Arc<dyn StopCondition<T, E>>,
    user_stop: bool,
    wait: Wait<T, E>,
    hooks: Hooks<T, E>,
    sleeper: Arc<dyn Sleeper>,
    blocking_sleeper: Arc<dyn BlockingSleeper>,
}

impl<T, E> RetryConfig<T, E>
where
    T: 'static,
    E: 'static,
{
    /// Construct a new builder with defaults.
    pub fn builder() -> RetryConfigBuilder<T, E> {
        RetryConfigBuilder::new()
    }

    /// Stop only on success, never wait, no hooks.
    pub fn new() -> Self {
        Self {
            stop: Arc::new(NoFailure),
            user_stop: false,
            wait: Wait::None,
            hooks: Hooks::new(),
            sleeper: Arc::new(TokioSleeper),
            blocking_sleeper: Arc::new(ThreadSleeper),
        }
    }
}

impl<T, E> RetryConfig<T, E> {
    /// The effective stop condition consulted by the drivers.
    pub fn stop_condition(&self) -> &dyn StopCondition<T, E> {
        self.stop.as_ref()
    }

    /// Whether a caller-supplied condition is part of the effective one.
    pub fn has_user_condition(&self) -> bool {
        self.user_stop
    }

    pub fn wait(&self) -> &Wait<T, E> {
        &self.wait
    }

    pub fn hooks(&self) -> &Hooks<T, E> {
        &self.hooks
    }

    pub fn sleeper(&self) -> &Arc<dyn Sleeper> {
        &self.sleeper
    }

    pub fn blocking_sleeper(&self) -> &Arc<dyn BlockingSleeper> {
        &self.blocking_sleeper
    }
}

impl<T: 'static, E: 'static> Default for RetryConfig<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> fmt::Debug for RetryConfig<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryConfig")
            .field("stop", &if self.user_stop { "AnyOf(<until>, NoFailure)" } else { "NoFailure" })
            .field("wait", &self.wait)
            .field("hooks", &self.hooks)
            .field("sleeper", &self.sleeper)
            .field("blocking_sleeper", &self.blocking_sleeper)
            .finish()
    }
}

/// Builder for `RetryConfig`.
pub struct RetryConfigBuilder<T, E> {
    until: Option<Arc<dyn StopCondition<T, E>>>,
    max_attempts: Option<usize>,
    wait: Wait<T, E>,
    hooks: Hooks<T, E>,
    sleeper: Arc<dyn Sleeper>,
    blocking_sleeper: Arc<dyn BlockingSleeper>,
}

impl<T, E> RetryConfigBuilder<T, E>
where
    T: 'static,
    E: 'static,
{
    /// Create a builder with defaults: stop on success only, no wait, no hooks.
    pub fn new() -> Self {
        Self {
            until: None,
            max_attempts: None,
            wait: Wait::None,
            hooks: Hooks::new(),
            sleeper: Arc::new(TokioSleeper),
            blocking_sleeper: Arc::new(ThreadSleeper),
        }
    }

    /// Caller-supplied stop condition. Replaces any previous `until`.
    pub fn until<C>(mut self, condition: C) -> Self
    where
        C: StopCondition<T, E> + 'static,
    {
        self.until = Some(Arc::new(condition));
        self
    }

    /// Stop after `attempts` failed attempts. Must be > 0; checked by `build`.
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Wait specification: a `Duration`, seconds, a `Backoff` or a [`Wait`].
    pub fn wait<W>(mut self, wait: W) -> Self
    where
        W: Into<Wait<T, E>>,
    {
        self.wait = wait.into();
        self
    }

    /// Callable wait computed from the previous and next attempt.
    pub fn wait_fn<F>(self, f: F) -> Self
    where
        F: Fn(Option<&AttemptState<T, E>>, &AttemptState<T, E>) -> Option<Duration>
            + Send
            + Sync
            + 'static,
    {
        self.wait(Wait::from_fn(f))
    }

    /// Fallible callable wait; an error aborts the sequence.
    pub fn try_wait_fn<F>(self, f: F) -> Self
    where
        F: Fn(Option<&AttemptState<T, E>>, &AttemptState<T, E>) -> WaitResult
            + Send
            + Sync
            + 'static,
    {
        self.wait(Wait::try_from_fn(f))
    }

    /// Append a fallible hook at `point`.
    pub fn try_hook<F>(mut self, point: HookPoint, hook: F) -> Self
    where
        F: Fn(&AttemptState<T, E>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        let hook: Hook<T, E> = Arc::new(hook);
        self.hooks.push(point, hook);
        self
    }

    /// Append an infallible hook at `point`.
    pub fn hook<F>(self, point: HookPoint, hook: F) -> Self
    where
        F: Fn(&AttemptState<T, E>) + Send + Sync + 'static,
    {
        self.try_hook(point, move |state: &AttemptState<T, E>| -> Result<(), BoxError> {
            hook(state);
            Ok(())
        })
    }

    pub fn before_attempt<F>(self, hook: F) -> Self
    where
        F: Fn(&AttemptState<T, E>) + Send + Sync + 'static,
    {
        self.hook(HookPoint::BeforeAttempt, hook)
    }

    pub fn on_success<F>(self, hook: F) -> Self
    where
        F: Fn(&AttemptState<T, E>) + Send + Sync + 'static,
    {
        self.hook(HookPoint::OnSuccess, hook)
    }

    pub fn on_failure<F>(self, hook: F) -> Self
    where
        F: Fn(&AttemptState<T, E>) + Send + Sync + 'static,
    {
        self.hook(HookPoint::OnFailure, hook)
    }

    pub fn before_wait<F>(self, hook: F) -> Self
    where
        F: Fn(&AttemptState<T, E>) + Send + Sync + 'static,
    {
        self.hook(HookPoint::BeforeWait, hook)
    }

    pub fn after_wait<F>(self, hook: F) -> Self
    where
        F: Fn(&AttemptState<T, E>) + Send + Sync + 'static,
    {
        self.hook(HookPoint::AfterWait, hook)
    }

    /// Sleeper used by the suspending driver.
    pub fn with_sleeper<S>(mut self, sleeper: S) -> Self
    where
        S: Sleeper + 'static,
    {
        self.sleeper = Arc::new(sleeper);
        self
    }

    /// Sleeper used by the blocking driver.
    pub fn with_blocking_sleeper<S>(mut self, sleeper: S) -> Self
    where
        S: BlockingSleeper + 'static,
    {
        self.blocking_sleeper = Arc::new(sleeper);
        self
    }

    /// Build the configuration, validating inputs.
    pub fn build(self) -> Result<RetryConfig<T, E>, BuildError> {
        let bound = self.max_attempts.map(AttemptsExhausted::new).transpose()?;
        let user: Option<Arc<dyn StopCondition<T, E>>> = match (self.until, bound) {
            (None, None) => None,
            (Some(until), None) => Some(until),
            (None, Some(bound)) => Some(Arc::new(bound)),
            (Some(until), Some(bound)) => {
                Some(Arc::new(AnyOf::new().with_shared(until).with(bound)))
            }
        };
        let user_stop = user.is_some();
        let stop: Arc<dyn StopCondition<T, E>> = match user {
            Some(user) => Arc::new(AnyOf::new().with_shared(user).with(NoFailure)),
            None => Arc::new(NoFailure),
        };
        Ok(RetryConfig {
            stop,
            user_stop,
            wait: self.wait,
            hooks: self.hooks,
            sleeper: self.sleeper,
            blocking_sleeper: self.blocking_sleeper,
        })
    }
}

impl<T: 'static, E: 'static> Default for RetryConfigBuilder<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stop::{Always, Not};

    type State = AttemptState<u32, &'static str>;

    #[test]
    fn default_stops_only_on_success() {
        let config: RetryConfig<u32, &'static str> = RetryConfig::default();
        let stop = config.stop_condition();
        assert!(!config.has_user_condition());
        assert!(!stop.is_met(None));
        assert!(stop.is_met(Some(&State::succeeded(1, 1))));
        assert!(!stop.is_met(Some(&State::failed(1_000, "x"))));
    }

    #[test]
    fn success_wins_over_user_condition() {
        // a user condition that would never stop on its own
        let config =
            RetryConfig::<u32, &'static str>::builder().until(Not(Always)).build().unwrap();
        assert!(config.has_user_condition());
        assert!(config.stop_condition().is_met(Some(&State::succeeded(2, 1))));
        assert!(!config.stop_condition().is_met(Some(&State::failed(2, "x"))));
    }

    #[test]
    fn max_attempts_combines_with_until() {
        let config = RetryConfig::<u32, &'static str>::builder()
            .until(crate::stop::FailureMatches::new(|e: &&'static str| *e == "fatal"))
            .max_attempts(3)
            .build()
            .unwrap();
        let stop = config.stop_condition();
        assert!(stop.is_met(Some(&State::failed(1, "fatal"))));
        assert!(!stop.is_met(Some(&State::failed(2, "busy"))));
        assert!(stop.is_met(Some(&State::failed(3, "busy"))));
    }

    #[test]
    fn zero_max_attempts_is_rejected() {
        let err = RetryConfig::<u32, &'static str>::builder().max_attempts(0).build().unwrap_err();
        assert_eq!(err, BuildError::InvalidMaxAttempts(0));
    }

    #[test]
    fn hooks_are_registered_in_order() {
        let config = RetryConfig::<u32, &'static str>::builder()
            .before_attempt(|_| {})
            .before_attempt(|_| {})
            .on_failure(|_| {})
            .try_hook(HookPoint::AfterWait, |_| Ok(()))
            .build()
            .unwrap();
        assert_eq!(config.hooks().at(HookPoint::BeforeAttempt).len(), 2);
        assert_eq!(config.hooks().at(HookPoint::OnFailure).len(), 1);
        assert_eq!(config.hooks().at(HookPoint::AfterWait).len(), 1);
        assert!(config.hooks().at(HookPoint::OnSuccess).is_empty());
    }

    #[test]
    fn wait_accepts_numeric_seconds() {
        let config = RetryConfig::<u32, &'static str>::builder().wait(2.5).build().unwrap();
        let delay = config.wait().resolve(None, &State::new(2)).unwrap();
        assert_eq!(delay, Some(Duration::from_millis(2500)));
    }
}
