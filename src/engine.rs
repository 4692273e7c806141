//! Transition logic shared by the blocking and suspending drivers.
//!
//! Each "produce next attempt" request runs:
//!
//! 1. report the previously closed attempt to `on_success` / `on_failure` if not done yet
//! 2. evaluate the effective stop condition against the last attempt (or `None`)
//! 3. if met, halt: hand back the last failure, or end cleanly
//! 4. otherwise allocate attempt `last + 1` and resolve the wait for it
//!
//! The driver then brackets the delay with `before_wait` / `after_wait`, sleeps the way it
//! sleeps, and calls [`Engine::begin`] to fire `before_attempt`. Everything but the sleep lives
//! here, so both drivers follow one set of rules.

use crate::config::RetryConfig;
use crate::error::RetryError;
use crate::hooks::HookPoint;
use crate::jitter::millis;
use crate::state::{AttemptState, Phase};
use std::sync::Arc;
use std::time::Duration;

/// Outcome of a transition request.
pub(crate) enum Step<T, E> {
    /// Produce `next`, after sleeping `delay` if one was resolved.
    Attempt { next: AttemptState<T, E>, delay: Option<Duration> },
    /// The sequence is over without an error to hand back.
    Halt,
}

pub(crate) struct Engine<T, E> {
    config: Arc<RetryConfig<T, E>>,
    last: Option<AttemptState<T, E>>,
    // last closed attempt whose outcome hooks have not fired yet
    unreported: bool,
    // delay slept before the last attempt; decorrelated jitter grows from it
    last_delay: Option<Duration>,
    phase: Phase,
}

impl<T, E> Engine<T, E> {
    pub(crate) fn new(config: Arc<RetryConfig<T, E>>) -> Self {
        Self { config, last: None, unreported: false, last_delay: None, phase: Phase::Running }
    }

    pub(crate) fn config(&self) -> &Arc<RetryConfig<T, E>> {
        &self.config
    }

    pub(crate) fn last(&self) -> Option<&AttemptState<T, E>> {
        self.last.as_ref()
    }

    pub(crate) fn phase(&self) -> Phase {
        self.phase
    }

    pub(crate) fn step(&mut self) -> Result<Step<T, E>, RetryError<E>> {
        if self.phase.is_halted() {
            return Ok(Step::Halt);
        }
        self.report()?;

        if self.config.stop_condition().is_met(self.last.as_ref()) {
            return self.halt();
        }

        let number = self.last.as_ref().map_or(1, |last| last.attempt() + 1);
        let next = AttemptState::new(number);
        let resolved = self.config.wait().resolve_after(self.last.as_ref(), &next, self.last_delay);
        let delay = match resolved {
            Ok(delay) => delay,
            Err(source) => return Err(self.abort(RetryError::Wait { attempt: number, source })),
        };
        if let Some(delay) = delay {
            tracing::trace!(attempt = number, delay_ms = millis(delay), "wait resolved");
            self.last_delay = Some(delay);
        }
        Ok(Step::Attempt { next, delay })
    }

    /// Fire `before_wait` / `after_wait` for the attempt about to run.
    pub(crate) fn notify(
        &mut self,
        point: HookPoint,
        next: &AttemptState<T, E>,
    ) -> Result<(), RetryError<E>> {
        let dispatched = self.config.hooks().dispatch(point, next);
        dispatched.map_err(|err| self.abort(err))
    }

    /// Fire `before_attempt` and hand the state over to its scope.
    pub(crate) fn begin(
        &mut self,
        next: AttemptState<T, E>,
    ) -> Result<AttemptState<T, E>, RetryError<E>> {
        self.notify(HookPoint::BeforeAttempt, &next)?;
        tracing::debug!(attempt = next.attempt(), "attempt starting");
        Ok(next)
    }

    /// Record a closed attempt. Its outcome hooks fire on the next [`Engine::report`]; the record
    /// is never modified afterwards.
    pub(crate) fn close(&mut self, state: AttemptState<T, E>) {
        if state.is_failure() {
            tracing::debug!(attempt = state.attempt(), error = "captured", "attempt failed");
        }
        self.last = Some(state);
        self.unreported = true;
    }

    /// Fire `on_success` / `on_failure` for the last closed attempt, once.
    pub(crate) fn report(&mut self) -> Result<(), RetryError<E>> {
        if !std::mem::take(&mut self.unreported) {
            return Ok(());
        }
        let dispatched = match self.last.as_ref() {
            Some(last) if last.is_failure() => {
                self.config.hooks().dispatch(HookPoint::OnFailure, last)
            }
            Some(last) => self.config.hooks().dispatch(HookPoint::OnSuccess, last),
            None => Ok(()),
        };
        dispatched.map_err(|err| self.abort(err))
    }

    /// Hand the whole last record over, ending the engine.
    pub(crate) fn into_last(self) -> Option<AttemptState<T, E>> {
        self.last
    }

    /// End the sequence because the in-flight attempt was abandoned.
    pub(crate) fn cancel(&mut self, attempt: usize) {
        tracing::debug!(attempt, "attempt abandoned before its scope closed");
        self.phase = Phase::Aborted;
    }

    fn halt(&mut self) -> Result<Step<T, E>, RetryError<E>> {
        match self.last.as_ref() {
            None => {
                tracing::debug!("stop condition met before the first attempt");
                self.phase = Phase::Unattempted;
                Ok(Step::Halt)
            }
            Some(last) if last.is_failure() => {
                tracing::warn!(
                    attempts = last.attempt(),
                    "retries exhausted; returning last failure"
                );
                self.phase = Phase::Exhausted;
                // the record leaves the driver whole, carrying its failure back to the caller
                match self.last.take().and_then(AttemptState::into_failure) {
                    Some(failure) => Err(RetryError::Inner(failure)),
                    None => Ok(Step::Halt),
                }
            }
            Some(last) => {
                tracing::debug!(attempts = last.attempt(), "sequence succeeded");
                self.phase = Phase::Succeeded;
                Ok(Step::Halt)
            }
        }
    }

    fn abort(&mut self, err: RetryError<E>) -> RetryError<E> {
        self.phase = Phase::Aborted;
        err
    }
}
