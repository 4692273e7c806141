//! Scoped attempt.
//!
//! An [`AttemptContext`] is handed out by a driver for exactly one attempt. Closing it records the
//! outcome of the guarded operation: a failure is captured into the attempt's state and does
//! *not* escape; the driver decides later, through the stop condition, whether to hand that
//! failure back to the caller.
//!
//! Dropping a context without closing it counts as the scope exiting normally: the attempt is
//! recorded as a success without a value. A context dropped during a panic, or abandoned while
//! [`AttemptContext::run_async`] was awaiting the operation, records nothing and aborts the
//! sequence.

use crate::engine::Engine;
use crate::error::RetryError;
use crate::state::AttemptState;
use std::future::Future;

/// One in-flight attempt. Borrows its driver, so only one can be open at a time.
pub struct AttemptContext<'a, T, E> {
    engine: &'a mut Engine<T, E>,
    state: Option<AttemptState<T, E>>,
    attempt: usize,
    in_flight: bool,
}

impl<'a, T, E> AttemptContext<'a, T, E> {
    pub(crate) fn new(engine: &'a mut Engine<T, E>, state: AttemptState<T, E>) -> Self {
        let attempt = state.attempt();
        Self { engine, state: Some(state), attempt, in_flight: false }
    }

    /// 1-based attempt number.
    pub fn attempt(&self) -> usize {
        self.attempt
    }

    /// Close the scope with the operation's outcome.
    ///
    /// The outcome is recorded on the driver as-is: a produced value stays readable through
    /// `last_attempt()` and is handed over by `into_last_attempt()`. Outcome hooks fire before
    /// this returns; a failing hook aborts the sequence.
    pub fn exit(mut self, outcome: Result<T, E>) -> Result<(), RetryError<E>> {
        let Some(mut state) = self.state.take() else {
            return Ok(());
        };
        state.record(outcome);
        self.engine.close(state);
        self.engine.report()
    }

    /// Run a blocking operation inside this attempt's scope.
    pub fn run<F>(self, op: F) -> Result<(), RetryError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let outcome = op();
        self.exit(outcome)
    }

    /// Await an operation inside this attempt's scope.
    pub async fn run_async<Fut>(mut self, op: Fut) -> Result<(), RetryError<E>>
    where
        Fut: Future<Output = Result<T, E>>,
    {
        self.in_flight = true;
        let outcome = op.await;
        self.in_flight = false;
        self.exit(outcome)
    }
}

impl<T, E> Drop for AttemptContext<'_, T, E> {
    fn drop(&mut self) {
        let Some(state) = self.state.take() else {
            return;
        };
        if self.in_flight || std::thread::panicking() {
            self.engine.cancel(state.attempt());
            return;
        }
        self.engine.close(state);
    }
}
