//! Per-attempt outcome record.

/// Outcome of a single attempt.
///
/// A state is created when its attempt is allocated (no failure, no result) and filled in once
/// when the attempt's scope closes. Hooks and stop conditions only ever see it by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptState<T, E> {
    attempt: usize,
    failure: Option<E>,
    result: Option<T>,
}

impl<T, E> AttemptState<T, E> {
    /// A freshly allocated attempt with nothing recorded yet. Attempt numbers start at 1.
    pub fn new(attempt: usize) -> Self {
        debug_assert!(attempt >= 1, "attempt numbers are 1-based");
        Self { attempt, failure: None, result: None }
    }

    /// A closed attempt that produced `value`.
    pub fn succeeded(attempt: usize, value: T) -> Self {
        Self { attempt, failure: None, result: Some(value) }
    }

    /// A closed attempt that failed with `failure`.
    pub fn failed(attempt: usize, failure: E) -> Self {
        Self { attempt, failure: Some(failure), result: None }
    }

    /// 1-based attempt number.
    pub fn attempt(&self) -> usize {
        self.attempt
    }

    pub fn failure(&self) -> Option<&E> {
        self.failure.as_ref()
    }

    /// Value produced by the attempt. `None` until the scope closes successfully.
    pub fn result(&self) -> Option<&T> {
        self.result.as_ref()
    }

    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }

    /// True when no failure was recorded.
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    pub(crate) fn record(&mut self, outcome: Result<T, E>) {
        match outcome {
            Ok(value) => self.result = Some(value),
            Err(failure) => self.failure = Some(failure),
        }
    }

    /// Consume the record, keeping the produced value.
    pub fn into_result(self) -> Option<T> {
        self.result
    }

    /// Consume the record, keeping the captured failure.
    pub fn into_failure(self) -> Option<E> {
        self.failure
    }
}

/// Where a driver is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Still producing attempts.
    Running,
    /// Halted after an attempt without failure.
    Succeeded,
    /// Halted with the last attempt's failure handed back to the caller.
    Exhausted,
    /// Halted before any attempt was made.
    Unattempted,
    /// A hook or wait callable failed, or an in-flight attempt was cancelled.
    Aborted,
}

impl Phase {
    pub fn is_halted(self) -> bool {
        self != Phase::Running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_has_no_outcome() {
        let state: AttemptState<u32, &str> = AttemptState::new(1);
        assert_eq!(state.attempt(), 1);
        assert!(state.failure().is_none());
        assert!(state.result().is_none());
        assert!(state.is_success());
    }

    #[test]
    fn record_stores_exactly_one_side() {
        let mut ok: AttemptState<u32, &str> = AttemptState::new(2);
        ok.record(Ok(7));
        assert_eq!(ok.result(), Some(&7));
        assert!(!ok.is_failure());

        let mut err: AttemptState<u32, &str> = AttemptState::new(3);
        err.record(Err("nope"));
        assert_eq!(err.failure(), Some(&"nope"));
        assert!(err.result().is_none());
        assert_eq!(err.clone().into_result(), None);
        assert_eq!(err.into_failure(), Some("nope"));
        assert_eq!(ok.into_result(), Some(7));
    }

    #[test]
    fn halted_phases() {
        assert!(!Phase::Running.is_halted());
        for phase in [Phase::Succeeded, Phase::Exhausted, Phase::Unattempted, Phase::Aborted] {
            assert!(phase.is_halted());
        }
    }
}
