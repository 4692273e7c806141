//! Wait specification and its resolution between attempts.
//!
//! A [`Wait`] is resolved once per attempt numbered 2 or higher, right after the stop condition
//! decided to continue. The first attempt never waits, whatever the [`Wait`] says.
//!
//! ```rust
//! use std::time::Duration;
//! use mule::{AttemptState, Wait};
//!
//! // 2^(n-1) seconds before attempt n
//! let wait = Wait::from_fn(|_prev: Option<&AttemptState<(), ()>>, next: &AttemptState<(), ()>| {
//!     Some(Duration::from_secs(1 << (next.attempt() - 1)))
//! });
//! let prev = AttemptState::failed(2, ());
//! let delay = wait.resolve(Some(&prev), &AttemptState::new(3)).unwrap();
//! assert_eq!(delay, Some(Duration::from_secs(4)));
//! assert_eq!(wait.resolve(None, &AttemptState::new(1)).unwrap(), None);
//! ```

use crate::backoff::Backoff;
use crate::error::BoxError;
use crate::jitter::Jitter;
use crate::state::AttemptState;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Delay returned by a callable wait; `None` skips the wait this round.
pub type WaitResult = Result<Option<Duration>, BoxError>;

/// Callable wait: `(previous, next) -> delay`.
pub type WaitFn<T, E> =
    Arc<dyn Fn(Option<&AttemptState<T, E>>, &AttemptState<T, E>) -> WaitResult + Send + Sync>;

/// Delay applied between attempts.
pub enum Wait<T, E> {
    /// Never wait.
    None,
    /// Same delay before every retry.
    Fixed(Duration),
    /// Preset growth with optional randomization; retry `k` (attempt `k + 1`) uses
    /// `backoff.delay(k)`.
    Backoff { backoff: Backoff, jitter: Jitter },
    /// Computed from the previous and next attempt.
    Dynamic(WaitFn<T, E>),
}

impl<T, E> Wait<T, E> {
    pub fn none() -> Self {
        Wait::None
    }

    pub fn fixed(delay: Duration) -> Self {
        Wait::Fixed(delay)
    }

    /// Fixed wait in (possibly fractional) seconds. Negative or NaN values mean no delay.
    pub fn seconds(secs: f64) -> Self {
        Wait::Fixed(seconds(secs))
    }

    /// Backoff preset with jitter on top.
    ///
    /// [`Jitter::Decorrelated`] computes its delay from its own bounds and the previous sleep, so
    /// combined with it the preset is ignored. Pair it with [`Backoff::constant`] to make that
    /// visible at the call site.
    pub fn backoff(backoff: Backoff, jitter: Jitter) -> Self {
        Wait::Backoff { backoff, jitter }
    }

    /// Callable wait that cannot fail.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(Option<&AttemptState<T, E>>, &AttemptState<T, E>) -> Option<Duration>
            + Send
            + Sync
            + 'static,
    {
        Wait::Dynamic(Arc::new(
            move |prev: Option<&AttemptState<T, E>>,
                  next: &AttemptState<T, E>|
                  -> WaitResult { Ok(f(prev, next)) },
        ))
    }

    /// Callable wait whose errors abort the sequence with
    /// [`RetryError::Wait`](crate::RetryError::Wait).
    pub fn try_from_fn<F>(f: F) -> Self
    where
        F: Fn(Option<&AttemptState<T, E>>, &AttemptState<T, E>) -> WaitResult
            + Send
            + Sync
            + 'static,
    {
        Wait::Dynamic(Arc::new(f))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Wait::None)
    }

    /// Resolve the delay to apply before `next`. Always `None` for the first attempt.
    ///
    /// Resolves as the first sleep of a sequence; drivers use [`Wait::resolve_after`].
    pub fn resolve(
        &self,
        previous: Option<&AttemptState<T, E>>,
        next: &AttemptState<T, E>,
    ) -> WaitResult {
        self.resolve_after(previous, next, None)
    }

    /// Like [`Wait::resolve`], given the delay slept most recently in the same sequence.
    pub fn resolve_after(
        &self,
        previous: Option<&AttemptState<T, E>>,
        next: &AttemptState<T, E>,
        last_delay: Option<Duration>,
    ) -> WaitResult {
        if next.attempt() <= 1 {
            return Ok(None);
        }
        match self {
            Wait::None => Ok(None),
            Wait::Fixed(delay) => Ok(Some(*delay)),
            Wait::Backoff { backoff, jitter } => {
                Ok(Some(jitter.apply_after(backoff.delay(next.attempt() - 1), last_delay)))
            }
            Wait::Dynamic(f) => f(previous, next),
        }
    }
}

/// Convert numeric seconds into a delay. Negative, zero or NaN values become `Duration::ZERO`;
/// values too large to represent saturate to `Duration::MAX`.
pub fn seconds(secs: f64) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

impl<T, E> Default for Wait<T, E> {
    fn default() -> Self {
        Wait::None
    }
}

impl<T, E> Clone for Wait<T, E> {
    fn clone(&self) -> Self {
        match self {
            Wait::None => Wait::None,
            Wait::Fixed(delay) => Wait::Fixed(*delay),
            Wait::Backoff { backoff, jitter } => {
                Wait::Backoff { backoff: *backoff, jitter: *jitter }
            }
            Wait::Dynamic(f) => Wait::Dynamic(f.clone()),
        }
    }
}

impl<T, E> fmt::Debug for Wait<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Wait::None => f.write_str("None"),
            Wait::Fixed(delay) => f.debug_tuple("Fixed").field(delay).finish(),
            Wait::Backoff { backoff, jitter } => {
                f.debug_struct("Backoff").field("backoff", backoff).field("jitter", jitter).finish()
            }
            Wait::Dynamic(_) => f.write_str("Dynamic(<wait fn>)"),
        }
    }
}

impl<T, E> From<Duration> for Wait<T, E> {
    fn from(delay: Duration) -> Self {
        Wait::Fixed(delay)
    }
}

impl<T, E> From<f64> for Wait<T, E> {
    fn from(secs: f64) -> Self {
        Wait::seconds(secs)
    }
}

impl<T, E> From<u64> for Wait<T, E> {
    fn from(secs: u64) -> Self {
        Wait::Fixed(Duration::from_secs(secs))
    }
}

impl<T, E> From<Backoff> for Wait<T, E> {
    fn from(backoff: Backoff) -> Self {
        Wait::Backoff { backoff, jitter: Jitter::None }
    }
}

impl<T, E> From<Option<Duration>> for Wait<T, E> {
    fn from(delay: Option<Duration>) -> Self {
        delay.map_or(Wait::None, Wait::Fixed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type State = AttemptState<(), &'static str>;

    #[test]
    fn first_attempt_never_waits() {
        let waits: Vec<Wait<(), &'static str>> = vec![
            Wait::fixed(Duration::from_secs(5)),
            Wait::seconds(5.0),
            Wait::backoff(Backoff::constant(Duration::from_secs(1)), Jitter::None),
            Wait::from_fn(|_, _| Some(Duration::from_secs(9))),
            Wait::try_from_fn(|_, _| Err("never consulted".into())),
        ];
        for wait in waits {
            assert_eq!(wait.resolve(None, &State::new(1)).unwrap(), None);
        }
    }

    #[test]
    fn fixed_and_numeric_resolve_unchanged() {
        let prev = State::failed(1, "x");
        let next = State::new(2);
        let resolve = |wait: Wait<(), &'static str>| wait.resolve(Some(&prev), &next).unwrap();
        assert_eq!(resolve(Duration::from_secs(300).into()), Some(Duration::from_secs(300)));
        assert_eq!(resolve(5u64.into()), Some(Duration::from_secs(5)));
        assert_eq!(resolve(1.5.into()), Some(Duration::from_millis(1500)));
        assert_eq!(resolve(Wait::none()), None);
    }

    #[test]
    fn negative_and_nan_seconds_mean_no_delay() {
        assert_eq!(seconds(-3.0), Duration::ZERO);
        assert_eq!(seconds(0.0), Duration::ZERO);
        assert_eq!(seconds(f64::NAN), Duration::ZERO);
        assert_eq!(seconds(f64::INFINITY), Duration::MAX);
    }

    #[test]
    fn callable_sees_previous_and_next() {
        let wait: Wait<(), &'static str> = Wait::from_fn(|prev, next| {
            assert_eq!(prev.map(AttemptState::attempt), Some(next.attempt() - 1));
            Some(Duration::from_secs(1 << (next.attempt() - 1)))
        });
        let delays: Vec<_> = (2..=4)
            .map(|n| wait.resolve(Some(&State::failed(n - 1, "x")), &State::new(n)).unwrap())
            .collect();
        let expected: Vec<_> = [2, 4, 8].iter().map(|&s| Some(Duration::from_secs(s))).collect();
        assert_eq!(delays, expected);
    }

    #[test]
    fn callable_may_skip_or_fail() {
        let skip: Wait<(), &'static str> = Wait::from_fn(|_, _| None);
        assert_eq!(skip.resolve(None, &State::new(2)).unwrap(), None);

        let failing: Wait<(), &'static str> =
            Wait::try_from_fn(|_, _| Err("clock unavailable".into()));
        let err = failing.resolve(None, &State::new(2)).unwrap_err();
        assert_eq!(err.to_string(), "clock unavailable");
    }

    #[test]
    fn backoff_uses_retry_index() {
        let wait: Wait<(), &'static str> = Backoff::exponential(Duration::from_secs(1)).into();
        let delays: Vec<_> = (2..=4).map(|n| wait.resolve(None, &State::new(n)).unwrap()).collect();
        let expected: Vec<_> = [1, 2, 4].iter().map(|&s| Some(Duration::from_secs(s))).collect();
        assert_eq!(delays, expected);
    }

    #[test]
    fn decorrelated_backoff_grows_from_the_sequence_last_delay() {
        let jitter =
            Jitter::decorrelated(Duration::from_millis(100), Duration::from_secs(100)).unwrap();
        let wait: Wait<(), &'static str> =
            Wait::backoff(Backoff::exponential(Duration::from_secs(50)), jitter);
        for _ in 0..50 {
            // the 50s preset never shows through; only base and history bound the delay
            let first = wait.resolve_after(None, &State::new(2), None).unwrap().unwrap();
            assert!(first >= Duration::from_millis(100) && first <= Duration::from_millis(300));
            let later = wait.resolve_after(None, &State::new(3), Some(first)).unwrap().unwrap();
            assert!(later >= Duration::from_millis(100) && later <= first * 3);
        }
    }
}
