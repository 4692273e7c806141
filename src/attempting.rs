//! Blocking sequential attempt driver.
//!
//! ```rust
//! use mule::{Attempting, RetryConfig};
//!
//! let config = RetryConfig::<u32, String>::builder().max_attempts(3).build().unwrap();
//! let mut calls = 0;
//! let mut attempts = Attempting::new(config);
//! while let Some(attempt) = attempts.next_attempt().unwrap() {
//!     calls += 1;
//!     attempt.run(|| if calls < 2 { Err("flaky".to_string()) } else { Ok(7) }).unwrap();
//! }
//! assert_eq!(attempts.last_attempt().and_then(|s| s.result()), Some(&7));
//! assert_eq!(calls, 2);
//! ```

use crate::config::RetryConfig;
use crate::context::AttemptContext;
use crate::engine::{Engine, Step};
use crate::error::RetryError;
use crate::hooks::HookPoint;
use crate::state::{AttemptState, Phase};
use std::fmt;
use std::sync::Arc;

/// Produces attempt scopes one at a time, sleeping the calling thread between them.
///
/// Single-consumer: [`Attempting::next_attempt`] borrows the driver mutably for as long as the
/// returned scope is open. Once it returns `Ok(None)` or an error the driver is halted and keeps
/// returning `Ok(None)`.
pub struct Attempting<T, E> {
    engine: Engine<T, E>,
}

impl<T, E> Attempting<T, E> {
    pub fn new(config: impl Into<Arc<RetryConfig<T, E>>>) -> Self {
        Self { engine: Engine::new(config.into()) }
    }

    /// Produce the next attempt scope.
    ///
    /// - `Ok(Some(ctx))`: run the operation inside `ctx`
    /// - `Ok(None)`: the sequence ended without a failure to report
    /// - `Err(RetryError::Inner(e))`: the stop condition was met after a failed attempt; `e` is
    ///   that attempt's failure
    /// - `Err(RetryError::Hook { .. } | RetryError::Wait { .. })`: a hook or wait callable failed
    pub fn next_attempt(&mut self) -> Result<Option<AttemptContext<'_, T, E>>, RetryError<E>> {
        let (next, delay) = match self.engine.step()? {
            Step::Attempt { next, delay } => (next, delay),
            Step::Halt => return Ok(None),
        };
        if let Some(delay) = delay {
            self.engine.notify(HookPoint::BeforeWait, &next)?;
            let sleeper = self.engine.config().blocking_sleeper().clone();
            sleeper.sleep_blocking(delay);
            self.engine.notify(HookPoint::AfterWait, &next)?;
        }
        let next = self.engine.begin(next)?;
        Ok(Some(AttemptContext::new(&mut self.engine, next)))
    }

    /// The most recently closed attempt, exactly as it was recorded.
    ///
    /// `None` before the first attempt closes, after an aborted attempt, and once the sequence is
    /// exhausted: the failing record leaves the driver inside [`RetryError::Inner`].
    pub fn last_attempt(&self) -> Option<&AttemptState<T, E>> {
        self.engine.last()
    }

    /// Consume the driver, handing over the last recorded attempt.
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

impl<T, E> fmt::Debug for Attempting<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attempting")
            .field("phase", &self.engine.phase())
            .field("last_attempt", &self.engine.last().map(AttemptState::attempt))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sleeper::TrackingSleeper;
    use crate::stop::AttemptsExhausted;
    use std::sync::Mutex;
    use std::time::Duration;

    #[test]
    fn stops_on_first_success() {
        let mut attempts = Attempting::new(RetryConfig::<u32, &'static str>::default());
        let mut seen = Vec::new();
        while let Some(ctx) = attempts.next_attempt().unwrap() {
            seen.push(ctx.attempt());
            ctx.exit(Ok(1)).unwrap();
        }
        assert_eq!(seen, vec![1]);
        assert_eq!(attempts.phase(), Phase::Succeeded);
        assert!(attempts.next_attempt().unwrap().is_none());
    }

    #[test]
    fn exhaustion_returns_last_failure_and_sleeps_between() {
        let sleeper = TrackingSleeper::new();
        let config = RetryConfig::<u32, String>::builder()
            .until(AttemptsExhausted::new(3).unwrap())
            .wait(Duration::from_millis(25))
            .with_blocking_sleeper(sleeper.clone())
            .build()
            .unwrap();
        let mut attempts = Attempting::new(config);

        let err = loop {
            match attempts.next_attempt() {
                Ok(Some(ctx)) => {
                    let n = ctx.attempt();
                    ctx.run(|| Err(format!("failure {}", n))).unwrap();
                }
                Ok(None) => panic!("sequence should end in failure"),
                Err(err) => break err,
            }
        };
        assert_eq!(err.into_inner(), Some("failure 3".to_string()));
        assert_eq!(sleeper.calls(), vec![Duration::from_millis(25); 2]);
        assert_eq!(attempts.phase(), Phase::Exhausted);
        // never reports a success for an exhausted sequence
        assert!(attempts.last_attempt().is_none());
        assert!(attempts.next_attempt().unwrap().is_none());
        assert!(attempts.into_last_attempt().is_none());
    }

    #[test]
    fn success_record_survives_halting() {
        let mut attempts = Attempting::new(RetryConfig::<u32, &'static str>::default());
        while let Some(ctx) = attempts.next_attempt().unwrap() {
            ctx.exit(Ok(5)).unwrap();
        }
        assert_eq!(attempts.phase(), Phase::Succeeded);
        assert_eq!(attempts.last_attempt(), Some(&AttemptState::succeeded(1, 5)));
        assert_eq!(attempts.into_last_attempt().and_then(AttemptState::into_result), Some(5));
    }

    #[test]
    fn wait_hooks_bracket_the_sleep() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (before, after) = (log.clone(), log.clone());
        let config = RetryConfig::<(), &'static str>::builder()
            .max_attempts(2)
            .wait(Duration::from_secs(1))
            .before_wait(move |s| {
                before.lock().unwrap().push(format!("before_wait {}", s.attempt()))
            })
            .after_wait(move |s| after.lock().unwrap().push(format!("after_wait {}", s.attempt())))
            .with_blocking_sleeper(crate::sleeper::InstantSleeper)
            .build()
            .unwrap();
        let mut attempts = Attempting::new(config);
        while let Ok(Some(ctx)) = attempts.next_attempt() {
            ctx.exit(Err("no")).unwrap();
        }
        assert_eq!(*log.lock().unwrap(), vec!["before_wait 2", "after_wait 2"]);
    }
}
