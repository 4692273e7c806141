//! Lifecycle observers.
//!
//! Hooks are registered once on the [`RetryConfigBuilder`](crate::RetryConfigBuilder) and fired
//! in registration order on the driver's own execution context. Per attempt `n`:
//!
//! ```text
//! before_wait(n) -> sleep -> after_wait(n)    (n >= 2, only when a delay was resolved)
//! before_attempt(n) -> guarded operation -> on_success(n) | on_failure(n)
//! ```
//!
//! A hook returning an error aborts the sequence with [`RetryError::Hook`]; later hooks in the
//! same list are not run.

use crate::error::{BoxError, RetryError};
use crate::state::AttemptState;
use std::fmt;
use std::sync::Arc;

/// Observer callable receiving a read-only attempt snapshot.
pub type Hook<T, E> = Arc<dyn Fn(&AttemptState<T, E>) -> Result<(), BoxError> + Send + Sync>;

/// Lifecycle point a hook is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPoint {
    BeforeAttempt,
    OnSuccess,
    OnFailure,
    BeforeWait,
    AfterWait,
}

impl HookPoint {
    pub const ALL: [HookPoint; 5] = [
        HookPoint::BeforeAttempt,
        HookPoint::OnSuccess,
        HookPoint::OnFailure,
        HookPoint::BeforeWait,
        HookPoint::AfterWait,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HookPoint::BeforeAttempt => "before_attempt",
            HookPoint::OnSuccess => "on_success",
            HookPoint::OnFailure => "on_failure",
            HookPoint::BeforeWait => "before_wait",
            HookPoint::AfterWait => "after_wait",
        }
    }
}

impl fmt::Display for HookPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered hook lists, one per [`HookPoint`].
pub struct Hooks<T, E> {
    before_attempt: Vec<Hook<T, E>>,
    on_success: Vec<Hook<T, E>>,
    on_failure: Vec<Hook<T, E>>,
    before_wait: Vec<Hook<T, E>>,
    after_wait: Vec<Hook<T, E>>,
}

impl<T, E> Hooks<T, E> {
    pub fn new() -> Self {
        Self {
            before_attempt: Vec::new(),
            on_success: Vec::new(),
            on_failure: Vec::new(),
            before_wait: Vec::new(),
            after_wait: Vec::new(),
        }
    }

    /// Hooks registered at `point`, in firing order.
    pub fn at(&self, point: HookPoint) -> &[Hook<T, E>] {
        match point {
            HookPoint::BeforeAttempt => &self.before_attempt,
            HookPoint::OnSuccess => &self.on_success,
            HookPoint::OnFailure => &self.on_failure,
            HookPoint::BeforeWait => &self.before_wait,
            HookPoint::AfterWait => &self.after_wait,
        }
    }

    pub fn is_empty(&self) -> bool {
        HookPoint::ALL.iter().all(|point| self.at(*point).is_empty())
    }

    pub(crate) fn push(&mut self, point: HookPoint, hook: Hook<T, E>) {
        let list = match point {
            HookPoint::BeforeAttempt => &mut self.before_attempt,
            HookPoint::OnSuccess => &mut self.on_success,
            HookPoint::OnFailure => &mut self.on_failure,
            HookPoint::BeforeWait => &mut self.before_wait,
            HookPoint::AfterWait => &mut self.after_wait,
        };
        list.push(hook);
    }

    /// Fire every hook at `point` in order, stopping at the first error.
    pub(crate) fn dispatch(
        &self,
        point: HookPoint,
        state: &AttemptState<T, E>,
    ) -> Result<(), RetryError<E>> {
        for hook in self.at(point) {
            if let Err(source) = hook(state) {
                tracing::debug!(
                    hook = %point,
                    attempt = state.attempt(),
                    "hook failed; aborting sequence"
                );
                return Err(RetryError::Hook { point, attempt: state.attempt(), source });
            }
        }
        Ok(())
    }
}

impl<T, E> Default for Hooks<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> Clone for Hooks<T, E> {
    fn clone(&self) -> Self {
        Self {
            before_attempt: self.before_attempt.clone(),
            on_success: self.on_success.clone(),
            on_failure: self.on_failure.clone(),
            before_wait: self.before_wait.clone(),
            after_wait: self.after_wait.clone(),
        }
    }
}

impl<T, E> fmt::Debug for Hooks<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("before_attempt", &self.before_attempt.len())
            .field("on_success", &self.on_success.len())
            .field("on_failure", &self.on_failure.len())
            .field("before_wait", &self.before_wait.len())
            .field("after_wait", &self.after_wait.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    type State = AttemptState<(), &'static str>;

    fn hook<F>(f: F) -> Hook<(), &'static str>
    where
        F: Fn(&State) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Arc::new(f)
    }

    #[test]
    fn dispatch_runs_in_registration_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut hooks: Hooks<(), &'static str> = Hooks::new();
        for tag in ["first", "second", "third"] {
            let seen = seen.clone();
            hooks.push(
                HookPoint::BeforeAttempt,
                hook(move |s| {
                    seen.lock().unwrap().push((tag, s.attempt()));
                    Ok(())
                }),
            );
        }

        hooks.dispatch(HookPoint::BeforeAttempt, &State::new(4)).unwrap();
        hooks.dispatch(HookPoint::OnSuccess, &State::new(4)).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![("first", 4), ("second", 4), ("third", 4)]);
    }

    #[test]
    fn dispatch_stops_at_first_error() {
        let later = Arc::new(Mutex::new(0));
        let later_clone = later.clone();
        let mut hooks: Hooks<(), &'static str> = Hooks::new();
        hooks.push(HookPoint::OnFailure, hook(|_| Err("observer down".into())));
        hooks.push(
            HookPoint::OnFailure,
            hook(move |_| {
                *later_clone.lock().unwrap() += 1;
                Ok(())
            }),
        );

        let err = hooks.dispatch(HookPoint::OnFailure, &State::failed(2, "x")).unwrap_err();
        assert_eq!(err.hook_point(), Some(HookPoint::OnFailure));
        assert_eq!(err.attempt(), Some(2));
        assert_eq!(*later.lock().unwrap(), 0);
    }

    #[test]
    fn points_have_stable_names() {
        let names: Vec<_> = HookPoint::ALL.iter().map(|p| p.to_string()).collect();
        assert_eq!(
            names,
            ["before_attempt", "on_success", "on_failure", "before_wait", "after_wait"]
        );
        assert!(Hooks::<(), ()>::default().is_empty());
    }
}
