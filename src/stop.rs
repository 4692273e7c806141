//! Stop-condition algebra.
//!
//! A [`StopCondition`] looks at the previous attempt (or `None` before the first attempt) and
//! decides whether the sequence should end. Leaves:
//!
//! - [`NoFailure`] - the previous attempt recorded no failure
//! - [`AttemptsExhausted`] - the previous attempt failed and was the `max`-th
//! - [`FailureMatches`] - the previous attempt's failure satisfies a predicate
//! - [`Always`] - unconditionally true
//!
//! Composites: [`AllOf`] / [`AnyOf`] over any number of children, [`Not`] for negation.
//!
//! # Operator sugar
//!
//! Wrapping conditions in [`Stop`] enables `|`, `&` and `!`:
//!
//! ```text
//! Stop(a) | Stop(b)   // Or(a, b)
//! Stop(a) & Stop(b)   // And(a, b)
//! !Stop(a)            // Not(a)
//! ```
//!
//! `&` binds tighter than `|`, so `Stop(a) | Stop(b) & Stop(c)` is `a | (b & c)`.
//!
//! ```
//! use mule::stop::{AttemptsExhausted, FailureMatches, Stop, StopCondition};
//! use mule::AttemptState;
//!
//! # fn main() -> Result<(), mule::BuildError> {
//! // Give up after 5 failures, or immediately on a permission error.
//! let denial = FailureMatches::new(|e: &String| e == "denied");
//! let until = Stop(AttemptsExhausted::new(5)?) | Stop(denial);
//!
//! let denied = AttemptState::<(), String>::failed(1, "denied".to_string());
//! let busy = AttemptState::<(), String>::failed(1, "busy".to_string());
//! let fifth = AttemptState::<(), String>::failed(5, "busy".to_string());
//! assert!(until.is_met(Some(&denied)));
//! assert!(!until.is_met(Some(&busy)));
//! assert!(until.is_met(Some(&fifth)));
//! # Ok(())
//! # }
//! ```
//!
//! Every combinator evaluates all of its children; conditions are pure, so there is nothing to
//! short-circuit for.

use crate::error::BuildError;
use crate::state::AttemptState;
use std::fmt;
use std::ops::{BitAnd, BitOr};
use std::sync::Arc;

/// Decides whether a retry sequence should end, given the previous attempt.
pub trait StopCondition<T, E>: Send + Sync {
    /// `previous` is `None` when no attempt has been made yet.
    fn is_met(&self, previous: Option<&AttemptState<T, E>>) -> bool;
}

impl<T, E, C> StopCondition<T, E> for Box<C>
where
    C: StopCondition<T, E> + ?Sized,
{
    fn is_met(&self, previous: Option<&AttemptState<T, E>>) -> bool {
        (**self).is_met(previous)
    }
}

impl<T, E, C> StopCondition<T, E> for Arc<C>
where
    C: StopCondition<T, E> + ?Sized,
{
    fn is_met(&self, previous: Option<&AttemptState<T, E>>) -> bool {
        (**self).is_met(previous)
    }
}

/// Met when the previous attempt exists and recorded no failure.
///
/// Every driver combines the user's condition with this one, so a successful attempt always
/// ends the sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoFailure;

impl<T, E> StopCondition<T, E> for NoFailure {
    fn is_met(&self, previous: Option<&AttemptState<T, E>>) -> bool {
        previous.is_some_and(AttemptState::is_success)
    }
}

/// Met when the previous attempt failed and its number reached `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptsExhausted {
    max: usize,
}

impl AttemptsExhausted {
    /// Bound the sequence to `max` failed attempts. `max` must be > 0.
    pub fn new(max: usize) -> Result<Self, BuildError> {
        if max == 0 {
            return Err(BuildError::InvalidMaxAttempts(max));
        }
        Ok(Self { max })
    }

    pub fn max(&self) -> usize {
        self.max
    }
}

impl<T, E> StopCondition<T, E> for AttemptsExhausted {
    fn is_met(&self, previous: Option<&AttemptState<T, E>>) -> bool {
        match previous {
            // success is NoFailure's business
            Some(state) if state.is_failure() => state.attempt() >= self.max,
            _ => false,
        }
    }
}

/// Met when the previous attempt failed with an error accepted by the predicate.
#[derive(Clone, Copy)]
pub struct FailureMatches<F> {
    predicate: F,
}

impl<F> FailureMatches<F> {
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<F> fmt::Debug for FailureMatches<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FailureMatches").field("predicate", &"<predicate>").finish()
    }
}

impl<T, E, F> StopCondition<T, E> for FailureMatches<F>
where
    F: Fn(&E) -> bool + Send + Sync,
{
    fn is_met(&self, previous: Option<&AttemptState<T, E>>) -> bool {
        previous.and_then(AttemptState::failure).is_some_and(|failure| (self.predicate)(failure))
    }
}

/// Always met, even before the first attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Always;

impl<T, E> StopCondition<T, E> for Always {
    fn is_met(&self, _previous: Option<&AttemptState<T, E>>) -> bool {
        true
    }
}

/// Stop condition backed by an arbitrary closure over the previous attempt.
#[derive(Clone, Copy)]
pub struct FromFn<F>(F);

/// Build a stop condition from a closure.
///
/// ```
/// use mule::stop::{self, StopCondition};
/// use mule::AttemptState;
///
/// let past_third = stop::from_fn(|prev: Option<&AttemptState<(), ()>>| {
///     prev.is_some_and(|s| s.attempt() > 3)
/// });
/// let before_first: Option<&AttemptState<(), ()>> = None;
/// assert!(!past_third.is_met(before_first));
/// assert!(past_third.is_met(Some(&AttemptState::failed(4, ()))));
/// ```
pub fn from_fn<F>(f: F) -> FromFn<F> {
    FromFn(f)
}

impl<F> fmt::Debug for FromFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FromFn(<closure>)")
    }
}

impl<T, E, F> StopCondition<T, E> for FromFn<F>
where
    F: Fn(Option<&AttemptState<T, E>>) -> bool + Send + Sync,
{
    fn is_met(&self, previous: Option<&AttemptState<T, E>>) -> bool {
        (self.0)(previous)
    }
}

/// Met when every child is met. An empty `AllOf` is always met.
pub struct AllOf<T, E> {
    conditions: Vec<Arc<dyn StopCondition<T, E>>>,
}

/// Met when any child is met. An empty `AnyOf` is never met.
pub struct AnyOf<T, E> {
    conditions: Vec<Arc<dyn StopCondition<T, E>>>,
}

macro_rules! variadic {
    ($name:ident) => {
        impl<T, E> $name<T, E> {
            pub fn new() -> Self {
                Self { conditions: Vec::new() }
            }

            /// Append a child condition.
            pub fn with<C>(mut self, condition: C) -> Self
            where
                C: StopCondition<T, E> + 'static,
            {
                self.conditions.push(Arc::new(condition));
                self
            }

            /// Append an already shared child condition.
            pub fn with_shared(mut self, condition: Arc<dyn StopCondition<T, E>>) -> Self {
                self.conditions.push(condition);
                self
            }

            pub fn len(&self) -> usize {
                self.conditions.len()
            }

            pub fn is_empty(&self) -> bool {
                self.conditions.is_empty()
            }
        }

        impl<T, E> Default for $name<T, E> {
            fn default() -> Self {
                Self::new()
            }
        }

        impl<T, E> Clone for $name<T, E> {
            fn clone(&self) -> Self {
                Self { conditions: self.conditions.clone() }
            }
        }

        impl<T, E> fmt::Debug for $name<T, E> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("conditions", &self.conditions.len())
                    .finish()
            }
        }
    };
}

variadic!(AllOf);
variadic!(AnyOf);

impl<T, E> StopCondition<T, E> for AllOf<T, E> {
    fn is_met(&self, previous: Option<&AttemptState<T, E>>) -> bool {
        self.conditions.iter().fold(true, |met, c| c.is_met(previous) & met)
    }
}

impl<T, E> StopCondition<T, E> for AnyOf<T, E> {
    fn is_met(&self, previous: Option<&AttemptState<T, E>>) -> bool {
        self.conditions.iter().fold(false, |met, c| c.is_met(previous) | met)
    }
}

/// Boolean complement of a single condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Not<C>(pub C);

impl<T, E, C> StopCondition<T, E> for Not<C>
where
    C: StopCondition<T, E>,
{
    fn is_met(&self, previous: Option<&AttemptState<T, E>>) -> bool {
        !self.0.is_met(previous)
    }
}

/// Disjunction of two conditions, produced by `Stop(a) | Stop(b)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Or<A, B> {
    pub left: A,
    pub right: B,
}

impl<T, E, A, B> StopCondition<T, E> for Or<A, B>
where
    A: StopCondition<T, E>,
    B: StopCondition<T, E>,
{
    fn is_met(&self, previous: Option<&AttemptState<T, E>>) -> bool {
        let left = self.left.is_met(previous);
        let right = self.right.is_met(previous);
        left || right
    }
}

/// Conjunction of two conditions, produced by `Stop(a) & Stop(b)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct And<A, B> {
    pub left: A,
    pub right: B,
}

impl<T, E, A, B> StopCondition<T, E> for And<A, B>
where
    A: StopCondition<T, E>,
    B: StopCondition<T, E>,
{
    fn is_met(&self, previous: Option<&AttemptState<T, E>>) -> bool {
        let left = self.left.is_met(previous);
        let right = self.right.is_met(previous);
        left && right
    }
}

/// Opt-in wrapper enabling operator composition of stop conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stop<C>(pub C);

impl<C> Stop<C> {
    pub fn into_inner(self) -> C {
        self.0
    }
}

impl<T, E, C> StopCondition<T, E> for Stop<C>
where
    C: StopCondition<T, E>,
{
    fn is_met(&self, previous: Option<&AttemptState<T, E>>) -> bool {
        self.0.is_met(previous)
    }
}

impl<A, B> BitOr<Stop<B>> for Stop<A> {
    type Output = Stop<Or<A, B>>;
    fn bitor(self, rhs: Stop<B>) -> Self::Output {
        Stop(Or { left: self.0, right: rhs.0 })
    }
}

impl<A, B> BitAnd<Stop<B>> for Stop<A> {
    type Output = Stop<And<A, B>>;
    fn bitand(self, rhs: Stop<B>) -> Self::Output {
        Stop(And { left: self.0, right: rhs.0 })
    }
}

impl<C> std::ops::Not for Stop<C> {
    type Output = Stop<Not<C>>;
    fn not(self) -> Self::Output {
        Stop(Not(self.0))
    }
}
