//! Jitter strategies applied on top of a [`Backoff`](crate::Backoff) delay.
//!
//! - `None`: exact delays, for tests or tightly controlled workflows.
//! - `Full`: uniform in `[0, delay]`.
//! - `Equal`: uniform in `[delay/2, delay]`.
//! - `Decorrelated`: `min(max, random(base, previous * 3))`, growing from the previous sleep.
//!
//! Jitter carries no state of its own. The previous sleep decorrelated jitter grows from is
//! passed in by the caller, and each driver tracks its own, so sequences sharing one
//! configuration never influence each other.
//!
//! Randomness comes from `rand`'s thread-local RNG; use [`Jitter::apply_with_rng`] to inject a
//! seeded one. Millisecond conversions saturate at `u64::MAX`.

use crate::backoff::BackoffError;
use rand::Rng;
use std::time::Duration;

/// Randomization applied to each resolved backoff delay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Jitter {
    #[default]
    None,
    Full,
    Equal,
    /// Computes the whole delay from `base`, `max` and the previous sleep. The backoff delay it
    /// is applied to is ignored.
    Decorrelated(Decorrelated),
}

/// Bounds for decorrelated jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decorrelated {
    base: Duration,
    max: Duration,
}

impl Decorrelated {
    pub fn base(&self) -> Duration {
        self.base
    }

    pub fn max(&self) -> Duration {
        self.max
    }
}

impl Jitter {
    pub fn full() -> Self {
        Jitter::Full
    }

    pub fn equal() -> Self {
        Jitter::Equal
    }

    pub fn decorrelated(base: Duration, max: Duration) -> Result<Self, BackoffError> {
        if base > max {
            return Err(BackoffError::JitterBaseExceedsMax { base, max });
        }
        Ok(Jitter::Decorrelated(Decorrelated { base, max }))
    }

    /// Jitter `delay` as the first sleep of a sequence.
    pub fn apply(&self, delay: Duration) -> Duration {
        self.apply_after(delay, None)
    }

    /// Jitter `delay` given the sleep that preceded it, if any. Only decorrelated jitter looks at
    /// `previous`; without one it starts from its base.
    pub fn apply_after(&self, delay: Duration, previous: Option<Duration>) -> Duration {
        self.apply_with_rng(delay, previous, &mut rand::rng())
    }

    pub fn apply_with_rng<R: Rng>(
        &self,
        delay: Duration,
        previous: Option<Duration>,
        rng: &mut R,
    ) -> Duration {
        match self {
            Jitter::None => delay,
            Jitter::Full => match millis(delay) {
                0 => Duration::ZERO,
                ms => Duration::from_millis(rng.random_range(0..=ms)),
            },
            Jitter::Equal => match millis(delay) {
                0 => Duration::ZERO,
                ms => Duration::from_millis(rng.random_range(ms / 2..=ms)),
            },
            Jitter::Decorrelated(bounds) => {
                let previous = previous.unwrap_or(bounds.base);
                let upper = millis(previous).saturating_mul(3).min(millis(bounds.max));
                let lower = millis(bounds.base).min(upper);
                Duration::from_millis(rng.random_range(lower..=upper))
            }
        }
    }
}

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
pub(crate) fn millis(duration: Duration) -> u64 {
    duration.as_millis().try_into().unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn none_is_identity() {
        assert_eq!(Jitter::None.apply(Duration::from_secs(3)), Duration::from_secs(3));
    }

    #[test]
    fn full_stays_within_delay() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let d = Jitter::full().apply_with_rng(Duration::from_secs(1), None, &mut rng);
            assert!(d <= Duration::from_secs(1));
        }
    }

    #[test]
    fn equal_keeps_half_floor() {
        for _ in 0..100 {
            let d = Jitter::equal().apply(Duration::from_secs(1));
            assert!(d >= Duration::from_millis(500) && d <= Duration::from_secs(1));
        }
    }

    #[test]
    fn zero_delay_stays_zero() {
        assert_eq!(Jitter::full().apply(Duration::ZERO), Duration::ZERO);
        assert_eq!(Jitter::equal().apply(Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn decorrelated_grows_from_previous_sleep() {
        let mut rng = StdRng::seed_from_u64(123);
        let jitter =
            Jitter::decorrelated(Duration::from_millis(100), Duration::from_secs(10)).unwrap();
        let first = jitter.apply_with_rng(Duration::ZERO, None, &mut rng);
        assert!(first >= Duration::from_millis(100) && first <= Duration::from_millis(300));
        let second = jitter.apply_with_rng(Duration::ZERO, Some(first), &mut rng);
        assert!(second >= Duration::from_millis(100));
        assert!(second.as_millis() <= (first.as_millis() * 3).min(10_000));
    }

    #[test]
    fn decorrelated_starts_from_base_without_history() {
        let jitter =
            Jitter::decorrelated(Duration::from_millis(100), Duration::from_secs(100)).unwrap();
        // a long previous sleep elsewhere must not leak into a fresh start
        let grown = jitter.apply_after(Duration::ZERO, Some(Duration::from_secs(30)));
        assert!(grown >= Duration::from_millis(100));
        for _ in 0..100 {
            let fresh = jitter.apply(Duration::ZERO);
            assert!(fresh >= Duration::from_millis(100) && fresh <= Duration::from_millis(300));
        }
    }

    #[test]
    fn decorrelated_ignores_backoff_delay() {
        let jitter =
            Jitter::decorrelated(Duration::from_millis(10), Duration::from_secs(1)).unwrap();
        for _ in 0..50 {
            let d = jitter.apply(Duration::from_secs(60));
            assert!(d >= Duration::from_millis(10) && d <= Duration::from_millis(30));
        }
    }

    #[test]
    fn decorrelated_caps_at_max() {
        let jitter =
            Jitter::decorrelated(Duration::from_millis(100), Duration::from_millis(500)).unwrap();
        let d = jitter.apply_after(Duration::ZERO, Some(Duration::from_secs(10)));
        assert!(d >= Duration::from_millis(100) && d <= Duration::from_millis(500));
    }

    #[test]
    fn millis_saturates() {
        assert_eq!(millis(Duration::from_millis(1500)), 1500);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }

    #[test]
    fn decorrelated_rejects_inverted_bounds() {
        assert!(matches!(
            Jitter::decorrelated(Duration::from_secs(5), Duration::from_secs(1)),
            Err(BackoffError::JitterBaseExceedsMax { .. })
        ));
    }
}
