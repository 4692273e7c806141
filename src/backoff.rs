//! Backoff presets for [`Wait::backoff`](crate::Wait::backoff).
//!
//! A backoff maps the *retry index* to a delay: index `1` is the wait before attempt 2, index `2`
//! the wait before attempt 3, and so on. Index `0` (the first attempt) never waits.
//!
//! ```rust
//! use std::time::Duration;
//! use mule::Backoff;
//!
//! let backoff = Backoff::exponential(Duration::from_millis(100))
//!     .with_max(Duration::from_secs(2))
//!     .unwrap();
//! assert_eq!(backoff.delay(0), Duration::ZERO);
//! assert_eq!(backoff.delay(1), Duration::from_millis(100));
//! assert_eq!(backoff.delay(2), Duration::from_millis(200));
//! assert_eq!(backoff.delay(6), Duration::from_secs(2)); // capped
//! ```
//!
//! Computations that would overflow saturate to [`MAX_BACKOFF`].

use std::time::Duration;

/// Upper bound for any computed delay (1 day).
pub const MAX_BACKOFF: Duration = Duration::from_secs(24 * 60 * 60);

/// Invalid backoff or jitter configuration.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BackoffError {
    #[error("with_max is only valid for linear or exponential backoff")]
    ConstantDoesNotSupportMax,
    #[error("max must be greater than zero")]
    MaxMustBePositive,
    #[error("max ({max:?}) must be >= base ({base:?})")]
    MaxLessThanBase { base: Duration, max: Duration },
    #[error("decorrelated jitter: base ({base:?}) must not exceed max ({max:?})")]
    JitterBaseExceedsMax { base: Duration, max: Duration },
}

/// Delay growth strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Same delay before every retry.
    Constant { delay: Duration },
    /// `base * retry`, optionally capped.
    Linear { base: Duration, max: Option<Duration> },
    /// `base * 2^(retry - 1)`, optionally capped.
    Exponential { base: Duration, max: Option<Duration> },
}

impl Backoff {
    pub fn constant(delay: Duration) -> Self {
        Backoff::Constant { delay }
    }

    pub fn linear(base: Duration) -> Self {
        Backoff::Linear { base, max: None }
    }

    pub fn exponential(base: Duration) -> Self {
        Backoff::Exponential { base, max: None }
    }

    /// Cap a linear or exponential backoff.
    pub fn with_max(self, cap: Duration) -> Result<Self, BackoffError> {
        if cap.is_zero() {
            return Err(BackoffError::MaxMustBePositive);
        }
        match self {
            Backoff::Constant { .. } => Err(BackoffError::ConstantDoesNotSupportMax),
            Backoff::Linear { base, .. } | Backoff::Exponential { base, .. } if cap < base => {
                Err(BackoffError::MaxLessThanBase { base, max: cap })
            }
            Backoff::Linear { base, .. } => Ok(Backoff::Linear { base, max: Some(cap) }),
            Backoff::Exponential { base, .. } => Ok(Backoff::Exponential { base, max: Some(cap) }),
        }
    }

    /// Delay before retry number `retry` (0 = first attempt, no delay).
    pub fn delay(&self, retry: usize) -> Duration {
        if retry == 0 {
            return Duration::ZERO;
        }
        // clamp so the u32 multipliers below never truncate
        let retry = retry.min(u32::MAX as usize) as u32;
        let (raw, cap) = match *self {
            Backoff::Constant { delay } => (delay, None),
            Backoff::Linear { base, max } => (base.checked_mul(retry).unwrap_or(MAX_BACKOFF), max),
            Backoff::Exponential { base, max } => {
                let factor = 2u128.saturating_pow(retry - 1);
                let nanos = base.as_nanos().saturating_mul(factor).min(MAX_BACKOFF.as_nanos());
                (Duration::from_nanos(nanos as u64), max)
            }
        };
        cap.map_or(raw, |cap| raw.min(cap)).min(MAX_BACKOFF)
    }
}
