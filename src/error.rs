//! Error types for retry sequences
use crate::hooks::HookPoint;
use std::fmt;

/// Boxed error returned by fallible hooks and wait callables.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Message carried by [`RetryError::NoAttempts`].
pub const NO_ATTEMPTS_MESSAGE: &str =
    "Failed to make a single attempt with the given stop condition";

/// Unified error type returned by the attempt drivers and the retry wrappers.
#[derive(Debug)]
pub enum RetryError<E> {
    /// The guarded operation failed and the stop condition ended the sequence.
    ///
    /// Holds the failure of the last attempt, moved out unchanged.
    Inner(E),
    /// The stop condition was met before a single attempt was made.
    NoAttempts,
    /// An observer hook failed; the sequence was aborted.
    Hook { point: HookPoint, attempt: usize, source: BoxError },
    /// A callable wait specification failed; the sequence was aborted.
    Wait { attempt: usize, source: BoxError },
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inner(e) => write!(f, "{}", e),
            Self::NoAttempts => f.write_str(NO_ATTEMPTS_MESSAGE),
            Self::Hook { point, attempt, source } => {
                write!(f, "{} hook failed on attempt {}: {}", point, attempt, source)
            }
            Self::Wait { attempt, source } => {
                write!(f, "wait resolution failed before attempt {}: {}", attempt, source)
            }
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for RetryError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Inner(e) => Some(e),
            Self::Hook { source, .. } | Self::Wait { source, .. } => Some(source.as_ref()),
            Self::NoAttempts => None,
        }
    }
}

impl<E> RetryError<E> {
    /// Check if this error carries the operation's own failure
    pub fn is_inner(&self) -> bool {
        matches!(self, Self::Inner(_))
    }
    /// Check if the sequence ended without making any attempt
    pub fn is_no_attempts(&self) -> bool {
        matches!(self, Self::NoAttempts)
    }
    /// Check if an observer hook aborted the sequence
    pub fn is_hook(&self) -> bool {
        matches!(self, Self::Hook { .. })
    }
    /// Check if wait resolution aborted the sequence
    pub fn is_wait(&self) -> bool {
        matches!(self, Self::Wait { .. })
    }
    /// Get the operation failure if this is an Inner variant
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::Inner(e) => Some(e),
            _ => None,
        }
    }
    /// Borrow the operation failure if present.
    pub fn as_inner(&self) -> Option<&E> {
        match self {
            Self::Inner(e) => Some(e),
            _ => None,
        }
    }
    /// Attempt number an aborting hook or wait error was raised for.
    pub fn attempt(&self) -> Option<usize> {
        match self {
            Self::Hook { attempt, .. } | Self::Wait { attempt, .. } => Some(*attempt),
            _ => None,
        }
    }
    /// Hook point that aborted the sequence, if any.
    pub fn hook_point(&self) -> Option<HookPoint> {
        match self {
            Self::Hook { point, .. } => Some(*point),
            _ => None,
        }
    }
}

/// Errors produced while building stop conditions and retry configurations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// An attempt bound must be > 0.
    #[error("max_attempts must be > 0 (got {0})")]
    InvalidMaxAttempts(usize),
}
