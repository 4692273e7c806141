//! Abstraction for sleeping/waiting between attempts
//!
//! The suspending driver sleeps through [`Sleeper`], the blocking driver through
//! [`BlockingSleeper`]. Tests swap in [`InstantSleeper`] or [`TrackingSleeper`], which implement
//! both, so no real time passes.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Non-blocking sleep used by the suspending driver
pub trait Sleeper: Send + Sync + std::fmt::Debug {
    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send>>;
}

/// Thread-blocking sleep used by the blocking driver
pub trait BlockingSleeper: Send + Sync + std::fmt::Debug {
    fn sleep_blocking(&self, duration: Duration);
}

/// Production sleeper using tokio runtime
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        Box::pin(tokio::time::sleep(duration))
    }
}

/// Production sleeper parking the calling thread
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl BlockingSleeper for ThreadSleeper {
    fn sleep_blocking(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// Test sleeper that doesn't actually sleep
#[derive(Debug, Default, Clone, Copy)]
pub struct InstantSleeper;

impl Sleeper for InstantSleeper {
    fn sleep(&self, _duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        Box::pin(async {})
    }
}

impl BlockingSleeper for InstantSleeper {
    fn sleep_blocking(&self, _duration: Duration) {}
}

/// Test sleeper that records every requested delay without sleeping
#[derive(Debug, Clone, Default)]
pub struct TrackingSleeper {
    calls: Arc<Mutex<Vec<Duration>>>,
}

impl TrackingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Duration> {
        self.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.lock().len()
    }

    pub fn call_at(&self, idx: usize) -> Option<Duration> {
        self.lock().get(idx).copied()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn record(&self, duration: Duration) {
        self.lock().push(duration);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Duration>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Sleeper for TrackingSleeper {
    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        self.record(duration);
        Box::pin(async {})
    }
}

impl BlockingSleeper for TrackingSleeper {
    fn sleep_blocking(&self, duration: Duration) {
        self.record(duration);
    }
}
