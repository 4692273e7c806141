#![allow(dead_code)]

use mule::RetryConfigBuilder;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TestError {
    #[error("transient failure on attempt {0}")]
    Transient(usize),
    #[error("fatal failure on attempt {0}")]
    Fatal(usize),
}

/// Operation failing transiently before `succeed_on`; `None` fails forever.
pub fn scripted(attempt: usize, succeed_on: Option<usize>) -> Result<String, TestError> {
    match succeed_on {
        Some(n) if attempt >= n => Ok(format!("value from attempt {}", attempt)),
        _ => Err(TestError::Transient(attempt)),
    }
}

/// Shared, ordered record of hook firings.
#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    /// Register a recording hook at every lifecycle point.
    pub fn install<T: 'static, E: 'static>(
        &self,
        builder: RetryConfigBuilder<T, E>,
    ) -> RetryConfigBuilder<T, E> {
        let (a, b, c) = (self.clone(), self.clone(), self.clone());
        let (d, e) = (self.clone(), self.clone());
        builder
            .before_attempt(move |s| a.push(format!("before_attempt {}", s.attempt())))
            .on_success(move |s| b.push(format!("on_success {}", s.attempt())))
            .on_failure(move |s| c.push(format!("on_failure {}", s.attempt())))
            .before_wait(move |s| d.push(format!("before_wait {}", s.attempt())))
            .after_wait(move |s| e.push(format!("after_wait {}", s.attempt())))
    }
}
