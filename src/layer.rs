//! Tower middleware running each request through the suspending driver.
//!
//! Every attempt first waits for the inner service to become ready, then calls it with a clone of
//! the request. Readiness errors count as failed attempts.

use crate::aio::AsyncAttempting;
use crate::config::RetryConfig;
use crate::error::RetryError;
use crate::state::AttemptState;
use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower_layer::Layer;
use tower_service::Service;

/// Tower-native retry layer.
pub struct RetryLayer<T, E> {
    config: Arc<RetryConfig<T, E>>,
}

impl<T, E> RetryLayer<T, E> {
    pub fn new(config: impl Into<Arc<RetryConfig<T, E>>>) -> Self {
        Self { config: config.into() }
    }

    pub fn config(&self) -> &RetryConfig<T, E> {
        &self.config
    }
}

impl<T, E> Clone for RetryLayer<T, E> {
    fn clone(&self) -> Self {
        Self { config: self.config.clone() }
    }
}

impl<T, E> fmt::Debug for RetryLayer<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryLayer").field("config", &self.config).finish()
    }
}

impl<S, T, E> Layer<S> for RetryLayer<T, E> {
    type Service = RetryService<S, T, E>;

    fn layer(&self, service: S) -> Self::Service {
        RetryService { inner: service, config: self.config.clone() }
    }
}

/// Retry service produced by [`RetryLayer`].
pub struct RetryService<S, T, E> {
    inner: S,
    config: Arc<RetryConfig<T, E>>,
}

impl<S: Clone, T, E> Clone for RetryService<S, T, E> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone(), config: self.config.clone() }
    }
}

impl<S: fmt::Debug, T, E> fmt::Debug for RetryService<S, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryService").field("inner", &self.inner).finish_non_exhaustive()
    }
}

impl<S, T, E> RetryService<S, T, E> {
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S, Req, T, E> Service<Req> for RetryService<S, T, E>
where
    Req: Clone + Send + 'static,
    S: Service<Req, Response = T, Error = E> + Clone + Send + 'static,
    S::Future: Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    type Response = T;
    type Error = RetryError<E>;
    type Future = BoxFuture<'static, Result<T, RetryError<E>>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(RetryError::Inner)
    }

    fn call(&mut self, req: Req) -> Self::Future {
        // keep the instance that was driven to readiness
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let mut attempts = AsyncAttempting::new(self.config.clone());
        Box::pin(async move {
            while let Some(attempt) = attempts.next_attempt().await? {
                let req = req.clone();
                let inner = &mut inner;
                attempt
                    .run_async(async move {
                        futures::future::poll_fn(|cx| inner.poll_ready(cx)).await?;
                        inner.call(req).await
                    })
                    .await?;
            }
            attempts
                .into_last_attempt()
                .and_then(AttemptState::into_result)
                .ok_or(RetryError::NoAttempts)
        })
    }
}
