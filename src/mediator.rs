//! Mediator builder and dispatch engine.
//!
//! The [`Mediator`] resolves a message to its type-key, looks up the
//! registered handler(s) and normalizes every outcome:
//!
//! 1. No handler registered -> `HANDLER_NOT_FOUND`
//! 2. Handler returned an error or panicked -> `HANDLER_ERROR`
//! 3. Handler outcome carried the wrong response type -> `INVALID_HANDLER_RESULT`
//! 4. Otherwise the handler's outcome is returned as is
//!
//! Notifications are fire-and-forget: every subscriber runs, failures are
//! logged and discarded, and `publish` itself never fails.
//!
//! # Example
//!
//! ```
//! use edge_mediator::{Mediator, Outcome, Request};
//!
//! struct Ping;
//! impl Request for Ping {
//!     const TYPE_KEY: &'static str = "Ping";
//!     type Response = String;
//! }
//!
//! # futures::executor::block_on(async {
//! let mediator = Mediator::builder().batch_concurrency(8).build();
//! mediator
//!     .registry()
//!     .register_request_handler(|_: Ping| async { Ok(Outcome::ok("pong".to_string())) });
//!
//! let outcome = mediator.send(Ping).await;
//! assert_eq!(outcome.data().map(String::as_str), Some("pong"));
//! # });
//! ```

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::join_all;
use futures::stream::{self, StreamExt};
use futures::FutureExt;

use crate::error::DispatchFailure;
use crate::handler::{Registry, RegistryStats};
use crate::message::{
    AnyResponse, Command, Notification, NotificationEnvelope, Query, Request, RequestEnvelope,
};
use crate::outcome::Outcome;

/// Default for [`MediatorConfig::log_handler_failures`].
pub const DEFAULT_LOG_HANDLER_FAILURES: bool = true;

/// Configuration for a mediator.
#[derive(Debug, Clone)]
pub struct MediatorConfig {
    /// Maximum in-flight operations per batch. `None` runs the whole batch at once.
    pub batch_concurrency: Option<usize>,
    /// Log handler errors and panics before they are normalized or discarded.
    pub log_handler_failures: bool,
}

impl Default for MediatorConfig {
    fn default() -> Self {
        Self {
            batch_concurrency: None,
            log_handler_failures: DEFAULT_LOG_HANDLER_FAILURES,
        }
    }
}

/// Builder for configuring and creating a [`Mediator`].
pub struct MediatorBuilder {
    registry: Option<Registry>,
    config: MediatorConfig,
}

impl MediatorBuilder {
    /// Create a new mediator builder.
    pub fn new() -> Self {
        Self {
            registry: None,
            config: MediatorConfig::default(),
        }
    }

    /// Use an existing registry instead of a fresh one.
    pub fn registry(mut self, registry: Registry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: MediatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Cap the number of in-flight operations in `send_batch`/`publish_batch`.
    ///
    /// Output order is preserved regardless. A limit of 0 is treated as 1.
    /// Default: unbounded
    pub fn batch_concurrency(mut self, limit: usize) -> Self {
        self.config.batch_concurrency = Some(limit.max(1));
        self
    }

    /// Whether handler errors and panics are logged.
    ///
    /// Default: true
    pub fn log_handler_failures(mut self, enabled: bool) -> Self {
        self.config.log_handler_failures = enabled;
        self
    }

    pub fn build(self) -> Mediator {
        Mediator {
            registry: self.registry.unwrap_or_default(),
            config: Arc::new(self.config),
        }
    }
}

impl Default for MediatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Dispatcher over a single [`Registry`].
///
/// Cheap to clone; clones share the registry.
#[derive(Clone)]
pub struct Mediator {
    registry: Registry,
    config: Arc<MediatorConfig>,
}

impl Mediator {
    /// Mediator over a fresh, empty registry.
    pub fn new() -> Self {
        MediatorBuilder::new().build()
    }

    /// Mediator over an existing registry, default configuration.
    pub fn with_registry(registry: Registry) -> Self {
        MediatorBuilder::new().registry(registry).build()
    }

    pub fn builder() -> MediatorBuilder {
        MediatorBuilder::new()
    }

    #[inline]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    #[inline]
    pub fn config(&self) -> &MediatorConfig {
        &self.config
    }

    pub fn stats(&self) -> RegistryStats {
        self.registry.stats()
    }

    /// Send a request to its handler.
    ///
    /// Never fails: routing and handler failures come back as failed outcomes.
    pub async fn send<R: Request>(&self, request: R) -> Outcome<R::Response> {
        let outcome = self.dispatch(R::TYPE_KEY, Box::new(request)).await;

        match outcome.try_map(|data| data.downcast::<R::Response>().map(|data| *data)) {
            Ok(outcome) => outcome,
            Err(_) => {
                if self.config.log_handler_failures {
                    tracing::error!(
                        "Handler for {} returned a payload that is not {}",
                        R::TYPE_KEY,
                        std::any::type_name::<R::Response>()
                    );
                }
                DispatchFailure::InvalidHandlerResult.into_outcome(R::TYPE_KEY)
            }
        }
    }

    /// Send a command. Same pipeline as [`send`](Self::send).
    pub async fn send_command<C: Command>(&self, command: C) -> Outcome<C::Response> {
        self.send(command).await
    }

    /// Send a query. Same pipeline as [`send`](Self::send).
    pub async fn send_query<Q: Query>(&self, query: Q) -> Outcome<Q::Response> {
        self.send(query).await
    }

    /// Send a type-erased request.
    ///
    /// The successful payload is boxed; downcast it to the response type the
    /// caller expects.
    pub async fn send_envelope(&self, envelope: RequestEnvelope) -> Outcome<AnyResponse> {
        let (type_key, request) = envelope.into_parts();
        self.dispatch(type_key, request).await
    }

    /// Send every request concurrently. Results are in input order.
    pub async fn send_batch<R: Request>(&self, requests: Vec<R>) -> Vec<Outcome<R::Response>> {
        self.run_ordered(requests.into_iter().map(|request| self.send(request)))
            .await
    }

    /// Heterogeneous variant of [`send_batch`](Self::send_batch).
    pub async fn send_envelope_batch(
        &self,
        envelopes: Vec<RequestEnvelope>,
    ) -> Vec<Outcome<AnyResponse>> {
        self.run_ordered(envelopes.into_iter().map(|envelope| self.send_envelope(envelope)))
            .await
    }

    /// Publish a notification to every subscriber.
    ///
    /// Subscribers run concurrently. A subscriber's error or panic is logged
    /// at `warn` and dropped; it never affects other subscribers or the
    /// caller.
    pub async fn publish<N: Notification>(&self, notification: N) {
        self.publish_envelope(NotificationEnvelope::new(notification))
            .await
    }

    /// Publish a type-erased notification.
    pub async fn publish_envelope(&self, envelope: NotificationEnvelope) {
        let type_key = envelope.type_key();
        let handlers = self.registry.get_notification_handlers(type_key);
        if handlers.is_empty() {
            tracing::debug!("No notification handlers registered for {}", type_key);
            return;
        }

        let payload = envelope.payload();
        let calls = handlers.into_iter().map(|handler| {
            let payload = Arc::clone(&payload);
            AssertUnwindSafe(async move { handler.call(payload).await }).catch_unwind()
        });

        for (index, result) in join_all(calls).await.into_iter().enumerate() {
            if !self.config.log_handler_failures {
                continue;
            }
            match result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::warn!(
                        "Notification handler {} for {} failed: {:#}",
                        index,
                        type_key,
                        e
                    );
                }
                Err(panic) => {
                    tracing::warn!(
                        "Notification handler {} for {} panicked: {}",
                        index,
                        type_key,
                        panic_message(&*panic)
                    );
                }
            }
        }
    }

    /// Publish every notification concurrently; resolves once all settle.
    pub async fn publish_batch<N: Notification>(&self, notifications: Vec<N>) {
        self.run_ordered(
            notifications
                .into_iter()
                .map(|notification| self.publish(notification)),
        )
        .await;
    }

    /// Heterogeneous variant of [`publish_batch`](Self::publish_batch).
    pub async fn publish_envelope_batch(&self, envelopes: Vec<NotificationEnvelope>) {
        self.run_ordered(envelopes.into_iter().map(|envelope| self.publish_envelope(envelope)))
            .await;
    }

    /// Look up and invoke the request handler under a failure boundary.
    async fn dispatch(&self, type_key: &str, request: Box<dyn Any + Send>) -> Outcome<AnyResponse> {
        let Some(handler) = self.registry.get_handler(type_key) else {
            tracing::debug!("No handler registered for {}", type_key);
            return DispatchFailure::HandlerNotFound.into_outcome(type_key);
        };

        let result = AssertUnwindSafe(async move { handler.call(request).await })
            .catch_unwind()
            .await;

        match result {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                if self.config.log_handler_failures {
                    tracing::error!("Handler error for {}: {:#}", type_key, e);
                }
                DispatchFailure::HandlerError.into_outcome(type_key)
            }
            Err(panic) => {
                if self.config.log_handler_failures {
                    tracing::error!(
                        "Handler for {} panicked: {}",
                        type_key,
                        panic_message(&*panic)
                    );
                }
                DispatchFailure::HandlerError.into_outcome(type_key)
            }
        }
    }

    /// Drive futures concurrently on the current task, keeping input order.
    async fn run_ordered<I>(&self, futures: I) -> Vec<<I::Item as Future>::Output>
    where
        I: IntoIterator,
        I::Item: Future,
    {
        match self.config.batch_concurrency {
            Some(limit) => stream::iter(futures).buffered(limit).collect().await,
            None => join_all(futures).await,
        }
    }
}

impl Default for Mediator {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
