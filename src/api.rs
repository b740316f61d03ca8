//! Convenience functions over the default mediator.
//!
//! Each function lazily creates the process-wide mediator through
//! [`MediatorFactory`] and forwards to it. Registration and dispatch always
//! observe the same instance until [`reset_registry`] is called.
//!
//! # Example
//!
//! ```
//! use edge_mediator::{api, Outcome, Request};
//!
//! struct Ping;
//! impl Request for Ping {
//!     const TYPE_KEY: &'static str = "Ping";
//!     type Response = &'static str;
//! }
//!
//! api::register_handler("Ping", |_: Ping| async { Ok(Outcome::ok("pong")) });
//!
//! # futures::executor::block_on(async {
//! let outcome = api::send_request(Ping).await;
//! assert_eq!(outcome.data(), Some(&"pong"));
//! # });
//! api::reset_registry();
//! ```

use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{HandlerResult, Result};
use crate::factory::MediatorFactory;
use crate::handler::{Registration, RegistryStats};
use crate::mediator::Mediator;
use crate::message::{
    AnyResponse, Command, Notification, NotificationEnvelope, Query, Request, RequestEnvelope,
};
use crate::outcome::Outcome;

/// The default mediator, created on first use.
pub fn mediator() -> Mediator {
    MediatorFactory::create()
}

pub fn register_handler<F, Req, Resp, Fut>(type_key: impl Into<String>, handler: F)
where
    F: Fn(Req) -> Fut + Send + Sync + 'static,
    Req: Send + 'static,
    Resp: Send + 'static,
    Fut: Future<Output = HandlerResult<Outcome<Resp>>> + Send + 'static,
{
    mediator().registry().register_handler(type_key, handler);
}

pub fn register_request_handler<R, F, Fut>(handler: F)
where
    R: Request,
    F: Fn(R) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult<Outcome<R::Response>>> + Send + 'static,
{
    mediator().registry().register_request_handler(handler);
}

pub fn register_notification_handler<F, N, Fut>(type_key: impl Into<String>, handler: F)
where
    F: Fn(Arc<N>) -> Fut + Send + Sync + 'static,
    N: Send + Sync + 'static,
    Fut: Future<Output = HandlerResult<()>> + Send + 'static,
{
    mediator()
        .registry()
        .register_notification_handler(type_key, handler);
}

pub fn subscribe<N, F, Fut>(handler: F)
where
    N: Notification,
    F: Fn(Arc<N>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult<()>> + Send + 'static,
{
    mediator().registry().subscribe(handler);
}

pub fn register_request_class<R>()
where
    R: Request + DeserializeOwned,
{
    mediator().registry().register_request_class::<R>();
}

pub fn register_notification_class<N>()
where
    N: Notification + DeserializeOwned,
{
    mediator().registry().register_notification_class::<N>();
}

/// Apply several registrations at once.
pub fn register_batch(registrations: impl IntoIterator<Item = Registration>) {
    mediator().registry().register_batch(registrations);
}

pub async fn send_request<R: Request>(request: R) -> Outcome<R::Response> {
    mediator().send(request).await
}

pub async fn send_command<C: Command>(command: C) -> Outcome<C::Response> {
    mediator().send_command(command).await
}

pub async fn send_query<Q: Query>(query: Q) -> Outcome<Q::Response> {
    mediator().send_query(query).await
}

pub async fn send_envelope(envelope: RequestEnvelope) -> Outcome<AnyResponse> {
    mediator().send_envelope(envelope).await
}

/// Publish to every subscriber. Subscriber failures are discarded.
pub async fn publish_notification<N: Notification>(notification: N) {
    mediator().publish(notification).await
}

pub async fn publish_envelope(envelope: NotificationEnvelope) {
    mediator().publish_envelope(envelope).await
}

pub async fn send_batch<R: Request>(requests: Vec<R>) -> Vec<Outcome<R::Response>> {
    mediator().send_batch(requests).await
}

pub async fn publish_batch<N: Notification>(notifications: Vec<N>) {
    mediator().publish_batch(notifications).await
}

pub fn get_mediator_stats() -> RegistryStats {
    mediator().stats()
}

/// Clear every registration and drop the default mediator.
pub fn reset_registry() {
    MediatorFactory::reset();
}

pub fn create_request_from_data(type_key: &str, data: Value) -> Result<RequestEnvelope> {
    mediator().registry().create_request(type_key, data)
}

pub fn create_notification_from_data(type_key: &str, data: Value) -> Result<NotificationEnvelope> {
    mediator().registry().create_notification(type_key, data)
}
