//! Type-erased handler traits and their typed wrappers.
//!
//! The registry stores handlers keyed by string, so the request and response
//! types are erased at registration and recovered at dispatch. A request
//! that does not match the handler's input type fails inside [`call`], which
//! the mediator reports as `HANDLER_ERROR`.
//!
//! [`call`]: RequestHandler::call

use std::any::{type_name, Any};
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{HandlerResult, MediatorError, Result};
use crate::message::{AnyResponse, Notification, NotificationEnvelope, Request, RequestEnvelope};
use crate::outcome::Outcome;

/// Boxed future for handler results.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Trait for request handler functions.
pub trait RequestHandler: Send + Sync + 'static {
    /// Handle a type-erased request.
    fn call(
        &self,
        request: Box<dyn Any + Send>,
    ) -> BoxFuture<'static, HandlerResult<Outcome<AnyResponse>>>;
}

/// Trait for notification handler functions.
pub trait NotificationHandler: Send + Sync + 'static {
    /// Handle a type-erased notification.
    fn call(
        &self,
        notification: Arc<dyn Any + Send + Sync>,
    ) -> BoxFuture<'static, HandlerResult<()>>;
}

/// Wrapper that downcasts the request before calling the handler.
pub struct TypedRequestHandler<F, Req, Resp, Fut>
where
    F: Fn(Req) -> Fut + Send + Sync + 'static,
    Req: Send + 'static,
    Resp: Send + 'static,
    Fut: Future<Output = HandlerResult<Outcome<Resp>>> + Send + 'static,
{
    handler: F,
    _phantom: PhantomData<fn(Req) -> (Resp, Fut)>,
}

impl<F, Req, Resp, Fut> TypedRequestHandler<F, Req, Resp, Fut>
where
    F: Fn(Req) -> Fut + Send + Sync + 'static,
    Req: Send + 'static,
    Resp: Send + 'static,
    Fut: Future<Output = HandlerResult<Outcome<Resp>>> + Send + 'static,
{
    /// Create a new typed handler.
    pub fn new(handler: F) -> Self {
        Self {
            handler,
            _phantom: PhantomData,
        }
    }
}

impl<F, Req, Resp, Fut> RequestHandler for TypedRequestHandler<F, Req, Resp, Fut>
where
    F: Fn(Req) -> Fut + Send + Sync + 'static,
    Req: Send + 'static,
    Resp: Send + 'static,
    Fut: Future<Output = HandlerResult<Outcome<Resp>>> + Send + 'static,
{
    fn call(
        &self,
        request: Box<dyn Any + Send>,
    ) -> BoxFuture<'static, HandlerResult<Outcome<AnyResponse>>> {
        let request: Req = match request.downcast::<Req>() {
            Ok(r) => *r,
            Err(_) => {
                let expected = type_name::<Req>();
                return Box::pin(async move {
                    Err(anyhow::anyhow!("handler expects request type {expected}"))
                });
            }
        };

        let fut = (self.handler)(request);
        Box::pin(async move {
            let outcome = fut.await?;
            Ok(outcome.map(|data| Box::new(data) as AnyResponse))
        })
    }
}

/// Wrapper that downcasts the notification before calling the handler.
pub struct TypedNotificationHandler<F, N, Fut>
where
    F: Fn(Arc<N>) -> Fut + Send + Sync + 'static,
    N: Send + Sync + 'static,
    Fut: Future<Output = HandlerResult<()>> + Send + 'static,
{
    handler: F,
    _phantom: PhantomData<fn(Arc<N>) -> Fut>,
}

impl<F, N, Fut> TypedNotificationHandler<F, N, Fut>
where
    F: Fn(Arc<N>) -> Fut + Send + Sync + 'static,
    N: Send + Sync + 'static,
    Fut: Future<Output = HandlerResult<()>> + Send + 'static,
{
    pub fn new(handler: F) -> Self {
        Self {
            handler,
            _phantom: PhantomData,
        }
    }
}

impl<F, N, Fut> NotificationHandler for TypedNotificationHandler<F, N, Fut>
where
    F: Fn(Arc<N>) -> Fut + Send + Sync + 'static,
    N: Send + Sync + 'static,
    Fut: Future<Output = HandlerResult<()>> + Send + 'static,
{
    fn call(
        &self,
        notification: Arc<dyn Any + Send + Sync>,
    ) -> BoxFuture<'static, HandlerResult<()>> {
        match notification.downcast::<N>() {
            Ok(n) => Box::pin((self.handler)(n)),
            Err(_) => {
                let expected = type_name::<N>();
                Box::pin(async move {
                    Err(anyhow::anyhow!("handler expects notification type {expected}"))
                })
            }
        }
    }
}

/// Builds a request envelope from plain data.
pub(crate) type RequestConstructor = Arc<dyn Fn(Value) -> Result<RequestEnvelope> + Send + Sync>;

/// Builds a notification envelope from plain data.
pub(crate) type NotificationConstructor =
    Arc<dyn Fn(Value) -> Result<NotificationEnvelope> + Send + Sync>;

fn decode<D: DeserializeOwned>(type_key: &str, data: Value) -> Result<D> {
    serde_json::from_value(data).map_err(|source| MediatorError::InvalidData {
        type_key: type_key.to_string(),
        source,
    })
}

pub(crate) fn request_constructor<R, D, C>(ctor: C) -> RequestConstructor
where
    R: Request,
    D: DeserializeOwned,
    C: Fn(D) -> R + Send + Sync + 'static,
{
    Arc::new(move |data: Value| {
        let data: D = decode(R::TYPE_KEY, data)?;
        Ok(RequestEnvelope::new(ctor(data)))
    })
}

pub(crate) fn notification_constructor<N, D, C>(ctor: C) -> NotificationConstructor
where
    N: Notification,
    D: DeserializeOwned,
    C: Fn(D) -> N + Send + Sync + 'static,
{
    Arc::new(move |data: Value| {
        let data: D = decode(N::TYPE_KEY, data)?;
        Ok(NotificationEnvelope::new(ctor(data)))
    })
}
