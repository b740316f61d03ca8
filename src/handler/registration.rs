//! Registration values.
//!
//! A [`Registration`] captures one handler or class registration so that a
//! heterogeneous set of them can be applied in a single
//! [`Registry::register_batch`](super::Registry::register_batch) call.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use super::typed::{
    notification_constructor, request_constructor, NotificationConstructor, NotificationHandler,
    RequestConstructor, RequestHandler, TypedNotificationHandler, TypedRequestHandler,
};
use crate::error::HandlerResult;
use crate::message::{Notification, Request};
use crate::outcome::Outcome;

pub(crate) enum RegistrationKind {
    RequestHandler {
        type_key: String,
        handler: Arc<dyn RequestHandler>,
    },
    NotificationHandler {
        type_key: String,
        handler: Arc<dyn NotificationHandler>,
    },
    RequestClass {
        type_key: &'static str,
        ctor: RequestConstructor,
    },
    NotificationClass {
        type_key: &'static str,
        ctor: NotificationConstructor,
    },
}

/// One pending registration.
pub struct Registration(pub(crate) RegistrationKind);

impl Registration {
    /// Request handler under an explicit type-key.
    pub fn handler<F, Req, Resp, Fut>(type_key: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Req) -> Fut + Send + Sync + 'static,
        Req: Send + 'static,
        Resp: Send + 'static,
        Fut: Future<Output = HandlerResult<Outcome<Resp>>> + Send + 'static,
    {
        Self(RegistrationKind::RequestHandler {
            type_key: type_key.into(),
            handler: Arc::new(TypedRequestHandler::new(handler)),
        })
    }

    /// Request handler keyed by `R::TYPE_KEY`.
    pub fn request_handler<R, F, Fut>(handler: F) -> Self
    where
        R: Request,
        F: Fn(R) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult<Outcome<R::Response>>> + Send + 'static,
    {
        Self::handler(R::TYPE_KEY, handler)
    }

    /// Notification handler under an explicit type-key.
    pub fn notification_handler<F, N, Fut>(type_key: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Arc<N>) -> Fut + Send + Sync + 'static,
        N: Send + Sync + 'static,
        Fut: Future<Output = HandlerResult<()>> + Send + 'static,
    {
        Self(RegistrationKind::NotificationHandler {
            type_key: type_key.into(),
            handler: Arc::new(TypedNotificationHandler::new(handler)),
        })
    }

    /// Notification handler keyed by `N::TYPE_KEY`.
    pub fn subscriber<N, F, Fut>(handler: F) -> Self
    where
        N: Notification,
        F: Fn(Arc<N>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult<()>> + Send + 'static,
    {
        Self::notification_handler(N::TYPE_KEY, handler)
    }

    /// Request class deserialized directly from its data.
    pub fn request_class<R>() -> Self
    where
        R: Request + DeserializeOwned,
    {
        Self::request_class_with(|r: R| r)
    }

    /// Request class built from `D` by an explicit constructor.
    pub fn request_class_with<R, D, C>(ctor: C) -> Self
    where
        R: Request,
        D: DeserializeOwned,
        C: Fn(D) -> R + Send + Sync + 'static,
    {
        Self(RegistrationKind::RequestClass {
            type_key: R::TYPE_KEY,
            ctor: request_constructor(ctor),
        })
    }

    pub fn notification_class<N>() -> Self
    where
        N: Notification + DeserializeOwned,
    {
        Self::notification_class_with(|n: N| n)
    }

    pub fn notification_class_with<N, D, C>(ctor: C) -> Self
    where
        N: Notification,
        D: DeserializeOwned,
        C: Fn(D) -> N + Send + Sync + 'static,
    {
        Self(RegistrationKind::NotificationClass {
            type_key: N::TYPE_KEY,
            ctor: notification_constructor(ctor),
        })
    }

    /// Type-key this registration applies to.
    pub fn type_key(&self) -> &str {
        match &self.0 {
            RegistrationKind::RequestHandler { type_key, .. }
            | RegistrationKind::NotificationHandler { type_key, .. } => type_key.as_str(),
            RegistrationKind::RequestClass { type_key, .. }
            | RegistrationKind::NotificationClass { type_key, .. } => type_key,
        }
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.0 {
            RegistrationKind::RequestHandler { .. } => "RequestHandler",
            RegistrationKind::NotificationHandler { .. } => "NotificationHandler",
            RegistrationKind::RequestClass { .. } => "RequestClass",
            RegistrationKind::NotificationClass { .. } => "NotificationClass",
        };
        f.debug_struct("Registration")
            .field("kind", &kind)
            .field("type_key", &self.type_key())
            .finish()
    }
}
