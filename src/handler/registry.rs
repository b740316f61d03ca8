//! Handler registry keyed by type-key.
//!
//! The registry holds four independent maps: request handlers (one per key,
//! last write wins), notification handlers (ordered list per key), request
//! classes and notification classes. All four sit behind one lock so that
//! `reset` clears them together.
//!
//! `Registry` is a cheap handle; clones share the same maps.
//!
//! # Example
//!
//! ```
//! use edge_mediator::{Outcome, Registry};
//!
//! let registry = Registry::new();
//! registry.register_handler("Ping", |_: ()| async { Ok(Outcome::ok("pong")) });
//! registry.register_notification_handler("Ticked", |_: std::sync::Arc<u32>| async { Ok(()) });
//!
//! assert!(registry.has_handler("Ping"));
//! assert_eq!(registry.stats().request_handlers, 1);
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::registration::{Registration, RegistrationKind};
use super::typed::{
    NotificationConstructor, NotificationHandler, RequestConstructor, RequestHandler,
};
use crate::error::{HandlerResult, MediatorError, Result};
use crate::message::{MessageKind, Notification, NotificationEnvelope, Request, RequestEnvelope};
use crate::outcome::Outcome;

/// Entry counts per map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStats {
    pub request_handlers: usize,
    /// Type-keys with a subscriber list, not individual subscribers.
    pub notification_handlers: usize,
    pub request_classes: usize,
    pub notification_classes: usize,
}

impl RegistryStats {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Default)]
struct RegistryInner {
    request_handlers: HashMap<String, Arc<dyn RequestHandler>>,
    notification_handlers: HashMap<String, Vec<Arc<dyn NotificationHandler>>>,
    request_classes: HashMap<String, RequestConstructor>,
    notification_classes: HashMap<String, NotificationConstructor>,
}

/// Registry mapping type-keys to handlers and class constructors.
#[derive(Clone, Default)]
pub struct Registry {
    inner: Arc<RwLock<RegistryInner>>,
}

impl Registry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a single registration.
    pub fn register(&self, registration: Registration) {
        let mut inner = self.inner.write();
        match registration.0 {
            RegistrationKind::RequestHandler { type_key, handler } => {
                tracing::debug!("Registering request handler for {}", type_key);
                if inner
                    .request_handlers
                    .insert(type_key.clone(), handler)
                    .is_some()
                {
                    tracing::debug!("Replaced existing request handler for {}", type_key);
                }
            }
            RegistrationKind::NotificationHandler { type_key, handler } => {
                tracing::debug!("Registering notification handler for {}", type_key);
                inner
                    .notification_handlers
                    .entry(type_key)
                    .or_default()
                    .push(handler);
            }
            RegistrationKind::RequestClass { type_key, ctor } => {
                inner.request_classes.insert(type_key.to_string(), ctor);
            }
            RegistrationKind::NotificationClass { type_key, ctor } => {
                inner.notification_classes.insert(type_key.to_string(), ctor);
            }
        }
    }

    /// Apply every registration in order.
    ///
    /// Registrations cannot fail, so the batch is always fully applied.
    pub fn register_batch(&self, registrations: impl IntoIterator<Item = Registration>) {
        for registration in registrations {
            self.register(registration);
        }
    }

    /// Register a request handler, replacing any previous one for `type_key`.
    ///
    /// The key is not checked against the handler's input type; a mismatch
    /// only shows up at dispatch.
    pub fn register_handler<F, Req, Resp, Fut>(&self, type_key: impl Into<String>, handler: F)
    where
        F: Fn(Req) -> Fut + Send + Sync + 'static,
        Req: Send + 'static,
        Resp: Send + 'static,
        Fut: Future<Output = HandlerResult<Outcome<Resp>>> + Send + 'static,
    {
        self.register(Registration::handler(type_key, handler));
    }

    /// Register a request handler keyed by `R::TYPE_KEY`.
    pub fn register_request_handler<R, F, Fut>(&self, handler: F)
    where
        R: Request,
        F: Fn(R) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult<Outcome<R::Response>>> + Send + 'static,
    {
        self.register(Registration::request_handler(handler));
    }

    /// Append a notification handler for `type_key`.
    pub fn register_notification_handler<F, N, Fut>(&self, type_key: impl Into<String>, handler: F)
    where
        F: Fn(Arc<N>) -> Fut + Send + Sync + 'static,
        N: Send + Sync + 'static,
        Fut: Future<Output = HandlerResult<()>> + Send + 'static,
    {
        self.register(Registration::notification_handler(type_key, handler));
    }

    /// Append a notification handler keyed by `N::TYPE_KEY`.
    pub fn subscribe<N, F, Fut>(&self, handler: F)
    where
        N: Notification,
        F: Fn(Arc<N>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult<()>> + Send + 'static,
    {
        self.register(Registration::subscriber(handler));
    }

    pub fn register_request_class<R>(&self)
    where
        R: Request + DeserializeOwned,
    {
        self.register(Registration::request_class::<R>());
    }

    pub fn register_request_class_with<R, D, C>(&self, ctor: C)
    where
        R: Request,
        D: DeserializeOwned,
        C: Fn(D) -> R + Send + Sync + 'static,
    {
        self.register(Registration::request_class_with(ctor));
    }

    pub fn register_notification_class<N>(&self)
    where
        N: Notification + DeserializeOwned,
    {
        self.register(Registration::notification_class::<N>());
    }

    pub fn register_notification_class_with<N, D, C>(&self, ctor: C)
    where
        N: Notification,
        D: DeserializeOwned,
        C: Fn(D) -> N + Send + Sync + 'static,
    {
        self.register(Registration::notification_class_with(ctor));
    }

    /// Get the request handler for a type-key.
    pub fn get_handler(&self, type_key: &str) -> Option<Arc<dyn RequestHandler>> {
        self.inner.read().request_handlers.get(type_key).cloned()
    }

    /// Get the notification handlers for a type-key, in registration order.
    pub fn get_notification_handlers(&self, type_key: &str) -> Vec<Arc<dyn NotificationHandler>> {
        self.inner
            .read()
            .notification_handlers
            .get(type_key)
            .cloned()
            .unwrap_or_default()
    }

    pub fn has_handler(&self, type_key: &str) -> bool {
        self.inner.read().request_handlers.contains_key(type_key)
    }

    pub fn has_request_class(&self, type_key: &str) -> bool {
        self.inner.read().request_classes.contains_key(type_key)
    }

    pub fn has_notification_class(&self, type_key: &str) -> bool {
        self.inner.read().notification_classes.contains_key(type_key)
    }

    /// Build a request from plain data using its registered class.
    pub fn create_request(&self, type_key: &str, data: Value) -> Result<RequestEnvelope> {
        let ctor = self
            .inner
            .read()
            .request_classes
            .get(type_key)
            .cloned()
            .ok_or_else(|| MediatorError::ClassNotRegistered {
                kind: MessageKind::Request,
                type_key: type_key.to_string(),
            })?;
        ctor(data)
    }

    /// Build a notification from plain data using its registered class.
    pub fn create_notification(&self, type_key: &str, data: Value) -> Result<NotificationEnvelope> {
        let ctor = self
            .inner
            .read()
            .notification_classes
            .get(type_key)
            .cloned()
            .ok_or_else(|| MediatorError::ClassNotRegistered {
                kind: MessageKind::Notification,
                type_key: type_key.to_string(),
            })?;
        ctor(data)
    }

    /// Clear all four maps.
    pub fn reset(&self) {
        let mut inner = self.inner.write();
        inner.request_handlers.clear();
        inner.notification_handlers.clear();
        inner.request_classes.clear();
        inner.notification_classes.clear();
        tracing::debug!("Registry reset");
    }

    pub fn stats(&self) -> RegistryStats {
        let inner = self.inner.read();
        RegistryStats {
            request_handlers: inner.request_handlers.len(),
            notification_handlers: inner.notification_handlers.len(),
            request_classes: inner.request_classes.len(),
            notification_classes: inner.notification_classes.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct CreateUser {
        name: String,
    }

    impl Request for CreateUser {
        const TYPE_KEY: &'static str = "CreateUser";
        type Response = u64;
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct UserCreated {
        id: u64,
    }

    impl Notification for UserCreated {
        const TYPE_KEY: &'static str = "UserCreated";
    }

    #[test]
    fn test_register_handler() {
        let registry = Registry::new();

        registry.register_handler("Ping", |_: ()| async { Ok(Outcome::ok("pong")) });

        assert!(registry.has_handler("Ping"));
        assert!(registry.get_handler("Ping").is_some());
        assert!(registry.get_handler("Pong").is_none());
    }

    #[test]
    fn test_request_handler_overwrites() {
        let registry = Registry::new();

        registry.register_request_handler(|_: CreateUser| async { Ok(Outcome::ok(1)) });
        registry.register_request_handler(|_: CreateUser| async { Ok(Outcome::ok(2)) });

        assert_eq!(registry.stats().request_handlers, 1);
    }

    #[test]
    fn test_notification_handlers_append() {
        let registry = Registry::new();

        registry.subscribe(|_: Arc<UserCreated>| async { Ok(()) });
        registry.subscribe(|_: Arc<UserCreated>| async { Ok(()) });

        assert_eq!(registry.get_notification_handlers("UserCreated").len(), 2);
        assert!(registry.get_notification_handlers("Other").is_empty());
        assert_eq!(registry.stats().notification_handlers, 1);
    }

    #[test]
    fn test_create_request_from_data() {
        let registry = Registry::new();
        registry.register_request_class::<CreateUser>();

        let envelope = registry
            .create_request("CreateUser", json!({ "name": "ada" }))
            .unwrap();
        assert_eq!(envelope.type_key(), "CreateUser");
        assert_eq!(
            envelope.downcast::<CreateUser>().unwrap(),
            CreateUser {
                name: "ada".to_string()
            }
        );
    }

    #[test]
    fn test_create_request_with_constructor() {
        let registry = Registry::new();
        registry.register_request_class_with(|name: String| CreateUser { name });

        let envelope = registry.create_request("CreateUser", json!("grace")).unwrap();
        assert_eq!(envelope.downcast::<CreateUser>().unwrap().name, "grace");
    }

    #[test]
    fn test_create_request_rejects_bad_data() {
        let registry = Registry::new();
        registry.register_request_class::<CreateUser>();

        let err = registry
            .create_request("CreateUser", json!({ "nom": 1 }))
            .unwrap_err();
        assert!(matches!(
            err,
            MediatorError::InvalidData { ref type_key, .. } if type_key == "CreateUser"
        ));
    }

    #[test]
    fn test_create_without_class() {
        let registry = Registry::new();

        let err = registry.create_request("CreateUser", json!({})).unwrap_err();
        assert!(matches!(
            err,
            MediatorError::ClassNotRegistered {
                kind: MessageKind::Request,
                ..
            }
        ));

        let err = registry.create_notification("UserCreated", json!({})).unwrap_err();
        assert!(matches!(
            err,
            MediatorError::ClassNotRegistered {
                kind: MessageKind::Notification,
                ..
            }
        ));
    }

    #[test]
    fn test_create_notification_from_data() {
        let registry = Registry::new();
        registry.register_notification_class::<UserCreated>();

        let envelope = registry
            .create_notification("UserCreated", json!({ "id": 9 }))
            .unwrap();
        assert_eq!(envelope.downcast_ref::<UserCreated>(), Some(&UserCreated { id: 9 }));
    }

    #[test]
    fn test_classes_independent_of_handlers() {
        let registry = Registry::new();
        registry.register_request_class::<CreateUser>();

        assert!(registry.has_request_class("CreateUser"));
        assert!(!registry.has_handler("CreateUser"));
    }

    #[test]
    fn test_register_batch() {
        let registry = Registry::new();

        registry.register_batch([
            Registration::request_handler(|_: CreateUser| async { Ok(Outcome::ok(1)) }),
            Registration::subscriber(|_: Arc<UserCreated>| async { Ok(()) }),
            Registration::request_class::<CreateUser>(),
            Registration::notification_class::<UserCreated>(),
        ]);

        assert_eq!(
            registry.stats(),
            RegistryStats {
                request_handlers: 1,
                notification_handlers: 1,
                request_classes: 1,
                notification_classes: 1,
            }
        );
    }

    #[test]
    fn test_reset_clears_everything() {
        let registry = Registry::new();
        registry.register_handler("Ping", |_: ()| async { Ok(Outcome::ok(())) });
        registry.register_notification_handler("Tick", |_: Arc<()>| async { Ok(()) });
        registry.register_request_class::<CreateUser>();
        registry.register_notification_class::<UserCreated>();

        registry.reset();

        assert!(registry.stats().is_empty());
        assert!(registry.get_handler("Ping").is_none());
    }

    #[test]
    fn test_clones_share_state() {
        let registry = Registry::new();
        let clone = registry.clone();

        clone.register_handler("Ping", |_: ()| async { Ok(Outcome::ok(())) });

        assert!(registry.has_handler("Ping"));
    }

    #[test]
    fn test_stats_serialize_camel_case() {
        let stats = RegistryStats {
            request_handlers: 1,
            notification_handlers: 2,
            request_classes: 3,
            notification_classes: 4,
        };
        assert_eq!(
            serde_json::to_value(stats).unwrap(),
            json!({
                "requestHandlers": 1,
                "notificationHandlers": 2,
                "requestClasses": 3,
                "notificationClasses": 4
            })
        );
    }
}
