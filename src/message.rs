//! Message capabilities: requests (commands and queries) and notifications.
//!
//! Every message type declares an explicit, application-chosen type-key.
//! The mediator routes on that key only, so two types sharing a key share
//! handlers. Namespace keys (`"billing.CreateInvoice"`) to keep them unique.
//!
//! # Example
//!
//! ```
//! use edge_mediator::{Command, Notification, Query, Request};
//!
//! struct CreateUser { name: String }
//! impl Request for CreateUser {
//!     const TYPE_KEY: &'static str = "users.CreateUser";
//!     type Response = u64;
//! }
//! impl Command for CreateUser {}
//!
//! struct GetUser { id: u64 }
//! impl Request for GetUser {
//!     const TYPE_KEY: &'static str = "users.GetUser";
//!     type Response = String;
//! }
//! impl Query for GetUser {}
//!
//! struct UserCreated { id: u64 }
//! impl Notification for UserCreated {
//!     const TYPE_KEY: &'static str = "users.UserCreated";
//! }
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Type-erased response payload, produced by envelope dispatch.
pub type AnyResponse = Box<dyn Any + Send>;

/// A message expecting an [`Outcome`](crate::Outcome) in return.
pub trait Request: Send + 'static {
    /// Dispatch key for this type.
    const TYPE_KEY: &'static str;

    /// Payload of a successful outcome. Use `()` for commands with no data.
    type Response: Send + 'static;
}

/// Marker for write/side-effecting requests.
pub trait Command: Request {}

/// Marker for read-only requests.
pub trait Query: Request {}

/// A fire-and-forget event with zero or more subscribers.
///
/// Subscribers share one instance through an `Arc`, hence `Sync`.
pub trait Notification: Send + Sync + 'static {
    /// Dispatch key for this type.
    const TYPE_KEY: &'static str;
}

/// Which registration space a type-key lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Request,
    Notification,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::Request => f.write_str("request"),
            MessageKind::Notification => f.write_str("notification"),
        }
    }
}

/// A request whose concrete type has been erased.
///
/// Built from a typed request with [`RequestEnvelope::new`] or from raw data
/// with [`Registry::create_request`](crate::Registry::create_request), and
/// dispatched with [`Mediator::send_envelope`](crate::Mediator::send_envelope).
pub struct RequestEnvelope {
    type_key: &'static str,
    payload: Box<dyn Any + Send>,
}

impl RequestEnvelope {
    pub fn new<R: Request>(request: R) -> Self {
        Self {
            type_key: R::TYPE_KEY,
            payload: Box::new(request),
        }
    }

    #[inline]
    pub fn type_key(&self) -> &'static str {
        self.type_key
    }

    /// Check whether the wrapped value is an `R`.
    pub fn is<R: Request>(&self) -> bool {
        self.payload.is::<R>()
    }

    /// Recover the typed request, or hand the envelope back on mismatch.
    pub fn downcast<R: Request>(self) -> std::result::Result<R, Self> {
        let type_key = self.type_key;
        self.payload
            .downcast::<R>()
            .map(|r| *r)
            .map_err(|payload| Self { type_key, payload })
    }

    pub(crate) fn into_parts(self) -> (&'static str, Box<dyn Any + Send>) {
        (self.type_key, self.payload)
    }
}

impl fmt::Debug for RequestEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestEnvelope")
            .field("type_key", &self.type_key)
            .finish_non_exhaustive()
    }
}

/// A notification whose concrete type has been erased.
#[derive(Clone)]
pub struct NotificationEnvelope {
    type_key: &'static str,
    payload: Arc<dyn Any + Send + Sync>,
}

impl NotificationEnvelope {
    pub fn new<N: Notification>(notification: N) -> Self {
        Self::from_arc(Arc::new(notification))
    }

    pub fn from_arc<N: Notification>(notification: Arc<N>) -> Self {
        Self {
            type_key: N::TYPE_KEY,
            payload: notification,
        }
    }

    #[inline]
    pub fn type_key(&self) -> &'static str {
        self.type_key
    }

    pub fn is<N: Notification>(&self) -> bool {
        self.payload.is::<N>()
    }

    /// Borrow the typed notification if the wrapped value is an `N`.
    pub fn downcast_ref<N: Notification>(&self) -> Option<&N> {
        self.payload.downcast_ref::<N>()
    }

    pub(crate) fn payload(&self) -> Arc<dyn Any + Send + Sync> {
        Arc::clone(&self.payload)
    }
}

impl fmt::Debug for NotificationEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationEnvelope")
            .field("type_key", &self.type_key)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Ping;
    impl Request for Ping {
        const TYPE_KEY: &'static str = "Ping";
        type Response = String;
    }

    #[derive(Debug)]
    struct Pong;
    impl Request for Pong {
        const TYPE_KEY: &'static str = "Pong";
        type Response = ();
    }

    #[derive(Debug, PartialEq)]
    struct Tick(u32);
    impl Notification for Tick {
        const TYPE_KEY: &'static str = "Tick";
    }

    #[test]
    fn test_request_envelope_downcast() {
        let envelope = RequestEnvelope::new(Ping);
        assert_eq!(envelope.type_key(), "Ping");
        assert!(envelope.is::<Ping>());
        assert!(!envelope.is::<Pong>());

        let envelope = envelope.downcast::<Pong>().unwrap_err();
        assert_eq!(envelope.type_key(), "Ping");
        assert!(envelope.downcast::<Ping>().is_ok());
    }

    #[test]
    fn test_notification_envelope_shares_payload() {
        let envelope = NotificationEnvelope::new(Tick(7));
        let copy = envelope.clone();

        assert_eq!(copy.type_key(), "Tick");
        assert_eq!(copy.downcast_ref::<Tick>(), Some(&Tick(7)));
        assert!(Arc::ptr_eq(&envelope.payload(), &copy.payload()));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(MessageKind::Request.to_string(), "request");
        assert_eq!(MessageKind::Notification.to_string(), "notification");
    }
}
