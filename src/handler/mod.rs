//! Handler module - registration and storage.
//!
//! Provides:
//! - [`Registry`] - maps type-keys to handlers and class constructors
//! - [`Registration`] - a single registration, for batch registration
//! - [`RequestHandler`] / [`NotificationHandler`] - type-erased handler traits
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use edge_mediator::{Outcome, Registration, Registry};
//!
//! let registry = Registry::new();
//!
//! // Register a request handler
//! registry.register_handler("Echo", |text: String| async move { Ok(Outcome::ok(text)) });
//!
//! // Or several registrations at once
//! registry.register_batch([
//!     Registration::notification_handler("Audit", |line: Arc<String>| async move {
//!         println!("{line}");
//!         Ok(())
//!     }),
//! ]);
//! ```

mod registration;
mod registry;
mod typed;

pub use registration::Registration;
pub use registry::{Registry, RegistryStats};
pub use typed::{
    BoxFuture, NotificationHandler, RequestHandler, TypedNotificationHandler, TypedRequestHandler,
};
