//! # edge-mediator
//!
//! Minimal in-process Mediator / CQRS dispatch.
//!
//! Callers build typed commands, queries and notifications and route them
//! through a [`Mediator`] to whatever handler is registered for the
//! message's type-key. Aimed at edge functions and serverless workers where
//! startup cost and footprint matter.
//!
//! ## Architecture
//!
//! - **Registry**: type-key -> handler / class constructor maps
//! - **Mediator**: lookup, invocation and outcome normalization, batches
//! - **Factory**: lazily created process-wide default mediator
//! - **api**: free functions over the default mediator
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use edge_mediator::{Mediator, Notification, Outcome, Request};
//!
//! struct GetGreeting { name: String }
//! impl Request for GetGreeting {
//!     const TYPE_KEY: &'static str = "greetings.Get";
//!     type Response = String;
//! }
//!
//! struct Greeted;
//! impl Notification for Greeted {
//!     const TYPE_KEY: &'static str = "greetings.Greeted";
//! }
//!
//! # futures::executor::block_on(async {
//! let mediator = Mediator::new();
//! mediator.registry().register_request_handler(|q: GetGreeting| async move {
//!     Ok(Outcome::ok(format!("hello, {}", q.name)))
//! });
//! mediator.registry().subscribe(|_: Arc<Greeted>| async { Ok(()) });
//!
//! let outcome = mediator.send(GetGreeting { name: "edge".into() }).await;
//! assert_eq!(outcome.into_data().as_deref(), Some("hello, edge"));
//!
//! mediator.publish(Greeted).await;
//! # });
//! ```

pub mod api;
pub mod error;
pub mod handler;
pub mod message;
pub mod outcome;

mod factory;
mod mediator;

pub use error::{DispatchFailure, HandlerResult, MediatorError};
pub use factory::MediatorFactory;
pub use handler::{Registration, Registry, RegistryStats};
pub use mediator::{Mediator, MediatorBuilder, MediatorConfig};
pub use message::{
    AnyResponse, Command, MessageKind, Notification, NotificationEnvelope, Query, Request,
    RequestEnvelope,
};
pub use outcome::{ErrorDetail, Outcome};
