//! Error types for edge-mediator.
//!
//! Dispatch itself never returns an error: routing and handler failures are
//! reported as failed [`Outcome`](crate::Outcome)s built from
//! [`DispatchFailure`]. [`MediatorError`] covers the remaining fallible
//! operations, such as building a request from raw data.

use thiserror::Error;

use crate::message::MessageKind;
use crate::outcome::{ErrorDetail, Outcome};

/// Main error type for non-dispatch operations.
#[derive(Debug, Error)]
pub enum MediatorError {
    /// No constructor registered for the given type-key.
    #[error("No {kind} class registered for type: {type_key}")]
    ClassNotRegistered { kind: MessageKind, type_key: String },

    /// Payload did not match the registered constructor's data shape.
    #[error("Invalid data for type {type_key}: {source}")]
    InvalidData {
        type_key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type alias using MediatorError.
pub type Result<T> = std::result::Result<T, MediatorError>;

/// Result type returned by handler functions.
///
/// Any error type convertible into `anyhow::Error` can be propagated with `?`.
pub type HandlerResult<T> = anyhow::Result<T>;

/// The three standard failures the mediator emits on its own behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchFailure {
    /// No handler registered for the resolved type-key.
    HandlerNotFound,
    /// The handler returned an error, panicked, or could not accept the request.
    HandlerError,
    /// The handler's outcome did not carry the expected response type.
    InvalidHandlerResult,
}

impl DispatchFailure {
    pub const HANDLER_NOT_FOUND: &'static str = "HANDLER_NOT_FOUND";
    pub const HANDLER_ERROR: &'static str = "HANDLER_ERROR";
    pub const INVALID_HANDLER_RESULT: &'static str = "INVALID_HANDLER_RESULT";

    /// Machine-readable code.
    pub fn code(self) -> &'static str {
        match self {
            DispatchFailure::HandlerNotFound => Self::HANDLER_NOT_FOUND,
            DispatchFailure::HandlerError => Self::HANDLER_ERROR,
            DispatchFailure::InvalidHandlerResult => Self::INVALID_HANDLER_RESULT,
        }
    }

    /// Default HTTP-style status.
    pub fn status(self) -> u16 {
        match self {
            DispatchFailure::HandlerNotFound => 404,
            DispatchFailure::HandlerError | DispatchFailure::InvalidHandlerResult => 500,
        }
    }

    /// Message naming the request type.
    pub fn message(self, type_key: &str) -> String {
        match self {
            DispatchFailure::HandlerNotFound => {
                format!("Handler not found for request type: {type_key}")
            }
            DispatchFailure::HandlerError => {
                format!("Handler execution failed for request type: {type_key}")
            }
            DispatchFailure::InvalidHandlerResult => {
                format!("Handler returned invalid result for request type: {type_key}")
            }
        }
    }

    pub fn detail(self, type_key: &str) -> ErrorDetail {
        ErrorDetail::new(self.code(), self.message(type_key)).with_status(self.status())
    }

    /// Failed outcome carrying this error.
    pub fn into_outcome<T>(self, type_key: &str) -> Outcome<T> {
        Outcome::fail_with(self.detail(type_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_failure_table() {
        let cases = [
            (
                DispatchFailure::HandlerNotFound,
                "HANDLER_NOT_FOUND",
                404,
                "Handler not found for request type: Ping",
            ),
            (
                DispatchFailure::HandlerError,
                "HANDLER_ERROR",
                500,
                "Handler execution failed for request type: Ping",
            ),
            (
                DispatchFailure::InvalidHandlerResult,
                "INVALID_HANDLER_RESULT",
                500,
                "Handler returned invalid result for request type: Ping",
            ),
        ];

        for (failure, code, status, message) in cases {
            let detail = failure.detail("Ping");
            assert_eq!(detail.code, code);
            assert_eq!(detail.status, Some(status));
            assert_eq!(detail.message, message);
        }
    }

    #[test]
    fn test_into_outcome_is_failure() {
        let outcome: Outcome<String> = DispatchFailure::HandlerNotFound.into_outcome("Unknown");
        assert!(outcome.is_failure());
        assert_eq!(outcome.errors()[0].code, DispatchFailure::HANDLER_NOT_FOUND);
    }

    #[test]
    fn test_error_display() {
        let err = MediatorError::ClassNotRegistered {
            kind: MessageKind::Notification,
            type_key: "UserCreated".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "No notification class registered for type: UserCreated"
        );
    }
}
