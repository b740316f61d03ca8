//! Outcome values returned by request handlers.
//!
//! An [`Outcome`] is either a success carrying a data payload or a failure
//! carrying one or more [`ErrorDetail`]s. Warnings are orthogonal: a
//! successful outcome may still carry warnings.
//!
//! # Example
//!
//! ```
//! use edge_mediator::{ErrorDetail, Outcome};
//!
//! let ok = Outcome::ok("pong");
//! assert!(ok.is_success());
//! assert_eq!(ok.data(), Some(&"pong"));
//!
//! let denied = ErrorDetail::new("NOT_ALLOWED", "nope").with_status(403);
//! let failed: Outcome<()> = Outcome::fail_with(denied);
//! assert!(failed.is_failure());
//! assert_eq!(failed.errors()[0].code, "NOT_ALLOWED");
//! ```

use serde::{Deserialize, Deserializer, Serialize};

/// Structured error descriptor carried by a failed (or warned) outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable code, e.g. `HANDLER_NOT_FOUND`.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Optional HTTP-style status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorDetail {
    /// Create a descriptor without a status.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            status: None,
        }
    }

    /// Attach an HTTP-style status.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

/// Success/failure outcome of a request.
///
/// Fields are private; an outcome built through the constructors is always
/// well formed. A success has data and no errors, a failure has at least one
/// error and no data. Deserialization enforces the same shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "RawOutcome<T>",
    bound(deserialize = "T: Deserialize<'de>")
)]
pub struct Outcome<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    errors: Vec<ErrorDetail>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<ErrorDetail>,
}

impl<T> Outcome<T> {
    /// Successful outcome.
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Successful outcome that also carries warnings.
    pub fn ok_with_warnings(data: T, warnings: Vec<ErrorDetail>) -> Self {
        Self {
            data: Some(data),
            errors: Vec::new(),
            warnings,
        }
    }

    /// Failed outcome.
    ///
    /// An empty error list is replaced by a single `UNKNOWN_ERROR` so that
    /// `is_failure` and `errors` always agree.
    pub fn fail(errors: Vec<ErrorDetail>) -> Self {
        let errors = if errors.is_empty() {
            vec![ErrorDetail::new("UNKNOWN_ERROR", "Unknown error")]
        } else {
            errors
        };
        Self {
            data: None,
            errors,
            warnings: Vec::new(),
        }
    }

    /// Failed outcome with a single error.
    pub fn fail_with(error: ErrorDetail) -> Self {
        Self::fail(vec![error])
    }

    /// Add warnings to an existing outcome.
    pub fn with_warnings(mut self, warnings: impl IntoIterator<Item = ErrorDetail>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    #[inline]
    pub fn is_failure(&self) -> bool {
        !self.errors.is_empty()
    }

    #[inline]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Payload, present only on success.
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// Consume the outcome, returning the payload if successful.
    pub fn into_data(self) -> Option<T> {
        self.data
    }

    pub fn errors(&self) -> &[ErrorDetail] {
        &self.errors
    }

    pub fn warnings(&self) -> &[ErrorDetail] {
        &self.warnings
    }

    /// Transform the payload, keeping errors and warnings as they are.
    pub fn map<U, F>(self, f: F) -> Outcome<U>
    where
        F: FnOnce(T) -> U,
    {
        Outcome {
            data: self.data.map(f),
            errors: self.errors,
            warnings: self.warnings,
        }
    }

    /// Like [`map`](Self::map) but the transform may reject the payload.
    ///
    /// A failed outcome has no payload, so `f` only runs on success.
    pub(crate) fn try_map<U, E, F>(self, f: F) -> std::result::Result<Outcome<U>, E>
    where
        F: FnOnce(T) -> std::result::Result<U, E>,
    {
        let data = match self.data {
            Some(d) => Some(f(d)?),
            None => None,
        };
        Ok(Outcome {
            data,
            errors: self.errors,
            warnings: self.warnings,
        })
    }

    /// Convert into a standard `Result`, discarding warnings.
    pub fn into_result(self) -> std::result::Result<T, Vec<ErrorDetail>> {
        match self.data {
            Some(data) if self.errors.is_empty() => Ok(data),
            _ => Err(self.errors),
        }
    }
}

/// Wire form of an [`Outcome`] before its shape is checked.
#[derive(Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct RawOutcome<T> {
    #[serde(default, deserialize_with = "present")]
    data: Option<T>,
    #[serde(default)]
    errors: Vec<ErrorDetail>,
    #[serde(default)]
    warnings: Vec<ErrorDetail>,
}

// A present `data` key is always a payload, even `null` (for `()` and
// `Option` payloads). Only a missing key means "no data".
fn present<'de, T, D>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl<T> TryFrom<RawOutcome<T>> for Outcome<T> {
    type Error = &'static str;

    fn try_from(raw: RawOutcome<T>) -> std::result::Result<Self, Self::Error> {
        match (raw.data.is_some(), raw.errors.is_empty()) {
            (true, false) => Err("failed outcome must not carry data"),
            (false, true) => Err("successful outcome must carry data"),
            _ => Ok(Self {
                data: raw.data,
                errors: raw.errors,
                warnings: raw.warnings,
            }),
        }
    }
}

impl Outcome<()> {
    /// Successful outcome with no payload.
    pub fn done() -> Self {
        Self::ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_predicates() {
        let outcome = Outcome::ok(42);
        assert!(outcome.is_success());
        assert!(!outcome.is_failure());
        assert!(!outcome.has_warnings());
        assert_eq!(outcome.data(), Some(&42));
        assert!(outcome.errors().is_empty());
    }

    #[test]
    fn test_fail_predicates() {
        let outcome: Outcome<i32> = Outcome::fail_with(ErrorDetail::new("BAD", "bad input"));
        assert!(outcome.is_failure());
        assert!(!outcome.is_success());
        assert_eq!(outcome.data(), None);
        assert_eq!(outcome.errors().len(), 1);
        assert_eq!(outcome.errors()[0].code, "BAD");
        assert_eq!(outcome.errors()[0].status, None);
    }

    #[test]
    fn test_fail_empty_list_still_fails() {
        let outcome: Outcome<()> = Outcome::fail(Vec::new());
        assert!(outcome.is_failure());
        assert_eq!(outcome.errors()[0].code, "UNKNOWN_ERROR");
    }

    #[test]
    fn test_warnings_are_orthogonal() {
        let outcome = Outcome::ok_with_warnings("v", vec![ErrorDetail::new("DEPRECATED", "old")]);
        assert!(outcome.is_success());
        assert!(outcome.has_warnings());
        assert_eq!(outcome.warnings()[0].code, "DEPRECATED");

        let failed: Outcome<()> = Outcome::fail_with(ErrorDetail::new("E", "e"))
            .with_warnings([ErrorDetail::new("W", "w")]);
        assert!(failed.is_failure());
        assert!(failed.has_warnings());
    }

    #[test]
    fn test_map_keeps_errors_and_warnings() {
        let outcome = Outcome::ok(2).with_warnings([ErrorDetail::new("W", "w")]);
        let mapped = outcome.map(|n| n * 10);
        assert_eq!(mapped.data(), Some(&20));
        assert!(mapped.has_warnings());

        let failed: Outcome<i32> = Outcome::fail_with(ErrorDetail::new("E", "e"));
        let mapped = failed.map(|n| n.to_string());
        assert!(mapped.is_failure());
        assert_eq!(mapped.errors()[0].code, "E");
    }

    #[test]
    fn test_into_result() {
        assert_eq!(Outcome::ok(1).into_result(), Ok(1));

        let failed: Outcome<i32> = Outcome::fail_with(ErrorDetail::new("E", "e").with_status(500));
        let errors = failed.into_result().unwrap_err();
        assert_eq!(errors[0].status, Some(500));
    }

    #[test]
    fn test_serialized_shape() {
        let outcome = Outcome::ok("pong");
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json, serde_json::json!({ "data": "pong" }));

        let failed: Outcome<String> =
            Outcome::fail_with(ErrorDetail::new("HANDLER_NOT_FOUND", "missing").with_status(404));
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "errors": [{ "code": "HANDLER_NOT_FOUND", "message": "missing", "status": 404 }]
            })
        );
    }

    #[test]
    fn test_deserialize_round_trip() {
        let done = serde_json::to_string(&Outcome::done()).unwrap();
        assert_eq!(done, r#"{"data":null}"#);
        let back: Outcome<()> = serde_json::from_str(&done).unwrap();
        assert_eq!(back, Outcome::done());
        assert_eq!(back.into_result(), Ok(()));

        let warned = Outcome::ok(Some(3u8)).with_warnings([ErrorDetail::new("W", "w")]);
        let json = serde_json::to_string(&warned).unwrap();
        assert_eq!(serde_json::from_str::<Outcome<Option<u8>>>(&json).unwrap(), warned);

        let failed: Outcome<u8> =
            Outcome::fail_with(ErrorDetail::new("HANDLER_ERROR", "boom").with_status(500));
        let json = serde_json::to_string(&failed).unwrap();
        assert_eq!(serde_json::from_str::<Outcome<u8>>(&json).unwrap(), failed);
    }

    #[test]
    fn test_deserialize_rejects_ill_formed() {
        let both = r#"{"data":1,"errors":[{"code":"E","message":"m"}]}"#;
        let err = serde_json::from_str::<Outcome<u8>>(both).unwrap_err();
        assert!(err.to_string().contains("must not carry data"));

        let neither = serde_json::from_str::<Outcome<u8>>("{}").unwrap_err();
        assert!(neither.to_string().contains("must carry data"));

        let only_warnings = r#"{"warnings":[{"code":"W","message":"w"}]}"#;
        assert!(serde_json::from_str::<Outcome<u8>>(only_warnings).is_err());
    }
}
