//! Error types for the Clockify client.
//!
//! # Design
//! Failures fall into two classes. A `PreconditionViolation` is raised
//! locally, before any I/O, when a write request is missing a mandatory
//! field. Everything that happens after a request is dispatched (transport
//! failures, non-2xx statuses, undecodable bodies) is an `ApiError` and is
//! carried inside the `ApiResponse` envelope rather than returned as `Err`.

use thiserror::Error;

/// A mandatory request field was missing. Never retried, never sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("value cannot be null (field `{field}`)")]
pub struct PreconditionViolation {
    pub field: &'static str,
}

impl PreconditionViolation {
    pub fn missing(field: &'static str) -> Self {
        Self { field }
    }
}

/// Errors produced while executing or interpreting a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server returned 404; the requested resource does not exist.
    #[error("resource not found")]
    NotFound,

    /// The server rejected the API key (401 or 403).
    #[error("unauthorized (HTTP {status})")]
    Unauthorized { status: u16 },

    /// The server returned a non-2xx status other than 401, 403 or 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The request never produced a response.
    #[error("transport failed: {0}")]
    TransportError(String),
}

/// Errors returned by `ClockifyClient::build_*` methods.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error(transparent)]
    Precondition(#[from] PreconditionViolation),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors raised while loading `ClientConfig` from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingVar(&'static str),

    #[error("environment variable {0} is empty")]
    EmptyVar(&'static str),
}
