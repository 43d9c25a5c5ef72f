//! Error types for the bridge and its client.
//!
//! # Design
//! `BridgeError` covers everything that can go wrong inside the adapters or
//! at the dispatcher boundary. None of it reaches the host: the pipeline
//! turns every `BridgeError` into the fallback envelope. `ApiError` is the
//! client-side view of a finished response, and `ValidationError` is what a
//! `Validator` reports for input that does not fit its schema.

use thiserror::Error;

/// Adapter-level failures. Always surfaced to callers as a 500.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// A write-style call carried a body that is not JSON.
    #[error("request body is not valid JSON: {0}")]
    MalformedBody(#[source] serde_json::Error),

    /// The event was flagged base64 but the body could not be decoded.
    #[error("request body is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    /// The decoded base64 body is not UTF-8 text.
    #[error("request body is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// The host could not turn the incoming request into a trigger event.
    #[error("request could not be read: {0}")]
    UnreadableRequest(String),

    /// The dispatcher could not produce a response at all.
    #[error("dispatch failed: {0}")]
    Dispatch(String),

    /// The dispatcher answered with a body that is not JSON.
    #[error("response body is not valid JSON: {0}")]
    MalformedResponse(#[source] serde_json::Error),
}

/// Input rejected by a `Validator`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors returned by `HelloClient::parse_hello`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 404: no procedure under that name. `message` is read from the
    /// envelope the same way as for `HttpError`.
    #[error("not found: {message}")]
    NotFound { message: String },

    /// Any other non-2xx response. `message` is taken from the error
    /// envelope when there is one, else the raw body.
    #[error("HTTP {status}: {message}")]
    HttpError { status: u16, message: String },

    /// A 2xx reply whose body is not a JSON string.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// `HelloInput` could not be encoded as a mutation body.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}

impl ApiError {
    /// Text suitable for an error display slot, shown verbatim.
    pub fn message(&self) -> String {
        match self {
            ApiError::NotFound { message } | ApiError::HttpError { message, .. } => {
                message.clone()
            }
            other => other.to_string(),
        }
    }
}
