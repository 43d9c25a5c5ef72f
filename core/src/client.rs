//! Stateless request builder and response parser for the `hello` procedure.
//!
//! # Design
//! `HelloClient` holds only its base URL and call style and carries no
//! mutable state between calls. `build_hello` produces an `HttpRequest`,
//! `parse_hello` consumes an `HttpResponse`; the caller performs the actual
//! round-trip. Whether a call goes out as a query or a mutation is a
//! caller-side choice made through `CallStyle`.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{ErrorBody, HelloInput};

/// How the client invokes a procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CallStyle {
    /// GET with the input in the query string. Idempotent.
    #[default]
    Query,
    /// POST with `{"input": ...}` as the body.
    Mutation,
}

#[derive(Debug, Clone)]
pub struct HelloClient {
    base_url: String,
    style: CallStyle,
}

impl HelloClient {
    /// `base_url` is the function's endpoint, e.g.
    /// `http://localhost:8888/.netlify/functions/api`.
    pub fn new(base_url: &str, style: CallStyle) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            style,
        }
    }

    pub fn build_hello(&self, input: &str) -> Result<HttpRequest, ApiError> {
        let url = format!("{}/hello", self.base_url);
        match self.style {
            CallStyle::Query => {
                let query = form_urlencoded::Serializer::new(String::new())
                    .append_pair("input", input)
                    .finish();
                Ok(HttpRequest {
                    method: HttpMethod::Get,
                    url: format!("{url}?{query}"),
                    headers: Vec::new(),
                    body: None,
                })
            }
            CallStyle::Mutation => {
                let body = serde_json::to_string(&HelloInput {
                    input: input.to_string(),
                })
                .map_err(|e| ApiError::SerializationError(e.to_string()))?;
                Ok(HttpRequest {
                    method: HttpMethod::Post,
                    url,
                    headers: vec![("content-type".to_string(), "application/json".to_string())],
                    body: Some(body),
                })
            }
        }
    }

    /// Decode a greeting. Any response shape, including the fallback
    /// envelope or a body that is not JSON at all, yields an `ApiError`
    /// rather than a panic.
    pub fn parse_hello(&self, response: HttpResponse) -> Result<String, ApiError> {
        check_status(&response)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
    }
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if (200..300).contains(&response.status) {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound {
            message: error_message(&response.body),
        });
    }
    Err(ApiError::HttpError {
        status: response.status,
        message: error_message(&response.body),
    })
}

/// `details` when the envelope has it, else `error`, else the raw body.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            details: Some(details),
            ..
        }) => details,
        Ok(ErrorBody { error, .. }) => error,
        Err(_) => body.to_string(),
    }
}
