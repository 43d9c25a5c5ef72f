//! Outbound adapter: canonical response to trigger response, plus the
//! fallback envelope used for every adapter-level failure.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::BridgeError;
use crate::http::HttpResponse;
use crate::trigger::TriggerResponse;
use crate::types::ErrorBody;

/// Headers present on every reply, success or failure.
pub const FIXED_HEADERS: [(&str, &str); 3] = [
    ("Content-Type", "application/json"),
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "GET, POST, OPTIONS"),
];

#[derive(Debug, Clone)]
pub struct OutboundAdapter {
    expose_error_details: bool,
}

impl OutboundAdapter {
    pub fn new(expose_error_details: bool) -> Self {
        Self {
            expose_error_details,
        }
    }

    /// Re-serialize the dispatcher's body as compact JSON and apply the
    /// fixed headers. Status passes through untouched.
    pub fn respond(&self, response: HttpResponse) -> Result<TriggerResponse, BridgeError> {
        let body = if response.body.trim().is_empty() {
            String::new()
        } else {
            let value: Value =
                serde_json::from_str(&response.body).map_err(BridgeError::MalformedResponse)?;
            value.to_string()
        };

        Ok(TriggerResponse {
            status_code: response.status,
            headers: merge_headers(response.headers),
            body,
        })
    }

    /// The 500 envelope. `details` carries the error text unless disabled.
    pub fn fallback(&self, error: &BridgeError) -> TriggerResponse {
        let mut envelope = ErrorBody::internal();
        if self.expose_error_details {
            envelope = envelope.with_details(error.to_string());
        }
        TriggerResponse {
            status_code: 500,
            headers: merge_headers(Vec::new()),
            body: serde_json::to_string(&envelope)
                .unwrap_or_else(|_| format!("{{\"error\":\"{}\"}}", ErrorBody::INTERNAL)),
        }
    }

    /// Answer to an OPTIONS request: no content, just the fixed headers.
    pub fn preflight(&self) -> TriggerResponse {
        TriggerResponse {
            status_code: 204,
            headers: merge_headers(Vec::new()),
            body: String::new(),
        }
    }
}

/// Dispatcher headers, minus `content-length` and anything the fixed set
/// overrides (compared case-insensitively), plus the fixed set.
fn merge_headers(headers: Vec<(String, String)>) -> BTreeMap<String, String> {
    let mut merged: BTreeMap<String, String> = headers
        .into_iter()
        .filter(|(key, _)| {
            !key.eq_ignore_ascii_case("content-length")
                && !FIXED_HEADERS
                    .iter()
                    .any(|(fixed, _)| key.eq_ignore_ascii_case(fixed))
        })
        .collect();
    for (key, value) in FIXED_HEADERS {
        merged.insert(key.to_string(), value.to_string());
    }
    merged
}
