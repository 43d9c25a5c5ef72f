//! Host-runtime shapes: the trigger event a function receives, the reply it
//! returns, and the per-invocation context.
//!
//! # Design
//! Field names follow the proxy-event JSON the host delivers
//! (`httpMethod`, `queryStringParameters`, ...), so the types deserialize
//! straight from the raw invocation payload. Maps are `BTreeMap` so that
//! re-encoding headers and query strings is deterministic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::http::HttpMethod;

/// An inbound invocation payload. Borrowed by the inbound adapter, never
/// mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerEvent {
    #[serde(rename = "httpMethod")]
    pub method: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub headers: BTreeMap<String, Option<String>>,
    #[serde(default)]
    pub query_string_parameters: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub multi_value_query_string_parameters: Option<BTreeMap<String, Vec<String>>>,
    #[serde(default)]
    pub multi_value_headers: Option<BTreeMap<String, Vec<String>>>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

impl TriggerEvent {
    /// A bare event with the given method and path.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_string_parameters
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), Some(value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn http_method(&self) -> HttpMethod {
        HttpMethod::parse(&self.method)
    }

    /// Query parameters merged from both maps. Single-value entries win; a
    /// key only present in the multi-value map contributes its first value.
    pub fn query_parameters(&self) -> BTreeMap<String, String> {
        let mut params = self.query_string_parameters.clone().unwrap_or_default();
        if let Some(multi) = &self.multi_value_query_string_parameters {
            for (key, values) in multi {
                if let Some(first) = values.first() {
                    params.entry(key.clone()).or_insert_with(|| first.clone());
                }
            }
        }
        params
    }

    /// Headers with a present value, merged the same way as the query.
    pub fn header_pairs(&self) -> BTreeMap<String, String> {
        let mut pairs: BTreeMap<String, String> = self
            .headers
            .iter()
            .filter_map(|(key, value)| value.as_ref().map(|v| (key.clone(), v.clone())))
            .collect();
        if let Some(multi) = &self.multi_value_headers {
            for (key, values) in multi {
                if let Some(first) = values.first() {
                    pairs.entry(key.clone()).or_insert_with(|| first.clone());
                }
            }
        }
        pairs
    }
}

/// The reply handed back to the host runtime. Terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl TriggerResponse {
    /// Header value by name, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Per-invocation host context, passed explicitly through the pipeline and
/// on to the dispatcher.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationContext {
    #[serde(default)]
    pub aws_request_id: Option<String>,
    #[serde(default)]
    pub function_name: Option<String>,
    #[serde(default)]
    pub function_version: Option<String>,
    #[serde(default)]
    pub invoked_function_arn: Option<String>,
    #[serde(default)]
    pub callback_waits_for_empty_event_loop: Option<bool>,
}

impl InvocationContext {
    pub fn with_request_id(request_id: impl Into<String>) -> Self {
        Self {
            aws_request_id: Some(request_id.into()),
            ..Self::default()
        }
    }

    pub fn request_id(&self) -> &str {
        self.aws_request_id.as_deref().unwrap_or("-")
    }
}
