//! Inbound adapter: trigger event to canonical request.
//!
//! # Design
//! One adapter, parameterized by the `{method -> EncodingRule}` table in
//! `AdapterConfig`, covers every way the call parameter can travel. The
//! adapter only borrows the event and builds a fresh `HttpRequest`.

use std::collections::BTreeMap;

use base64::Engine;
use serde_json::Value;
use tracing::debug;

use crate::config::{AdapterConfig, EncodingRule};
use crate::error::BridgeError;
use crate::http::HttpRequest;
use crate::trigger::TriggerEvent;

const CONTENT_TYPE_JSON: &str = "application/json";

/// What the inbound adapter decided to do with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// Forward to the dispatcher.
    Dispatch(HttpRequest),
    /// Answer the preflight directly.
    Preflight,
}

#[derive(Debug, Clone)]
pub struct InboundAdapter {
    config: AdapterConfig,
}

impl InboundAdapter {
    pub fn new(config: AdapterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// The procedure segment of a trigger path: the path with the first
    /// matching mount prefix (and one following `/`) removed. Empty when no
    /// prefix matches.
    pub fn procedure_path<'a>(&self, path: &'a str) -> &'a str {
        for mount in &self.config.mount_paths {
            let mount = mount.trim_end_matches('/');
            let Some(rest) = path.strip_prefix(mount) else {
                continue;
            };
            if rest.is_empty() {
                return "";
            }
            if let Some(rest) = rest.strip_prefix('/') {
                return rest;
            }
        }
        ""
    }

    pub fn adapt(&self, event: &TriggerEvent) -> Result<Inbound, BridgeError> {
        let method = event.http_method();
        let rule = self.config.rule_for(method.as_str());
        let procedure = self.procedure_path(&event.path);
        let mut query = event.query_parameters();

        let body = match rule {
            EncodingRule::Preflight => {
                debug!(%method, "preflight request");
                return Ok(Inbound::Preflight);
            }
            EncodingRule::Query => {
                query.entry(self.config.input_param.clone()).or_default();
                None
            }
            EncodingRule::JsonBody => match decode_body(event)? {
                Some(raw) => Some(self.reencode_body(raw)?),
                None => None,
            },
            EncodingRule::Passthrough => decode_body(event)?,
        };
        debug!(%method, procedure, ?rule, has_body = body.is_some(), "adapted trigger event");

        Ok(Inbound::Dispatch(HttpRequest {
            method,
            url: self.absolute_url(procedure, &query),
            headers: canonical_headers(event, body.is_some()),
            body,
        }))
    }

    /// Parse a JSON body. An object with the input field is reduced to just
    /// that field; any other JSON value is forwarded as it came.
    fn reencode_body(&self, raw: String) -> Result<String, BridgeError> {
        let value: Value = serde_json::from_str(&raw).map_err(BridgeError::MalformedBody)?;
        let input = match &value {
            Value::Object(fields) => fields.get(&self.config.input_param),
            _ => None,
        };
        match input {
            Some(input) => {
                let mut wrapped = serde_json::Map::new();
                wrapped.insert(self.config.input_param.clone(), input.clone());
                Ok(Value::Object(wrapped).to_string())
            }
            None => Ok(raw),
        }
    }

    fn absolute_url(&self, procedure: &str, query: &BTreeMap<String, String>) -> String {
        let mut url = format!(
            "{}{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.endpoint.trim_end_matches('/'),
            encode_path(procedure)
        );
        if !query.is_empty() {
            let encoded = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(query.iter())
                .finish();
            url.push('?');
            url.push_str(&encoded);
        }
        url
    }
}

/// Percent-encode each `/`-separated segment so a decoded `?`, `#` or space
/// in the trigger path stays part of the procedure name.
fn encode_path(procedure: &str) -> String {
    procedure
        .split('/')
        .map(|segment| {
            form_urlencoded::byte_serialize(segment.as_bytes())
                .collect::<String>()
                .replace('+', "%20")
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn decode_body(event: &TriggerEvent) -> Result<Option<String>, BridgeError> {
    match &event.body {
        Some(body) if event.is_base64_encoded => {
            let bytes = base64::engine::general_purpose::STANDARD.decode(body)?;
            Ok(Some(String::from_utf8(bytes)?))
        }
        other => Ok(other.clone()),
    }
}

/// Event headers minus `content-type` and `content-length`, plus a JSON
/// content type whenever a body is attached.
fn canonical_headers(event: &TriggerEvent, has_body: bool) -> Vec<(String, String)> {
    let mut headers: Vec<(String, String)> = event
        .header_pairs()
        .into_iter()
        .filter(|(key, _)| {
            !key.eq_ignore_ascii_case("content-type") && !key.eq_ignore_ascii_case("content-length")
        })
        .collect();
    if has_body {
        headers.push(("content-type".to_string(), CONTENT_TYPE_JSON.to_string()));
    }
    headers
}
