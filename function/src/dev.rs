//! Local dev host.
//!
//! Every request, whatever its path, is converted into a `TriggerEvent`,
//! handled by the bridge, and the `TriggerResponse` is written back as the
//! HTTP response. This is what a functions dev proxy does in front of a
//! deployed function, so the adapters see the same event shape locally.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::{Query, Request, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::Response,
    Router,
};
use base64::Engine;
use bridge_core::{BridgeError, InvocationContext, TriggerEvent, TriggerResponse};
use tokio::net::TcpListener;
use tracing::{debug, info};
use uuid::Uuid;

use crate::FunctionBridge;

const BODY_LIMIT: usize = 6 * 1024 * 1024;

pub fn app(bridge: Arc<FunctionBridge>) -> Router {
    Router::new().fallback(invoke).with_state(bridge)
}

pub async fn run(listener: TcpListener, bridge: FunctionBridge) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, endpoint = %bridge.config().endpoint, "dev host listening");
    }
    axum::serve(listener, app(Arc::new(bridge))).await
}

async fn invoke(State(bridge): State<Arc<FunctionBridge>>, request: Request) -> Response {
    let context = InvocationContext::with_request_id(Uuid::new_v4().to_string());
    let event = match trigger_event(request).await {
        Ok(event) => event,
        Err(message) => {
            let reply = bridge.fallback(&BridgeError::UnreadableRequest(message));
            return http_response(reply);
        }
    };
    debug!(request_id = context.request_id(), method = %event.method, path = %event.path, "dev invocation");
    http_response(bridge.handle(&event, &context).await)
}

/// Build the trigger event a host would deliver for this request. Bodies
/// that are not UTF-8 are base64-encoded and flagged.
pub async fn trigger_event(request: Request) -> Result<TriggerEvent, String> {
    let (parts, body) = request.into_parts();

    let query = Query::<BTreeMap<String, String>>::try_from_uri(&parts.uri)
        .map(|Query(query)| query)
        .map_err(|e| e.to_string())?;
    let headers = parts
        .headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                value.to_str().ok().map(str::to_string),
            )
        })
        .collect();

    let bytes = to_bytes(body, BODY_LIMIT).await.map_err(|e| e.to_string())?;
    let (body, is_base64_encoded) = if bytes.is_empty() {
        (None, false)
    } else {
        match String::from_utf8(bytes.to_vec()) {
            Ok(text) => (Some(text), false),
            Err(_) => (
                Some(base64::engine::general_purpose::STANDARD.encode(&bytes)),
                true,
            ),
        }
    };

    Ok(TriggerEvent {
        method: parts.method.as_str().to_string(),
        path: parts.uri.path().to_string(),
        headers,
        query_string_parameters: (!query.is_empty()).then_some(query),
        multi_value_query_string_parameters: None,
        multi_value_headers: None,
        body,
        is_base64_encoded,
    })
}

pub fn http_response(reply: TriggerResponse) -> Response {
    let mut response = Response::new(Body::from(reply.body));
    *response.status_mut() =
        StatusCode::from_u16(reply.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    for (name, value) in reply.headers {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(&value),
        ) {
            response.headers_mut().insert(name, value);
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn request_becomes_trigger_event() {
        let request = Request::builder()
            .method("POST")
            .uri("/.netlify/functions/api/hello?b=2&a=1")
            .header("x-trace", "t1")
            .body(Body::from(r#"{"input":"x"}"#))
            .unwrap();

        let event = trigger_event(request).await.unwrap();

        assert_eq!(event.method, "POST");
        assert_eq!(event.path, "/.netlify/functions/api/hello");
        assert_eq!(event.query_parameters().len(), 2);
        assert_eq!(event.headers.get("x-trace"), Some(&Some("t1".to_string())));
        assert_eq!(event.body.as_deref(), Some(r#"{"input":"x"}"#));
        assert!(!event.is_base64_encoded);
    }

    #[tokio::test]
    async fn empty_request_has_no_body_or_query() {
        let request = Request::builder()
            .uri("/api/hello")
            .body(Body::empty())
            .unwrap();

        let event = trigger_event(request).await.unwrap();

        assert!(event.body.is_none());
        assert!(event.query_string_parameters.is_none());
    }

    #[tokio::test]
    async fn binary_body_is_base64_flagged() {
        let request = Request::builder()
            .method("PUT")
            .uri("/api/hello")
            .body(Body::from(vec![0xff, 0xfe]))
            .unwrap();

        let event = trigger_event(request).await.unwrap();

        assert!(event.is_base64_encoded);
        assert_eq!(event.body.as_deref(), Some("//4="));
    }

    #[test]
    fn trigger_response_becomes_http_response() {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        let response = http_response(TriggerResponse {
            status_code: 201,
            headers,
            body: "\"ok\"".to_string(),
        });
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()["content-type"], "application/json");
    }
}
