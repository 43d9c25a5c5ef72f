//! End-to-end calls against the live dev host.
//!
//! # Design
//! Starts the dev host on a random port, then drives it over real HTTP with
//! ureq through `HelloClient` in both call styles. Validates that request
//! building, the adapters, the dispatcher and response parsing agree.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use bridge_core::{
    AdapterConfig, ApiError, CallStyle, ErrorBody, HelloClient, HttpMethod, HttpResponse,
    FIXED_HEADERS,
};
use tower::ServiceExt;

/// Send a client-built request over the wire. Error statuses come back as
/// responses so `parse_hello` sees the envelope.
fn execute(req: bridge_core::HttpRequest) -> HttpResponse {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let mut response = match (req.method, req.body) {
        (HttpMethod::Get, _) => agent.get(&req.url).call(),
        (HttpMethod::Post, Some(body)) => agent
            .post(&req.url)
            .content_type("application/json")
            .send(body.as_bytes()),
        (HttpMethod::Post, None) => agent.post(&req.url).send_empty(),
        (method, _) => panic!("unsupported method in test: {method}"),
    }
    .expect("HTTP transport error");

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    HttpResponse {
        status,
        headers,
        body,
    }
}

/// Start the dev host on a random port; returns the function endpoint URL.
fn start_host() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            let bridge = hello_function::bridge(AdapterConfig::default());
            hello_function::dev::run(listener, bridge).await
        })
        .unwrap();
    });

    format!("http://{addr}/.netlify/functions/api")
}

#[test]
fn query_and_mutation_round_trip() {
    let endpoint = start_host();

    for style in [CallStyle::Query, CallStyle::Mutation] {
        let client = HelloClient::new(&endpoint, style);

        let response = execute(client.build_hello("World").unwrap());
        assert_eq!(response.header("access-control-allow-origin"), Some("*"), "{style:?}");
        assert_eq!(
            response.header("access-control-allow-methods"),
            Some("GET, POST, OPTIONS"),
            "{style:?}"
        );
        assert_eq!(client.parse_hello(response).unwrap(), "Hello, World!", "{style:?}");

        let response = execute(client.build_hello("").unwrap());
        assert_eq!(client.parse_hello(response).unwrap(), "Hello, !", "{style:?}");

        let response = execute(client.build_hello("a b&c=d/é").unwrap());
        assert_eq!(client.parse_hello(response).unwrap(), "Hello, a b&c=d/é!", "{style:?}");
    }
}

#[test]
fn short_mount_path_is_served() {
    let endpoint = start_host().replace("/.netlify/functions/api", "/api");
    let client = HelloClient::new(&endpoint, CallStyle::Query);

    let response = execute(client.build_hello("Short").unwrap());
    assert_eq!(client.parse_hello(response).unwrap(), "Hello, Short!");
}

#[test]
fn malformed_mutation_surfaces_fallback_message() {
    let endpoint = start_host();
    let client = HelloClient::new(&endpoint, CallStyle::Mutation);

    let mut req = client.build_hello("ignored").unwrap();
    req.body = Some("not-json".to_string());
    let response = execute(req);
    assert_eq!(response.status, 500);
    assert_eq!(response.header("content-type"), Some("application/json"));

    let err = client.parse_hello(response).unwrap_err();
    assert!(matches!(err, ApiError::HttpError { status: 500, .. }));
    assert!(err.message().starts_with("request body is not valid JSON"));
}

#[test]
fn unknown_procedure_is_not_found() {
    let endpoint = start_host();
    let client = HelloClient::new(&format!("{endpoint}/missing"), CallStyle::Query);

    let err = client
        .parse_hello(execute(client.build_hello("x").unwrap()))
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }));
    assert!(err.message().starts_with("no procedure at"), "{}", err.message());
}

#[tokio::test]
async fn options_preflight_is_acknowledged() {
    let app = hello_function::dev::app(Arc::new(hello_function::bridge(AdapterConfig::default())));
    let resp = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/.netlify/functions/api/hello")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
    assert_eq!(resp.headers()["access-control-allow-methods"], "GET, POST, OPTIONS");
}

#[tokio::test]
async fn oversized_body_gets_fallback_envelope() {
    let app = hello_function::dev::app(Arc::new(hello_function::bridge(AdapterConfig::default())));
    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/.netlify/functions/api/hello")
                .body(Body::from(vec![b'a'; 7 * 1024 * 1024]))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    for (key, value) in FIXED_HEADERS {
        assert_eq!(resp.headers()[key], value, "{key}");
    }
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let envelope: ErrorBody = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(envelope.error, ErrorBody::INTERNAL);
    assert!(envelope
        .details
        .unwrap()
        .starts_with("request could not be read"));
}
