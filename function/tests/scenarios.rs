//! Run every trigger event in `test-vectors/scenarios.json` through the
//! full pipeline and check status, body and the fixed headers.
//!
//! Error cases are compared on the envelope's `error` field only, since
//! `details` carries parser messages that are not part of the contract.

use bridge_core::{AdapterConfig, ErrorBody, InvocationContext, TriggerEvent, FIXED_HEADERS};

#[tokio::test]
async fn scenario_test_vectors() {
    let raw = include_str!("../../test-vectors/scenarios.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let bridge = hello_function::bridge(AdapterConfig::default());
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let event: TriggerEvent = serde_json::from_value(case["event"].clone()).unwrap();

        let reply = bridge
            .handle(&event, &InvocationContext::with_request_id(name))
            .await;

        assert_eq!(
            u64::from(reply.status_code),
            case["expected_status"].as_u64().unwrap(),
            "{name}: status (body {})",
            reply.body
        );
        for (key, value) in FIXED_HEADERS {
            assert_eq!(reply.header(key), Some(value), "{name}: header {key}");
        }
        if let Some(body) = case["expected_body"].as_str() {
            assert_eq!(reply.body, body, "{name}: body");
        }
        if let Some(error) = case["expected_error"].as_str() {
            let envelope: ErrorBody = serde_json::from_str(&reply.body).unwrap();
            assert_eq!(envelope.error, error, "{name}: error");
        }
    }
}

#[tokio::test]
async fn malformed_body_envelope_has_details() {
    let bridge = hello_function::bridge(AdapterConfig::default());
    let event = TriggerEvent::new("POST", "/api/hello").with_body("not-json");

    let reply = bridge.handle(&event, &InvocationContext::default()).await;

    let envelope: ErrorBody = serde_json::from_str(&reply.body).unwrap();
    assert_eq!(envelope.error, "Internal Server Error");
    assert!(envelope
        .details
        .unwrap()
        .starts_with("request body is not valid JSON"));
}

#[tokio::test]
async fn details_can_be_suppressed() {
    let config = AdapterConfig {
        expose_error_details: false,
        ..AdapterConfig::default()
    };
    let bridge = hello_function::bridge(config);
    let event = TriggerEvent::new("POST", "/api/hello").with_body("not-json");

    let reply = bridge.handle(&event, &InvocationContext::default()).await;

    assert_eq!(reply.status_code, 500);
    assert_eq!(reply.body, r#"{"error":"Internal Server Error"}"#);
}

#[tokio::test]
async fn custom_endpoint_is_served() {
    let config = AdapterConfig {
        endpoint: "/rpc".to_string(),
        mount_paths: vec!["/functions/hello-api".to_string()],
        ..AdapterConfig::default()
    };
    let bridge = hello_function::bridge(config);
    let event = TriggerEvent::new("GET", "/functions/hello-api/hello").with_query("input", "Custom");

    let reply = bridge.handle(&event, &InvocationContext::default()).await;

    assert_eq!(reply.status_code, 200);
    assert_eq!(reply.body, "\"Hello, Custom!\"");
}

#[tokio::test]
async fn reserved_characters_in_path_do_not_leak_into_query() {
    let bridge = hello_function::bridge(AdapterConfig::default());

    for path in ["/api/hello?input=Injected", "/api/hello world"] {
        let event = TriggerEvent::new("GET", path).with_query("input", "World");

        let reply = bridge.handle(&event, &InvocationContext::default()).await;

        assert_eq!(reply.status_code, 404, "{path}: {}", reply.body);
        let envelope: ErrorBody = serde_json::from_str(&reply.body).unwrap();
        assert_eq!(envelope.error, ErrorBody::NOT_FOUND, "{path}");
    }
}
