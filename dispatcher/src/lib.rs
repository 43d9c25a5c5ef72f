//! RPC-over-HTTP runtime for the function's procedures.
//!
//! Procedures live under `<endpoint>/<name>`. GET and HEAD calls carry the
//! input in the `input` query parameter; every other method carries it as a
//! JSON body. Results are answered as JSON; failures use the
//! `{"error", "details"}` envelope with 400 (bad input), 404 (unknown
//! procedure) or 500 (procedure failed).
//!
//! The router is served standalone by the `rpc-dispatcher` binary, and used
//! in-process by `RouterDispatcher`, which implements the bridge's
//! `Dispatcher` trait.

pub mod procedure;

use std::collections::HashMap;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    extract::{Path, Query, Request, State},
    http::{self, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use bridge_core::{BridgeError, Dispatcher, ErrorBody, HttpRequest, HttpResponse, InvocationContext};
use http_body_util::BodyExt;
use serde_json::Value;
use tokio::net::TcpListener;
use tower::ServiceExt;
use tracing::{debug, info};

pub use procedure::{greet, hello, Procedure, ProcedureError, Registry, Typed};

/// Path procedures are served under.
pub const ENDPOINT: &str = "/.netlify/functions/api";

const BODY_LIMIT: usize = 1024 * 1024;

/// Registry with every procedure this function exposes.
pub fn default_registry() -> Registry {
    Registry::new().register("hello", hello())
}

pub fn app() -> Router {
    router(ENDPOINT, default_registry())
}

pub fn router(endpoint: &str, registry: Registry) -> Router {
    let endpoint = endpoint.trim_end_matches('/');
    Router::new()
        .route(&format!("{endpoint}/{{procedure}}"), any(call))
        .fallback(not_found)
        .with_state(registry)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    let registry = default_registry();
    info!(endpoint = ENDPOINT, procedures = ?registry.names(), "serving procedures");
    axum::serve(listener, router(ENDPOINT, registry)).await
}

async fn call(
    State(registry): State<Registry>,
    Path(name): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    request: Request,
) -> Response {
    let context = request
        .extensions()
        .get::<InvocationContext>()
        .cloned()
        .unwrap_or_default();
    let Some(procedure) = registry.get(&name) else {
        return error_response(
            StatusCode::NOT_FOUND,
            ErrorBody::new(ErrorBody::NOT_FOUND).with_details(format!("no procedure named `{name}`")),
        );
    };

    let method = request.method().clone();
    let input = if method == Method::GET || method == Method::HEAD {
        params.get("input").cloned().map(Value::String).unwrap_or(Value::Null)
    } else {
        match read_json_body(request).await {
            Ok(value) => value,
            Err(details) => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    ErrorBody::new(ErrorBody::BAD_REQUEST).with_details(details),
                )
            }
        }
    };
    debug!(procedure = %name, %method, "calling procedure");

    match procedure.call(input, &context) {
        Ok(output) => (StatusCode::OK, Json(output)).into_response(),
        Err(ProcedureError::Validation(error)) => error_response(
            StatusCode::BAD_REQUEST,
            ErrorBody::new(ErrorBody::BAD_REQUEST).with_details(error.message),
        ),
        Err(ProcedureError::Execution(message)) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorBody::internal().with_details(message),
        ),
    }
}

/// Empty body reads as `null`, so it reaches the validator rather than
/// failing here.
async fn read_json_body(request: Request) -> Result<Value, String> {
    let bytes = to_bytes(request.into_body(), BODY_LIMIT)
        .await
        .map_err(|e| e.to_string())?;
    if bytes.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_slice(&bytes).map_err(|e| format!("body is not valid JSON: {e}"))
}

async fn not_found(request: Request) -> Response {
    error_response(
        StatusCode::NOT_FOUND,
        ErrorBody::new(ErrorBody::NOT_FOUND)
            .with_details(format!("no procedure at `{}`", request.uri().path())),
    )
}

fn error_response(status: StatusCode, body: ErrorBody) -> Response {
    (status, Json(body)).into_response()
}

/// Drives the router in-process, one `oneshot` per invocation.
#[derive(Clone)]
pub struct RouterDispatcher {
    router: Router,
}

impl RouterDispatcher {
    pub fn new(router: Router) -> Self {
        Self { router }
    }
}

impl Default for RouterDispatcher {
    fn default() -> Self {
        Self::new(app())
    }
}

#[async_trait]
impl Dispatcher for RouterDispatcher {
    async fn dispatch(
        &self,
        request: HttpRequest,
        context: &InvocationContext,
    ) -> Result<HttpResponse, BridgeError> {
        let mut http_request = http::Request::builder()
            .method(request.method.as_str())
            .uri(request.url.as_str())
            .body(Body::from(request.body.unwrap_or_default()))
            .map_err(|e| BridgeError::Dispatch(e.to_string()))?;
        for (name, value) in &request.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    http_request.headers_mut().append(name, value);
                }
                _ => debug!(header = %name, "skipping header that is not valid HTTP"),
            }
        }
        http_request.extensions_mut().insert(context.clone());

        let response = match self.router.clone().oneshot(http_request).await {
            Ok(response) => response,
            Err(never) => match never {},
        };
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
        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| BridgeError::Dispatch(e.to_string()))?
            .to_bytes();
        let body = String::from_utf8(bytes.to_vec()).map_err(|e| BridgeError::Dispatch(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
