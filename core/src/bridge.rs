//! The per-invocation pipeline: inbound adapter, dispatcher, outbound
//! adapter, in that order.
//!
//! # Design
//! `Bridge::handle` is infallible. Every `BridgeError` raised on the way is
//! turned into the outbound fallback envelope, so the host always gets
//! exactly one `TriggerResponse`. Dispatcher-level failures (validation,
//! unknown procedure, execution) are ordinary responses and pass through
//! with their own status.

use async_trait::async_trait;
use tracing::{info, info_span, warn, Instrument};

use crate::config::AdapterConfig;
use crate::error::BridgeError;
use crate::http::{HttpRequest, HttpResponse};
use crate::inbound::{Inbound, InboundAdapter};
use crate::outbound::OutboundAdapter;
use crate::trigger::{InvocationContext, TriggerEvent, TriggerResponse};

/// The RPC runtime behind the adapters. Parses a canonical request,
/// resolves and runs the procedure, and answers with a canonical response.
///
/// `Err` is reserved for failures to produce any response at all; a
/// rejected or failed call is an `Ok` response with a 4xx/5xx status.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn dispatch(
        &self,
        request: HttpRequest,
        context: &InvocationContext,
    ) -> Result<HttpResponse, BridgeError>;
}

pub struct Bridge<D> {
    inbound: InboundAdapter,
    outbound: OutboundAdapter,
    dispatcher: D,
}

impl<D: Dispatcher> Bridge<D> {
    pub fn new(config: AdapterConfig, dispatcher: D) -> Self {
        let outbound = OutboundAdapter::new(config.expose_error_details);
        Self {
            inbound: InboundAdapter::new(config),
            outbound,
            dispatcher,
        }
    }

    pub fn config(&self) -> &AdapterConfig {
        self.inbound.config()
    }

    /// The fallback envelope for a failure that happened before an event
    /// could be handed to `handle`.
    pub fn fallback(&self, error: &BridgeError) -> TriggerResponse {
        warn!(%error, "request rejected before dispatch");
        self.outbound.fallback(error)
    }

    /// Run one invocation to completion.
    pub async fn handle(&self, event: &TriggerEvent, context: &InvocationContext) -> TriggerResponse {
        let span = info_span!(
            "invocation",
            request_id = context.request_id(),
            method = %event.method,
            path = %event.path,
        );
        async {
            let response = match self.process(event, context).await {
                Ok(response) => response,
                Err(error) => {
                    warn!(%error, "invocation failed, returning fallback envelope");
                    self.outbound.fallback(&error)
                }
            };
            info!(status = response.status_code, "invocation complete");
            response
        }
        .instrument(span)
        .await
    }

    async fn process(
        &self,
        event: &TriggerEvent,
        context: &InvocationContext,
    ) -> Result<TriggerResponse, BridgeError> {
        let request = match self.inbound.adapt(event)? {
            Inbound::Dispatch(request) => request,
            Inbound::Preflight => return Ok(self.outbound.preflight()),
        };
        let response = self.dispatcher.dispatch(request, context).await?;
        self.outbound.respond(response)
    }
}
