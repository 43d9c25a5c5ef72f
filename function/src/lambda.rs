//! Proxy-event entry point for `lambda_runtime`.

use std::sync::Arc;

use bridge_core::{InvocationContext, TriggerEvent, TriggerResponse};
use lambda_runtime::{service_fn, Context, LambdaEvent};

use crate::FunctionBridge;

pub fn invocation_context(context: &Context) -> InvocationContext {
    InvocationContext {
        aws_request_id: Some(context.request_id.clone()),
        function_name: Some(context.env_config.function_name.clone()),
        function_version: Some(context.env_config.version.clone()),
        invoked_function_arn: Some(context.invoked_function_arn.clone()),
        callback_waits_for_empty_event_loop: None,
    }
}

/// Never errors: failures are already folded into the response envelope.
pub async fn handle_event(
    bridge: &FunctionBridge,
    event: LambdaEvent<TriggerEvent>,
) -> Result<TriggerResponse, lambda_runtime::Error> {
    let (payload, context) = event.into_parts();
    Ok(bridge.handle(&payload, &invocation_context(&context)).await)
}

pub async fn run(bridge: FunctionBridge) -> Result<(), lambda_runtime::Error> {
    let bridge = Arc::new(bridge);
    lambda_runtime::run(service_fn(move |event: LambdaEvent<TriggerEvent>| {
        let bridge = Arc::clone(&bridge);
        async move { handle_event(&bridge, event).await }
    }))
    .await
}
