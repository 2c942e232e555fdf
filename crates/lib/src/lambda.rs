//! Lambda runtime adapter: maps API Gateway proxy / WebSocket events onto the ingestion handler.

use crate::gateway::{Action, IngestError, IngestHandler, ResponseEnvelope};
use base64::Engine;
use lambda_runtime::{service_fn, LambdaEvent};
use std::sync::Arc;

/// Invocation payload. API Gateway proxy events deserialize into it as well; they carry no route key.
pub type InvocationEvent = aws_lambda_events::apigw::ApiGatewayWebsocketProxyRequest;

const CONNECT_ROUTE: &str = "$connect";
const DISCONNECT_ROUTE: &str = "$disconnect";

/// WebSocket lifecycle route, if this invocation is one. These carry no body.
pub fn lifecycle_route(event: &InvocationEvent) -> Option<Action> {
    match event.request_context.route_key.as_deref()? {
        CONNECT_ROUTE => Some(Action::Connect),
        DISCONNECT_ROUTE => Some(Action::Disconnect),
        _ => None,
    }
}

/// Body text, decoding base64 when the gateway flagged it.
pub fn body_text(event: &InvocationEvent) -> Result<Option<String>, IngestError> {
    let Some(body) = event.body.as_ref() else {
        return Ok(None);
    };
    if !event.is_base64_encoded {
        return Ok(Some(body.clone()));
    }
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(body.trim())
        .map_err(|e| IngestError::MalformedPayload(format!("invalid base64 body: {}", e)))?;
    String::from_utf8(bytes)
        .map(Some)
        .map_err(|e| IngestError::MalformedPayload(format!("body is not UTF-8: {}", e)))
}

/// Run one invocation. `None` means no response (serialized as JSON null).
pub async fn dispatch_invocation(
    handler: &IngestHandler,
    event: &InvocationEvent,
) -> Option<ResponseEnvelope> {
    if let Some(action) = lifecycle_route(event) {
        log::debug!("ignoring websocket lifecycle route {:?}", action);
        return None;
    }
    let dispatch = match body_text(event) {
        Ok(body) => handler.handle(body.as_deref()).await,
        Err(e) => handler.reject(e),
    };
    dispatch.into_response()
}

/// Serve invocations until the runtime stops. The handler (and its sink client) is shared by all of them.
pub async fn run_lambda(handler: Arc<IngestHandler>) -> Result<(), lambda_runtime::Error> {
    log::info!("lambda runtime starting; stream {}", handler.stream_name());
    lambda_runtime::run(service_fn(move |event: LambdaEvent<InvocationEvent>| {
        let handler = handler.clone();
        async move {
            let response = dispatch_invocation(&handler, &event.payload).await;
            Ok::<_, lambda_runtime::Error>(response)
        }
    }))
    .await
}
