//! Local HTTP gateway: serves the ingestion handler outside Lambda (development, LocalStack).

use crate::config::{self, GatewayConfig};
use crate::gateway::error::IngestError;
use crate::gateway::handler::IngestHandler;
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

/// Shared state for the gateway routes.
#[derive(Clone)]
struct GatewayState {
    handler: Arc<IngestHandler>,
    port: u16,
}

/// Bind `gateway.bind:gateway.port` and serve until SIGINT/SIGTERM.
pub async fn run_gateway(gateway: GatewayConfig, handler: Arc<IngestHandler>) -> Result<()> {
    let bind = gateway.bind.trim();
    if !config::is_loopback_bind(bind) {
        log::warn!(
            "gateway bound to non-loopback address {}; anyone who can reach it can write to stream {}",
            bind,
            handler.stream_name()
        );
    }

    let state = GatewayState {
        handler,
        port: gateway.port,
    };
    let app = Router::new()
        .route("/", get(health_http))
        .route("/events", post(post_event))
        .with_state(state);

    let bind_addr = format!("{}:{}", bind, gateway.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("gateway listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("gateway server exited")?;
    log::info!("gateway stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining connections");
}

/// GET / returns a simple health JSON (for liveness checks).
async fn health_http(State(state): State<GatewayState>) -> Json<serde_json::Value> {
    Json(json!({
        "runtime": "running",
        "stream": state.handler.stream_name(),
        "port": state.port,
    }))
}

/// POST /events runs the handler on the raw body. The envelope status becomes the HTTP status;
/// an ignored lifecycle event answers 204 with no body.
async fn post_event(State(state): State<GatewayState>, body: Bytes) -> Response {
    let dispatch = match std::str::from_utf8(&body) {
        Ok(text) => state.handler.handle(Some(text)).await,
        Err(e) => state
            .handler
            .reject(IngestError::MalformedPayload(format!("body is not UTF-8: {}", e))),
    };
    let Some(envelope) = dispatch.into_response() else {
        return StatusCode::NO_CONTENT.into_response();
    };
    let status =
        StatusCode::from_u16(envelope.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        envelope.body,
    )
        .into_response()
}

