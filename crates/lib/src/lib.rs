//! Forwarder core library: config, the ingestion gateway, sinks, and the Lambda adapter
//! used by the `forwarder` CLI.

pub mod config;
pub mod gateway;
pub mod ids;
pub mod init;
pub mod lambda;
pub mod sink;

use std::sync::Arc;

/// Build the handler from config: one Kinesis client for the life of the process.
pub async fn build_handler(config: &config::Config) -> gateway::IngestHandler {
    let sink = sink::KinesisSink::from_config(&config.kinesis).await;
    let stream_name = config::resolve_stream_name(&config.kinesis);
    gateway::IngestHandler::new(Arc::new(sink), Arc::new(ids::UuidV4), stream_name)
        .with_error_detail(config.gateway.expose_error_detail)
}
