//! Kinesis sink built on the AWS SDK. Also carries the stream administration used for local setup.

use super::{SinkError, StreamSink};
use crate::config::{self, KinesisConfig};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_kinesis::config::Credentials;
use aws_sdk_kinesis::error::DisplayErrorContext;
use aws_sdk_kinesis::primitives::Blob;
use aws_sdk_kinesis::Client;

/// Shard count for streams created by `create_stream`.
const SHARD_COUNT: i32 = 1;

/// Kinesis client wrapper. Build once per process and share.
#[derive(Clone)]
pub struct KinesisSink {
    client: Client,
}

impl KinesisSink {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build the SDK client from config: region, optional endpoint override, optional static credentials.
    pub async fn from_config(kinesis: &KinesisConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(kinesis.region.clone()));
        if let Some(url) = config::resolve_endpoint_url(kinesis) {
            log::info!("kinesis endpoint override: {}", url);
            loader = loader.endpoint_url(url);
        }
        if let Some((key, secret)) = config::resolve_static_credentials(kinesis) {
            log::debug!("using static kinesis credentials from config");
            loader = loader.credentials_provider(Credentials::new(
                key,
                secret,
                None,
                None,
                "forwarder-config",
            ));
        }
        let shared = loader.load().await;
        Self::new(Client::new(&shared))
    }

    /// Create a stream with a single shard.
    pub async fn create_stream(&self, name: &str) -> Result<(), SinkError> {
        self.client
            .create_stream()
            .stream_name(name)
            .shard_count(SHARD_COUNT)
            .send()
            .await
            .map_err(|e| SinkError::Admin(DisplayErrorContext(&e).to_string()))?;
        Ok(())
    }

    pub async fn delete_stream(&self, name: &str) -> Result<(), SinkError> {
        self.client
            .delete_stream()
            .stream_name(name)
            .send()
            .await
            .map_err(|e| SinkError::Admin(DisplayErrorContext(&e).to_string()))?;
        Ok(())
    }

    /// ARN of an existing stream (for binding consumers).
    pub async fn stream_arn(&self, name: &str) -> Result<String, SinkError> {
        let out = self
            .client
            .describe_stream_summary()
            .stream_name(name)
            .send()
            .await
            .map_err(|e| SinkError::Admin(DisplayErrorContext(&e).to_string()))?;
        out.stream_description_summary()
            .map(|s| s.stream_arn().to_string())
            .ok_or_else(|| SinkError::Admin(format!("no description returned for stream {}", name)))
    }
}

#[async_trait]
impl StreamSink for KinesisSink {
    async fn put_record(
        &self,
        stream_name: &str,
        partition_key: &str,
        data: Vec<u8>,
    ) -> Result<(), SinkError> {
        let out = self
            .client
            .put_record()
            .stream_name(stream_name)
            .partition_key(partition_key)
            .data(Blob::new(data))
            .send()
            .await
            .map_err(|e| SinkError::Put(DisplayErrorContext(&e).to_string()))?;
        log::debug!(
            "put record: stream={} shard={} sequence={}",
            stream_name,
            out.shard_id(),
            out.sequence_number()
        );
        Ok(())
    }
}
