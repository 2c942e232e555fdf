//! Streaming sinks: where forwarded records go.

mod kinesis;

pub use kinesis::KinesisSink;

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("put record failed: {0}")]
    Put(String),
    #[error("stream administration failed: {0}")]
    Admin(String),
}

/// Destination for encoded records. Shared across invocations; implementations hold no per-call state.
#[async_trait]
pub trait StreamSink: Send + Sync {
    /// Write one record. Success or failure is reported once; callers do not retry.
    async fn put_record(
        &self,
        stream_name: &str,
        partition_key: &str,
        data: Vec<u8>,
    ) -> Result<(), SinkError>;
}
