//! Ingestion handler: validate one event, classify its action, and forward or reject it.

use crate::gateway::error::IngestError;
use crate::gateway::protocol::{
    Action, EventData, ForwardRecord, InboundEvent, ResponseEnvelope, PARTITION_KEY,
};
use crate::ids::IdGenerator;
use crate::sink::StreamSink;
use base64::Engine;
use std::sync::Arc;

/// Result of one invocation.
#[derive(Debug)]
pub enum Dispatch {
    /// Record written to the stream.
    Forwarded {
        record_id: String,
        response: ResponseEnvelope,
    },
    /// Connection lifecycle event; no response is produced.
    Ignored(Action),
    /// Validation or forwarding failed; `response` is the error-shaped envelope.
    Rejected {
        error: IngestError,
        response: ResponseEnvelope,
    },
}

impl Dispatch {
    /// Envelope to send back; `None` for ignored lifecycle events.
    pub fn into_response(self) -> Option<ResponseEnvelope> {
        match self {
            Dispatch::Forwarded { response, .. } | Dispatch::Rejected { response, .. } => {
                Some(response)
            }
            Dispatch::Ignored(_) => None,
        }
    }
}

/// Handler with its collaborators injected. Built once per process; `handle` keeps no state between calls.
pub struct IngestHandler {
    sink: Arc<dyn StreamSink>,
    ids: Arc<dyn IdGenerator>,
    stream_name: String,
    expose_error_detail: bool,
}

impl IngestHandler {
    pub fn new(
        sink: Arc<dyn StreamSink>,
        ids: Arc<dyn IdGenerator>,
        stream_name: impl Into<String>,
    ) -> Self {
        Self {
            sink,
            ids,
            stream_name: stream_name.into(),
            expose_error_detail: true,
        }
    }

    /// Whether 500 responses carry the sink failure detail.
    pub fn with_error_detail(mut self, expose: bool) -> Self {
        self.expose_error_detail = expose;
        self
    }

    pub fn stream_name(&self) -> &str {
        &self.stream_name
    }

    /// Handle one raw request body.
    pub async fn handle(&self, body: Option<&str>) -> Dispatch {
        match self.process(body).await {
            Ok(dispatch) => dispatch,
            Err(error) => self.reject(error),
        }
    }

    /// Convert an error raised outside `handle` (e.g. undecodable transport body) into a rejection.
    pub fn reject(&self, error: IngestError) -> Dispatch {
        match &error {
            IngestError::Forward(cause) => log::error!("{}: {}", error.message(), cause),
            other => log::debug!("rejecting event: {}", other),
        }
        let response = error.to_envelope(self.expose_error_detail);
        Dispatch::Rejected { error, response }
    }

    /// Yields `Forwarded` or `Ignored`; every failure comes back as an error.
    async fn process(&self, body: Option<&str>) -> Result<Dispatch, IngestError> {
        let body = body
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .ok_or(IngestError::MissingBody)?;
        let event: InboundEvent = serde_json::from_str(body)
            .map_err(|e| IngestError::MalformedPayload(e.to_string()))?;

        match Action::parse(&event.action) {
            Action::Forward => {
                let data = event
                    .data
                    .ok_or_else(|| IngestError::MalformedPayload("missing data".to_string()))?;
                let data: EventData = serde_json::from_value(data)
                    .map_err(|e| IngestError::MalformedPayload(format!("invalid data: {}", e)))?;
                let (record_id, response) = self.forward(data).await?;
                Ok(Dispatch::Forwarded {
                    record_id,
                    response,
                })
            }
            action if action.is_lifecycle() => {
                log::debug!("ignoring lifecycle action {:?}", event.action);
                Ok(Dispatch::Ignored(action))
            }
            _ => Err(IngestError::InvalidAction(event.action)),
        }
    }

    async fn forward(&self, data: EventData) -> Result<(String, ResponseEnvelope), IngestError> {
        let record_id = self.ids.next_id();
        let record = ForwardRecord::from_data(data, record_id.clone());
        let payload = record.encode();
        let encoded = base64::engine::general_purpose::STANDARD.encode(&payload);

        self.sink
            .put_record(&self.stream_name, PARTITION_KEY, payload)
            .await?;
        log::info!("forwarded record {} to stream {}", record_id, self.stream_name);
        Ok((record_id, ResponseEnvelope::received(encoded)))
    }
}
