//! Ingestion failures and their response mapping.

use crate::gateway::protocol::{
    ResponseEnvelope, MSG_FORWARD_FAILED, MSG_INVALID_ACTION, MSG_MALFORMED, MSG_MISSING_BODY,
};
use crate::sink::SinkError;

/// Why an invocation was rejected. Every variant is terminal; nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("missing event body")]
    MissingBody,
    #[error("malformed event body: {0}")]
    MalformedPayload(String),
    #[error("invalid event action: {0:?}")]
    InvalidAction(String),
    #[error("forwarding to stream failed: {0}")]
    Forward(#[from] SinkError),
}

impl IngestError {
    pub fn status_code(&self) -> u16 {
        match self {
            IngestError::MissingBody
            | IngestError::MalformedPayload(_)
            | IngestError::InvalidAction(_) => 400,
            IngestError::Forward(_) => 500,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            IngestError::MissingBody => MSG_MISSING_BODY,
            IngestError::MalformedPayload(_) => MSG_MALFORMED,
            IngestError::InvalidAction(_) => MSG_INVALID_ACTION,
            IngestError::Forward(_) => MSG_FORWARD_FAILED,
        }
    }

    /// Detail shown to the caller. Sink detail is internal and only shown when `expose_detail` is set.
    fn detail(&self, expose_detail: bool) -> Option<String> {
        match self {
            IngestError::MalformedPayload(why) => Some(why.clone()),
            IngestError::Forward(e) if expose_detail => Some(e.to_string()),
            _ => None,
        }
    }

    pub fn to_envelope(&self, expose_detail: bool) -> ResponseEnvelope {
        ResponseEnvelope::failure(self.status_code(), self.message(), self.detail(expose_detail))
    }
}
