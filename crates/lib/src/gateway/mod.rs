//! Gateway: the ingestion handler and the surfaces that feed it.
//!
//! One request in, at most one record out. The handler validates the body, classifies its action,
//! and forwards, ignores, or rejects. `server` exposes it over HTTP for local runs.

mod error;
mod handler;
mod protocol;
mod server;

pub use error::IngestError;
pub use handler::{Dispatch, IngestHandler};
pub use protocol::{
    Action, EventData, ForwardRecord, InboundEvent, ResponseBody, ResponseEnvelope,
    CONNECT_ACTION, DISCONNECT_ACTION, FORWARD_ACTION, PARTITION_KEY,
};
pub use server::run_gateway;
