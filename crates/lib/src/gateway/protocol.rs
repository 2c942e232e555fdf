//! Gateway wire types: inbound event, forwarded record, and response envelope.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Action tag that forwards `data` to the stream.
pub const FORWARD_ACTION: &str = "kinesis-data-forwarder";
pub const CONNECT_ACTION: &str = "connect";
pub const DISCONNECT_ACTION: &str = "disconnect";

/// Every record goes to the same partition; the stream owns ordering.
pub const PARTITION_KEY: &str = "1";

pub const MSG_RECEIVED: &str = "Event received";
pub const MSG_MISSING_BODY: &str = "Missing event body";
pub const MSG_MALFORMED: &str = "Malformed event body";
pub const MSG_INVALID_ACTION: &str = "Invalid event action";
pub const MSG_FORWARD_FAILED: &str = "Error sending event to Kinesis";

/// Request body: `{ "action", "data"? }`. `data` stays raw until the action says it is needed.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundEvent {
    pub action: String,
    #[serde(default)]
    pub data: Option<Value>,
}

/// Classified action tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Forward,
    Connect,
    Disconnect,
    Other(String),
}

impl Action {
    pub fn parse(tag: &str) -> Self {
        match tag {
            FORWARD_ACTION => Action::Forward,
            CONNECT_ACTION => Action::Connect,
            DISCONNECT_ACTION => Action::Disconnect,
            other => Action::Other(other.to_string()),
        }
    }

    /// Connection lifecycle actions carry nothing to forward.
    pub fn is_lifecycle(&self) -> bool {
        matches!(self, Action::Connect | Action::Disconnect)
    }
}

/// `data` of a forward event. Any caller `id` is accepted but never used.
#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    pub title: String,
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Record written to the stream: caller data with a generated id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForwardRecord {
    pub title: String,
    pub id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ForwardRecord {
    /// Build from caller data, discarding the caller id in favor of `id`.
    pub fn from_data(data: EventData, id: String) -> Self {
        Self {
            title: data.title,
            id,
            extra: data.extra,
        }
    }

    /// UTF-8 JSON bytes handed to the sink: `title`, `id`, then the caller's other fields in order.
    /// Built from `Value`, whose rendering cannot fail.
    pub fn encode(&self) -> Vec<u8> {
        let mut object = Map::with_capacity(self.extra.len() + 2);
        object.insert("title".to_string(), Value::String(self.title.clone()));
        object.insert("id".to_string(), Value::String(self.id.clone()));
        for (key, value) in &self.extra {
            object.insert(key.clone(), value.clone());
        }
        Value::Object(object).to_string().into_bytes()
    }
}

/// Response shape expected by the invoking gateway: `{ "statusCode", "body" }` with `body` a JSON string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub status_code: u16,
    pub body: String,
}

/// Object rendered into `ResponseEnvelope::body`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResponseBody {
    pub message: String,
    /// Forwarded payload, base64 (standard alphabet).
    #[serde(default)]
    pub encoded: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ResponseBody {
    /// JSON text with absent fields omitted.
    pub fn to_json(&self) -> String {
        let mut object = Map::new();
        object.insert("message".to_string(), Value::String(self.message.clone()));
        if let Some(encoded) = &self.encoded {
            object.insert("encoded".to_string(), Value::String(encoded.clone()));
        }
        if let Some(error) = &self.error {
            object.insert("error".to_string(), Value::String(error.clone()));
        }
        Value::Object(object).to_string()
    }
}

impl ResponseEnvelope {
    pub fn new(status_code: u16, body: &ResponseBody) -> Self {
        Self {
            status_code,
            body: body.to_json(),
        }
    }

    pub fn received(encoded: String) -> Self {
        Self::new(
            200,
            &ResponseBody {
                message: MSG_RECEIVED.to_string(),
                encoded: Some(encoded),
                error: None,
            },
        )
    }

    pub fn failure(status_code: u16, message: &str, error: Option<String>) -> Self {
        Self::new(
            status_code,
            &ResponseBody {
                message: message.to_string(),
                encoded: None,
                error,
            },
        )
    }

    /// Parse `body` back into its object form.
    pub fn parse_body(&self) -> Result<ResponseBody, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn action_classification() {
        assert_eq!(Action::parse("kinesis-data-forwarder"), Action::Forward);
        assert!(Action::parse("connect").is_lifecycle());
        assert!(Action::parse("disconnect").is_lifecycle());
        assert_eq!(Action::parse("Connect"), Action::Other("Connect".to_string()));
        assert!(!Action::parse("").is_lifecycle());
    }

    #[test]
    fn record_replaces_caller_id_and_keeps_other_fields() {
        let data: EventData = serde_json::from_value(json!({
            "title": "segment",
            "id": 42,
            "speed_mph_mean": 26.6,
            "osm_way_id": 40722998
        }))
        .unwrap();
        let record = ForwardRecord::from_data(data, "generated".to_string());
        let bytes = record.encode();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"title":"segment","id":"generated","speed_mph_mean":26.6,"osm_way_id":40722998}"#
        );
    }

    #[test]
    fn event_data_requires_title() {
        assert!(serde_json::from_value::<EventData>(json!({ "id": "x" })).is_err());
        assert!(serde_json::from_value::<EventData>(json!({ "title": 3 })).is_err());
    }

    #[test]
    fn envelope_serializes_camel_case_with_string_body() {
        let env = ResponseEnvelope::failure(400, MSG_INVALID_ACTION, None);
        let v = serde_json::to_value(&env).unwrap();
        assert_eq!(v["statusCode"], 400);
        assert_eq!(v["body"], r#"{"message":"Invalid event action"}"#);
    }

    #[test]
    fn envelope_body_escapes_as_json() {
        let env = ResponseEnvelope::failure(
            500,
            MSG_FORWARD_FAILED,
            Some("service error: \"quoted\"\nline \u{e9}".to_string()),
        );
        assert_eq!(
            env.body,
            r#"{"message":"Error sending event to Kinesis","error":"service error: \"quoted\"\nline é"}"#
        );
        let body = env.parse_body().unwrap();
        assert_eq!(body.error.as_deref(), Some("service error: \"quoted\"\nline é"));
        assert_eq!(body.encoded, None);

        let ok = ResponseEnvelope::received("eyJ0aXRsZSI6ImEifQ==".to_string());
        assert_eq!(
            ok.body,
            r#"{"message":"Event received","encoded":"eyJ0aXRsZSI6ImEifQ=="}"#
        );
    }
}
