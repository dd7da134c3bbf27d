//! Webhook normalisation: pulls the single relevant event out of the Cloud API
//! envelope `{"entry":[{"changes":[{"value":{...}}]}]}`.

use std::sync::OnceLock;

use serde_json::{Map, Value};
use tracing::debug;

use crate::inbound;
use crate::json::Node;
use crate::types::IncomingMessage;

pub const MESSAGING_PRODUCT: &str = "whatsapp";

/// One inbound webhook request, decoded once and read-only afterwards.
#[derive(Debug)]
pub struct WebhookRequest {
    raw_body: String,
    envelope: Value,
    payload: Value,
    event: Value,
    messages: OnceLock<Vec<IncomingMessage>>,
}

impl WebhookRequest {
    /// Decodes a raw request body. Bodies that are not JSON degrade to an empty
    /// envelope so the request still flows through as an empty event.
    pub fn from_body(body: &[u8]) -> Self {
        let envelope = match serde_json::from_slice::<Value>(body) {
            Ok(value) => value,
            Err(err) => {
                debug!(error = %err, "webhook body is not JSON; using empty envelope");
                Value::Object(Map::new())
            }
        };
        Self::build(String::from_utf8_lossy(body).into_owned(), envelope)
    }

    pub fn from_value(envelope: Value) -> Self {
        Self::build(envelope.to_string(), envelope)
    }

    fn build(raw_body: String, envelope: Value) -> Self {
        let payload = extract_payload(&envelope);
        let event = extract_event(&payload);
        Self {
            raw_body,
            envelope,
            payload,
            event,
            messages: OnceLock::new(),
        }
    }

    pub fn raw_body(&self) -> &str {
        &self.raw_body
    }

    pub fn envelope(&self) -> &Value {
        &self.envelope
    }

    /// The `entry[0].changes[0].value` object, or an empty object.
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// `payload.messages[0]` when present, otherwise the payload itself.
    pub fn event(&self) -> &Value {
        &self.event
    }

    /// True iff the payload declares `messaging_product == "whatsapp"`.
    pub fn matches_request(&self) -> bool {
        Node::new(&self.payload).get("messaging_product").as_str() == Some(MESSAGING_PRODUCT)
    }

    /// Classified messages, computed on first access and cached for the lifetime
    /// of the request.
    pub fn messages(&self) -> &[IncomingMessage] {
        self.messages
            .get_or_init(|| inbound::classify(&self.event, &self.payload).into_iter().collect())
    }
}

/// Extracts `entry[0].changes[0].value`, substituting an empty object when any
/// step of the path is missing.
pub fn extract_payload(envelope: &Value) -> Value {
    let value = Node::new(envelope)
        .get("entry")
        .at(0)
        .get("changes")
        .at(0)
        .get("value")
        .value();
    match value {
        Value::Object(_) => value.clone(),
        _ => Value::Object(Map::new()),
    }
}

pub fn extract_event(payload: &Value) -> Value {
    match Node::new(payload).get("messages").first() {
        Some(first) => first.value().clone(),
        None => payload.clone(),
    }
}
