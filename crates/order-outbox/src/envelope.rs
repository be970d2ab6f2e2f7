//! Envelope: the unit of durability.

use crate::{OutboxError, OutboxResult};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata about the submitting client, captured once per envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientContext {
    pub ua: String,
    pub url: String,
}

impl ClientContext {
    pub fn new(ua: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            ua: ua.into(),
            url: url.into(),
        }
    }
}

/// A persisted, retry-tracked wrapper around one order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Unique per envelope; used to match fast-path and drain outcomes.
    pub id: String,
    /// Creation instant.
    pub timestamp: DateTime<Utc>,
    pub client_context: ClientContext,
    /// The caller's order record, opaque to the queue.
    pub payload: Map<String, Value>,
    /// Failed send attempts so far.
    #[serde(default)]
    pub attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_attempt_at: Option<DateTime<Utc>>,
}

impl Envelope {
    /// Wrap an order. Anything other than a JSON object is rejected.
    pub fn new(order: Value, client_context: ClientContext, now: DateTime<Utc>) -> OutboxResult<Self> {
        let payload = match order {
            Value::Object(map) => map,
            Value::Null => {
                return Err(OutboxError::InvalidInput("order must not be null".to_string()))
            }
            other => {
                return Err(OutboxError::InvalidInput(format!(
                    "order must be an object, got {}",
                    json_kind(&other)
                )))
            }
        };

        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: now,
            client_context,
            payload,
            attempts: 0,
            last_attempt_at: None,
        })
    }

    /// Instant the backoff window is measured from.
    pub fn backoff_anchor(&self) -> DateTime<Utc> {
        self.last_attempt_at.unwrap_or(self.timestamp)
    }

    /// Body posted to the webhook.
    pub fn wire_body(&self) -> WebhookBody<'_> {
        WebhookBody {
            ts: self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            client: &self.client_context,
            order: &self.payload,
        }
    }
}

/// JSON body accepted by the webhook: `{ ts, client: { ua, url }, order }`.
#[derive(Debug, Serialize)]
pub struct WebhookBody<'a> {
    pub ts: String,
    pub client: &'a ClientContext,
    pub order: &'a Map<String, Value>,
}

/// An envelope removed after exhausting its retry budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DroppedEnvelope {
    pub envelope: Envelope,
    pub dropped_at: DateTime<Utc>,
    pub reason: String,
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn ctx() -> ClientContext {
        ClientContext::new("mieza/test", "cli://test")
    }

    #[test]
    fn new_envelope_starts_unattempted() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let env = Envelope::new(json!({"item": "bread", "qty": 2}), ctx(), now).unwrap();

        assert_eq!(env.attempts, 0);
        assert!(env.last_attempt_at.is_none());
        assert_eq!(env.timestamp, now);
        assert_eq!(env.backoff_anchor(), now);
        assert_eq!(env.payload["item"], "bread");
    }

    #[test]
    fn ids_are_unique_even_with_identical_timestamps() {
        let now = Utc::now();
        let a = Envelope::new(json!({"item": "milk"}), ctx(), now).unwrap();
        let b = Envelope::new(json!({"item": "milk"}), ctx(), now).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn rejects_non_objects() {
        let now = Utc::now();
        for bad in [json!(null), json!("order"), json!(42), json!([1, 2]), json!(true)] {
            let err = Envelope::new(bad, ctx(), now).unwrap_err();
            assert!(matches!(err, OutboxError::InvalidInput(_)));
        }
    }

    #[test]
    fn wire_body_shape() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let env = Envelope::new(json!({"item": "bread"}), ctx(), now).unwrap();

        let body = serde_json::to_value(env.wire_body()).unwrap();
        assert_eq!(
            body,
            json!({
                "ts": "2025-03-01T12:00:00.000Z",
                "client": {"ua": "mieza/test", "url": "cli://test"},
                "order": {"item": "bread"}
            })
        );
    }

    #[test]
    fn persisted_form_is_camel_case() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let mut env = Envelope::new(json!({"item": "bread"}), ctx(), now).unwrap();
        env.attempts = 2;
        env.last_attempt_at = Some(now);

        let value = serde_json::to_value(&env).unwrap();
        assert!(value.get("clientContext").is_some());
        assert!(value.get("lastAttemptAt").is_some());
        assert_eq!(value["attempts"], 2);

        let back: Envelope = serde_json::from_value(value).unwrap();
        assert_eq!(back, env);
    }

    #[test]
    fn backoff_anchor_prefers_last_attempt() {
        let created = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let attempted = Utc.with_ymd_and_hms(2025, 3, 1, 12, 5, 0).unwrap();
        let mut env = Envelope::new(json!({}), ctx(), created).unwrap();
        env.last_attempt_at = Some(attempted);
        assert_eq!(env.backoff_anchor(), attempted);
    }
}
