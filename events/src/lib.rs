//! Events platform interface for the KubeGate control plane.
use std::collections::BTreeMap;

use anyhow::Context;
use anyhow::Result;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;

pub mod emit;
mod errors;

pub use self::errors::Error;

/// An individual event emitted by the control plane.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Identifier of the specific event (and its payload type).
    pub code: String,

    /// Additional unstructured metadata attached to the event.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,

    /// JSON encoded event payload.
    #[serde(default)]
    pub payload: Value,

    /// Time the event was generated.
    #[serde(with = "time::serde::rfc3339")]
    pub time: OffsetDateTime,
}

impl Event {
    /// Create an event with the given code and JSON serialisable payload.
    pub fn new_with_payload<C, P>(code: C, payload: P) -> Result<Event>
    where
        C: Into<String>,
        P: Serialize,
    {
        let payload = serde_json::to_value(payload)
            .context(Error::PayloadEncode)
            .map_err(anyhow::Error::from)?;
        Ok(Event {
            code: code.into(),
            metadata: Default::default(),
            payload,
            time: OffsetDateTime::now_utc(),
        })
    }

    /// Attempt to decode the event payload into the specified type.
    pub fn decode<T>(&self) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        serde_json::from_value(self.payload.clone())
            .context(Error::PayloadDecode)
            .map_err(anyhow::Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::Event;

    #[test]
    fn decode_event() {
        let event = Event {
            code: "TEST".into(),
            metadata: Default::default(),
            payload: serde_json::json!("test string"),
            time: time::OffsetDateTime::now_utc(),
        };
        let actual: String = event.decode().unwrap();
        assert_eq!(actual, "test string");
    }

    #[test]
    fn event_with_payload() {
        let event = Event::new_with_payload("TEST", serde_json::json!({"key": "value"})).unwrap();
        assert_eq!(event.code, "TEST");
        assert_eq!(event.payload, serde_json::json!({"key": "value"}));
    }
}
