//! Tagged events pushed to clients

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Payload of every connected event
pub const CONNECTED_DATA: &str = "connected";

/// A tagged, immutable unit of data pushed to a client
///
/// Serializes to the wire shape `{"key": "<namespace>:<name>", "data": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Stable dotted identifier, e.g. `sysinfo:uptime`
    pub key: String,
    /// Source-specific payload
    pub data: Value,
}

impl Event {
    pub fn new(key: impl Into<String>, data: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            data: data.into(),
        }
    }

    /// Error event carrying the failure description as a string
    pub fn error(key: impl Into<String>, description: impl std::fmt::Display) -> Self {
        Self::new(key, Value::String(description.to_string()))
    }

    /// Serialize to the JSON text sent over the wire
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_to_key_and_data() {
        let event = Event::new("sysinfo:uptime", 4242);
        let parsed: Value = serde_json::from_str(&event.to_json().unwrap()).unwrap();
        assert_eq!(parsed, json!({"key": "sysinfo:uptime", "data": 4242}));
    }

    #[test]
    fn error_event_carries_description_string() {
        let event = Event::error("sysinfo:kernel_error", "unsupported kernel");
        assert_eq!(event.key, "sysinfo:kernel_error");
        assert_eq!(event.data, json!("unsupported kernel"));
    }
}
