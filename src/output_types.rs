use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which path produced an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Agent,
    Simple,
    LocalTest,
}

/// The uniform JSON shape every code path returns.
///
/// Exactly one of `response` / `error` is set, chosen by `success`.
/// Unset optional fields are left out of the serialized body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph_output: Option<Vec<Value>>,
    /// Mirrors the HTTP status on failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
}

impl ResultEnvelope {
    pub fn success(response: impl Into<Value>) -> Self {
        Self {
            success: true,
            response: Some(response.into()),
            error: None,
            mode: None,
            timestamp: None,
            graph_output: None,
            code: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            response: None,
            error: Some(error.into()),
            mode: None,
            timestamp: None,
            graph_output: None,
            code: None,
        }
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_code(mut self, code: u16) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    pub fn with_graph_output(mut self, graph_output: Vec<Value>) -> Self {
        self.graph_output = Some(graph_output);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_envelope_omits_unset_fields() {
        let envelope = ResultEnvelope::success("hi").with_mode(Mode::Simple);
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(
            value,
            json!({"success": true, "response": "hi", "mode": "simple"})
        );
    }

    #[test]
    fn failure_envelope_carries_error_and_code() {
        let envelope = ResultEnvelope::failure("boom").with_code(500);
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(
            value,
            json!({"success": false, "error": "boom", "code": 500})
        );
        assert!(value.get("response").is_none());
    }

    #[test]
    fn local_test_mode_uses_snake_case() {
        let value = serde_json::to_value(Mode::LocalTest).unwrap();
        assert_eq!(value, json!("local_test"));
    }
}
