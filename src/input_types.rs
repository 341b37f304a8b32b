use serde_json::Value;

use crate::error::RelayError;

/// Longest query prefix written to the log.
const QUERY_PREVIEW_CHARS: usize = 100;

/// Which backend a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    /// Remote agent graph run (the default).
    Agent,
    /// Local single-turn chain.
    Simple,
}

impl RequestMode {
    /// Only the literal `"simple"` selects the local chain; anything else,
    /// including an absent flag, goes to the agent graph.
    pub fn from_flag(flag: Option<&str>) -> Self {
        match flag {
            Some("simple") => RequestMode::Simple,
            _ => RequestMode::Agent,
        }
    }
}

/// A validated inbound query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub query: String,
    pub mode: RequestMode,
}

impl QueryRequest {
    /// Parse and validate a request from its `Content-Type` and raw body.
    ///
    /// Non-JSON media types are treated like a missing body.
    pub fn from_parts(content_type: Option<&str>, body: &[u8]) -> Result<Self, RelayError> {
        if !is_json_content_type(content_type) {
            return Err(RelayError::NoJsonData);
        }
        Self::from_body(body)
    }

    /// Parse and validate a raw request body.
    pub fn from_body(body: &[u8]) -> Result<Self, RelayError> {
        if body.is_empty() {
            return Err(RelayError::NoJsonData);
        }

        let value: Value = serde_json::from_slice(body).map_err(|_| RelayError::NoJsonData)?;
        let object = value.as_object().ok_or(RelayError::NoJsonData)?;

        let query = object
            .get("query")
            .and_then(Value::as_str)
            .filter(|q| !q.is_empty())
            .ok_or(RelayError::NoQuery)?;

        let mode = RequestMode::from_flag(object.get("mode").and_then(Value::as_str));

        Ok(Self {
            query: query.to_string(),
            mode,
        })
    }

    /// The query as it should appear in logs.
    pub fn preview(&self) -> String {
        let mut chars = self.query.chars();
        let head: String = chars.by_ref().take(QUERY_PREVIEW_CHARS).collect();
        if chars.next().is_some() {
            format!("{}...", head)
        } else {
            head
        }
    }
}

/// `application/json` or any `application/*+json`, parameters ignored.
pub fn is_json_content_type(content_type: Option<&str>) -> bool {
    let Some(value) = content_type else {
        return false;
    };
    let mime = value.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
    match mime.split_once('/') {
        Some(("application", "json")) => true,
        Some(("application", subtype)) => subtype.ends_with("+json"),
        _ => false,
    }
}
