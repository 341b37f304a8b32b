use std::time::Duration;

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::sse::{SseDecoder, SseFrame};

/// Event name the service sends after the last update.
const END_EVENT: &str = "end";

#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("LANGGRAPH_DEPLOYMENT_URL is not set")]
    MissingEndpoint,

    #[error("request to graph service failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("graph service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("run timed out after {0:?}")]
    Timeout(Duration),
}

/// One streamed update from a graph run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunEvent {
    pub event: String,
    pub data: Value,
}

impl From<SseFrame> for RunEvent {
    fn from(frame: SseFrame) -> Self {
        let data = if frame.data.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&frame.data).unwrap_or(Value::String(frame.data))
        };
        Self {
            event: frame.event,
            data,
        }
    }
}

/// Parameters of a streamed run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunRequest {
    /// `None` requests a threadless run.
    #[serde(skip)]
    pub thread_id: Option<String>,
    pub assistant_id: String,
    pub input: Value,
    pub stream_mode: String,
}

impl RunRequest {
    pub fn threadless(assistant_id: impl Into<String>, input: Value, stream_mode: impl Into<String>) -> Self {
        Self {
            thread_id: None,
            assistant_id: assistant_id.into(),
            input,
            stream_mode: stream_mode.into(),
        }
    }
}

pub type RunEventStream = BoxStream<'static, Result<RunEvent, GraphError>>;

/// Anything that can start a graph run and stream its events.
#[async_trait]
pub trait GraphRunner: Send + Sync {
    async fn stream_run(&self, request: RunRequest) -> Result<RunEventStream, GraphError>;
}

/// HTTP client for a hosted LangGraph deployment.
#[derive(Debug, Clone)]
pub struct LangGraphClient {
    client: Client,
    url: Option<String>,
    api_key: Option<String>,
}

impl LangGraphClient {
    pub fn new(client: Client, url: Option<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            url,
            api_key,
        }
    }

    fn endpoint(&self, thread_id: Option<&str>) -> Result<String, GraphError> {
        let base = self.url.as_deref().ok_or(GraphError::MissingEndpoint)?;
        let base = base.trim_end_matches('/');
        Ok(match thread_id {
            Some(id) => format!("{}/threads/{}/runs/stream", base, id),
            None => format!("{}/runs/stream", base),
        })
    }
}

#[async_trait]
impl GraphRunner for LangGraphClient {
    async fn stream_run(&self, request: RunRequest) -> Result<RunEventStream, GraphError> {
        let endpoint = self.endpoint(request.thread_id.as_deref())?;
        debug!(
            "Starting run: assistant={}, stream_mode={}, endpoint={}",
            request.assistant_id, request.stream_mode, endpoint
        );

        let mut req = self
            .client
            .post(&endpoint)
            .header(ACCEPT, "text/event-stream")
            .json(&request);
        if let Some(key) = &self.api_key {
            req = req.header("x-api-key", key);
        }

        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GraphError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let stream = async_stream::try_stream! {
            let mut bytes = response.bytes_stream();
            let mut decoder = SseDecoder::new();
            let mut ended = false;

            'body: while let Some(chunk) = bytes.next().await {
                let chunk = chunk.map_err(GraphError::from)?;
                for frame in decoder.feed(&chunk) {
                    if frame.event == END_EVENT {
                        ended = true;
                        break 'body;
                    }
                    yield RunEvent::from(frame);
                }
            }

            if !ended {
                if let Some(frame) = decoder.finish() {
                    if frame.event != END_EVENT {
                        yield RunEvent::from(frame);
                    }
                }
            }
        };

        Ok(stream.boxed())
    }
}
