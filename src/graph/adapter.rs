use futures::StreamExt;
use serde_json::{json, Value};
use tracing::{error, info};

use super::client::{GraphError, GraphRunner, RunRequest};
use crate::config::GraphConfig;
use crate::output_types::{Mode, ResultEnvelope};

pub const AGENT_COMPLETED: &str = "Agent processing completed";
pub const LOCAL_TEST_COMPLETED: &str = "Graph execution completed";

/// Graph input carrying the caller's query.
pub fn agent_input(query: &str) -> Value {
    json!({
        "messages": [],
        "step": query,
    })
}

/// Default input for a one-off run from the command line.
pub fn default_test_input() -> Value {
    json!({
        "user_input": "",
        "previous_state": {
            "messages": [],
            "step": "q1",
        },
    })
}

/// Run the configured graph on `input` and fold the outcome into an envelope.
///
/// Transport and streaming failures never escape; they come back as
/// `success: false` with `code: 500`.
pub async fn run_agent(runner: &dyn GraphRunner, config: &GraphConfig, input: Value) -> ResultEnvelope {
    match consume_run(runner, config, input).await {
        Ok(graph_output) => ResultEnvelope::success(AGENT_COMPLETED)
            .with_mode(Mode::Agent)
            .with_graph_output(graph_output),
        Err(e) => graph_failure(e),
    }
}

/// Same as [`run_agent`], tagged as a local test run.
pub async fn test_graph_locally(
    runner: &dyn GraphRunner,
    config: &GraphConfig,
    input: Value,
) -> ResultEnvelope {
    match consume_run(runner, config, input).await {
        Ok(graph_output) => ResultEnvelope::success(LOCAL_TEST_COMPLETED)
            .with_mode(Mode::LocalTest)
            .with_graph_output(graph_output),
        Err(e) => graph_failure(e),
    }
}

fn graph_failure(e: GraphError) -> ResultEnvelope {
    error!(error = ?e, "Error testing graph: {}", e);
    ResultEnvelope::failure(format!("Error testing graph: {}", e)).with_code(500)
}

/// Start a threadless run and drain its stream, keeping payloads in
/// arrival order. The whole run is bounded by `config.run_timeout`.
async fn consume_run(
    runner: &dyn GraphRunner,
    config: &GraphConfig,
    input: Value,
) -> Result<Vec<Value>, GraphError> {
    let request = RunRequest::threadless(&config.assistant_id, input, &config.stream_mode);

    let drain = async {
        let mut stream = runner.stream_run(request).await?;
        let mut graph_output = Vec::new();
        while let Some(event) = stream.next().await {
            let event = event?;
            info!("Receiving new event of type: {}...", event.event);
            info!("{}", event.data);
            graph_output.push(event.data);
        }
        Ok::<_, GraphError>(graph_output)
    };

    tokio::time::timeout(config.run_timeout, drain)
        .await
        .map_err(|_| GraphError::Timeout(config.run_timeout))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::client::{LangGraphClient, RunEvent, RunEventStream};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    fn graph_config(timeout: Duration) -> GraphConfig {
        GraphConfig {
            deployment_url: Some("http://graph.invalid".to_string()),
            api_key: None,
            assistant_id: "superNode".to_string(),
            stream_mode: "updates".to_string(),
            run_timeout: timeout,
        }
    }

    fn event(n: u64) -> RunEvent {
        RunEvent {
            event: "updates".to_string(),
            data: json!({"node": n}),
        }
    }

    /// Replays a fixed script of stream items.
    struct ScriptedRunner {
        script: Mutex<Option<Vec<Result<RunEvent, GraphError>>>>,
        requests: Mutex<Vec<RunRequest>>,
    }

    impl ScriptedRunner {
        fn new(script: Vec<Result<RunEvent, GraphError>>) -> Self {
            Self {
                script: Mutex::new(Some(script)),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl GraphRunner for ScriptedRunner {
        async fn stream_run(&self, request: RunRequest) -> Result<RunEventStream, GraphError> {
            self.requests.lock().unwrap().push(request);
            let script = self.script.lock().unwrap().take().unwrap_or_default();
            Ok(futures::stream::iter(script).boxed())
        }
    }

    struct StalledRunner;

    #[async_trait]
    impl GraphRunner for StalledRunner {
        async fn stream_run(&self, _request: RunRequest) -> Result<RunEventStream, GraphError> {
            Ok(futures::stream::pending().boxed())
        }
    }

    struct UnreachableRunner;

    #[async_trait]
    impl GraphRunner for UnreachableRunner {
        async fn stream_run(&self, _request: RunRequest) -> Result<RunEventStream, GraphError> {
            Err(GraphError::MissingEndpoint)
        }
    }

    #[tokio::test]
    async fn collects_payloads_in_arrival_order() {
        let runner = ScriptedRunner::new(vec![Ok(event(1)), Ok(event(2)), Ok(event(3))]);
        let config = graph_config(Duration::from_secs(5));

        let envelope = run_agent(&runner, &config, agent_input("Hello")).await;

        assert!(envelope.success);
        assert_eq!(envelope.response, Some(json!(AGENT_COMPLETED)));
        assert_eq!(envelope.mode, Some(Mode::Agent));
        assert_eq!(
            envelope.graph_output,
            Some(vec![json!({"node": 1}), json!({"node": 2}), json!({"node": 3})])
        );

        let requests = runner.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].thread_id, None);
        assert_eq!(requests[0].assistant_id, "superNode");
        assert_eq!(requests[0].stream_mode, "updates");
        assert_eq!(requests[0].input, json!({"messages": [], "step": "Hello"}));
    }

    #[tokio::test]
    async fn empty_stream_is_still_a_success() {
        let runner = ScriptedRunner::new(Vec::new());
        let envelope = run_agent(&runner, &graph_config(Duration::from_secs(5)), json!({})).await;

        assert!(envelope.success);
        assert_eq!(envelope.graph_output, Some(Vec::new()));
    }

    #[tokio::test]
    async fn mid_stream_failure_becomes_failure_envelope() {
        let runner = ScriptedRunner::new(vec![
            Ok(event(1)),
            Err(GraphError::Status {
                status: 502,
                body: "bad gateway".to_string(),
            }),
            Ok(event(2)),
        ]);

        let envelope = run_agent(&runner, &graph_config(Duration::from_secs(5)), json!({})).await;

        assert!(!envelope.success);
        assert_eq!(envelope.code, Some(500));
        assert_eq!(
            envelope.error.as_deref(),
            Some("Error testing graph: graph service returned 502: bad gateway")
        );
        assert!(envelope.graph_output.is_none());
    }

    #[tokio::test]
    async fn session_failure_becomes_failure_envelope() {
        let envelope = run_agent(
            &UnreachableRunner,
            &graph_config(Duration::from_secs(5)),
            json!({}),
        )
        .await;

        assert!(!envelope.success);
        assert_eq!(envelope.code, Some(500));
        assert_eq!(
            envelope.error.as_deref(),
            Some("Error testing graph: LANGGRAPH_DEPLOYMENT_URL is not set")
        );
    }

    #[tokio::test]
    async fn stalled_stream_times_out() {
        let envelope = run_agent(
            &StalledRunner,
            &graph_config(Duration::from_millis(50)),
            json!({}),
        )
        .await;

        assert!(!envelope.success);
        assert_eq!(
            envelope.error.as_deref(),
            Some("Error testing graph: run timed out after 50ms")
        );
    }

    #[tokio::test]
    async fn local_test_run_is_tagged() {
        let runner = ScriptedRunner::new(vec![Ok(event(7))]);
        let envelope =
            test_graph_locally(&runner, &graph_config(Duration::from_secs(5)), default_test_input())
                .await;

        assert!(envelope.success);
        assert_eq!(envelope.response, Some(json!(LOCAL_TEST_COMPLETED)));
        assert_eq!(envelope.mode, Some(Mode::LocalTest));
        assert_eq!(
            runner.requests.lock().unwrap()[0].input["previous_state"]["step"],
            "q1"
        );
    }

    #[tokio::test]
    async fn refused_connection_becomes_failure_envelope() {
        // Nothing listens on port 1, so the connection is refused.
        let client = LangGraphClient::new(
            reqwest::Client::new(),
            Some("http://127.0.0.1:1".to_string()),
            None,
        );

        let envelope =
            run_agent(&client, &graph_config(Duration::from_secs(5)), agent_input("Hi")).await;

        assert!(!envelope.success);
        assert_eq!(envelope.code, Some(500));
        assert!(envelope.graph_output.is_none());
        assert!(
            envelope
                .error
                .as_deref()
                .unwrap()
                .starts_with("Error testing graph: request to graph service failed"),
            "{:?}",
            envelope.error
        );
    }
}
