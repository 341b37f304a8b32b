use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::error::RelayError;
use crate::graph::{agent_input, run_agent};
use crate::input_types::{QueryRequest, RequestMode};
use crate::output_types::{Mode, ResultEnvelope};
use crate::state::AppState;

/// Entry point for `POST /`: parse, dispatch, respond.
pub async fn process_query_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    info!("Graph relay function invoked");

    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            let e = RelayError::from(rejection);
            info!("Rejected request: {}", e);
            return e.into_response();
        }
    };

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    let request = match QueryRequest::from_parts(content_type, &body) {
        Ok(request) => request,
        Err(e) => {
            info!("Rejected request: {}", e);
            return e.into_response();
        }
    };

    info!("Processing query: {}", request.preview());

    match dispatch(&state, &request).await {
        Ok(envelope) if envelope.success => {
            let envelope = envelope.with_timestamp(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
            info!("Successfully processed query");
            (StatusCode::OK, Json(envelope)).into_response()
        }
        Ok(envelope) => {
            // The envelope's own code decides the status so the two always agree.
            let status = envelope
                .code
                .and_then(|code| StatusCode::from_u16(code).ok())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let envelope = envelope.with_code(status.as_u16());
            warn!("Query failed: {}", envelope.error.as_deref().unwrap_or("unknown error"));
            (status, Json(envelope)).into_response()
        }
        Err(e) => {
            error!(error = ?e, "Error processing request: {:#}", e);
            RelayError::Internal(e.to_string()).into_response()
        }
    }
}

async fn dispatch(state: &AppState, request: &QueryRequest) -> anyhow::Result<ResultEnvelope> {
    match request.mode {
        RequestMode::Simple => {
            let chain = state.chain_builder.build()?;
            let output = chain.invoke(&request.query).await?;
            Ok(ResultEnvelope::success(serde_json::to_value(output)?).with_mode(Mode::Simple))
        }
        RequestMode::Agent => Ok(run_agent(
            state.graph_runner.as_ref(),
            &state.config.graph,
            agent_input(&request.query),
        )
        .await),
    }
}

pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
