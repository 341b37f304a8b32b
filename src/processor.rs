use serde_json::Value;
use tracing::error;

use crate::chain::ChainBuilder;
use crate::output_types::ResultEnvelope;

/// Run `query` through a freshly built chain.
///
/// Never fails: construction and invocation errors are logged and folded
/// into a `success: false` envelope.
pub async fn process_query(builder: &dyn ChainBuilder, query: &str) -> ResultEnvelope {
    let outcome = async {
        let chain = builder.build()?;
        chain.invoke(query).await
    }
    .await;

    match outcome {
        Ok(output) => ResultEnvelope::success(
            serde_json::to_value(&output).unwrap_or_else(|_| Value::String(output.text)),
        ),
        Err(e) => {
            error!(error = ?e, "Error processing query: {}", e);
            ResultEnvelope::failure(e.to_string())
        }
    }
}
