use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::chain::{ChainBuilder, OpenAIChainBuilder};
use crate::config::Config;
use crate::graph::{GraphRunner, LangGraphClient};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared, read-only per-process state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub chain_builder: Arc<dyn ChainBuilder>,
    pub graph_runner: Arc<dyn GraphRunner>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let http = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;

        let chain_builder = Arc::new(OpenAIChainBuilder::new(config.model.clone(), http.clone()));
        let graph_runner = Arc::new(LangGraphClient::new(
            http,
            config.graph.deployment_url.clone(),
            config.graph.api_key.clone(),
        ));

        Ok(Self::with_components(config, chain_builder, graph_runner))
    }

    /// Assemble state from explicit collaborators.
    pub fn with_components(
        config: Config,
        chain_builder: Arc<dyn ChainBuilder>,
        graph_runner: Arc<dyn GraphRunner>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            chain_builder,
            graph_runner,
        }
    }
}
