use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};

use graph_relay::config::Config;
use graph_relay::graph::{default_test_input, test_graph_locally};
use graph_relay::logging::{init_logging, startup_log_format};
use graph_relay::output_types::ResultEnvelope;
use graph_relay::processor::process_query;
use graph_relay::{build_router, AppState};

/// Query relay for a local model chain and a hosted agent graph.
#[derive(Parser)]
#[command(name = "graph-relay", about = "Query relay for a local model chain and a hosted agent graph")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP endpoint (default).
    Serve {
        /// Bind host (default: HOST or 0.0.0.0).
        #[arg(long)]
        host: Option<String>,

        /// Bind port (default: PORT or 8080).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run the configured agent graph once and print the result.
    TestGraph {
        /// Graph input as a JSON document.
        #[arg(short, long)]
        input: Option<String>,
    },

    /// Answer a query with the local chain and print the result.
    Query {
        /// The query text.
        text: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Local development convenience; real deployments set the environment.
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let loaded = Config::from_env();
    let sink = init_logging(startup_log_format(&loaded));
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(anyhow::Error::new(e).context("failed to load configuration"));
        }
    };
    info!("Logging initialized: {:?}", sink);

    match cli.command.unwrap_or(Commands::Serve { host: None, port: None }) {
        Commands::Serve { host, port } => serve(config, host, port).await,
        Commands::TestGraph { input } => {
            let input = match input {
                Some(raw) => serde_json::from_str(&raw).context("--input is not valid JSON")?,
                None => default_test_input(),
            };
            let state = AppState::new(config)?;
            info!("Testing graph locally...");
            let result =
                test_graph_locally(state.graph_runner.as_ref(), &state.config.graph, input).await;
            print_and_exit(&result)
        }
        Commands::Query { text } => {
            let state = AppState::new(config)?;
            let result = process_query(state.chain_builder.as_ref(), &text).await;
            print_and_exit(&result)
        }
    }
}

async fn serve(config: Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    info!(
        "Loaded configuration: model={}, assistant={}, graph_url_set={}",
        config.model.model_name,
        config.graph.assistant_id,
        config.graph.deployment_url.is_some()
    );

    let app = build_router(AppState::new(config)?);

    info!("Starting server on {}:{}", host, port);
    let listener = tokio::net::TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("failed to bind {}:{}", host, port))?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn print_and_exit(result: &ResultEnvelope) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(result)?);
    if !result.success {
        std::process::exit(1);
    }
    Ok(())
}
