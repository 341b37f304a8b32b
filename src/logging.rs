use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, ConfigError, LogFormat};

const DEFAULT_FILTER: &str = "graph_relay=debug,tower_http=debug";

/// Environment markers set by managed serverless runtimes, whose log
/// ingestion parses one JSON object per stdout line.
const MANAGED_RUNTIME_VARS: [&str; 2] = ["K_SERVICE", "FUNCTION_TARGET"];

/// Which sink ended up installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSink {
    Structured,
    Local,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Decide whether structured output is wanted for `format`.
pub fn wants_structured(format: LogFormat, on_managed_runtime: bool) -> bool {
    match format {
        LogFormat::Json => true,
        LogFormat::Pretty => false,
        LogFormat::Auto => on_managed_runtime,
    }
}

/// Format to install at startup. A configuration that failed to load still
/// gets the default sink, so the load error itself can be logged.
pub fn startup_log_format(loaded: &Result<Config, ConfigError>) -> LogFormat {
    match loaded {
        Ok(config) => config.log_format,
        Err(_) => LogFormat::Auto,
    }
}

fn on_managed_runtime() -> bool {
    MANAGED_RUNTIME_VARS
        .iter()
        .any(|var| std::env::var_os(var).is_some())
}

/// Install the process-wide subscriber. Call once at startup.
///
/// Falls back to the local human-readable sink if the structured one
/// cannot be installed.
pub fn init_logging(format: LogFormat) -> LogSink {
    if wants_structured(format, on_managed_runtime()) {
        let installed = tracing_subscriber::registry()
            .with(env_filter())
            .with(tracing_subscriber::fmt::layer().json().flatten_event(true))
            .try_init();
        match installed {
            Ok(()) => return LogSink::Structured,
            Err(e) => eprintln!("structured logging unavailable, using local sink: {}", e),
        }
    }

    // Already-installed is the only failure here and leaves a sink in place.
    let _ = tracing_subscriber::fmt().with_env_filter(env_filter()).try_init();
    LogSink::Local
}
