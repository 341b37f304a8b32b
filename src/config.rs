use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

/// Immutable runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub model: ModelConfig,
    pub graph: GraphConfig,
    pub server: ServerConfig,
    pub log_format: LogFormat,
}

/// Settings for the chat model behind the simple chain.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub model_name: String,
    pub api_key: Option<String>,
    pub base_url: String,
    pub organization: Option<String>,
    pub temperature: f32,
}

/// Settings for the hosted agent graph service.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    pub deployment_url: Option<String>,
    pub api_key: Option<String>,
    pub assistant_id: String,
    pub stream_mode: String,
    pub run_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Structured output on managed runtimes, human-readable elsewhere.
    Auto,
    Json,
    Pretty,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Source(#[from] config::ConfigError),

    #[error("invalid LOG_FORMAT '{0}': expected json or pretty")]
    InvalidLogFormat(String),

    #[error("LANGGRAPH_RUN_TIMEOUT_SECS must be greater than zero")]
    InvalidRunTimeout,
}

/// Flat view of the environment, one field per variable (lowercased).
#[derive(Debug, Deserialize)]
struct EnvSettings {
    model_name: String,
    openai_api_key: Option<String>,
    openai_base_url: String,
    openai_organization: Option<String>,
    langgraph_deployment_url: Option<String>,
    langgraph_api_key: Option<String>,
    langgraph_assistant_id: String,
    langgraph_stream_mode: String,
    langgraph_run_timeout_secs: u64,
    host: String,
    port: u16,
    log_format: Option<String>,
}

pub const DEFAULT_MODEL_NAME: &str = "gpt-4";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_ASSISTANT_ID: &str = "superNode";
pub const DEFAULT_STREAM_MODE: &str = "updates";
const DEFAULT_RUN_TIMEOUT_SECS: u64 = 300;
const DEFAULT_PORT: u16 = 8080;

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// Load configuration from an explicit variable map instead of the
    /// process environment.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::load(Some(vars))
    }

    fn load(vars: Option<HashMap<String, String>>) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .set_default("model_name", DEFAULT_MODEL_NAME)?
            .set_default("openai_base_url", DEFAULT_OPENAI_BASE_URL)?
            .set_default("langgraph_assistant_id", DEFAULT_ASSISTANT_ID)?
            .set_default("langgraph_stream_mode", DEFAULT_STREAM_MODE)?
            .set_default("langgraph_run_timeout_secs", DEFAULT_RUN_TIMEOUT_SECS as i64)?
            .set_default("host", "0.0.0.0")?
            .set_default("port", i64::from(DEFAULT_PORT))?
            .add_source(config::Environment::default().source(vars))
            .build()?;

        let env: EnvSettings = settings.try_deserialize()?;

        let log_format = match non_empty(env.log_format).as_deref() {
            None => LogFormat::Auto,
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            Some(v) if v.eq_ignore_ascii_case("pretty") => LogFormat::Pretty,
            Some(other) => return Err(ConfigError::InvalidLogFormat(other.to_string())),
        };

        if env.langgraph_run_timeout_secs == 0 {
            return Err(ConfigError::InvalidRunTimeout);
        }

        Ok(Self {
            model: ModelConfig {
                model_name: env.model_name,
                api_key: non_empty(env.openai_api_key),
                base_url: env.openai_base_url,
                organization: non_empty(env.openai_organization),
                temperature: 0.0,
            },
            graph: GraphConfig {
                deployment_url: non_empty(env.langgraph_deployment_url),
                api_key: non_empty(env.langgraph_api_key),
                assistant_id: env.langgraph_assistant_id,
                stream_mode: env.langgraph_stream_mode,
                run_timeout: Duration::from_secs(env.langgraph_run_timeout_secs),
            },
            server: ServerConfig {
                host: env.host,
                port: env.port,
            },
            log_format,
        })
    }
}

// An exported-but-empty variable counts as unset.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = Config::from_vars(HashMap::new()).unwrap();

        assert_eq!(config.model.model_name, "gpt-4");
        assert_eq!(config.model.base_url, DEFAULT_OPENAI_BASE_URL);
        assert_eq!(config.model.temperature, 0.0);
        assert!(config.model.api_key.is_none());
        assert!(config.graph.deployment_url.is_none());
        assert_eq!(config.graph.assistant_id, "superNode");
        assert_eq!(config.graph.stream_mode, "updates");
        assert_eq!(config.graph.run_timeout, Duration::from_secs(300));
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.log_format, LogFormat::Auto);
    }

    #[test]
    fn environment_values_override_defaults() {
        let config = Config::from_vars(vars(&[
            ("MODEL_NAME", "gpt-4o-mini"),
            ("OPENAI_API_KEY", "sk-test"),
            ("LANGGRAPH_DEPLOYMENT_URL", "https://graph.example.com"),
            ("LANGGRAPH_API_KEY", "lg-key"),
            ("LANGGRAPH_RUN_TIMEOUT_SECS", "12"),
            ("PORT", "9090"),
            ("LOG_FORMAT", "JSON"),
        ]))
        .unwrap();

        assert_eq!(config.model.model_name, "gpt-4o-mini");
        assert_eq!(config.model.api_key.as_deref(), Some("sk-test"));
        assert_eq!(
            config.graph.deployment_url.as_deref(),
            Some("https://graph.example.com")
        );
        assert_eq!(config.graph.api_key.as_deref(), Some("lg-key"));
        assert_eq!(config.graph.run_timeout, Duration::from_secs(12));
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn blank_credentials_are_treated_as_missing() {
        let config = Config::from_vars(vars(&[("OPENAI_API_KEY", "  ")])).unwrap();
        assert!(config.model.api_key.is_none());
    }

    #[test]
    fn malformed_port_is_rejected() {
        assert!(Config::from_vars(vars(&[("PORT", "eighty")])).is_err());
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        let err = Config::from_vars(vars(&[("LOG_FORMAT", "xml")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLogFormat(ref v) if v == "xml"));
    }

    #[test]
    fn zero_run_timeout_is_rejected() {
        let err = Config::from_vars(vars(&[("LANGGRAPH_RUN_TIMEOUT_SECS", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRunTimeout));
    }
}
