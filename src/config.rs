//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub tracker: TrackerConfig,

    #[serde(default)]
    pub chat: ChatConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Mockup backend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:5001".to_string()
}

fn default_request_timeout() -> u64 {
    120 // generation calls are slow
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Issue-tracker endpoints exposed by the backend
#[derive(Debug, Clone, Deserialize)]
pub struct TrackerConfig {
    #[serde(default = "default_tracker_test_path")]
    pub test_path: String,

    #[serde(default = "default_tracker_tickets_path")]
    pub tickets_path: String,
}

fn default_tracker_test_path() -> String {
    "/api/jira/test".to_string()
}

fn default_tracker_tickets_path() -> String {
    "/api/jira/tickets".to_string()
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            test_path: default_tracker_test_path(),
            tickets_path: default_tracker_tickets_path(),
        }
    }
}

/// Conversation behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    /// Pause between the assistant reply and the "mockup ready" notice
    #[serde(default = "default_ready_delay")]
    pub ready_delay_ms: u64,

    #[serde(default = "default_welcome_message")]
    pub welcome_message: String,
}

fn default_ready_delay() -> u64 {
    1000
}

fn default_welcome_message() -> String {
    "Hi! I'm your AI assistant. I'll help you create a mockup for your product. \
     Let's start by understanding what you're building. What kind of product or \
     application would you like to create a mockup for?"
        .to_string()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            ready_delay_ms: default_ready_delay(),
            welcome_message: default_welcome_message(),
        }
    }
}

/// Identity provider settings
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Provider domain, e.g. "example.auth0.com"
    #[serde(default)]
    pub domain: String,

    #[serde(default)]
    pub client_id: String,

    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,

    /// Token obtained from the provider after login
    pub access_token: Option<String>,

    pub user_name: Option<String>,

    pub user_email: Option<String>,
}

fn default_redirect_uri() -> String {
    "http://localhost:3000".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            domain: String::new(),
            client_id: String::new(),
            redirect_uri: default_redirect_uri(),
            access_token: None,
            user_name: None,
            user_email: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("mockup-studio").join("config.toml")),
            Some(PathBuf::from("/etc/mockup-studio/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("MOCKUP_STUDIO_API_URL") {
            self.api.base_url = url;
        }
        if let Ok(secs) = std::env::var("MOCKUP_STUDIO_TIMEOUT_SECS") {
            if let Ok(s) = secs.parse() {
                self.api.request_timeout_secs = s;
            }
        }

        if let Ok(token) = std::env::var("MOCKUP_STUDIO_ACCESS_TOKEN") {
            if !token.is_empty() {
                self.auth.access_token = Some(token);
            }
        }

        if let Ok(level) = std::env::var("MOCKUP_STUDIO_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("MOCKUP_STUDIO_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Mockup Studio Configuration
#
# Environment variables override these settings:
# - MOCKUP_STUDIO_API_URL
# - MOCKUP_STUDIO_TIMEOUT_SECS
# - MOCKUP_STUDIO_ACCESS_TOKEN
# - MOCKUP_STUDIO_LOG_LEVEL
# - MOCKUP_STUDIO_LOG_FORMAT

[api]
# Mockup backend base URL
base_url = "http://localhost:5001"

# Request timeout in seconds (generation can take a while)
request_timeout_secs = 120

[tracker]
# Backend endpoints for the issue tracker
test_path = "/api/jira/test"
tickets_path = "/api/jira/tickets"

[chat]
# Delay before the generated mockup opens (ms)
ready_delay_ms = 1000

[auth]
# Identity provider settings
domain = ""
client_id = ""
redirect_uri = "http://localhost:3000"

# Access token issued by the provider after login
# access_token = ""
# user_name = ""
# user_email = ""

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
