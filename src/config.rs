//! Server configuration from environment variables

use std::env;
use std::path::PathBuf;

/// Default listen port for the dashboard server
pub const DEFAULT_PORT: u16 = 8787;

/// Default bind address
pub const DEFAULT_BIND: &str = "127.0.0.1";

/// Deployment mode, selected via `GF_ENV`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Development,
    Production,
}

impl Default for RunMode {
    fn default() -> Self {
        RunMode::Development
    }
}

impl RunMode {
    pub fn from_env() -> Self {
        match env::var("GF_ENV") {
            Ok(v) if v.eq_ignore_ascii_case("production") => RunMode::Production,
            _ => RunMode::Development,
        }
    }
}

/// Metrics intake configuration
#[derive(Debug, Clone, Default)]
pub struct MetricsConfig {
    /// Global kill-switch; when off the intake endpoint accepts without parsing
    pub enabled: bool,
    /// Forward accepted events to this URL when set
    pub webhook_url: Option<String>,
    /// Bearer token attached to webhook requests when set
    pub webhook_secret: Option<String>,
    pub mode: RunMode,
}

impl MetricsConfig {
    pub fn from_env() -> Self {
        Self {
            enabled: env_flag("GF_METRICS_ENABLED"),
            webhook_url: env_nonempty("GF_METRICS_WEBHOOK_URL"),
            webhook_secret: env_nonempty("GF_METRICS_WEBHOOK_SECRET"),
            mode: RunMode::from_env(),
        }
    }
}

/// Full server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    /// Root of the data tree (`data/`, `automation/` live under it)
    pub data_dir: PathBuf,
    /// Shared secret for the dashboard routes; unset disables the gate
    pub dashboard_secret: Option<String>,
    pub metrics: MetricsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND.to_string(),
            port: DEFAULT_PORT,
            data_dir: PathBuf::from("."),
            dashboard_secret: None,
            metrics: MetricsConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            bind_address: env::var("GF_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string()),
            port: env::var("GF_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            data_dir: env::var("GF_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
            dashboard_secret: env_nonempty("DASHBOARD_SECRET"),
            metrics: MetricsConfig::from_env(),
        }
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

/// Check a boolean flag environment variable (`1` or `true` enable it)
fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn env_nonempty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
