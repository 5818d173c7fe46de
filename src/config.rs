//! Application-level configuration: heartbeat cadence and storage call
//! bounds, loaded from a JSON file with built-in defaults.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "CARDROOM_BACK_CONFIG_PATH";

const DEFAULT_HEARTBEAT: Duration = Duration::from_secs(10);
const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_STORE_READ_RETRIES: u32 = 2;

/// Immutable runtime configuration shared across the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Cadence of the empty `stayAlive` message sent to bound connections.
    pub heartbeat_interval: Duration,
    /// Upper bound on any single storage call.
    pub store_timeout: Duration,
    /// How many times a failed storage read is retried. Writes are never
    /// retried: a write that may have partially applied must not be
    /// replayed.
    pub store_read_retries: u32,
}

impl AppConfig {
    /// Load the configuration from disk, falling back to the defaults when
    /// the file is absent or unreadable.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(path = %path.display(), ?config, "loaded configuration");
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval: DEFAULT_HEARTBEAT,
            store_timeout: DEFAULT_STORE_TIMEOUT,
            store_read_retries: DEFAULT_STORE_READ_RETRIES,
        }
    }
}

/// JSON representation of the configuration file; every field optional.
#[derive(Debug, Deserialize)]
struct RawConfig {
    heartbeat_seconds: Option<u64>,
    store_timeout_ms: Option<u64>,
    store_read_retries: Option<u32>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = AppConfig::default();
        Self {
            heartbeat_interval: value
                .heartbeat_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.heartbeat_interval),
            store_timeout: value
                .store_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.store_timeout),
            store_read_retries: value
                .store_read_retries
                .unwrap_or(defaults.store_read_retries),
        }
    }
}

fn resolve_config_path() -> PathBuf {
    env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}
