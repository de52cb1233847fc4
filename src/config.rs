//! Application-level configuration loading: public URL, static assets, and
//! card-table tunables.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use serde_with::{DurationSeconds, serde_as};
use tracing::{info, warn};

use crate::state::uno::session::UnoSettings;

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "PARTY_GAMES_CONFIG_PATH";
/// Port used to derive the default public URL.
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    base_url: Option<String>,
    public_dir: PathBuf,
    disconnect_timeout: Duration,
    sweep_interval: Duration,
    chat_history: usize,
    chat_snapshot: usize,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        public_dir = %app_config.public_dir.display(),
                        "loaded configuration"
                    );
                    app_config
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

    /// Override the public URL (from `BASE_URL`).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Public URL players reach the server at. Derived from `port` when unset.
    pub fn base_url(&self, port: u16) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://localhost:{port}"),
        }
    }

    /// Directory holding the HTML pages and their assets.
    pub fn public_dir(&self) -> &PathBuf {
        &self.public_dir
    }

    /// Period of the disconnected-player sweep.
    pub fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }

    /// Chat messages carried in each table snapshot.
    pub fn chat_snapshot(&self) -> usize {
        self.chat_snapshot
    }

    /// Settings handed to the card-game store.
    pub fn uno_settings(&self) -> UnoSettings {
        UnoSettings {
            disconnect_timeout: self.disconnect_timeout,
            chat_history: self.chat_history,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[serde_as]
#[derive(Debug, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    base_url: Option<String>,
    public_dir: PathBuf,
    #[serde_as(as = "DurationSeconds<u64>")]
    disconnect_timeout: Duration,
    #[serde_as(as = "DurationSeconds<u64>")]
    sweep_interval: Duration,
    chat_history: usize,
    chat_snapshot: usize,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            public_dir: PathBuf::from("public"),
            disconnect_timeout: Duration::from_secs(60),
            sweep_interval: Duration::from_secs(10),
            chat_history: 50,
            chat_snapshot: 15,
        }
    }
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            base_url: value.base_url.filter(|url| !url.trim().is_empty()),
            public_dir: value.public_dir,
            disconnect_timeout: value.disconnect_timeout,
            // A zero period would make the ticker panic.
            sweep_interval: value.sweep_interval.max(Duration::from_secs(1)),
            chat_history: value.chat_history.max(1),
            chat_snapshot: value.chat_snapshot,
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
