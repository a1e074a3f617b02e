//! Client configuration.
//!
//! Values come from, in increasing priority: built-in defaults, an optional
//! TOML file, the `MODEL_EVAL_BASE_URL` environment variable, and finally
//! command-line flags (applied by `main`).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable overriding [`ClientConfig::base_url`].
pub const BASE_URL_ENV: &str = "MODEL_EVAL_BASE_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Settings of the viewer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Root of the analytics service, e.g. `http://127.0.0.1:8000`.
    pub base_url: String,

    /// Lifetime of the `auth-token` cookie written after sign-in. Zero or
    /// negative stores a session cookie without expiry.
    ///
    /// Default: 3.
    pub auth_token_expire_days: i64,

    /// Page size of the training data table.
    ///
    /// Default: 100.
    pub train_data_limit: usize,

    /// Where the cookie jar is persisted. `None` uses the platform data
    /// directory.
    pub cookie_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            auth_token_expire_days: 3,
            train_data_limit: 100,
            cookie_file: None,
        }
    }
}

impl ClientConfig {
    /// Read a TOML file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Load from `path` (if any) and apply the environment override.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if !url.trim().is_empty() {
                config.base_url = url.trim().to_string();
            }
        }
        Ok(config)
    }

    /// Cookie jar location: the configured file, else
    /// `<platform data dir>/cookies.txt`, else `None` (memory only).
    pub fn cookie_path(&self) -> Option<PathBuf> {
        self.cookie_file.clone().or_else(|| {
            directories::ProjectDirs::from("org", "ModelEval", "model-eval-viewer")
                .map(|dirs| dirs.data_dir().join("cookies.txt"))
        })
    }

    /// Whether cookies must carry the `Secure` attribute.
    pub fn is_https(&self) -> bool {
        self.base_url
            .trim_start()
            .to_ascii_lowercase()
            .starts_with("https:")
    }
}
