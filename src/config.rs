use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::dirs;
use crate::error::{RedactError, Result};
use crate::rewriter::OverlapPolicy;

/// User-configurable settings for the redaction server and CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactConfig {
    /// Host address for the HTTP server (default: 127.0.0.1)
    #[serde(default = "default_host")]
    pub host: String,

    /// Port for the HTTP server (default: 11480)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Base directory for sessions and stored objects
    #[serde(default = "dirs::redact_home")]
    pub data_dir: PathBuf,

    /// Handling of intersecting matches from different detectors
    #[serde(default)]
    pub overlap_policy: OverlapPolicy,

    /// Keep the cleartext literal in persisted match records
    #[serde(default = "default_retain_plaintext")]
    pub retain_plaintext: bool,

    /// Largest accepted upload in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    11480
}

fn default_retain_plaintext() -> bool {
    true
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

impl Default for RedactConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            data_dir: dirs::redact_home(),
            overlap_policy: OverlapPolicy::default(),
            retain_plaintext: default_retain_plaintext(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl RedactConfig {
    /// Load configuration from the default config file path.
    /// Returns default config if the file does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&dirs::config_path())
    }

    /// Load configuration from an explicit path, defaulting when absent.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            RedactError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        let config: RedactConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.max_upload_bytes == 0 {
            return Err(RedactError::Config(
                "max_upload_bytes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the server bind address string (e.g., "127.0.0.1:11480").
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
