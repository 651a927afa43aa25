//! Parsing of the optional `fanout.toml` workspace config

use std::time::Duration;

use fanout_fs::{LayoutPath, NormalizedPath, io, validate_segment};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

fn default_shared_dir() -> String {
    LayoutPath::SharedDir.as_str().to_string()
}

fn default_clients_dir() -> String {
    LayoutPath::ClientsDir.as_str().to_string()
}

fn default_mirror_subdir() -> String {
    LayoutPath::MirrorSubdir.as_str().to_string()
}

fn default_log_file() -> String {
    LayoutPath::LogFile.as_str().to_string()
}

fn default_poll_interval_ms() -> u64 {
    500
}

/// Workspace settings, all optional in `fanout.toml`.
///
/// Directory settings are relative to the workspace root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FanoutConfig {
    /// The shared tree
    #[serde(default = "default_shared_dir")]
    pub shared_dir: String,

    /// Directory containing one directory per client
    #[serde(default = "default_clients_dir")]
    pub clients_dir: String,

    /// Mirror root inside each client directory
    #[serde(default = "default_mirror_subdir")]
    pub mirror_subdir: String,

    /// Subscription log file name inside the shared tree
    #[serde(default = "default_log_file")]
    pub log_file: String,

    /// Sleep between scheduler passes
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for FanoutConfig {
    fn default() -> Self {
        Self {
            shared_dir: default_shared_dir(),
            clients_dir: default_clients_dir(),
            mirror_subdir: default_mirror_subdir(),
            log_file: default_log_file(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl FanoutConfig {
    /// Parse config from TOML content.
    ///
    /// ```
    /// use fanout_core::config::FanoutConfig;
    ///
    /// let config = FanoutConfig::parse("poll_interval_ms = 250").unwrap();
    /// assert_eq!(config.poll_interval_ms, 250);
    /// assert_eq!(config.shared_dir, "clients/shared");
    /// ```
    pub fn parse(content: &str) -> Result<Self> {
        let config: FanoutConfig = toml::from_str(content).map_err(|e| Error::ConfigParse {
            path: std::path::PathBuf::from(LayoutPath::ConfigFile.as_str()),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `fanout.toml` from the workspace root, falling back to defaults
    /// when the file does not exist.
    pub fn load(root: &NormalizedPath) -> Result<Self> {
        let path = root.join(LayoutPath::ConfigFile.as_str());
        let Some(content) = io::read_text_if_exists(&path)? else {
            tracing::debug!(path = %path, "no config file, using defaults");
            return Ok(Self::default());
        };

        Self::parse(&content).map_err(|e| match e {
            Error::ConfigParse { message, .. } => Error::ConfigParse {
                path: path.to_native(),
                message,
            },
            other => other,
        })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(Error::InvalidConfig {
                message: "poll_interval_ms must be greater than zero".to_string(),
            });
        }
        validate_segment(&self.log_file).map_err(|e| Error::InvalidConfig {
            message: format!("log_file: {e}"),
        })?;
        for (key, value) in [
            ("shared_dir", &self.shared_dir),
            ("clients_dir", &self.clients_dir),
            ("mirror_subdir", &self.mirror_subdir),
        ] {
            if value.trim_matches('/').is_empty() {
                return Err(Error::InvalidConfig {
                    message: format!("{key} cannot be empty"),
                });
            }
        }
        Ok(())
    }
}
