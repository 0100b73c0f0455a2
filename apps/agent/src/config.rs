//! Agent configuration management.
//!
//! Configuration is stored as TOML:
//! - Linux: `~/.config/monarch/agent.toml`
//! - Windows: `%APPDATA%/monarch/agent.toml`
//!
//! `MONARCH_CONFIG` overrides the location.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use monarch_client::ClientConfig;
use monarch_protocol::DEFAULT_BASE_URL;
use monarch_uploader::UploadSettings;
use serde::{Deserialize, Serialize};

/// Environment variable overriding the config file location.
const CONFIG_ENV: &str = "MONARCH_CONFIG";

/// Agent configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Folder whose new files are uploaded.
    #[serde(default)]
    pub watch_path: String,

    /// Account upload secret sent with every chunk.
    #[serde(default)]
    pub upload_secret: String,

    /// Mark uploads as private.
    #[serde(default)]
    pub private: bool,

    /// Service root URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds. Unset means no timeout.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            watch_path: String::new(),
            upload_secret: String::new(),
            private: false,
            base_url: default_base_url(),
            request_timeout_secs: None,
        }
    }
}

impl Config {
    /// Loads configuration from disk, or creates a default if not found.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&config_path()?)
    }

    /// Loads configuration from `path`, writing a default file if missing.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("parsing {}", path.display()))?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            tracing::info!(path = %path.display(), "wrote default configuration");
            Ok(config)
        }
    }

    /// Saves to `path`. The file holds the upload secret, so it is made
    /// owner-only on Unix.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    /// Returns the watch folder, failing if it is unset or not a directory.
    pub fn watch_dir(&self) -> anyhow::Result<PathBuf> {
        if self.watch_path.trim().is_empty() {
            bail!("no watch folder configured (set `watch_path`)");
        }
        let path = PathBuf::from(&self.watch_path);
        if !path.is_dir() {
            bail!("watch folder is not a directory: {}", path.display());
        }
        Ok(path)
    }

    /// Settings handed to a single upload.
    pub fn upload_settings(&self) -> UploadSettings {
        UploadSettings {
            secret: self.upload_secret.clone(),
            private: self.private,
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            timeout: self.request_timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Returns the configuration file path.
pub fn config_path() -> anyhow::Result<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Ok(PathBuf::from(path));
    }

    #[cfg(target_os = "linux")]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        Ok(PathBuf::from(home)
            .join(".config")
            .join("monarch")
            .join("agent.toml"))
    }

    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        Ok(PathBuf::from(appdata).join("monarch").join("agent.toml"))
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows")))]
    {
        Ok(PathBuf::from("/tmp/monarch/agent.toml"))
    }
}
