//! Application settings.
//!
//! Settings are layered, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. a TOML file (`SPECBUNDLE_CONFIG`, else `./specbundle.toml`, else the
//!    platform config directory)
//! 3. environment variables such as `SPECBUNDLE_SERVER__PORT=8080`
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 5000
//!
//! [project]
//! root = "."
//! root_spec = "openapi.yaml"
//! ui_dir = "ui"
//!
//! [logging]
//! level = "info"
//! directory = "logs"
//! json = false
//!
//! [tool]
//! command = ["npx", "--yes", "@redocly/cli"]
//! timeout_secs = 120
//! max_concurrent = 1
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{BundlerError, Result};

/// Environment variable naming an explicit settings file.
pub const CONFIG_ENV_VAR: &str = "SPECBUNDLE_CONFIG";

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "SPECBUNDLE";

/// Settings file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "specbundle.toml";

/// Top-level settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// HTTP listener.
    pub server: ServerSettings,
    /// Project tree the specification lives in.
    pub project: ProjectSettings,
    /// Log output.
    pub logging: LoggingSettings,
    /// External tool invocation.
    pub tool: ToolSettings,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

/// Project tree settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProjectSettings {
    /// Directory holding the root specification and its fragments.
    pub root: PathBuf,
    /// Root specification file, relative to `root`.
    pub root_spec: PathBuf,
    /// Directory of static UI files served at `/`, relative to `root`.
    pub ui_dir: Option<PathBuf>,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            root_spec: PathBuf::from("openapi.yaml"),
            ui_dir: None,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter used when `RUST_LOG` is not set.
    pub level: String,
    /// Log directory, relative to the project root.
    pub directory: PathBuf,
    /// Write JSON lines to the log file instead of text.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: PathBuf::from("logs"),
            json: false,
        }
    }
}

/// External tool settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    /// Command prefix replacing the built-in Redocly candidates.
    pub command: Option<Vec<String>>,
    /// Kill the tool after this many seconds. No limit when unset.
    pub timeout_secs: Option<u64>,
    /// Maximum number of tool runs in flight.
    pub max_concurrent: usize,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            command: None,
            timeout_secs: None,
            max_concurrent: 1,
        }
    }
}

impl ToolSettings {
    /// Configured timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Settings {
    /// Load settings from the default file location and the environment.
    ///
    /// # Errors
    ///
    /// Returns [`BundlerError::Settings`] if a source cannot be parsed or the
    /// result fails validation.
    pub fn load() -> Result<Self> {
        Self::load_from(config_file_path().as_deref())
    }

    /// Load settings from `file` (optional, may not exist) and the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns [`BundlerError::Settings`] if a source cannot be parsed or the
    /// result fails validation.
    pub fn load_from(file: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = file {
            tracing::debug!(path = %path.display(), "Reading settings file");
            builder = builder.add_source(config::File::from(path).required(false));
        }

        let settings: Self = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Check values that deserialize fine but cannot work.
    ///
    /// # Errors
    ///
    /// Returns [`BundlerError::Settings`] describing the first bad value.
    pub fn validate(&self) -> Result<()> {
        if self.tool.max_concurrent == 0 {
            return Err(BundlerError::Settings(
                "tool.max_concurrent must be at least 1".to_string(),
            ));
        }
        if self.project.root_spec.as_os_str().is_empty() {
            return Err(BundlerError::Settings(
                "project.root_spec must not be empty".to_string(),
            ));
        }
        if matches!(&self.tool.command, Some(command) if command.is_empty()) {
            return Err(BundlerError::Settings(
                "tool.command must name an executable".to_string(),
            ));
        }
        Ok(())
    }

    /// Socket address for the HTTP listener.
    ///
    /// # Errors
    ///
    /// Returns [`BundlerError::Settings`] if `server.host` is not an IP
    /// address.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| BundlerError::Settings(format!("invalid server address: {e}")))
    }

    /// Project root directory.
    #[must_use]
    pub fn project_root(&self) -> &Path {
        &self.project.root
    }

    /// Log directory, resolved against the project root.
    #[must_use]
    pub fn log_directory(&self) -> PathBuf {
        self.project.root.join(&self.logging.directory)
    }

    /// UI directory, resolved against the project root.
    #[must_use]
    pub fn ui_directory(&self) -> Option<PathBuf> {
        self.project.ui_dir.as_ref().map(|dir| self.project.root.join(dir))
    }
}

/// Where to look for the settings file.
#[must_use]
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return Some(PathBuf::from(path));
    }

    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.exists() {
        return Some(local);
    }

    directories::ProjectDirs::from("", "", "specbundle")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}
