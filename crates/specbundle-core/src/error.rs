//! Unified error types for the specbundle core library.
//!
//! [`BundlerError`] covers every failure that can reach a caller of this
//! crate. Loading a single YAML document is *not* represented
//! here: the loader absorbs those failures and reports "nothing found" (see
//! [`crate::loader::LoadError`] for the internal reasons).
//!
//! Each variant carries an HTTP status code and a machine-readable error code
//! so the server can map errors without re-inspecting them.
//!
//! # Example
//!
//! ```rust
//! use specbundle_core::error::{BundlerError, Result};
//! use std::path::PathBuf;
//!
//! fn require_root(found: bool) -> Result<()> {
//!     if !found {
//!         return Err(BundlerError::RootSpecMissing(PathBuf::from("openapi.yaml")));
//!     }
//!     Ok(())
//! }
//!
//! assert!(require_root(false).is_err());
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Message shown to clients in place of internal failure details.
pub const GENERIC_FAILURE_MESSAGE: &str = "An unexpected error occurred on the server.";

/// The unified error type for all specbundle operations.
#[derive(Debug, Error)]
pub enum BundlerError {
    // =========================================================================
    // PROJECT ERRORS
    // =========================================================================
    /// The root specification could not be loaded or has no `paths` mapping.
    #[error("Could not load paths from '{}'. Please ensure the file exists.", .0.display())]
    RootSpecMissing(PathBuf),

    // =========================================================================
    // REQUEST ERRORS
    // =========================================================================
    /// A user-supplied output filename failed validation.
    #[error("Invalid filename '{name}'. It must end with {allowed} and not contain path characters.")]
    InvalidFilename {
        /// The rejected name.
        name: String,
        /// Human-readable list of accepted extensions.
        allowed: String,
    },

    /// A request that needs a specification body did not provide one.
    #[error("No spec content provided.")]
    MissingSpecContent,

    // =========================================================================
    // EXTERNAL TOOL ERRORS
    // =========================================================================
    /// None of the candidate tool commands could be started.
    #[error(
        "Redocly CLI not found. Install Node.js, then either install globally with \
         'npm i -g @redocly/cli' so 'redocly' is on PATH, or use 'npx --yes @redocly/cli'."
    )]
    ToolNotFound,

    /// The tool ran but exited unsuccessfully.
    #[error("{stderr}")]
    ToolFailed {
        /// Diagnostic output of the tool, verbatim.
        stderr: String,
    },

    /// The tool did not finish within the configured timeout.
    #[error("External tool did not finish within {secs} seconds")]
    ToolTimedOut {
        /// Configured timeout.
        secs: u64,
    },

    // =========================================================================
    // INTERNAL ERRORS
    // =========================================================================
    /// A document could not be serialized to YAML.
    #[error("YAML serialization failed: {0}")]
    Serialize(#[from] serde_yaml::Error),

    /// A low-level I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings could not be loaded or are invalid.
    #[error("Invalid settings: {0}")]
    Settings(String),
}

/// A specialized [`Result`] type for specbundle operations.
pub type Result<T> = std::result::Result<T, BundlerError>;

impl BundlerError {
    /// Returns `true` if the caller sent something we refuse to process.
    #[inline]
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidFilename { .. } | Self::MissingSpecContent)
    }

    /// Returns `true` if this error came from the external tool.
    #[inline]
    #[must_use]
    pub const fn is_tool_error(&self) -> bool {
        matches!(
            self,
            Self::ToolNotFound | Self::ToolFailed { .. } | Self::ToolTimedOut { .. }
        )
    }

    /// Returns `true` if the error's message must not be shown to clients.
    #[inline]
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Serialize(_) | Self::Io(_) | Self::Settings(_))
    }

    /// Message suitable for an API response.
    ///
    /// Internal errors collapse to [`GENERIC_FAILURE_MESSAGE`]; tool failures
    /// are prefixed the same way the UI expects.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::ToolFailed { .. } | Self::ToolTimedOut { .. } | Self::ToolNotFound => {
                format!("Error: {self}")
            }
            _ if self.is_internal() => GENERIC_FAILURE_MESSAGE.to_string(),
            _ => self.to_string(),
        }
    }

    /// Returns an HTTP-appropriate status code for this error.
    #[inline]
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidFilename { .. } | Self::MissingSpecContent => 400,
            Self::ToolNotFound => 503,
            Self::ToolTimedOut { .. } => 504,
            Self::RootSpecMissing(_)
            | Self::ToolFailed { .. }
            | Self::Serialize(_)
            | Self::Io(_)
            | Self::Settings(_) => 500,
        }
    }

    /// Returns a machine-readable error code for API responses.
    #[inline]
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::RootSpecMissing(_) => "ROOT_SPEC_MISSING",
            Self::InvalidFilename { .. } => "INVALID_FILENAME",
            Self::MissingSpecContent => "MISSING_SPEC_CONTENT",
            Self::ToolNotFound => "TOOL_NOT_FOUND",
            Self::ToolFailed { .. } => "TOOL_FAILED",
            Self::ToolTimedOut { .. } => "TOOL_TIMED_OUT",
            Self::Serialize(_) => "SERIALIZE_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Settings(_) => "SETTINGS_ERROR",
        }
    }
}

impl From<config::ConfigError> for BundlerError {
    fn from(err: config::ConfigError) -> Self {
        Self::Settings(err.to_string())
    }
}
