//! YAML document loading relative to the project root.
//!
//! The loader never fails outward: a missing, unreadable, unparsable or
//! empty document all come back as `None`. Callers that care about the
//! difference can use [`SpecLoader::try_load`].

use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};
use thiserror::Error;

/// Why a document could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// Resolved path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid YAML.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        /// Resolved path.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_yaml::Error,
    },

    /// The document parsed but is null, empty, or not a mapping.
    #[error("{} does not contain a YAML mapping", path.display())]
    NotAMapping {
        /// Resolved path.
        path: PathBuf,
    },
}

/// Loads YAML documents from a fixed project root.
#[derive(Debug, Clone)]
pub struct SpecLoader {
    project_root: PathBuf,
}

impl SpecLoader {
    /// Create a loader rooted at `project_root`.
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
        }
    }

    /// The directory relative paths are resolved against.
    #[must_use]
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Resolve `path` against the project root. Absolute paths are kept.
    #[must_use]
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.project_root.join(path)
    }

    /// Load `path` as a YAML mapping, or `None` if that is not possible.
    pub fn load(&self, path: impl AsRef<Path>) -> Option<Mapping> {
        match self.try_load(path) {
            Ok(mapping) => Some(mapping),
            Err(err) => {
                tracing::warn!(error = %err, "Could not load or parse YAML document");
                None
            }
        }
    }

    /// Load `path` as a YAML mapping, reporting why it failed.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if the file is missing or unreadable, is not
    /// valid YAML, or does not hold a non-empty mapping.
    pub fn try_load(&self, path: impl AsRef<Path>) -> Result<Mapping, LoadError> {
        let path = self.resolve(path);

        let content = std::fs::read_to_string(&path).map_err(|source| LoadError::Read {
            path: path.clone(),
            source,
        })?;

        let value: Value = serde_yaml::from_str(&content).map_err(|source| LoadError::Parse {
            path: path.clone(),
            source,
        })?;

        match value {
            Value::Mapping(mapping) if !mapping.is_empty() => Ok(mapping),
            _ => Err(LoadError::NotAMapping { path }),
        }
    }
}
