//! Output filename validation.
//!
//! Filenames come straight from the browser and end up in attachment
//! headers and scratch paths, so they must be bare names with a known
//! extension.

use crate::error::{BundlerError, Result};

/// What kind of file a request produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// A bundled YAML specification.
    Bundle,
    /// Standalone HTML documentation.
    Docs,
}

impl OutputKind {
    /// Extensions accepted for this kind.
    #[must_use]
    pub const fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Bundle => &[".yaml", ".yml"],
            Self::Docs => &[".html", ".htm"],
        }
    }

    /// Name used when the request does not supply one.
    #[must_use]
    pub const fn default_filename(self) -> &'static str {
        match self {
            Self::Bundle => "bundled.yaml",
            Self::Docs => "api-docs.html",
        }
    }

    /// MIME type of the produced file.
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Bundle => "application/yaml",
            Self::Docs => "text/html; charset=utf-8",
        }
    }
}

/// Whether `name` is a bare filename ending in one of `extensions`.
#[must_use]
pub fn is_valid_filename(name: &str, extensions: &[&str]) -> bool {
    if name.is_empty() {
        return false;
    }
    if name.contains('/') || name.contains('\\') || name.contains("..") {
        return false;
    }
    if name.chars().any(char::is_control) {
        return false;
    }
    extensions.iter().any(|ext| name.ends_with(ext))
}

/// Validate `name` for `kind`.
///
/// # Errors
///
/// Returns [`BundlerError::InvalidFilename`] if the name is empty, contains
/// a path separator, `..` or a control character, or lacks an accepted
/// extension.
pub fn validate_filename(name: &str, kind: OutputKind) -> Result<()> {
    if is_valid_filename(name, kind.extensions()) {
        Ok(())
    } else {
        Err(BundlerError::InvalidFilename {
            name: name.to_string(),
            allowed: kind.extensions().join(" or "),
        })
    }
}
