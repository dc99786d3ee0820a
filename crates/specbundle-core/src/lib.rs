//! # specbundle-core
//!
//! Core logic for working with a multi-file OpenAPI specification.
//!
//! This crate provides:
//! - Loading of the root specification and its referenced path fragments
//! - Grouping of path keys by their primary tag for display
//! - Assembly of a filtered specification from a subset of paths
//! - Delegation of bundle, split and docs rendering to Redocly CLI
//!
//! ## Architecture
//!
//! - [`loader`] - YAML loading relative to the project root
//! - [`grouping`] - Tag grouping and tag resolution over path fragments
//! - [`assemble`] - Filtered specification assembly
//! - [`filename`] - Output filename validation
//! - [`tool`] - The external tool seam and its Redocly implementation
//! - [`service`] - Request-level operations with scratch file handling
//! - [`settings`] - Layered settings (defaults, TOML file, environment)
//! - [`error`] - Unified error types for the crate

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(missing_docs)]

pub mod assemble;
pub mod error;
pub mod filename;
pub mod grouping;
pub mod loader;
pub mod service;
pub mod settings;
pub mod tool;

pub use assemble::{filter_spec, select_paths};
pub use error::{BundlerError, Result, GENERIC_FAILURE_MESSAGE};
pub use filename::{is_valid_filename, validate_filename, OutputKind};
pub use grouping::{group_paths, resolve_tags, GroupedPath, TagGroups, DEFAULT_SUMMARY, UNTAGGED};
pub use loader::{LoadError, SpecLoader};
pub use service::BundlerService;
pub use settings::{LoggingSettings, ProjectSettings, ServerSettings, Settings, ToolSettings};
pub use tool::{RedoclyCli, SpecTool};
