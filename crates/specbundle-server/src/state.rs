//! Application state shared across handlers.

use std::path::Path;
use std::sync::Arc;

use specbundle_core::{BundlerService, Settings};

/// Shared application state.
///
/// Cheap to clone; everything lives behind one `Arc`. The service holds no
/// mutable state of its own apart from the tool semaphore, so no lock is
/// needed here.
#[derive(Debug, Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

#[derive(Debug)]
struct AppStateInner {
    service: BundlerService,
}

impl AppState {
    /// Wrap an already built service.
    #[must_use]
    pub fn new(service: BundlerService) -> Self {
        Self {
            inner: Arc::new(AppStateInner { service }),
        }
    }

    /// Build state running Redocly CLI as configured in `settings`.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(BundlerService::from_settings(settings))
    }

    /// The bundler service.
    #[must_use]
    pub fn service(&self) -> &BundlerService {
        &self.inner.service
    }

    /// Root specification file name, relative to the project root.
    #[must_use]
    pub fn root_spec(&self) -> &Path {
        self.inner.service.root_spec()
    }
}
