//! Request-level operations: list, bundle, split, build docs.
//!
//! Every tool run gets its own uniquely named scratch paths inside the
//! project root. They are removed when the guards drop, on success and on
//! every error path. Tool runs are additionally limited by a semaphore
//! (`tool.max_concurrent`, default 1) because `split` rewrites the project
//! tree the other operations read from.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_yaml::Mapping;
use tempfile::{NamedTempFile, TempDir};
use tokio::sync::{Semaphore, SemaphorePermit};
use uuid::Uuid;

use crate::assemble::filter_spec;
use crate::error::{BundlerError, Result};
use crate::filename::{validate_filename, OutputKind};
use crate::grouping::{group_paths, TagGroups};
use crate::loader::SpecLoader;
use crate::settings::Settings;
use crate::tool::{RedoclyCli, SpecTool};

/// Prefix of every scratch file and directory.
const SCRATCH_PREFIX: &str = ".specbundle-";

/// Owns everything a request needs to talk to the project tree and the tool.
pub struct BundlerService {
    loader: SpecLoader,
    root_spec: PathBuf,
    tool: Arc<dyn SpecTool>,
    permits: Semaphore,
}

impl std::fmt::Debug for BundlerService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BundlerService")
            .field("project_root", &self.loader.project_root())
            .field("root_spec", &self.root_spec)
            .field("available_permits", &self.permits.available_permits())
            .finish_non_exhaustive()
    }
}

impl BundlerService {
    /// Create a service over `project_root` using `tool`.
    ///
    /// `max_concurrent` is clamped to at least one.
    pub fn new(
        project_root: impl Into<PathBuf>,
        root_spec: impl Into<PathBuf>,
        tool: Arc<dyn SpecTool>,
        max_concurrent: usize,
    ) -> Self {
        Self {
            loader: SpecLoader::new(project_root),
            root_spec: root_spec.into(),
            tool,
            permits: Semaphore::new(max_concurrent.max(1)),
        }
    }

    /// Create a service running Redocly CLI as configured in `settings`.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        let root = settings.project_root().to_path_buf();
        let tool = RedoclyCli::from_settings(&settings.tool, root.clone());
        Self::new(
            root,
            settings.project.root_spec.clone(),
            Arc::new(tool),
            settings.tool.max_concurrent,
        )
    }

    /// Root specification file, relative to the project root.
    #[must_use]
    pub fn root_spec(&self) -> &Path {
        &self.root_spec
    }

    /// Whether the root specification currently exists on disk.
    #[must_use]
    pub fn root_spec_exists(&self) -> bool {
        self.loader.resolve(&self.root_spec).is_file()
    }

    fn load_root(&self) -> Result<Mapping> {
        self.loader
            .load(&self.root_spec)
            .ok_or_else(|| BundlerError::RootSpecMissing(self.root_spec.clone()))
    }

    /// Group the root specification's paths by primary tag.
    ///
    /// The root is re-read on every call.
    ///
    /// # Errors
    ///
    /// Returns [`BundlerError::RootSpecMissing`] if the root cannot be loaded
    /// or has no `paths`.
    pub fn grouped_paths(&self) -> Result<TagGroups> {
        let root = self.load_root()?;
        group_paths(&self.loader, &root, &self.root_spec)
    }

    /// Build the filtered specification for the selected path keys.
    ///
    /// # Errors
    ///
    /// Returns [`BundlerError::RootSpecMissing`] if the root cannot be loaded.
    pub fn filtered_spec<S: AsRef<str>>(&self, keys: &[S]) -> Result<Mapping> {
        let root = self.load_root()?;
        Ok(filter_spec(&self.loader, &root, keys))
    }

    /// Bundle the selected paths into a single YAML document.
    ///
    /// The filtered specification is written next to the root specification
    /// so its relative `$ref`s resolve, then handed to the tool.
    ///
    /// # Errors
    ///
    /// Fails on an invalid `filename` (before any file work), a missing root
    /// specification, a tool failure, or I/O on the scratch files.
    #[tracing::instrument(skip(self, keys), fields(op_id = %Uuid::new_v4(), selected = keys.len()))]
    pub async fn bundle<S: AsRef<str> + Sync>(&self, filename: &str, keys: &[S]) -> Result<Vec<u8>> {
        validate_filename(filename, OutputKind::Bundle)?;

        // the root is read under the permit; split rewrites it
        let _permit = self.acquire().await?;
        let spec = self.filtered_spec(keys)?;
        let yaml = serde_yaml::to_string(&spec)?;

        let root = self.loader.project_root();

        let input = scratch_file(root, ".yaml")?;
        tokio::fs::write(input.path(), yaml).await?;

        let scratch = scratch_dir(root)?;
        let output = scratch.path().join(filename);

        self.tool.bundle(input.path(), &output).await?;
        let bundled = tokio::fs::read(&output).await?;

        tracing::info!(bytes = bundled.len(), "Bundle generated");
        Ok(bundled)
    }

    /// Split a monolithic specification and install the result into the
    /// project root, replacing same-named files and directories.
    ///
    /// Returns the names of the installed top-level entries, sorted.
    ///
    /// # Errors
    ///
    /// Fails on empty content, a tool failure, or I/O while installing.
    #[tracing::instrument(skip(self, document), fields(op_id = %Uuid::new_v4(), bytes = document.len()))]
    pub async fn split(&self, document: &str) -> Result<Vec<PathBuf>> {
        if document.trim().is_empty() {
            return Err(BundlerError::MissingSpecContent);
        }

        let _permit = self.acquire().await?;
        let root = self.loader.project_root();

        let scratch = scratch_dir(root)?;
        let input = scratch.path().join("monolith.yaml");
        tokio::fs::write(&input, document).await?;

        let out_dir = scratch.path().join("split");
        tokio::fs::create_dir(&out_dir).await?;

        self.tool.split(&input, &out_dir).await?;
        let installed = install_entries(&out_dir, root).await?;

        tracing::info!(entries = installed.len(), "Project split and updated");
        Ok(installed)
    }

    /// Render `spec_content` as standalone HTML documentation.
    ///
    /// # Errors
    ///
    /// Fails on an invalid `filename`, absent or empty content, a tool
    /// failure, or scratch I/O.
    #[tracing::instrument(skip(self, spec_content), fields(op_id = %Uuid::new_v4()))]
    pub async fn build_docs(
        &self,
        filename: &str,
        spec_content: Option<&serde_json::Value>,
    ) -> Result<Vec<u8>> {
        validate_filename(filename, OutputKind::Docs)?;

        let content = spec_content
            .filter(|value| !is_blank(value))
            .ok_or(BundlerError::MissingSpecContent)?;
        let yaml = serde_yaml::to_string(content)?;

        let _permit = self.acquire().await?;
        let scratch = scratch_dir(self.loader.project_root())?;
        let input = scratch.path().join("bundle.yaml");
        tokio::fs::write(&input, yaml).await?;

        let output = scratch.path().join(filename);
        self.tool.build_docs(&input, &output).await?;
        let html = tokio::fs::read(&output).await?;

        tracing::info!(bytes = html.len(), "Docs built");
        Ok(html)
    }

    async fn acquire(&self) -> Result<SemaphorePermit<'_>> {
        self.permits
            .acquire()
            .await
            .map_err(|_| BundlerError::Io(std::io::Error::other("tool semaphore closed")))
    }
}

fn is_blank(value: &serde_json::Value) -> bool {
    use serde_json::Value;
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

fn scratch_file(root: &Path, suffix: &str) -> Result<NamedTempFile> {
    Ok(tempfile::Builder::new()
        .prefix(SCRATCH_PREFIX)
        .suffix(suffix)
        .tempfile_in(root)?)
}

fn scratch_dir(root: &Path) -> Result<TempDir> {
    Ok(tempfile::Builder::new()
        .prefix(SCRATCH_PREFIX)
        .tempdir_in(root)?)
}

/// Move every top-level entry of `from` into `to`, replacing what is there.
async fn install_entries(from: &Path, to: &Path) -> Result<Vec<PathBuf>> {
    let mut installed = Vec::new();
    let mut entries = tokio::fs::read_dir(from).await?;

    while let Some(entry) = entries.next_entry().await? {
        let name = PathBuf::from(entry.file_name());
        let dest = to.join(&name);

        if let Ok(existing) = tokio::fs::symlink_metadata(&dest).await {
            if existing.is_dir() {
                tokio::fs::remove_dir_all(&dest).await?;
            } else {
                tokio::fs::remove_file(&dest).await?;
            }
        }

        tokio::fs::rename(entry.path(), &dest).await?;
        tracing::debug!(entry = %name.display(), "Installed split output");
        installed.push(name);
    }

    installed.sort();
    Ok(installed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::tests::shop_project;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio_test::{assert_err, assert_ok};

    const SPLIT_ROOT: &str = "\
openapi: 3.1.0
info:
  title: Pets
  version: 2.0.0
paths:
  /pets:
    $ref: paths/pets.yaml
";

    /// Stands in for Redocly: copies, writes a fixed tree, or fails.
    #[derive(Default)]
    struct FakeTool {
        fail_with: Option<String>,
        inputs: Mutex<Vec<PathBuf>>,
    }

    impl FakeTool {
        fn failing(message: &str) -> Self {
            Self {
                fail_with: Some(message.to_string()),
                ..Self::default()
            }
        }

        fn record(&self, input: &Path) -> Result<()> {
            self.inputs.lock().unwrap().push(input.to_path_buf());
            match &self.fail_with {
                Some(stderr) => Err(BundlerError::ToolFailed {
                    stderr: stderr.clone(),
                }),
                None => Ok(()),
            }
        }

        fn inputs(&self) -> Vec<PathBuf> {
            self.inputs.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SpecTool for FakeTool {
        async fn bundle(&self, input: &Path, output: &Path) -> Result<()> {
            self.record(input)?;
            std::fs::copy(input, output)?;
            Ok(())
        }

        async fn split(&self, input: &Path, out_dir: &Path) -> Result<()> {
            self.record(input)?;
            std::fs::create_dir_all(out_dir.join("paths"))?;
            std::fs::write(out_dir.join("openapi.yaml"), SPLIT_ROOT)?;
            std::fs::write(
                out_dir.join("paths/pets.yaml"),
                "get:\n  summary: List pets\n  tags: [Pets]\n",
            )?;
            Ok(())
        }

        async fn build_docs(&self, input: &Path, output: &Path) -> Result<()> {
            self.record(input)?;
            let spec = std::fs::read_to_string(input)?;
            std::fs::write(output, format!("<html><body><pre>{spec}</pre></body></html>"))?;
            Ok(())
        }
    }

    fn service(root: &Path, tool: &Arc<FakeTool>) -> BundlerService {
        BundlerService::new(root, "openapi.yaml", tool.clone(), 1)
    }

    fn scratch_leftovers(root: &Path) -> Vec<String> {
        std::fs::read_dir(root)
            .unwrap()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with(SCRATCH_PREFIX))
            .collect()
    }

    #[test]
    fn test_grouped_paths_reads_root() {
        let dir = shop_project();
        let svc = service(dir.path(), &Arc::new(FakeTool::default()));
        let groups = svc.grouped_paths().unwrap();
        assert_eq!(groups.tags().collect::<Vec<_>>(), vec!["Users", "Orders"]);
    }

    #[test]
    fn test_missing_root_spec() {
        let dir = tempfile::TempDir::new().unwrap();
        let svc = service(dir.path(), &Arc::new(FakeTool::default()));
        assert!(!svc.root_spec_exists());
        assert!(matches!(
            svc.grouped_paths(),
            Err(BundlerError::RootSpecMissing(_))
        ));
    }

    #[tokio::test]
    async fn test_bundle_filters_and_cleans_up() {
        let dir = shop_project();
        let tool = Arc::new(FakeTool::default());
        let svc = service(dir.path(), &tool);

        let bytes = assert_ok!(svc.bundle("users.yaml", &["/users"]).await);
        let bundled: Mapping = serde_yaml::from_slice(&bytes).unwrap();

        let tags: Vec<&str> = bundled["tags"]
            .as_sequence()
            .unwrap()
            .iter()
            .filter_map(|t| t["name"].as_str())
            .collect();
        assert_eq!(tags, vec!["Users", "Admin"]);
        assert!(bundled["paths"].as_mapping().unwrap().contains_key("/users"));

        // input lived in the project root, and is gone now
        let inputs = tool.inputs();
        assert_eq!(inputs[0].parent(), Some(dir.path()));
        assert!(!inputs[0].exists());
        assert!(scratch_leftovers(dir.path()).is_empty());
        assert!(!dir.path().join("users.yaml").exists());
    }

    #[tokio::test]
    async fn test_bundle_rejects_filename_before_work() {
        let dir = shop_project();
        let tool = Arc::new(FakeTool::default());
        let svc = service(dir.path(), &tool);

        let err = assert_err!(svc.bundle("../evil.yaml", &["/users"]).await);
        assert!(matches!(err, BundlerError::InvalidFilename { .. }));
        assert!(tool.inputs().is_empty());
    }

    #[tokio::test]
    async fn test_bundle_tool_failure_cleans_up() {
        let dir = shop_project();
        let tool = Arc::new(FakeTool::failing("Can't resolve $ref"));
        let svc = service(dir.path(), &tool);

        let err = assert_err!(svc.bundle("out.yaml", &["/users"]).await);
        assert!(matches!(err, BundlerError::ToolFailed { ref stderr } if stderr == "Can't resolve $ref"));
        assert!(scratch_leftovers(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_bundle_without_root_spec() {
        let dir = tempfile::TempDir::new().unwrap();
        let tool = Arc::new(FakeTool::default());
        let svc = service(dir.path(), &tool);

        let err = assert_err!(svc.bundle("out.yaml", &["/users"]).await);
        assert!(matches!(err, BundlerError::RootSpecMissing(_)));
        assert!(tool.inputs().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_bundles_use_distinct_inputs() {
        let dir = shop_project();
        let tool = Arc::new(FakeTool::default());
        let svc = service(dir.path(), &tool);

        let (a, b) = tokio::join!(
            svc.bundle("a.yaml", &["/users"]),
            svc.bundle("b.yaml", &["/orders"])
        );
        assert_ok!(a);
        assert_ok!(b);

        let inputs = tool.inputs();
        assert_eq!(inputs.len(), 2);
        assert_ne!(inputs[0], inputs[1]);
    }

    #[tokio::test]
    async fn test_bundle_reads_root_after_waiting_for_permit() {
        let dir = shop_project();
        let tool = Arc::new(FakeTool::default());
        let svc = Arc::new(service(dir.path(), &tool));

        let held = svc.acquire().await.unwrap();
        let pending = tokio::spawn({
            let svc = Arc::clone(&svc);
            async move { svc.bundle("users.yaml", &["/users"]).await }
        });
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        // another tool run replaces the tree while the bundle waits
        std::fs::write(
            dir.path().join("openapi.yaml"),
            "openapi: 3.1.0\ninfo:\n  title: Replaced\npaths: {}\n",
        )
        .unwrap();
        drop(held);

        let bytes = assert_ok!(pending.await.unwrap());
        let bundled: Mapping = serde_yaml::from_slice(&bytes).unwrap();
        assert_eq!(bundled["info"]["title"].as_str(), Some("Replaced"));
        assert!(bundled["paths"].as_mapping().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_split_replaces_project_tree() {
        let dir = shop_project();
        let tool = Arc::new(FakeTool::default());
        let svc = service(dir.path(), &tool);

        let installed = assert_ok!(svc.split("openapi: 3.1.0\npaths: {}\n").await);
        assert_eq!(
            installed,
            vec![PathBuf::from("openapi.yaml"), PathBuf::from("paths")]
        );

        // old fragments are replaced, not merged
        assert!(!dir.path().join("paths/users.yaml").exists());
        assert!(dir.path().join("paths/pets.yaml").exists());
        assert!(scratch_leftovers(dir.path()).is_empty());

        // the next listing sees the new tree
        let groups = svc.grouped_paths().unwrap();
        assert_eq!(groups.get("Pets").unwrap()[0].path, "/pets");
    }

    #[tokio::test]
    async fn test_split_requires_content() {
        let dir = shop_project();
        let tool = Arc::new(FakeTool::default());
        let svc = service(dir.path(), &tool);

        let err = assert_err!(svc.split("  \n").await);
        assert!(matches!(err, BundlerError::MissingSpecContent));
        assert!(tool.inputs().is_empty());
    }

    #[tokio::test]
    async fn test_split_failure_leaves_tree_untouched() {
        let dir = shop_project();
        let tool = Arc::new(FakeTool::failing("split failed"));
        let svc = service(dir.path(), &tool);

        assert_err!(svc.split("openapi: 3.1.0\n").await);
        assert!(dir.path().join("paths/users.yaml").exists());
        assert!(scratch_leftovers(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_build_docs() {
        let dir = shop_project();
        let tool = Arc::new(FakeTool::default());
        let svc = service(dir.path(), &tool);

        let content = serde_json::json!({ "openapi": "3.1.0", "info": { "title": "Shop" } });
        let html = assert_ok!(svc.build_docs("docs.html", Some(&content)).await);
        let html = String::from_utf8(html).unwrap();
        assert!(html.starts_with("<html>"));
        assert!(html.contains("title: Shop"));
        assert!(scratch_leftovers(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_build_docs_requires_content() {
        let dir = shop_project();
        let tool = Arc::new(FakeTool::default());
        let svc = service(dir.path(), &tool);

        for content in [None, Some(serde_json::json!({})), Some(serde_json::json!(""))] {
            let err = assert_err!(svc.build_docs("docs.html", content.as_ref()).await);
            assert!(matches!(err, BundlerError::MissingSpecContent));
        }

        let err = assert_err!(
            svc.build_docs("docs.pdf", Some(&serde_json::json!({"openapi": "3.1.0"})))
                .await
        );
        assert!(matches!(err, BundlerError::InvalidFilename { .. }));
        assert!(tool.inputs().is_empty());
    }
}
