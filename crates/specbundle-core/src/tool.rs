//! External specification tool (Redocly CLI).
//!
//! Bundling, splitting and documentation rendering are not done in-process.
//! [`SpecTool`] is the seam; [`RedoclyCli`] runs the real command and tests
//! substitute their own implementation.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{BundlerError, Result};
use crate::settings::ToolSettings;

/// Operations delegated to the external tool.
///
/// Each call must either write its result to the given output location and
/// return `Ok`, or fail without promising anything about the output.
#[async_trait]
pub trait SpecTool: Send + Sync {
    /// Resolve every `$ref` in `input` into a single document at `output`.
    async fn bundle(&self, input: &Path, output: &Path) -> Result<()>;

    /// Split the monolithic document `input` into a file tree under `out_dir`.
    async fn split(&self, input: &Path, out_dir: &Path) -> Result<()>;

    /// Render `input` as standalone HTML at `output`.
    async fn build_docs(&self, input: &Path, output: &Path) -> Result<()>;
}

/// Command prefixes tried in order when none is configured.
const DEFAULT_CANDIDATES: &[&[&str]] = &[
    &["redocly"],
    &["redocly.cmd"],
    &["npx", "--yes", "@redocly/cli"],
];

/// Runs Redocly CLI as a subprocess.
#[derive(Debug, Clone)]
pub struct RedoclyCli {
    candidates: Vec<Vec<String>>,
    working_dir: PathBuf,
    timeout: Option<Duration>,
}

impl RedoclyCli {
    /// Use the default candidates, running in `working_dir`.
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            candidates: DEFAULT_CANDIDATES
                .iter()
                .map(|prefix| prefix.iter().map(|s| (*s).to_string()).collect())
                .collect(),
            working_dir: working_dir.into(),
            timeout: None,
        }
    }

    /// Build from settings. A configured command replaces the candidates.
    pub fn from_settings(settings: &ToolSettings, working_dir: impl Into<PathBuf>) -> Self {
        let mut cli = Self::new(working_dir);
        if let Some(command) = settings.command.as_ref().filter(|c| !c.is_empty()) {
            cli.candidates = vec![command.clone()];
        }
        cli.timeout = settings.timeout();
        cli
    }

    /// Kill the tool if it runs longer than `timeout`.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Command prefixes that will be tried, in order.
    #[must_use]
    pub fn candidates(&self) -> &[Vec<String>] {
        &self.candidates
    }

    async fn run(&self, args: &[OsString]) -> Result<()> {
        for prefix in &self.candidates {
            let Some((program, leading)) = prefix.split_first() else {
                continue;
            };

            let mut command = Command::new(program);
            command
                .args(leading)
                .args(args)
                .current_dir(&self.working_dir)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true);

            tracing::debug!(program = %program, ?args, "Running external tool");

            let output = match self.timeout {
                Some(limit) => tokio::time::timeout(limit, command.output())
                    .await
                    .map_err(|_| BundlerError::ToolTimedOut {
                        secs: limit.as_secs(),
                    })?,
                None => command.output().await,
            };

            match output {
                Ok(output) => return check_status(&output),
                Err(err) if err.kind() == ErrorKind::NotFound => {
                    tracing::debug!(program = %program, "Tool candidate not found, trying next");
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(BundlerError::ToolNotFound)
    }
}

fn check_status(output: &Output) -> Result<()> {
    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let diagnostic = if stderr.trim().is_empty() {
        String::from_utf8_lossy(&output.stdout).into_owned()
    } else {
        stderr.into_owned()
    };

    tracing::warn!(status = %output.status, "External tool failed");
    Err(BundlerError::ToolFailed { stderr: diagnostic })
}

#[async_trait]
impl SpecTool for RedoclyCli {
    async fn bundle(&self, input: &Path, output: &Path) -> Result<()> {
        self.run(&[
            "bundle".into(),
            input.into(),
            "--output".into(),
            output.into(),
        ])
        .await
    }

    async fn split(&self, input: &Path, out_dir: &Path) -> Result<()> {
        let mut out_arg = OsString::from("--outDir=");
        out_arg.push(out_dir);
        self.run(&["split".into(), input.into(), out_arg]).await
    }

    async fn build_docs(&self, input: &Path, output: &Path) -> Result<()> {
        self.run(&[
            "build-docs".into(),
            input.into(),
            "--output".into(),
            output.into(),
        ])
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_candidates() {
        let cli = RedoclyCli::new(".");
        assert_eq!(cli.candidates().len(), 3);
        assert_eq!(cli.candidates()[0], vec!["redocly".to_string()]);
        assert_eq!(cli.candidates()[2][0], "npx");
    }

    #[test]
    fn test_configured_command_replaces_candidates() {
        let settings = ToolSettings {
            command: Some(vec!["/opt/redocly/bin/redocly".to_string()]),
            timeout_secs: Some(10),
            max_concurrent: 1,
        };
        let cli = RedoclyCli::from_settings(&settings, ".");
        assert_eq!(cli.candidates(), &[vec!["/opt/redocly/bin/redocly".to_string()]]);
        assert_eq!(cli.timeout, Some(Duration::from_secs(10)));
    }

    #[tokio::test]
    async fn test_missing_executable_is_tool_not_found() {
        let settings = ToolSettings {
            command: Some(vec!["specbundle-test-no-such-binary".to_string()]),
            ..ToolSettings::default()
        };
        let cli = RedoclyCli::from_settings(&settings, std::env::temp_dir());
        let err = cli
            .bundle(Path::new("in.yaml"), Path::new("out.yaml"))
            .await
            .unwrap_err();
        assert!(matches!(err, BundlerError::ToolNotFound));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_relays_stderr() {
        let settings = ToolSettings {
            command: Some(vec![
                "sh".to_string(),
                "-c".to_string(),
                "echo 'Unable to resolve $ref' >&2; exit 1".to_string(),
            ]),
            ..ToolSettings::default()
        };
        let cli = RedoclyCli::from_settings(&settings, std::env::temp_dir());
        let err = cli
            .bundle(Path::new("in.yaml"), Path::new("out.yaml"))
            .await
            .unwrap_err();
        match err {
            BundlerError::ToolFailed { stderr } => {
                assert_eq!(stderr.trim(), "Unable to resolve $ref");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_kills_tool() {
        let settings = ToolSettings {
            command: Some(vec!["sh".to_string(), "-c".to_string(), "sleep 5".to_string()]),
            timeout_secs: None,
            max_concurrent: 1,
        };
        let cli = RedoclyCli::from_settings(&settings, std::env::temp_dir())
            .with_timeout(Some(Duration::from_millis(100)));
        let err = cli
            .split(Path::new("in.yaml"), Path::new("out"))
            .await
            .unwrap_err();
        assert!(matches!(err, BundlerError::ToolTimedOut { .. }));
    }
}
