//! External notebook collaborators.
//!
//! Execution and HTML conversion are delegated to Jupyter's `nbconvert`.
//! The pipeline only sees the [`NotebookExecutor`] and [`HtmlConverter`]
//! traits, so tests and alternative runners can stand in for Jupyter.

pub mod converter;
pub mod executor;

use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{GalleryError, Result};
use crate::notebook::Notebook;

pub use converter::JupyterConverter;
pub use executor::JupyterExecutor;

/// Version recorded when the tool version cannot be probed.
pub const UNKNOWN_VERSION: &str = "unknown";

/// Runs every code cell of a notebook.
#[async_trait]
pub trait NotebookExecutor: Send + Sync {
    /// Executes the notebook at `path` with `workdir` as its working
    /// directory and returns the executed document.
    ///
    /// Cell exceptions must be captured as `error` outputs rather than
    /// failing the call.
    ///
    /// # Errors
    ///
    /// Returns an error only when the notebook cannot be executed at all.
    async fn execute(&self, path: &Path, workdir: &Path) -> Result<Notebook>;
}

/// Renders a notebook to a standalone HTML page.
#[async_trait]
pub trait HtmlConverter: Send + Sync {
    /// Converts `path` into `<output_dir>/<output_base>.html` and returns
    /// the written path.
    ///
    /// # Errors
    ///
    /// Returns an error if the conversion fails.
    async fn convert(&self, path: &Path, output_dir: &Path, output_base: &str) -> Result<PathBuf>;
}

/// Runs a prepared command to completion and checks its exit status.
///
/// Non-empty stderr on success is logged at debug level; nbconvert writes
/// its progress there.
pub(crate) async fn run_collaborator(mut command: Command, program: &str) -> Result<Output> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    debug!(program, command = ?command.as_std(), "spawning collaborator");

    let output = command.output().await.map_err(|source| GalleryError::Spawn {
        program: program.to_string(),
        source,
    })?;

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

    if !output.status.success() {
        return Err(GalleryError::Collaborator {
            program: program.to_string(),
            code: output.status.code(),
            stderr,
        });
    }

    if !stderr.is_empty() {
        debug!(program, stderr = %stderr, "collaborator stderr");
    }

    Ok(output)
}

/// Reads `<tool>.__version__` through the configured Python interpreter.
///
/// Falls back to [`UNKNOWN_VERSION`] with a warning when the interpreter
/// or the package is unavailable.
pub async fn probe_tool_version(python: &str, tool: &str) -> String {
    let mut command = Command::new(python);
    command
        .arg("-c")
        .arg(format!("import {tool}; print({tool}.__version__)"));

    match run_collaborator(command, python).await {
        Ok(output) => {
            let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if version.is_empty() {
                warn!(tool, "version probe printed nothing");
                UNKNOWN_VERSION.to_string()
            } else {
                debug!(tool, version = %version, "probed tool version");
                version
            }
        }
        Err(e) => {
            warn!(tool, error = %e, "could not determine tool version");
            UNKNOWN_VERSION.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_spawn_failure() {
        let command = Command::new("/nonexistent/nbgallery-test-binary");
        let err = run_collaborator(command, "missing").await.unwrap_err();
        assert!(matches!(err, GalleryError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit() {
        let command = Command::new("false");
        let err = run_collaborator(command, "false").await.unwrap_err();
        assert!(matches!(err, GalleryError::Collaborator { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stdout_captured() {
        let mut command = Command::new("echo");
        command.arg("hello");
        let output = run_collaborator(command, "echo").await.unwrap();
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "hello");
    }

    #[tokio::test]
    async fn test_probe_falls_back_to_unknown() {
        let version = probe_tool_version("/nonexistent/python", "sunpy").await;
        assert_eq!(version, UNKNOWN_VERSION);
    }
}
