//! Notebook execution through `jupyter nbconvert --execute`.

use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::Result;
use crate::jupyter::{NotebookExecutor, run_collaborator};
use crate::notebook::Notebook;

/// Executes notebooks with `nbconvert`'s execute preprocessor.
///
/// Runs with `--allow-errors` so a raising cell is recorded as an `error`
/// output and execution continues with the next cell. The executed
/// notebook is read back from stdout.
#[derive(Debug, Clone)]
pub struct JupyterExecutor {
    program: String,
    kernel_name: Option<String>,
}

impl JupyterExecutor {
    /// Creates an executor using the given `jupyter` launcher.
    #[must_use]
    pub fn new(program: impl Into<String>, kernel_name: Option<String>) -> Self {
        Self {
            program: program.into(),
            kernel_name,
        }
    }

    /// Arguments passed after the program name.
    #[must_use]
    pub fn args(&self, path: &Path) -> Vec<String> {
        let mut args = vec![
            "nbconvert".to_string(),
            "--to".to_string(),
            "notebook".to_string(),
            "--execute".to_string(),
            "--allow-errors".to_string(),
            "--stdout".to_string(),
        ];
        if let Some(kernel) = &self.kernel_name {
            args.push(format!("--ExecutePreprocessor.kernel_name={kernel}"));
        }
        args.push(path.display().to_string());
        args
    }
}

#[async_trait]
impl NotebookExecutor for JupyterExecutor {
    async fn execute(&self, path: &Path, workdir: &Path) -> Result<Notebook> {
        let mut command = Command::new(&self.program);
        command.args(self.args(path)).current_dir(workdir);

        let output = run_collaborator(command, &self.program).await?;
        Notebook::from_slice(&output.stdout, path)
    }
}
