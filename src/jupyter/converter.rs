//! HTML conversion through `jupyter nbconvert --to html`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::Result;
use crate::jupyter::{HtmlConverter, run_collaborator};

/// Renders notebooks with a named nbconvert template.
///
/// The gallery's templates directory is added to nbconvert's template
/// search path so a site-specific template (e.g. `sunpy`) resolves.
#[derive(Debug, Clone)]
pub struct JupyterConverter {
    program: String,
    template: String,
    templates_dir: PathBuf,
}

impl JupyterConverter {
    /// Creates a converter.
    #[must_use]
    pub fn new(program: impl Into<String>, template: impl Into<String>, templates_dir: PathBuf) -> Self {
        Self {
            program: program.into(),
            template: template.into(),
            templates_dir,
        }
    }

    /// Arguments passed after the program name.
    #[must_use]
    pub fn args(&self, path: &Path, output_dir: &Path, output_base: &str) -> Vec<String> {
        vec![
            "nbconvert".to_string(),
            "--to".to_string(),
            "html".to_string(),
            "--template".to_string(),
            self.template.clone(),
            format!(
                "--TemplateExporter.extra_template_basedirs={}",
                self.templates_dir.display()
            ),
            "--output-dir".to_string(),
            output_dir.display().to_string(),
            "--output".to_string(),
            output_base.to_string(),
            path.display().to_string(),
        ]
    }
}

#[async_trait]
impl HtmlConverter for JupyterConverter {
    async fn convert(&self, path: &Path, output_dir: &Path, output_base: &str) -> Result<PathBuf> {
        let mut command = Command::new(&self.program);
        command.args(self.args(path, output_dir, output_base));

        run_collaborator(command, &self.program).await?;
        Ok(output_dir.join(format!("{output_base}.html")))
    }
}
