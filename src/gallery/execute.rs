//! The `run` stage: execute published notebooks into `_run_` copies.

use tracing::{debug, error, info, warn};

use crate::error::{GalleryError, Result};
use crate::gallery::Gallery;
use crate::gallery::discovery::{DiscoveredNotebook, GalleryWalker};
use crate::gallery::workdir::WorkdirGuard;
use crate::jupyter::NotebookExecutor;

/// Outcome of a `run` batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Notebooks whose executed copy was written.
    pub executed: usize,
    /// Notebooks that could not be executed at all.
    pub failed: usize,
    /// Cells that raised, across all executed notebooks.
    pub cell_errors: usize,
}

impl RunSummary {
    /// Turns a batch with failed notebooks into an error.
    ///
    /// # Errors
    ///
    /// Returns `GalleryError::ExecutionFailed` if any notebook failed.
    pub fn into_result(self) -> Result<Self> {
        if self.failed > 0 {
            Err(GalleryError::ExecutionFailed {
                failed: self.failed,
            })
        } else {
            Ok(self)
        }
    }
}

/// Executes every published original notebook in the gallery.
///
/// Each notebook runs with its own directory as the working directory; the
/// starting directory is restored after every notebook, however it ends.
/// A notebook that fails outright is logged and counted, and the batch
/// moves on. Cell exceptions are logged and counted but never fail the
/// notebook.
///
/// # Errors
///
/// Returns an error if the gallery directory is missing or a notebook
/// cannot be parsed during discovery.
pub async fn run_notebooks(gallery: &Gallery, executor: &dyn NotebookExecutor) -> Result<RunSummary> {
    let walker = GalleryWalker::new(&gallery.config.gallery_dir, gallery.source_discovery()?)?;
    let mut summary = RunSummary::default();

    for item in walker {
        let found = item?;
        if gallery.is_executed_name(found.file_name()) {
            continue;
        }

        info!("Running tutorial: {}", found.file_name());

        match run_one(gallery, executor, &found).await {
            Ok(cell_errors) => {
                summary.executed += 1;
                summary.cell_errors += cell_errors;
            }
            Err(e) => {
                error!(notebook = %found.path.display(), error = %e, "execution failed");
                summary.failed += 1;
            }
        }
    }

    info!(
        executed = summary.executed,
        failed = summary.failed,
        cell_errors = summary.cell_errors,
        "run complete"
    );
    Ok(summary)
}

async fn run_one(
    gallery: &Gallery,
    executor: &dyn NotebookExecutor,
    found: &DiscoveredNotebook,
) -> Result<usize> {
    let dir = found.dir();
    let guard = WorkdirGuard::capture()?;
    guard.enter(dir)?;

    let executed = executor.execute(&found.path, dir).await?;

    let cell_errors = executed.cell_errors();
    for err in &cell_errors {
        warn!(
            notebook = found.file_name(),
            cell = err.cell,
            ename = %err.ename,
            evalue = %err.evalue,
            "cell raised during execution, skipped"
        );
    }

    let output = dir.join(gallery.executed_name(found.file_name()));
    executed.write(&output)?;
    debug!(output = %output.display(), "wrote executed notebook");

    Ok(cell_errors.len())
}
