//! `run` action handler.

use crate::error::GalleryError;
use crate::gallery::{Gallery, run_notebooks};
use crate::jupyter::JupyterExecutor;

/// Execute the gallery's published notebooks with Jupyter.
///
/// # Errors
///
/// Returns an error if discovery fails or any notebook could not be
/// executed.
pub async fn run(gallery: &Gallery) -> Result<(), GalleryError> {
    let executor = JupyterExecutor::new(
        gallery.config.jupyter.clone(),
        gallery.config.kernel_name.clone(),
    );
    run_notebooks(gallery, &executor).await?.into_result()?;
    Ok(())
}
