//! `convert` action handler.

use crate::error::GalleryError;
use crate::gallery::{Gallery, convert_notebooks};
use crate::jupyter::{JupyterConverter, probe_tool_version};

/// Convert executed notebooks to HTML and write the gallery index.
///
/// The manifest version comes from configuration when set, otherwise
/// from the installed package.
///
/// # Errors
///
/// Returns an error if `run` has not been done, discovery fails, the
/// outputs cannot be written, or any notebook failed to convert.
pub async fn run(gallery: &Gallery) -> Result<(), GalleryError> {
    let config = &gallery.config;

    let tool_version = match &config.tool_version {
        Some(version) => version.clone(),
        None => probe_tool_version(&config.python, &config.tool_name).await,
    };

    let converter = JupyterConverter::new(
        config.jupyter.clone(),
        config.html_template.clone(),
        config.templates_dir.clone(),
    );

    convert_notebooks(gallery, &converter, &tool_version)
        .await?
        .into_result()?;
    Ok(())
}
