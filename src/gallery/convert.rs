//! The `convert` stage: pages, thumbnails and the manifest.

use std::fs;
use std::path::{Component, Path};

use tracing::{debug, error, info, warn};

use crate::error::{GalleryError, Result};
use crate::gallery::Gallery;
use crate::gallery::discovery::{DiscoveredNotebook, GalleryWalker};
use crate::gallery::manifest::{self, GalleryManifest, ManifestEntry};
use crate::gallery::thumbnail::Thumbnail;
use crate::jupyter::HtmlConverter;

/// Outcome of a `convert` batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    /// Manifest as written to `gallery.json`.
    pub manifest: GalleryManifest,
    /// Notebooks converted and listed.
    pub converted: usize,
    /// Notebooks skipped because conversion failed.
    pub failed: usize,
}

impl ConversionReport {
    /// Turns a batch with failed notebooks into an error.
    ///
    /// # Errors
    ///
    /// Returns `GalleryError::ConversionFailed` if any notebook failed.
    pub fn into_result(self) -> Result<Self> {
        if self.failed > 0 {
            Err(GalleryError::ConversionFailed {
                failed: self.failed,
            })
        } else {
            Ok(self)
        }
    }
}

/// Converts every published executed copy and writes the index outputs.
///
/// Fails before writing anything if an original notebook has no executed
/// copy. A notebook whose conversion fails is logged, left out of the
/// manifest and counted; the index and manifest are still written.
///
/// # Errors
///
/// Returns `GalleryError::NotExecuted` when `run` has not been done,
/// `GalleryError::MissingGalleryDir` when there is no gallery, or an error
/// from discovery or writing the outputs.
pub async fn convert_notebooks(
    gallery: &Gallery,
    converter: &dyn HtmlConverter,
    tool_version: &str,
) -> Result<ConversionReport> {
    let config = &gallery.config;

    ensure_executed(gallery)?;
    let walker = GalleryWalker::new(&config.gallery_dir, gallery.executed_discovery()?)?;

    fs::create_dir_all(&config.output_dir)
        .map_err(|e| GalleryError::io_at("create directory", &config.output_dir, &e))?;

    let mut report = ConversionReport {
        manifest: GalleryManifest::new(&config.tool_name, tool_version),
        converted: 0,
        failed: 0,
    };

    for item in walker {
        let found = item?;
        match convert_one(gallery, converter, &found).await {
            Ok((section, entry)) => {
                report.manifest.push(&section, entry);
                report.converted += 1;
            }
            Err(e) => {
                error!(notebook = %found.path.display(), error = %e, "conversion failed, skipping");
                report.failed += 1;
            }
        }
    }

    manifest::write_outputs(&config.output_dir, &gallery.index_template, &report.manifest)?;

    info!(
        converted = report.converted,
        failed = report.failed,
        "convert complete"
    );
    Ok(report)
}

/// Checks that every published original has an executed copy beside it.
///
/// # Errors
///
/// Returns `GalleryError::NotExecuted` listing the originals without one.
pub fn ensure_executed(gallery: &Gallery) -> Result<()> {
    let walker = GalleryWalker::new(&gallery.config.gallery_dir, gallery.source_discovery()?)?;
    let mut missing = Vec::new();

    for item in walker {
        let found = item?;
        if gallery.is_executed_name(found.file_name()) {
            continue;
        }
        let executed = found.dir().join(gallery.executed_name(found.file_name()));
        if !executed.is_file() {
            missing.push(found.path);
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(GalleryError::NotExecuted { paths: missing })
    }
}

async fn convert_one(
    gallery: &Gallery,
    converter: &dyn HtmlConverter,
    found: &DiscoveredNotebook,
) -> Result<(String, ManifestEntry)> {
    let config = &gallery.config;

    let link_name = found
        .metadata
        .link_name
        .clone()
        .ok_or_else(|| GalleryError::MissingLinkName {
            path: found.path.clone(),
        })?;

    let section = found.metadata.section_or(&config.default_section).to_string();
    if !is_plain_name(&section) {
        return Err(GalleryError::InvalidMetadata {
            path: found.path.clone(),
            message: format!("section_name '{section}' must be a single directory name"),
        });
    }

    let clean = gallery.clean_base_name(found.stem()).to_string();
    let section_dir = config.output_dir.join(&section);
    fs::create_dir_all(&section_dir)
        .map_err(|e| GalleryError::io_at("create directory", &section_dir, &e))?;

    info!(notebook = %clean, section = %section, "Converting tutorial");

    // Decoded up front so a notebook without a usable figure leaves no page.
    let thumbnail = Thumbnail::from_notebook(&found.notebook, &found.path)?;

    let page = converter.convert(&found.path, &section_dir, &clean).await?;
    let thumb = match thumbnail.write(&section_dir.join(&clean)) {
        Ok(path) => path,
        Err(e) => {
            if let Err(remove) = fs::remove_file(&page) {
                warn!(page = %page.display(), error = %remove, "failed to remove page");
            }
            return Err(e);
        }
    };

    debug!(page = %page.display(), thumbnail = %thumb.display(), "converted");

    Ok((
        section,
        ManifestEntry {
            notebook: clean,
            link_name,
        },
    ))
}

// Section names become directories under the output root.
fn is_plain_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
