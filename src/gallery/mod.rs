//! Gallery build pipeline.
//!
//! `discovery` finds notebooks, `execute` produces executed copies,
//! `convert` renders pages and thumbnails into the manifest, and
//! `manifest` writes the index outputs. [`Gallery`] carries the resolved
//! configuration and startup-loaded resources through every stage.

pub mod convert;
pub mod discovery;
pub mod execute;
pub mod manifest;
pub mod thumbnail;
pub mod workdir;

use std::fs;

use crate::config::GalleryConfig;
use crate::error::{GalleryError, Result};

use discovery::{DiscoveryOptions, compile_name_pattern};

pub use convert::{ConversionReport, convert_notebooks};
pub use execute::{RunSummary, run_notebooks};
pub use manifest::{GalleryManifest, ManifestEntry};
pub use workdir::WorkdirGuard;

/// Everything a pipeline stage needs, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Gallery {
    /// Configuration with absolute directories.
    pub config: GalleryConfig,
    /// Contents of the index page template.
    pub index_template: String,
    /// Optional `--nameregex` filter.
    pub name_pattern: Option<String>,
}

impl Gallery {
    /// Loads startup resources and validates the name pattern.
    ///
    /// # Errors
    ///
    /// Returns `GalleryError::MissingTemplate` if the index template cannot
    /// be read, or `GalleryError::InvalidPattern` for a bad pattern.
    pub fn open(config: GalleryConfig, name_pattern: Option<String>) -> Result<Self> {
        if let Some(pattern) = &name_pattern {
            compile_name_pattern("", pattern)?;
        }

        let template_path = config.index_template_path();
        let index_template = fs::read_to_string(&template_path).map_err(|source| {
            GalleryError::MissingTemplate {
                path: template_path.clone(),
                source,
            }
        })?;

        Ok(Self {
            config,
            index_template,
            name_pattern,
        })
    }

    /// Discovery options for original (not yet executed) notebooks.
    ///
    /// # Errors
    ///
    /// Returns `GalleryError::InvalidPattern` for a bad pattern.
    pub fn source_discovery(&self) -> Result<DiscoveryOptions> {
        self.discovery_with_prefix("")
    }

    /// Discovery options restricted to executed copies.
    ///
    /// # Errors
    ///
    /// Returns `GalleryError::InvalidPattern` for a bad pattern.
    pub fn executed_discovery(&self) -> Result<DiscoveryOptions> {
        self.discovery_with_prefix(&self.config.run_prefix)
    }

    fn discovery_with_prefix(&self, prefix: &str) -> Result<DiscoveryOptions> {
        let name_pattern = match (&self.name_pattern, prefix.is_empty()) {
            (Some(pattern), _) => Some(compile_name_pattern(prefix, pattern)?),
            (None, false) => Some(compile_name_pattern(prefix, "")?),
            (None, true) => None,
        };

        Ok(DiscoveryOptions {
            only_published: true,
            name_pattern,
            namespace: self.config.metadata_namespace.clone(),
        })
    }

    /// Strips the run prefix from an executed copy's stem.
    ///
    /// The prefix is removed once, exactly; names that do not carry it are
    /// returned unchanged.
    #[must_use]
    pub fn clean_base_name<'a>(&self, stem: &'a str) -> &'a str {
        stem.strip_prefix(self.config.run_prefix.as_str())
            .unwrap_or(stem)
    }

    /// File name of the executed copy of `file_name`.
    #[must_use]
    pub fn executed_name(&self, file_name: &str) -> String {
        format!("{}{file_name}", self.config.run_prefix)
    }

    /// Whether `file_name` is an executed copy.
    #[must_use]
    pub fn is_executed_name(&self, file_name: &str) -> bool {
        file_name.starts_with(self.config.run_prefix.as_str())
    }
}
