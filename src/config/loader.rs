//! Configuration loader
//!
//! Loading happens in four steps:
//! 1. Read the YAML file (explicit `--config`, or `nbgallery.yaml` if present)
//! 2. Deserialize into `GalleryConfig`, filling defaults for absent keys
//! 3. Apply command-line and environment overrides
//! 4. Validate

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "nbgallery.yaml";

// ============================================================================
// Public API
// ============================================================================

/// Runtime settings for a gallery build.
///
/// Every key is optional in the YAML file; absent keys take the defaults
/// of the sunpy gallery layout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Root directory holding one subdirectory per tutorial.
    pub gallery_dir: PathBuf,

    /// Root directory for generated HTML, thumbnails and the manifest.
    pub output_dir: PathBuf,

    /// Directory holding the index template and nbconvert templates.
    pub templates_dir: PathBuf,

    /// File name of the static index page template inside `templates_dir`.
    pub index_template: String,

    /// Name of the nbconvert HTML template.
    pub html_template: String,

    /// Notebook metadata key under which gallery fields live.
    pub metadata_namespace: String,

    /// File name prefix marking an executed copy.
    pub run_prefix: String,

    /// Section used when a notebook sets no `section_name`.
    pub default_section: String,

    /// Jupyter launcher used for execution and conversion.
    pub jupyter: String,

    /// Python interpreter used to probe the tool version.
    pub python: String,

    /// Kernel to execute notebooks with; the notebook's own kernel if unset.
    pub kernel_name: Option<String>,

    /// Key stamped into the manifest `meta` block.
    pub tool_name: String,

    /// Version stamped into the manifest; probed from `python` if unset.
    pub tool_version: Option<String>,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            gallery_dir: PathBuf::from("gallery"),
            output_dir: PathBuf::from("html"),
            templates_dir: PathBuf::from("templates"),
            index_template: "index_template.html".to_string(),
            html_template: "sunpy".to_string(),
            metadata_namespace: "sunpy-gallery".to_string(),
            run_prefix: "_run_".to_string(),
            default_section: "Examples".to_string(),
            jupyter: "jupyter".to_string(),
            python: "python".to_string(),
            kernel_name: None,
            tool_name: "sunpy".to_string(),
            tool_version: None,
        }
    }
}

/// Values from the command line (or their environment variables) that
/// take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Overrides `gallery_dir`.
    pub gallery_dir: Option<PathBuf>,
    /// Overrides `output_dir`.
    pub output_dir: Option<PathBuf>,
    /// Overrides `templates_dir`.
    pub templates_dir: Option<PathBuf>,
    /// Overrides `tool_version`.
    pub tool_version: Option<String>,
}

impl GalleryConfig {
    /// Loads the configuration.
    ///
    /// With `path` set the file must exist. Without it, `nbgallery.yaml`
    /// inside `base` is used when present and defaults otherwise.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingFile` if an explicit file is absent,
    /// `ConfigError::ParseError` if the YAML is malformed or has unknown keys,
    /// and `ConfigError::InvalidValue` if validation fails.
    pub fn load(path: Option<&Path>, base: &Path) -> Result<Self, ConfigError> {
        let config = match path {
            Some(explicit) => {
                if !explicit.is_file() {
                    return Err(ConfigError::MissingFile {
                        path: explicit.to_path_buf(),
                    });
                }
                Self::from_file(explicit)?
            }
            None => {
                let implicit = base.join(DEFAULT_CONFIG_FILE);
                if implicit.is_file() {
                    Self::from_file(&implicit)?
                } else {
                    Self::default()
                }
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Parses a configuration from YAML text.
    ///
    /// An empty document yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ParseError` if the YAML is malformed.
    pub fn from_yaml_str(yaml: &str, source: &Path) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError {
            path: source.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_yaml_str(&yaml, path)
    }

    /// Applies command-line overrides.
    #[must_use]
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(dir) = overrides.gallery_dir {
            self.gallery_dir = dir;
        }
        if let Some(dir) = overrides.output_dir {
            self.output_dir = dir;
        }
        if let Some(dir) = overrides.templates_dir {
            self.templates_dir = dir;
        }
        if overrides.tool_version.is_some() {
            self.tool_version = overrides.tool_version;
        }
        self
    }

    /// Makes every directory absolute relative to `base`.
    ///
    /// Execution changes the process working directory, so paths are
    /// pinned before any notebook runs.
    #[must_use]
    pub fn resolved_against(mut self, base: &Path) -> Self {
        self.gallery_dir = base.join(&self.gallery_dir);
        self.output_dir = base.join(&self.output_dir);
        self.templates_dir = base.join(&self.templates_dir);
        self
    }

    /// Full path of the index page template.
    #[must_use]
    pub fn index_template_path(&self) -> PathBuf {
        self.templates_dir.join(&self.index_template)
    }

    /// Checks field values that would otherwise fail much later.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("run_prefix", &self.run_prefix),
            ("metadata_namespace", &self.metadata_namespace),
            ("index_template", &self.index_template),
            ("html_template", &self.html_template),
            ("default_section", &self.default_section),
            ("jupyter", &self.jupyter),
            ("python", &self.python),
            ("tool_name", &self.tool_name),
        ];

        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    value: value.clone(),
                    expected: "a non-empty string".to_string(),
                });
            }
        }

        if self.run_prefix.contains(['/', '\\']) {
            return Err(ConfigError::InvalidValue {
                field: "run_prefix".to_string(),
                value: self.run_prefix.clone(),
                expected: "a file name prefix without path separators".to_string(),
            });
        }

        if self.default_section.contains(['/', '\\']) {
            return Err(ConfigError::InvalidValue {
                field: "default_section".to_string(),
                value: self.default_section.clone(),
                expected: "a section name without path separators".to_string(),
            });
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
