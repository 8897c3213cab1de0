//! Error types for `nbgallery`
//!
//! A single error hierarchy covering setup, discovery, execution and
//! conversion failures, each mapped to a process exit code.

use std::path::{Path, PathBuf};
use thiserror::Error;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `nbgallery` CLI operations.
///
/// These codes follow Unix conventions.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error (one or more notebooks failed in a batch)
    pub const ERROR: i32 = 1;

    /// Configuration error (invalid YAML, malformed notebook)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (missing gallery directory, missing template)
    pub const IO_ERROR: i32 = 3;

    /// Precondition error (convert requested before run)
    pub const PRECONDITION_ERROR: i32 = 4;

    /// External collaborator error (jupyter/python failed or missing)
    pub const COLLABORATOR_ERROR: i32 = 5;

    /// Usage error (invalid arguments such as a bad name pattern)
    pub const USAGE_ERROR: i32 = 64;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;

    /// Terminated by SIGTERM
    pub const TERMINATED: i32 = 143;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `nbgallery` operations.
#[derive(Debug, Error)]
pub enum GalleryError {
    /// Configuration loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The gallery root does not exist or is not a directory
    #[error(
        "can't find gallery directory {path}; run from the top-level gallery checkout or pass --gallery-dir"
    )]
    MissingGalleryDir {
        /// Path that was expected to hold the tutorials
        path: PathBuf,
    },

    /// The index template could not be read at startup
    #[error("failed to read index template {path}: {source}")]
    MissingTemplate {
        /// Path to the template file
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The `--nameregex` pattern is not a valid regular expression
    #[error("invalid name pattern '{pattern}': {source}")]
    InvalidPattern {
        /// Pattern as given on the command line
        pattern: String,
        /// Regex compilation error
        source: regex::Error,
    },

    /// A notebook file is not valid notebook JSON
    #[error("failed to parse notebook {path}: {source}")]
    NotebookParse {
        /// Path to the notebook
        path: PathBuf,
        /// JSON error
        source: serde_json::Error,
    },

    /// The gallery metadata block of a notebook has the wrong shape
    #[error("invalid gallery metadata in {path}: {message}")]
    InvalidMetadata {
        /// Path to the notebook
        path: PathBuf,
        /// What was wrong
        message: String,
    },

    /// A published notebook has no `link_name`
    #[error("notebook {path} has no link_name in its gallery metadata")]
    MissingLinkName {
        /// Path to the notebook
        path: PathBuf,
    },

    /// `convert` was requested for notebooks that have no executed copy
    #[error(
        "{} notebook(s) have not been executed yet (first: {}); run the 'run' action before 'convert'",
        .paths.len(),
        first_path(.paths)
    )]
    NotExecuted {
        /// Original notebooks missing their executed copy
        paths: Vec<PathBuf>,
    },

    /// No usable embedded PNG or JPEG output was found for the thumbnail
    #[error("no usable image output found in {path} for a thumbnail")]
    NoThumbnail {
        /// Path to the notebook
        path: PathBuf,
    },

    /// An embedded image output is not valid base64
    #[error("invalid embedded image in {path}: {source}")]
    InvalidImage {
        /// Path to the notebook
        path: PathBuf,
        /// Decoding error
        source: base64::DecodeError,
    },

    /// An external program could not be started
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        /// Program name
        program: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// An external program exited unsuccessfully
    #[error("'{program}' exited with {}: {stderr}", describe_code(.code))]
    Collaborator {
        /// Program name
        program: String,
        /// Exit code, if the process was not killed by a signal
        code: Option<i32>,
        /// Captured standard error
        stderr: String,
    },

    /// One or more notebooks failed to execute
    #[error("{failed} notebook(s) failed to execute")]
    ExecutionFailed {
        /// Number of failed notebooks
        failed: usize,
    },

    /// One or more notebooks failed to convert
    #[error("{failed} notebook(s) failed to convert")]
    ConversionFailed {
        /// Number of failed notebooks
        failed: usize,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GalleryError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_)
            | Self::NotebookParse { .. }
            | Self::InvalidMetadata { .. }
            | Self::Json(_) => ExitCode::CONFIG_ERROR,
            Self::MissingGalleryDir { .. } | Self::MissingTemplate { .. } | Self::Io(_) => {
                ExitCode::IO_ERROR
            }
            Self::NotExecuted { .. } => ExitCode::PRECONDITION_ERROR,
            Self::Spawn { .. } | Self::Collaborator { .. } => ExitCode::COLLABORATOR_ERROR,
            Self::InvalidPattern { .. } => ExitCode::USAGE_ERROR,
            Self::MissingLinkName { .. }
            | Self::NoThumbnail { .. }
            | Self::InvalidImage { .. }
            | Self::ExecutionFailed { .. }
            | Self::ConversionFailed { .. } => ExitCode::ERROR,
        }
    }

    /// Wraps an I/O error with the path and the operation that failed.
    #[must_use]
    pub fn io_at(action: &str, path: &Path, err: &std::io::Error) -> Self {
        Self::Io(std::io::Error::new(
            err.kind(),
            format!("failed to {action} {}: {err}", path.display()),
        ))
    }
}

fn first_path(paths: &[PathBuf]) -> String {
    paths
        .first()
        .map_or_else(|| "<none>".to_string(), |p| p.display().to_string())
}

#[allow(clippy::ref_option)]
fn describe_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "signal".to_string(), |c| format!("status {c}"))
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed
    #[error("parse error in {path}: {message}")]
    ParseError {
        /// Path to the configuration file
        path: PathBuf,
        /// Error message from the parser
        message: String,
    },

    /// Explicitly requested configuration file not found
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Field has an invalid value
    #[error("invalid value for '{field}': got '{value}', expected {expected}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The actual value provided
        value: String,
        /// Description of what was expected
        expected: String,
    },
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Result type alias for `nbgallery` operations.
pub type Result<T> = std::result::Result<T, GalleryError>;

// ============================================================================
// Tests
// ============================================================================
