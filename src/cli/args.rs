//! CLI argument definitions
//!
//! Clap derive structs for `nbgallery` command-line parsing.

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

use crate::config::ConfigOverrides;

// ============================================================================
// Root CLI
// ============================================================================

/// Prepare the notebook tutorials for deployment.
#[derive(Parser, Debug)]
#[command(name = "nbgallery", author, version, about)]
pub struct Cli {
    /// Action(s) to take, in order. "run" executes the notebooks;
    /// "convert" turns the executed notebooks into HTML pages.
    #[arg(required = true, value_enum)]
    pub actions: Vec<Action>,

    /// Regular expression selecting the notebooks to process, matched
    /// against the start of the file name. All notebooks if not given.
    #[arg(short = 'n', long = "nameregex", value_name = "PATTERN")]
    pub nameregex: Option<String>,

    /// Be chatty (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Be quiet: errors only.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to a YAML configuration file.
    #[arg(short, long, env = "NBGALLERY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding one subdirectory per tutorial.
    #[arg(long, env = "NBGALLERY_GALLERY_DIR")]
    pub gallery_dir: Option<PathBuf>,

    /// Directory receiving the generated site.
    #[arg(long, env = "NBGALLERY_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Directory holding the index and nbconvert templates.
    #[arg(long, env = "NBGALLERY_TEMPLATES_DIR")]
    pub templates_dir: Option<PathBuf>,

    /// Version stamped into the manifest instead of probing Python.
    #[arg(long, env = "NBGALLERY_TOOL_VERSION")]
    pub tool_version: Option<String>,

    /// Log output format.
    #[arg(long, default_value = "human")]
    pub log_format: LogFormat,

    /// Color output control.
    #[arg(long, default_value = "auto", env = "NBGALLERY_COLOR")]
    pub color: ColorChoice,
}

impl Cli {
    /// Config values given on the command line.
    #[must_use]
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            gallery_dir: self.gallery_dir.clone(),
            output_dir: self.output_dir.clone(),
            templates_dir: self.templates_dir.clone(),
            tool_version: self.tool_version.clone(),
        }
    }
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// A pipeline action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Action {
    /// Execute published notebooks into executed copies.
    Run,
    /// Convert executed copies to HTML and write the index.
    Convert,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with optional ANSI colors.
    #[default]
    Human,
    /// Newline-delimited JSON for machine consumption.
    Json,
}

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}
