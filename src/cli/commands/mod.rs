//! CLI command dispatch and handlers
//!
//! Loads startup resources once, then runs the requested actions in order.

pub mod convert;
pub mod run;

use std::path::Path;

use tracing::debug;

use crate::cli::args::{Action, Cli};
use crate::config::GalleryConfig;
use crate::error::GalleryError;
use crate::gallery::Gallery;

/// Dispatch a parsed CLI invocation.
///
/// Configuration and the index template are loaded before the first
/// action, so a missing template fails even a `run`-only invocation.
///
/// # Errors
///
/// Returns the first error from setup or from an action; later actions
/// are not run.
pub async fn dispatch(cli: Cli) -> Result<(), GalleryError> {
    let cwd = std::env::current_dir()?;
    let gallery = open_gallery(&cli, &cwd)?;

    for action in &cli.actions {
        debug!(?action, "starting action");
        match action {
            Action::Run => run::run(&gallery).await?,
            Action::Convert => convert::run(&gallery).await?,
        }
    }

    Ok(())
}

/// Builds the [`Gallery`] context from CLI arguments, resolving relative
/// paths against `base`.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the index template is
/// missing, or the name pattern does not compile.
pub fn open_gallery(cli: &Cli, base: &Path) -> Result<Gallery, GalleryError> {
    let config = GalleryConfig::load(cli.config.as_deref(), base)?
        .with_overrides(cli.overrides())
        .resolved_against(base);
    config.validate()?;

    Gallery::open(config, cli.nameregex.clone())
}
