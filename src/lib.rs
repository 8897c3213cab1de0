//! `nbgallery` - build a static gallery from Jupyter notebook tutorials
//!
//! Discovers published notebooks under `gallery/<tutorial>/`, executes them
//! into `_run_` copies, converts the executed copies to HTML pages with
//! thumbnails, and writes `index.html` plus a `gallery.json` manifest.

pub mod cli;
pub mod config;
pub mod error;
pub mod gallery;
pub mod jupyter;
pub mod notebook;
pub mod observability;
