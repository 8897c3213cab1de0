//! Configuration module
//!
//! Handles loading and validation of the `nbgallery` configuration file
//! and the command-line overrides layered on top of it.

pub mod loader;

pub use loader::{ConfigOverrides, DEFAULT_CONFIG_FILE, GalleryConfig};
