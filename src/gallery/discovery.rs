//! Gallery discovery.
//!
//! Walks `<gallery>/<tutorial>/<file>.ipynb`, one level deep, and yields
//! the notebooks that pass the publication and name filters. Directory
//! listings are sorted so the manifest order is stable across platforms.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::trace;

use crate::error::{GalleryError, Result};
use crate::notebook::{GalleryMetadata, NOTEBOOK_EXTENSION, Notebook};

/// Base-name marker of Jupyter autosave artifacts.
pub const CHECKPOINT_MARKER: &str = "checkpoint";

/// Filters applied while walking the gallery.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Skip notebooks whose metadata does not set `published: true`.
    pub only_published: bool,
    /// Anchored pattern the file stem must match.
    pub name_pattern: Option<Regex>,
    /// Metadata key holding the gallery fields.
    pub namespace: String,
}

/// A notebook that passed every filter.
#[derive(Debug, Clone)]
pub struct DiscoveredNotebook {
    /// Full path of the notebook file.
    pub path: PathBuf,
    /// Parsed document.
    pub notebook: Notebook,
    /// Gallery metadata (defaults when the namespace is absent).
    pub metadata: GalleryMetadata,
}

impl DiscoveredNotebook {
    /// File name including extension.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.path.file_name().and_then(|n| n.to_str()).unwrap_or_default()
    }

    /// File name without extension.
    #[must_use]
    pub fn stem(&self) -> &str {
        self.path.file_stem().and_then(|n| n.to_str()).unwrap_or_default()
    }

    /// Directory containing the notebook.
    #[must_use]
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }
}

/// Compiles a user pattern so it only matches at the start of a name.
///
/// `prefix` is matched literally ahead of the pattern. Patterns are
/// anchored already, so one leading `^` written by the user is dropped;
/// `^map` and `map` select the same notebooks.
///
/// # Errors
///
/// Returns `GalleryError::InvalidPattern` if `pattern` is not a valid regex.
pub fn compile_name_pattern(prefix: &str, pattern: &str) -> Result<Regex> {
    let body = pattern.strip_prefix('^').unwrap_or(pattern);
    Regex::new(&format!("^{}(?:{body})", regex::escape(prefix))).map_err(|source| {
        GalleryError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        }
    })
}

/// Lazy iterator over the gallery's notebooks.
///
/// Notebook files are read and parsed only as the iterator advances.
/// A read or parse failure is yielded as an `Err` item and the walk can
/// continue past it.
#[derive(Debug)]
pub struct GalleryWalker {
    options: DiscoveryOptions,
    tutorials: std::vec::IntoIter<PathBuf>,
    pending: std::vec::IntoIter<PathBuf>,
}

impl GalleryWalker {
    /// Opens the gallery root.
    ///
    /// # Errors
    ///
    /// Returns `GalleryError::MissingGalleryDir` if `root` is not a
    /// directory, or an I/O error if it cannot be listed.
    pub fn new(root: &Path, options: DiscoveryOptions) -> Result<Self> {
        if !root.is_dir() {
            return Err(GalleryError::MissingGalleryDir {
                path: root.to_path_buf(),
            });
        }

        let tutorials: Vec<PathBuf> = sorted_entries(root)?
            .into_iter()
            .filter(|p| p.is_dir())
            .collect();

        Ok(Self {
            options,
            tutorials: tutorials.into_iter(),
            pending: Vec::new().into_iter(),
        })
    }

    fn load(&self, path: &Path) -> Result<Option<DiscoveredNotebook>> {
        let notebook = Notebook::read(path)?;
        let namespace = &self.options.namespace;

        // Drafts are skipped on the flag alone; the rest of their block is
        // not validated.
        if self.options.only_published && !notebook.is_published(namespace, path)? {
            trace!(path = %path.display(), "skipping unpublished notebook");
            return Ok(None);
        }

        let metadata = notebook
            .gallery_metadata(namespace, path)?
            .unwrap_or_default();

        Ok(Some(DiscoveredNotebook {
            path: path.to_path_buf(),
            notebook,
            metadata,
        }))
    }
}

impl Iterator for GalleryWalker {
    type Item = Result<DiscoveredNotebook>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(file) = self.pending.next() {
                match self.load(&file) {
                    Ok(Some(found)) => return Some(Ok(found)),
                    Ok(None) => continue,
                    Err(e) => return Some(Err(e)),
                }
            }

            let tutorial = self.tutorials.next()?;
            match candidate_files(&tutorial, self.options.name_pattern.as_ref()) {
                Ok(files) => self.pending = files.into_iter(),
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Notebook files in one tutorial directory that pass the name filters.
fn candidate_files(dir: &Path, pattern: Option<&Regex>) -> Result<Vec<PathBuf>> {
    Ok(sorted_entries(dir)?
        .into_iter()
        .filter(|p| p.is_file() && is_candidate(p, pattern))
        .collect())
}

/// Name-only checks: extension, checkpoint marker, pattern.
#[must_use]
pub fn is_candidate(path: &Path, pattern: Option<&Regex>) -> bool {
    let has_ext = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(NOTEBOOK_EXTENSION));
    if !has_ext {
        return false;
    }

    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        return false;
    };

    if stem.contains(CHECKPOINT_MARKER) {
        return false;
    }

    pattern.is_none_or(|re| re.is_match(stem))
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)
        .map_err(|e| GalleryError::io_at("list", dir, &e))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| GalleryError::io_at("list", dir, &e))?;
    entries.sort();
    Ok(entries)
}
