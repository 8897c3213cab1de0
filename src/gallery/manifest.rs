//! Gallery manifest (`gallery.json`) and the static index page.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{GalleryError, Result};

/// File name of the generated manifest.
pub const MANIFEST_FILE: &str = "gallery.json";

/// File name of the static index page.
pub const INDEX_FILE: &str = "index.html";

/// One notebook listed on the index page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Clean base name; the page is `<section>/<notebook>.html`.
    pub notebook: String,
    /// Link text.
    pub link_name: String,
}

/// Sections and entries for the gallery index.
///
/// Sections keep the order they were first seen in; entries keep the
/// order they were pushed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryManifest {
    /// Tool name → version stamp.
    pub meta: IndexMap<String, String>,
    /// Section name → entries.
    pub sections: IndexMap<String, Vec<ManifestEntry>>,
}

impl GalleryManifest {
    /// Creates an empty manifest stamped with one tool version.
    #[must_use]
    pub fn new(tool_name: &str, tool_version: &str) -> Self {
        let mut meta = IndexMap::new();
        meta.insert(tool_name.to_string(), tool_version.to_string());
        Self {
            meta,
            sections: IndexMap::new(),
        }
    }

    /// Appends an entry, creating the section on first use.
    pub fn push(&mut self, section: &str, entry: ManifestEntry) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .push(entry);
    }

    /// Total number of entries across sections.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.sections.values().map(Vec::len).sum()
    }

    /// Serializes the manifest to compact JSON.
    ///
    /// # Errors
    ///
    /// Returns `GalleryError::Json` if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Writes `index.html` (template verbatim) and `gallery.json` into
/// `output_dir`, replacing any previous files.
///
/// # Errors
///
/// Returns an I/O error if either file cannot be written.
pub fn write_outputs(output_dir: &Path, index_template: &str, manifest: &GalleryManifest) -> Result<()> {
    fs::create_dir_all(output_dir)
        .map_err(|e| GalleryError::io_at("create directory", output_dir, &e))?;

    let index_path = output_dir.join(INDEX_FILE);
    fs::write(&index_path, index_template)
        .map_err(|e| GalleryError::io_at("write", &index_path, &e))?;

    let manifest_path = output_dir.join(MANIFEST_FILE);
    fs::write(&manifest_path, manifest.to_json()?)
        .map_err(|e| GalleryError::io_at("write", &manifest_path, &e))?;

    info!(
        sections = manifest.sections.len(),
        entries = manifest.entry_count(),
        manifest = %manifest_path.display(),
        "wrote gallery index"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(notebook: &str, link: &str) -> ManifestEntry {
        ManifestEntry {
            notebook: notebook.to_string(),
            link_name: link.to_string(),
        }
    }

    #[test]
    fn test_json_shape() {
        let mut manifest = GalleryManifest::new("sunpy", "6.0.1");
        manifest.push("Intro", entry("a", "A Demo"));
        let value: serde_json::Value = serde_json::from_str(&manifest.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "meta": {"sunpy": "6.0.1"},
                "sections": {"Intro": [{"notebook": "a", "link_name": "A Demo"}]}
            })
        );
    }

    #[test]
    fn test_same_section_accumulates() {
        let mut manifest = GalleryManifest::new("sunpy", "dev");
        manifest.push("Intro", entry("a", "A"));
        manifest.push("Maps", entry("m", "M"));
        manifest.push("Intro", entry("b", "B"));

        assert_eq!(manifest.sections.len(), 2);
        assert_eq!(manifest.sections["Intro"], vec![entry("a", "A"), entry("b", "B")]);
        assert_eq!(manifest.entry_count(), 3);
    }

    #[test]
    fn test_sections_keep_first_seen_order() {
        let mut manifest = GalleryManifest::new("sunpy", "dev");
        manifest.push("Zebra", entry("z", "Z"));
        manifest.push("Alpha", entry("a", "A"));
        let json = manifest.to_json().unwrap();
        assert!(json.find("Zebra").unwrap() < json.find("Alpha").unwrap());
    }

    #[test]
    fn test_write_outputs_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("html");
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join(MANIFEST_FILE), "stale").unwrap();

        let manifest = GalleryManifest::new("sunpy", "dev");
        write_outputs(&out, "<html>index</html>", &manifest).unwrap();

        assert_eq!(fs::read_to_string(out.join(INDEX_FILE)).unwrap(), "<html>index</html>");
        let written: GalleryManifest =
            serde_json::from_str(&fs::read_to_string(out.join(MANIFEST_FILE)).unwrap()).unwrap();
        assert_eq!(written, manifest);
    }
}
