//! Notebook document model.
//!
//! A typed view over nbformat-4 JSON. Only the fields the gallery reads are
//! typed; everything else is carried through `rest` so that an executed
//! notebook written back to disk loses nothing.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{GalleryError, Result};

/// File extension of notebook documents (compared case-insensitively).
pub const NOTEBOOK_EXTENSION: &str = "ipynb";

/// A parsed notebook document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notebook {
    /// Ordered cells.
    #[serde(default)]
    pub cells: Vec<Cell>,

    /// Notebook-level metadata, including the gallery namespace.
    #[serde(default)]
    pub metadata: Map<String, Value>,

    /// Major format version.
    #[serde(default = "default_nbformat")]
    pub nbformat: u32,

    /// Minor format version.
    #[serde(default)]
    pub nbformat_minor: u32,

    /// Any other top-level keys.
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

const fn default_nbformat() -> u32 {
    4
}

/// A single notebook cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// `code`, `markdown` or `raw`.
    pub cell_type: String,

    /// Outputs of a code cell; absent for markdown and raw cells.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<Output>>,

    /// Source, metadata, execution count and anything else.
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// A single output of a code cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Output {
    /// `stream`, `display_data`, `execute_result` or `error`.
    pub output_type: String,

    /// MIME bundle of rich outputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,

    /// Exception name for `error` outputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ename: Option<String>,

    /// Exception value for `error` outputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evalue: Option<String>,

    /// Any other output keys.
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// Gallery fields read from the notebook's metadata namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GalleryMetadata {
    /// Whether the notebook appears in the published gallery.
    #[serde(default)]
    pub published: bool,

    /// Section the notebook is listed under.
    #[serde(default)]
    pub section_name: Option<String>,

    /// Link text on the index page.
    #[serde(default)]
    pub link_name: Option<String>,
}

impl GalleryMetadata {
    /// Section name, falling back to `default_section`.
    #[must_use]
    pub fn section_or<'a>(&'a self, default_section: &'a str) -> &'a str {
        self.section_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(default_section)
    }
}

/// A cell that raised during execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellError {
    /// Zero-based cell index.
    pub cell: usize,
    /// Exception class name.
    pub ename: String,
    /// Exception message.
    pub evalue: String,
}

impl Notebook {
    /// Parses a notebook from JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns `GalleryError::NotebookParse` if the bytes are not a notebook.
    pub fn from_slice(bytes: &[u8], path: &Path) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|source| GalleryError::NotebookParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads and parses a notebook file.
    ///
    /// # Errors
    ///
    /// Returns `GalleryError::Io` if the file cannot be read, or
    /// `GalleryError::NotebookParse` if it is not a notebook.
    pub fn read(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| GalleryError::io_at("read", path, &e))?;
        Self::from_slice(&bytes, path)
    }

    /// Writes the notebook as nbformat-style JSON (one-space indent,
    /// trailing newline).
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn write(&self, path: &Path) -> Result<()> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        buf.push(b'\n');
        fs::write(path, buf).map_err(|e| GalleryError::io_at("write", path, &e))
    }

    /// Extracts the gallery metadata block.
    ///
    /// Returns `Ok(None)` when the namespace is absent.
    ///
    /// # Errors
    ///
    /// Returns `GalleryError::InvalidMetadata` if the block exists but has
    /// the wrong shape (e.g. `published: "yes"`).
    pub fn gallery_metadata(&self, namespace: &str, path: &Path) -> Result<Option<GalleryMetadata>> {
        let Some(block) = self.metadata.get(namespace) else {
            return Ok(None);
        };

        GalleryMetadata::deserialize(block)
            .map(Some)
            .map_err(|e| GalleryError::InvalidMetadata {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
    }

    /// Reads only the `published` flag of the gallery metadata block.
    ///
    /// A missing namespace or a missing flag means unpublished. Other keys
    /// in the block are not looked at, so a draft with a half-written
    /// `section_name` is still just a draft.
    ///
    /// # Errors
    ///
    /// Returns `GalleryError::InvalidMetadata` if the block is not a mapping
    /// or `published` is not a boolean.
    pub fn is_published(&self, namespace: &str, path: &Path) -> Result<bool> {
        let invalid = |message: &str| GalleryError::InvalidMetadata {
            path: path.to_path_buf(),
            message: message.to_string(),
        };

        match self.metadata.get(namespace) {
            None => Ok(false),
            Some(Value::Object(block)) => match block.get("published") {
                None | Some(Value::Null) => Ok(false),
                Some(Value::Bool(flag)) => Ok(*flag),
                Some(_) => Err(invalid("'published' must be true or false")),
            },
            Some(_) => Err(invalid("gallery metadata must be a mapping")),
        }
    }

    /// Lists every `error` output, in document order.
    #[must_use]
    pub fn cell_errors(&self) -> Vec<CellError> {
        self.cells
            .iter()
            .enumerate()
            .flat_map(|(index, cell)| {
                cell.outputs
                    .iter()
                    .flatten()
                    .filter(|o| o.output_type == "error")
                    .map(move |o| CellError {
                        cell: index,
                        ename: o.ename.clone().unwrap_or_default(),
                        evalue: o.evalue.clone().unwrap_or_default(),
                    })
            })
            .collect()
    }
}
