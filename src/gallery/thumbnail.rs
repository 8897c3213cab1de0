//! Thumbnail extraction from embedded notebook image outputs.
//!
//! The thumbnail is the last PNG or JPEG output in document order, written
//! byte-for-byte at its original size.

use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;
use tracing::debug;

use crate::error::{GalleryError, Result};
use crate::notebook::Notebook;

/// Image formats accepted as thumbnails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// `image/png`
    Png,
    /// `image/jpeg`
    Jpeg,
}

impl ImageFormat {
    /// MIME types in the order they are tried within one output.
    const PREFERENCE: [Self; 2] = [Self::Png, Self::Jpeg];

    /// MIME type key in an output's data bundle.
    #[must_use]
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// File extension used for the written thumbnail.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }
}

/// Finds the last embedded image in the notebook.
///
/// Cells and outputs are walked in document order. Inside a single output
/// bundle PNG wins over JPEG. Payloads that are not base64 text (a string
/// or a list of strings) are passed over.
#[must_use]
pub fn find_last_image(notebook: &Notebook) -> Option<(ImageFormat, &Value)> {
    notebook
        .cells
        .iter()
        .flat_map(|cell| cell.outputs.iter().flatten())
        .filter_map(|output| {
            let data = output.data.as_ref()?;
            ImageFormat::PREFERENCE
                .into_iter()
                .find_map(|format| {
                    data.get(format.mime())
                        .filter(|payload| is_text_payload(payload))
                        .map(|payload| (format, payload))
                })
        })
        .last()
}

/// Decodes a base64 image payload.
///
/// nbformat allows the payload as one string or as a list of line strings;
/// embedded whitespace and newlines are ignored.
///
/// # Errors
///
/// Returns the decoding error for malformed base64.
pub fn decode_payload(payload: &Value) -> std::result::Result<Vec<u8>, base64::DecodeError> {
    let mut joined = String::new();
    match payload {
        Value::String(s) => joined.push_str(s),
        Value::Array(lines) => {
            for line in lines.iter().filter_map(Value::as_str) {
                joined.push_str(line);
            }
        }
        _ => {}
    }
    joined.retain(|c| !c.is_ascii_whitespace());
    STANDARD.decode(joined)
}

fn is_text_payload(payload: &Value) -> bool {
    match payload {
        Value::String(_) => true,
        Value::Array(lines) => lines.iter().all(Value::is_string),
        _ => false,
    }
}

/// A decoded thumbnail image, ready to be written next to its page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    /// Image format, which picks the file extension.
    pub format: ImageFormat,
    /// Raw image bytes.
    pub bytes: Vec<u8>,
}

impl Thumbnail {
    /// Decodes the notebook's last embedded image.
    ///
    /// `source` names the notebook in error messages.
    ///
    /// # Errors
    ///
    /// Returns `GalleryError::NoThumbnail` if the notebook embeds no image
    /// or the image is empty, and `GalleryError::InvalidImage` if the
    /// payload is not base64.
    pub fn from_notebook(notebook: &Notebook, source: &Path) -> Result<Self> {
        let no_thumbnail = || GalleryError::NoThumbnail {
            path: source.to_path_buf(),
        };

        let (format, payload) = find_last_image(notebook).ok_or_else(no_thumbnail)?;
        let bytes = decode_payload(payload).map_err(|e| GalleryError::InvalidImage {
            path: source.to_path_buf(),
            source: e,
        })?;
        if bytes.is_empty() {
            return Err(no_thumbnail());
        }

        Ok(Self { format, bytes })
    }

    /// Writes the image to `<target_base>.<ext>` and returns that path.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be written.
    pub fn write(&self, target_base: &Path) -> Result<PathBuf> {
        let target = with_extension(target_base, self.format.extension());
        fs::write(&target, &self.bytes).map_err(|e| GalleryError::io_at("write", &target, &e))?;

        debug!(
            thumbnail = %target.display(),
            format = self.format.mime(),
            bytes = self.bytes.len(),
            "wrote thumbnail"
        );
        Ok(target)
    }
}

// `Path::with_extension` would clobber dotted names like `intro.v2`.
fn with_extension(base: &Path, ext: &str) -> PathBuf {
    let mut name = base.as_os_str().to_os_string();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}
