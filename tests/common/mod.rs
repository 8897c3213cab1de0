//! Shared integration-test harness: temporary gallery fixtures, fake
//! Jupyter collaborators, and a helper for spawning the `nbgallery` binary.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Value, json};
use tempfile::TempDir;

use nbgallery::config::GalleryConfig;
use nbgallery::error::{GalleryError, Result};
use nbgallery::gallery::Gallery;
use nbgallery::jupyter::{HtmlConverter, NotebookExecutor};
use nbgallery::notebook::Notebook;

/// Bytes of the PNG the fake executor embeds.
pub const FAKE_PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake-figure";

/// Contents of the fixture index template.
pub const INDEX_TEMPLATE: &str = "<!DOCTYPE html>\n<html><body>gallery index</body></html>\n";

static CWD_LOCK: Mutex<()> = Mutex::new(());

/// Serializes tests that run notebooks (execution moves the process cwd).
pub fn cwd_lock() -> MutexGuard<'static, ()> {
    CWD_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Fixtures
// ============================================================================

/// A gallery checkout in a temporary directory.
pub struct GalleryFixture {
    dir: TempDir,
}

impl GalleryFixture {
    /// Creates `templates/index_template.html` and an empty `gallery/`.
    #[allow(clippy::missing_panics_doc)]
    pub fn new() -> Self {
        let fixture = Self::without_gallery();
        fs::create_dir_all(fixture.gallery_dir()).expect("create gallery dir");
        fixture
    }

    /// Creates only the templates directory.
    #[allow(clippy::missing_panics_doc)]
    pub fn without_gallery() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let templates = dir.path().join("templates");
        fs::create_dir_all(&templates).expect("create templates dir");
        fs::write(templates.join("index_template.html"), INDEX_TEMPLATE).expect("write template");
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn gallery_dir(&self) -> PathBuf {
        self.root().join("gallery")
    }

    pub fn html_dir(&self) -> PathBuf {
        self.root().join("html")
    }

    /// Writes `gallery/<tutorial>/<file>` with the given gallery metadata.
    #[allow(clippy::missing_panics_doc)]
    pub fn add_notebook(&self, tutorial: &str, file: &str, gallery_meta: &Value) -> PathBuf {
        self.write_notebook(tutorial, file, &notebook_json(gallery_meta, &[]))
    }

    /// Writes an already-executed notebook with one embedded PNG.
    #[allow(clippy::missing_panics_doc)]
    pub fn add_executed(&self, tutorial: &str, file: &str, gallery_meta: &Value) -> PathBuf {
        self.write_notebook(tutorial, file, &notebook_json(gallery_meta, &[image_cell(FAKE_PNG)]))
    }

    /// Writes raw notebook JSON.
    #[allow(clippy::missing_panics_doc)]
    pub fn write_notebook(&self, tutorial: &str, file: &str, doc: &Value) -> PathBuf {
        let dir = self.gallery_dir().join(tutorial);
        fs::create_dir_all(&dir).expect("create tutorial dir");
        let path = dir.join(file);
        fs::write(&path, serde_json::to_string_pretty(doc).expect("serialize")).expect("write notebook");
        path
    }

    /// A `Gallery` context rooted at the fixture.
    #[allow(clippy::missing_panics_doc)]
    pub fn gallery(&self, pattern: Option<&str>) -> Gallery {
        let config = GalleryConfig::default().resolved_against(self.root());
        Gallery::open(config, pattern.map(str::to_string)).expect("open gallery")
    }

    /// Reads `html/gallery.json`.
    #[allow(clippy::missing_panics_doc)]
    pub fn manifest(&self) -> Value {
        let text = fs::read_to_string(self.html_dir().join("gallery.json")).expect("read manifest");
        serde_json::from_str(&text).expect("manifest is JSON")
    }
}

/// Gallery metadata block.
pub fn meta(published: bool, section: &str, link: &str) -> Value {
    json!({"published": published, "section_name": section, "link_name": link})
}

/// A minimal nbformat-4 notebook.
pub fn notebook_json(gallery_meta: &Value, extra_cells: &[Value]) -> Value {
    let mut cells = vec![
        json!({"cell_type": "markdown", "metadata": {}, "source": ["# Tutorial"]}),
        json!({
            "cell_type": "code",
            "execution_count": null,
            "metadata": {},
            "source": ["import matplotlib.pyplot as plt\n", "plt.plot([1, 2])"],
            "outputs": []
        }),
    ];
    cells.extend_from_slice(extra_cells);
    json!({
        "cells": cells,
        "metadata": {
            "kernelspec": {"display_name": "Python 3", "language": "python", "name": "python3"},
            "sunpy-gallery": gallery_meta
        },
        "nbformat": 4,
        "nbformat_minor": 5
    })
}

/// A code cell with one `image/png` display output.
pub fn image_cell(bytes: &[u8]) -> Value {
    json!({
        "cell_type": "code",
        "execution_count": 2,
        "metadata": {},
        "source": ["plt.show()"],
        "outputs": [{
            "output_type": "display_data",
            "metadata": {},
            "data": {"image/png": STANDARD.encode(bytes), "text/plain": ["<Figure size 640x480>"]}
        }]
    })
}

/// A code cell whose output is an exception.
pub fn error_cell() -> Value {
    json!({
        "cell_type": "code",
        "execution_count": 3,
        "metadata": {},
        "source": ["1 / 0"],
        "outputs": [{
            "output_type": "error",
            "ename": "ZeroDivisionError",
            "evalue": "division by zero",
            "traceback": []
        }]
    })
}

// ============================================================================
// Fake collaborators
// ============================================================================

/// One call seen by [`FakeExecutor`].
#[derive(Debug, Clone)]
pub struct ExecCall {
    pub path: PathBuf,
    pub workdir: PathBuf,
    pub cwd: PathBuf,
}

/// Stands in for `nbconvert --execute`: appends a figure cell (and an
/// error cell for notebooks named in `raising`), or fails outright for
/// notebooks named in `failing`.
#[derive(Default)]
pub struct FakeExecutor {
    pub failing: Vec<String>,
    pub raising: Vec<String>,
    pub calls: Mutex<Vec<ExecCall>>,
}

impl FakeExecutor {
    pub fn calls(&self) -> Vec<ExecCall> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl NotebookExecutor for FakeExecutor {
    async fn execute(&self, path: &Path, workdir: &Path) -> Result<Notebook> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ExecCall {
                path: path.to_path_buf(),
                workdir: workdir.to_path_buf(),
                cwd: std::env::current_dir()?,
            });

        let name = file_name(path);
        if self.failing.contains(&name) {
            return Err(GalleryError::Collaborator {
                program: "fake-jupyter".to_string(),
                code: Some(1),
                stderr: "kernel died".to_string(),
            });
        }

        let mut executed: Value = serde_json::from_slice(&fs::read(path)?)?;
        let cells = executed["cells"].as_array_mut().expect("cells array");
        if self.raising.contains(&name) {
            cells.push(error_cell());
        }
        cells.push(image_cell(FAKE_PNG));

        Notebook::from_slice(&serde_json::to_vec(&executed)?, path)
    }
}

/// Stands in for `nbconvert --to html`.
#[derive(Default)]
pub struct FakeConverter {
    pub failing: Vec<String>,
    pub calls: Mutex<Vec<PathBuf>>,
}

impl FakeConverter {
    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl HtmlConverter for FakeConverter {
    async fn convert(&self, path: &Path, output_dir: &Path, output_base: &str) -> Result<PathBuf> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_path_buf());

        if self.failing.contains(&file_name(path)) {
            return Err(GalleryError::Collaborator {
                program: "fake-jupyter".to_string(),
                code: Some(1),
                stderr: "template not found".to_string(),
            });
        }

        let page = output_dir.join(format!("{output_base}.html"));
        fs::write(&page, format!("<html>{output_base}</html>"))?;
        Ok(page)
    }
}

// ============================================================================
// Binary
// ============================================================================

/// The `nbgallery` binary in `cwd` with a clean `NBGALLERY_*` environment.
pub fn cli_command(cwd: &Path, args: &[&str]) -> std::process::Command {
    let mut command = std::process::Command::new(env!("CARGO_BIN_EXE_nbgallery"));
    command
        .args(args)
        .current_dir(cwd)
        .env_remove("NBGALLERY_CONFIG")
        .env_remove("NBGALLERY_GALLERY_DIR")
        .env_remove("NBGALLERY_OUTPUT_DIR")
        .env_remove("NBGALLERY_TEMPLATES_DIR")
        .env_remove("NBGALLERY_TOOL_VERSION")
        .env_remove("NBGALLERY_LOG_LEVEL");
    command
}

/// Runs the `nbgallery` binary to completion.
#[allow(clippy::missing_panics_doc)]
pub fn run_cli(cwd: &Path, args: &[&str]) -> Output {
    cli_command(cwd, args)
        .output()
        .expect("failed to spawn nbgallery")
}
