//! End-to-end `run convert` through the binary, with a shell script
//! standing in for `jupyter nbconvert`.
//!
//! Kept to a single test: the stand-in script is written and then
//! executed, which must not race with other tests forking.

#![cfg(unix)]

mod common;

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use serde_json::json;

use common::{FAKE_PNG, GalleryFixture, INDEX_TEMPLATE, meta, run_cli};

const FAKE_JUPYTER: &str = r#"#!/bin/sh
to=""; outdir=""; out=""; src=""
while [ $# -gt 0 ]; do
  case "$1" in
    --to) shift; to="$1" ;;
    --template) shift ;;
    --output-dir) shift; outdir="$1" ;;
    --output) shift; out="$1" ;;
    nbconvert|--*) ;;
    *) src="$1" ;;
  esac
  shift
done
case "$to" in
  notebook) pwd > ran_in.txt; cat "$src" ;;
  html) printf '<html>%s</html>\n' "$out" > "$outdir/$out.html" ;;
  *) echo "unsupported --to '$to'" >&2; exit 2 ;;
esac
"#;

fn install_fake_jupyter(root: &Path) -> std::path::PathBuf {
    let script = root.join("fake-jupyter.sh");
    fs::write(&script, FAKE_JUPYTER).unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    script
}

#[test]
fn run_then_convert_through_binary() {
    let fx = GalleryFixture::new();
    let script = install_fake_jupyter(fx.root());
    fs::write(
        fx.root().join("nbgallery.yaml"),
        format!("jupyter: {}\n", script.display()),
    )
    .unwrap();
    fx.add_executed("t1", "a.ipynb", &meta(true, "Intro", "A Demo"));
    fx.add_notebook("t1", "draft.ipynb", &meta(false, "Intro", "Draft"));

    let output = run_cli(
        fx.root(),
        &["run", "convert", "--tool-version", "6.0.1"],
    );
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    // run: executed copy beside the original, produced from its directory
    let tutorial = fx.gallery_dir().join("t1");
    assert!(tutorial.join("_run_a.ipynb").is_file());
    assert!(!tutorial.join("_run_draft.ipynb").exists());
    let ran_in = fs::read_to_string(tutorial.join("ran_in.txt")).unwrap();
    assert_eq!(
        Path::new(ran_in.trim()).canonicalize().unwrap(),
        tutorial.canonicalize().unwrap()
    );

    // convert: page, thumbnail, index and manifest
    let section = fx.html_dir().join("Intro");
    assert_eq!(
        fs::read_to_string(section.join("a.html")).unwrap(),
        "<html>a</html>\n"
    );
    assert_eq!(fs::read(section.join("a.png")).unwrap(), FAKE_PNG);
    assert!(!section.join("draft.html").exists());
    assert_eq!(
        fs::read_to_string(fx.html_dir().join("index.html")).unwrap(),
        INDEX_TEMPLATE
    );

    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(fx.html_dir().join("gallery.json")).unwrap())
            .unwrap();
    assert_eq!(
        manifest,
        json!({
            "meta": {"sunpy": "6.0.1"},
            "sections": {"Intro": [{"notebook": "a", "link_name": "A Demo"}]}
        })
    );
}
