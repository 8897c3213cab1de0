#![no_main]

use std::path::Path;

use libfuzzer_sys::fuzz_target;
use nbgallery::gallery::thumbnail::{Thumbnail, decode_payload, find_last_image};
use nbgallery::notebook::Notebook;

fuzz_target!(|data: &[u8]| {
    let path = Path::new("fuzz.ipynb");
    let Ok(notebook) = Notebook::from_slice(data, path) else {
        return;
    };

    let _ = notebook.gallery_metadata("sunpy-gallery", path);
    let _ = notebook.cell_errors();

    if let Some((_, payload)) = find_last_image(&notebook) {
        let _ = decode_payload(payload);
    }
    let _ = Thumbnail::from_notebook(&notebook, path);
});
