#![no_main]

use std::path::Path;

use libfuzzer_sys::fuzz_target;
use nbgallery::config::GalleryConfig;

fuzz_target!(|data: &[u8]| {
    if let Ok(yaml_str) = std::str::from_utf8(data) {
        // Parse then validate; neither may panic
        if let Ok(config) = GalleryConfig::from_yaml_str(yaml_str, Path::new("fuzz.yaml")) {
            let _ = config.validate();
        }
    }
});
