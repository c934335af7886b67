use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

// Formats the EXIF writer can update. Video files are out of scope.
const SUPPORTED_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "tif", "tiff", "png", "webp"];

/// Recursively collects the image files under an export directory.
pub fn scan_images(input_dir: &Path) -> Vec<PathBuf> {
    let mut images = Vec::new();

    if !input_dir.exists() {
        warn!("Image directory does not exist: {}", input_dir.display());
        return images;
    }

    info!("Scanning directory: {}", input_dir.display());
    walk_directory(input_dir, &mut images);
    info!("Found {} images", images.len());

    images
}

fn walk_directory(dir: &Path, images: &mut Vec<PathBuf>) {
    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();

            if path.is_dir() {
                walk_directory(&path, images);
            } else if path.is_file() && is_supported_image(&path) {
                images.push(path);
            }
        }
    }
}

fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
