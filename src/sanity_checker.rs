use log::{info, warn};
use std::collections::HashSet;
use std::path::Path;

use crate::file_scanner;
use crate::metadata_parser;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SanityReport {
    /// Photo IDs with at least one matching image file.
    pub matched: usize,
    /// Image files whose name contains no known photo ID.
    pub orphan_images: usize,
    /// Sidecar entries with no matching image file.
    pub orphan_metadata: usize,
}

/// Dry-run validation of an export: reports images without metadata and
/// metadata without images. Nothing is modified.
pub fn check_sanity(input_dir: &Path) -> SanityReport {
    let metadata = metadata_parser::extract_metadata(input_dir);
    let images = file_scanner::scan_images(input_dir);

    let mut matched_ids: HashSet<&str> = HashSet::new();
    let mut orphan_images = 0;

    for image in &images {
        let file_name = image
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();

        match metadata
            .keys()
            .find(|photo_id| file_name.contains(photo_id.as_str()))
        {
            Some(photo_id) => {
                matched_ids.insert(photo_id.as_str());
            }
            None => {
                warn!("No metadata for image {}", image.display());
                orphan_images += 1;
            }
        }
    }

    let mut orphan_metadata = 0;
    for photo_id in metadata.keys() {
        if !matched_ids.contains(photo_id.as_str()) {
            warn!("No matching image for metadata with ID {}", photo_id);
            orphan_metadata += 1;
        }
    }

    let report = SanityReport {
        matched: matched_ids.len(),
        orphan_images,
        orphan_metadata,
    };

    info!(
        "Sanity check: {} matched, {} orphan images, {} orphan metadata entries",
        report.matched, report.orphan_images, report.orphan_metadata
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_check_sanity_reports_orphans_both_ways() {
        let temp_dir = TempDir::new().unwrap();

        // Matched pair
        fs::write(
            temp_dir.path().join("photo_11111111.json"),
            r#"{ "id": "11111111" }"#,
        )
        .unwrap();
        fs::write(temp_dir.path().join("11111111_o.jpg"), b"x").unwrap();

        // Metadata without image
        fs::write(
            temp_dir.path().join("photo_22222222.json"),
            r#"{ "id": "22222222" }"#,
        )
        .unwrap();

        // Image without metadata
        fs::write(temp_dir.path().join("33333333_o.jpg"), b"x").unwrap();

        let report = check_sanity(temp_dir.path());

        assert_eq!(
            report,
            SanityReport {
                matched: 1,
                orphan_images: 1,
                orphan_metadata: 1,
            }
        );
    }

    #[test]
    fn test_check_sanity_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(check_sanity(temp_dir.path()), SanityReport::default());
    }
}
