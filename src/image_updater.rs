use chrono::NaiveDateTime;
use little_exif::exif_tag::ExifTag;
use little_exif::metadata::Metadata;
use little_exif::rational::uR64;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::file_scanner;
use crate::gps_converter::{encode_geolocation, GpsBlock, Rational};
use crate::metadata_parser::PhotoMetadata;

// Date formats seen across export versions, normalized to the EXIF form.
const DATE_TAKEN_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y:%m:%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const EXIF_DATE_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EmbedSummary {
    pub updated: usize,
    pub unmatched: usize,
    pub failed: usize,
}

/// Embeds capture date and GPS metadata into every image whose file name
/// contains a known photo ID.
///
/// With `overwrite` set, images are updated in place; otherwise each matched
/// image is copied into `output_dir` first and the copy is updated. A
/// failure on one file is logged and counted, never aborts the batch.
pub fn embed_metadata(
    input_dir: &Path,
    output_dir: &Path,
    metadata: &HashMap<String, PhotoMetadata>,
    overwrite: bool,
) -> Result<EmbedSummary, String> {
    if !overwrite {
        fs::create_dir_all(output_dir).map_err(|e| {
            format!(
                "Failed to create output directory {}: {}",
                output_dir.display(),
                e
            )
        })?;
    }

    let mut summary = EmbedSummary::default();

    for image in file_scanner::scan_images(input_dir) {
        let Some((photo_id, photo)) = match_photo(&image, metadata) else {
            debug!("No metadata matches {}", image.display());
            summary.unmatched += 1;
            continue;
        };

        match update_image(&image, output_dir, overwrite, photo) {
            Ok(target) => {
                info!("Embedded metadata for photo {} into {}", photo_id, target.display());
                summary.updated += 1;
            }
            Err(e) => {
                warn!("Failed to embed metadata in {}: {}", image.display(), e);
                summary.failed += 1;
            }
        }
    }

    info!(
        "Embedding finished: {} updated, {} unmatched, {} failed",
        summary.updated, summary.unmatched, summary.failed
    );
    Ok(summary)
}

/// Export image filenames contain the photo ID (e.g. `12345678_abcd_o.jpg`),
/// so matching is substring containment of the ID in the file name.
fn match_photo<'a>(
    path: &Path,
    metadata: &'a HashMap<String, PhotoMetadata>,
) -> Option<(&'a str, &'a PhotoMetadata)> {
    let file_name = path.file_name()?.to_str()?;

    metadata
        .iter()
        .find(|(photo_id, _)| file_name.contains(photo_id.as_str()))
        .map(|(photo_id, photo)| (photo_id.as_str(), photo))
}

fn update_image(
    source: &Path,
    output_dir: &Path,
    overwrite: bool,
    photo: &PhotoMetadata,
) -> Result<PathBuf, String> {
    let target = if overwrite {
        source.to_path_buf()
    } else {
        let file_name = source
            .file_name()
            .ok_or_else(|| "Image path has no file name".to_string())?;
        let target = output_dir.join(file_name);
        fs::copy(source, &target)
            .map_err(|e| format!("Failed to copy to {}: {}", target.display(), e))?;
        target
    };

    // Images straight from an export often carry no EXIF block at all;
    // start from an empty one in that case.
    let mut exif = Metadata::new_from_path(&target).unwrap_or_else(|e| {
        debug!("No existing EXIF in {} ({}), starting fresh", target.display(), e);
        Metadata::new()
    });

    if let Some(raw_date) = photo.date_taken.as_deref() {
        match normalize_date_taken(raw_date) {
            Some(datetime) => {
                exif.set_tag(ExifTag::DateTimeOriginal(datetime));
            }
            None => warn!(
                "Unrecognized date_taken {:?}, leaving capture date of {} unset",
                raw_date,
                target.display()
            ),
        }
    }

    if let Some(block) = encode_geolocation(photo.geolocation.as_ref()) {
        write_gps_tags(&mut exif, &block);
    }

    exif.write_to_file(&target)
        .map_err(|e| format!("Failed to write EXIF: {}", e))?;

    Ok(target)
}

/// Normalizes an exported `date_taken` string to `YYYY:MM:DD HH:MM:SS`.
fn normalize_date_taken(raw: &str) -> Option<String> {
    let trimmed = raw.trim();

    DATE_TAKEN_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|datetime| datetime.format(EXIF_DATE_FORMAT).to_string())
}

/// Sets the four GPS entries. Only these tags are touched, so any other GPS
/// data already present in the file survives.
fn write_gps_tags(exif: &mut Metadata, block: &GpsBlock) {
    exif.set_tag(ExifTag::GPSLatitudeRef(block.latitude_ref.as_str().to_string()));
    exif.set_tag(ExifTag::GPSLatitude(to_ur64(&block.latitude)));
    exif.set_tag(ExifTag::GPSLongitudeRef(
        block.longitude_ref.as_str().to_string(),
    ));
    exif.set_tag(ExifTag::GPSLongitude(to_ur64(&block.longitude)));
}

fn to_ur64(triple: &[Rational; 3]) -> Vec<uR64> {
    triple
        .iter()
        .map(|r| uR64 {
            nominator: r.numerator,
            denominator: r.denominator,
        })
        .collect()
}
