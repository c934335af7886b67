use little_exif::exif_tag::ExifTag;
use little_exif::metadata::Metadata;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use pix_restamp::gps_converter::{decode_geolocation, Rational, RawGpsBlock};
use pix_restamp::{image_updater, metadata_parser, sanity_checker};

const PHOTO_ID: &str = "12345678";

fn write_test_image(path: &Path) {
    let img = image::RgbImage::from_pixel(8, 8, image::Rgb([120, 160, 200]));
    img.save_with_format(path, image::ImageFormat::Jpeg)
        .unwrap();
}

fn build_export(export: &Path) {
    let images = export.join("data-download-1");
    let account = export.join("account_data");
    fs::create_dir_all(&images).unwrap();
    fs::create_dir_all(&account).unwrap();

    write_test_image(&images.join(format!("{}_abcd_o.jpg", PHOTO_ID)));

    fs::write(
        account.join(format!("photo_{}.json", PHOTO_ID)),
        r#"{
            "id": "12345678",
            "date_taken": "2012-06-30 17:25:43",
            "geolocation": {
                "latitude": 37.7749,
                "longitude": -122.4194,
                "accuracy": 16
            }
        }"#,
    )
    .unwrap();
}

fn read_gps_block(exif: &Metadata) -> RawGpsBlock {
    let to_rationals = |values: &Vec<little_exif::rational::uR64>| {
        values
            .iter()
            .map(|r| Rational::new(r.nominator, r.denominator))
            .collect::<Vec<_>>()
    };

    let mut block = RawGpsBlock::default();

    if let Some(ExifTag::GPSLatitude(values)) =
        exif.get_tag(&ExifTag::GPSLatitude(Vec::new())).next()
    {
        block.latitude = Some(to_rationals(values));
    }
    if let Some(ExifTag::GPSLongitude(values)) =
        exif.get_tag(&ExifTag::GPSLongitude(Vec::new())).next()
    {
        block.longitude = Some(to_rationals(values));
    }
    if let Some(ExifTag::GPSLatitudeRef(s)) =
        exif.get_tag(&ExifTag::GPSLatitudeRef(String::new())).next()
    {
        block.latitude_ref = s.trim_end_matches('\0').parse().ok();
    }
    if let Some(ExifTag::GPSLongitudeRef(s)) = exif
        .get_tag(&ExifTag::GPSLongitudeRef(String::new()))
        .next()
    {
        block.longitude_ref = s.trim_end_matches('\0').parse().ok();
    }

    block
}

#[test]
fn embed_pipeline_writes_date_and_gps_to_copies() {
    let export = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    build_export(export.path());

    let source = export
        .path()
        .join("data-download-1")
        .join(format!("{}_abcd_o.jpg", PHOTO_ID));
    let original_bytes = fs::read(&source).unwrap();

    let metadata = metadata_parser::extract_metadata(export.path());
    assert_eq!(metadata.len(), 1);

    let summary =
        image_updater::embed_metadata(export.path(), output.path(), &metadata, false).unwrap();
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.failed, 0);

    // Source file untouched in copy mode
    assert_eq!(fs::read(&source).unwrap(), original_bytes);

    let updated = output.path().join(format!("{}_abcd_o.jpg", PHOTO_ID));
    let exif = Metadata::new_from_path(&updated).unwrap();

    let date_tag = exif
        .get_tag(&ExifTag::DateTimeOriginal(String::new()))
        .next();
    assert!(date_tag.is_some(), "DateTimeOriginal not written");
    if let Some(ExifTag::DateTimeOriginal(s)) = date_tag {
        assert_eq!(s.trim_end_matches('\0'), "2012:06:30 17:25:43");
    }

    let (lat, lon) = decode_geolocation(&read_gps_block(&exif))
        .expect("GPS block missing or malformed after embedding");
    assert!((lat - 37.7749).abs() < 0.0001, "latitude read back as {}", lat);
    assert!(
        (lon - (-122.4194)).abs() < 0.0001,
        "longitude read back as {}",
        lon
    );
}

#[test]
fn embed_pipeline_overwrites_in_place() {
    let export = TempDir::new().unwrap();
    build_export(export.path());

    let source = export
        .path()
        .join("data-download-1")
        .join(format!("{}_abcd_o.jpg", PHOTO_ID));

    let metadata = metadata_parser::extract_metadata(export.path());
    let summary =
        image_updater::embed_metadata(export.path(), export.path(), &metadata, true).unwrap();
    assert_eq!(summary.updated, 1);

    let exif = Metadata::new_from_path(&source).unwrap();
    let (lat, _) = decode_geolocation(&read_gps_block(&exif)).unwrap();
    assert!((lat - 37.7749).abs() < 0.0001);
}

#[test]
fn embed_pipeline_counts_unmatched_images() {
    let export = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    build_export(export.path());

    write_test_image(&export.path().join("data-download-1").join("99999999_o.jpg"));

    let metadata = metadata_parser::extract_metadata(export.path());
    let summary =
        image_updater::embed_metadata(export.path(), output.path(), &metadata, false).unwrap();

    assert_eq!(summary.updated, 1);
    assert_eq!(summary.unmatched, 1);
    assert!(!output.path().join("99999999_o.jpg").exists());
}

#[test]
fn embed_pipeline_skips_gps_for_photos_without_geolocation() {
    let export = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();

    fs::create_dir_all(export.path().join("images")).unwrap();
    write_test_image(&export.path().join("images").join("555_o.jpg"));
    fs::write(
        export.path().join("photo_555.json"),
        r#"{ "id": "555", "date_taken": "2020-01-02 03:04:05" }"#,
    )
    .unwrap();

    let metadata = metadata_parser::extract_metadata(export.path());
    let summary =
        image_updater::embed_metadata(export.path(), output.path(), &metadata, false).unwrap();
    assert_eq!(summary.updated, 1);

    let exif = Metadata::new_from_path(&output.path().join("555_o.jpg")).unwrap();
    assert!(decode_geolocation(&read_gps_block(&exif)).is_none());

    let date_tag = exif
        .get_tag(&ExifTag::DateTimeOriginal(String::new()))
        .next();
    assert!(matches!(
        date_tag,
        Some(ExifTag::DateTimeOriginal(s)) if s.trim_end_matches('\0') == "2020:01:02 03:04:05"
    ));
}

#[test]
fn sanity_check_matches_export_contents() {
    let export = TempDir::new().unwrap();
    build_export(export.path());

    // Orphan image on top of the matched pair
    write_test_image(&export.path().join("data-download-1").join("77777777_o.jpg"));

    let report = sanity_checker::check_sanity(export.path());
    assert_eq!(report.matched, 1);
    assert_eq!(report.orphan_images, 1);
    assert_eq!(report.orphan_metadata, 0);
}
