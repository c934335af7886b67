use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SidecarError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Geolocation entry as exported in the sidecar JSON. Exports attach a
/// varying set of extra fields (accuracy, place ids, privacy flags) and
/// deliver coordinates either as numbers or as strings; only latitude and
/// longitude are consumed, everything else is ignored.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct GeolocationRecord {
    #[serde(default)]
    pub latitude: Option<Value>,
    #[serde(default)]
    pub longitude: Option<Value>,
}

impl GeolocationRecord {
    pub fn latitude(&self) -> Option<f64> {
        coerce_coordinate(self.latitude.as_ref()?)
    }

    pub fn longitude(&self) -> Option<f64> {
        coerce_coordinate(self.longitude.as_ref()?)
    }
}

/// Reads a coordinate value as a finite number, tolerating the string form
/// some export versions use. Anything else is treated as absent.
fn coerce_coordinate(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

/// Per-photo metadata extracted from a sidecar file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhotoMetadata {
    pub date_taken: Option<String>,
    pub geolocation: Option<GeolocationRecord>,
}

#[derive(Debug, Deserialize)]
struct Sidecar {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    date_taken: Option<String>,
    #[serde(default)]
    geolocation: Option<GeolocationRecord>,
}

/// Walks the export and parses every `photo_*.json` sidecar into a map of
/// photo ID to metadata. Unreadable or malformed sidecars are logged and
/// skipped; the walk never aborts.
pub fn extract_metadata(input_dir: &Path) -> HashMap<String, PhotoMetadata> {
    let mut metadata = HashMap::new();

    if !input_dir.exists() {
        warn!("Input directory does not exist: {}", input_dir.display());
        return metadata;
    }

    walk_sidecars(input_dir, &mut metadata);
    info!("Parsed metadata for {} photos", metadata.len());
    metadata
}

fn walk_sidecars(dir: &Path, metadata: &mut HashMap<String, PhotoMetadata>) {
    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();

            if path.is_dir() {
                walk_sidecars(&path, metadata);
            } else if is_sidecar(&path) {
                match parse_sidecar(&path) {
                    Ok(Some((photo_id, photo))) => {
                        metadata.insert(photo_id, photo);
                    }
                    // Sidecars without an ID cannot be matched to an image
                    Ok(None) => debug!("Skipping sidecar without id: {}", path.display()),
                    Err(e) => warn!("Failed to parse {}: {}", path.display(), e),
                }
            }
        }
    }
}

fn is_sidecar(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with("photo_") && name.ends_with(".json"))
        .unwrap_or(false)
}

fn parse_sidecar(path: &Path) -> Result<Option<(String, PhotoMetadata)>, SidecarError> {
    let contents = fs::read_to_string(path)?;
    let sidecar: Sidecar = serde_json::from_str(&contents)?;

    let Some(photo_id) = sidecar.id.as_ref().and_then(photo_id_string) else {
        return Ok(None);
    };

    Ok(Some((
        photo_id,
        PhotoMetadata {
            date_taken: sidecar.date_taken,
            geolocation: sidecar.geolocation,
        },
    )))
}

/// Photo IDs appear as JSON strings or numbers depending on export version.
fn photo_id_string(id: &Value) -> Option<String> {
    match id {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
