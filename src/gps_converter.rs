use thiserror::Error;

use crate::metadata_parser::GeolocationRecord;

/// Denominator used for the seconds component of an encoded coordinate.
/// Degrees and minutes are whole numbers; seconds keep four decimal digits,
/// giving roughly 3 mm of resolution along a meridian.
pub const SECONDS_DENOMINATOR: u32 = 10_000;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum GpsError {
    #[error("Rational has a zero denominator")]
    ZeroDenominator,
    #[error("Expected 3 rational components, got {0}")]
    WrongComponentCount(usize),
}

/// Exact fraction as stored in the EXIF GPS IFD.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rational {
    pub numerator: u32,
    pub denominator: u32,
}

impl Rational {
    pub fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }
}

/// Magnitude of a coordinate in degrees/minutes/seconds.
/// Direction is carried separately as a [`DirectionRef`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dms {
    pub degrees: u32,
    pub minutes: u32,
    pub seconds: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectionRef {
    North,
    South,
    East,
    West,
}

impl DirectionRef {
    pub fn as_str(&self) -> &'static str {
        match self {
            DirectionRef::North => "N",
            DirectionRef::South => "S",
            DirectionRef::East => "E",
            DirectionRef::West => "W",
        }
    }
}

impl std::str::FromStr for DirectionRef {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "N" => Ok(DirectionRef::North),
            "S" => Ok(DirectionRef::South),
            "E" => Ok(DirectionRef::East),
            "W" => Ok(DirectionRef::West),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for DirectionRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The four GPS entries produced by [`encode_geolocation`], matching the
/// EXIF GPS IFD layout (GPSLatitude, GPSLatitudeRef, GPSLongitude,
/// GPSLongitudeRef).
#[derive(Debug, Clone, PartialEq)]
pub struct GpsBlock {
    pub latitude: [Rational; 3],
    pub latitude_ref: DirectionRef,
    pub longitude: [Rational; 3],
    pub longitude_ref: DirectionRef,
}

/// GPS entries as they come back from reading an EXIF block: any field may
/// be missing and triples may have the wrong length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawGpsBlock {
    pub latitude: Option<Vec<Rational>>,
    pub latitude_ref: Option<DirectionRef>,
    pub longitude: Option<Vec<Rational>>,
    pub longitude_ref: Option<DirectionRef>,
}

impl From<&GpsBlock> for RawGpsBlock {
    fn from(block: &GpsBlock) -> Self {
        RawGpsBlock {
            latitude: Some(block.latitude.to_vec()),
            latitude_ref: Some(block.latitude_ref),
            longitude: Some(block.longitude.to_vec()),
            longitude_ref: Some(block.longitude_ref),
        }
    }
}

/// Splits a decimal coordinate into degrees, minutes and seconds.
/// The sign is dropped; direction is encoded separately via [`direction_ref`].
pub fn decimal_to_dms(coord: f64) -> Dms {
    let abs_coord = coord.abs();
    let degrees = abs_coord.floor();
    let minutes_float = (abs_coord - degrees) * 60.0;
    let minutes = minutes_float.floor();
    let seconds = (minutes_float - minutes) * 60.0;

    Dms {
        degrees: degrees as u32,
        minutes: minutes as u32,
        seconds,
    }
}

/// Encodes a DMS magnitude as the three rationals EXIF expects.
/// Seconds are truncated (not rounded) past four decimal digits.
pub fn dms_to_rational(dms: &Dms) -> [Rational; 3] {
    [
        Rational::new(dms.degrees, 1),
        Rational::new(dms.minutes, 1),
        Rational::new(
            (dms.seconds * SECONDS_DENOMINATOR as f64) as u32,
            SECONDS_DENOMINATOR,
        ),
    ]
}

/// Recovers the decimal magnitude from a degrees/minutes/seconds triple.
pub fn rational_to_decimal(triple: &[Rational]) -> Result<f64, GpsError> {
    if triple.len() != 3 {
        return Err(GpsError::WrongComponentCount(triple.len()));
    }
    if triple.iter().any(|r| r.denominator == 0) {
        return Err(GpsError::ZeroDenominator);
    }

    let value = |r: &Rational| r.numerator as f64 / r.denominator as f64;
    Ok(value(&triple[0]) + value(&triple[1]) / 60.0 + value(&triple[2]) / 3600.0)
}

/// Hemisphere/side reference for a signed coordinate. Zero maps to the
/// positive reference (N / E).
pub fn direction_ref(coord: f64, axis: Axis) -> DirectionRef {
    match axis {
        Axis::Latitude => {
            if coord >= 0.0 {
                DirectionRef::North
            } else {
                DirectionRef::South
            }
        }
        Axis::Longitude => {
            if coord >= 0.0 {
                DirectionRef::East
            } else {
                DirectionRef::West
            }
        }
    }
}

/// Converts an export geolocation record into an EXIF-ready GPS block.
///
/// Returns `None` whenever the record is absent, either coordinate is
/// missing, or a value cannot be read as a finite number. A bad geotag on
/// one photo must never abort the batch, so data problems are reported as
/// absence instead of errors.
pub fn encode_geolocation(record: Option<&GeolocationRecord>) -> Option<GpsBlock> {
    let record = record?;
    let lat = record.latitude()?;
    let lon = record.longitude()?;

    Some(GpsBlock {
        latitude: dms_to_rational(&decimal_to_dms(lat)),
        latitude_ref: direction_ref(lat, Axis::Latitude),
        longitude: dms_to_rational(&decimal_to_dms(lon)),
        longitude_ref: direction_ref(lon, Axis::Longitude),
    })
}

/// Decodes an EXIF GPS block back to signed decimal coordinates, used to
/// validate round-trip fidelity against [`encode_geolocation`].
///
/// Returns `None` if either coordinate triple is missing or malformed.
/// A missing direction reference defaults to N / E, while a missing triple
/// yields absence.
pub fn decode_geolocation(block: &RawGpsBlock) -> Option<(f64, f64)> {
    let mut lat = rational_to_decimal(block.latitude.as_deref()?).ok()?;
    let mut lon = rational_to_decimal(block.longitude.as_deref()?).ok()?;

    if block.latitude_ref.unwrap_or(DirectionRef::North) == DirectionRef::South {
        lat = -lat;
    }
    if block.longitude_ref.unwrap_or(DirectionRef::East) == DirectionRef::West {
        lon = -lon;
    }

    Some((lat, lon))
}
