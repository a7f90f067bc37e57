//! Geographic primitives: validated coordinates, great-circle distance, and
//! speed derivation.
//!
//! All distance math uses the haversine formula on a spherical Earth model.
//! Callers pass the optional side of a comparison (a checkpoint may have no
//! registered position) and receive `None` rather than a guessed distance.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters for the spherical distance model.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Validation failure raised while constructing a [`GeoPoint`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeoValidationError {
    /// Latitude outside `[-90, 90]` or not a finite number.
    LatitudeOutOfRange {
        /// Rejected latitude value.
        value: f64,
    },
    /// Longitude outside `[-180, 180]` or not a finite number.
    LongitudeOutOfRange {
        /// Rejected longitude value.
        value: f64,
    },
}

impl fmt::Display for GeoValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LatitudeOutOfRange { value } => {
                write!(f, "latitude {value} is outside [-90, 90]")
            }
            Self::LongitudeOutOfRange { value } => {
                write!(f, "longitude {value} is outside [-180, 180]")
            }
        }
    }
}

impl std::error::Error for GeoValidationError {}

/// A validated WGS84 coordinate pair in decimal degrees.
///
/// # Examples
/// ```
/// use backend::domain::geo::GeoPoint;
///
/// let point = GeoPoint::new(-33.45, -70.66).expect("valid coordinates");
/// assert_eq!(point.lat(), -33.45);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GeoPointDto", into = "GeoPointDto")]
pub struct GeoPoint {
    lat: f64,
    lng: f64,
}

impl GeoPoint {
    /// Create a point, validating both coordinates.
    pub fn new(lat: f64, lng: f64) -> Result<Self, GeoValidationError> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(GeoValidationError::LatitudeOutOfRange { value: lat });
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(GeoValidationError::LongitudeOutOfRange { value: lng });
        }
        Ok(Self { lat, lng })
    }

    /// Latitude in decimal degrees.
    #[must_use]
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in decimal degrees.
    #[must_use]
    pub fn lng(&self) -> f64 {
        self.lng
    }
}

/// Wire shape for [`GeoPoint`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeoPointDto {
    lat: f64,
    lng: f64,
}

impl TryFrom<GeoPointDto> for GeoPoint {
    type Error = GeoValidationError;

    fn try_from(dto: GeoPointDto) -> Result<Self, Self::Error> {
        Self::new(dto.lat, dto.lng)
    }
}

impl From<GeoPoint> for GeoPointDto {
    fn from(point: GeoPoint) -> Self {
        Self {
            lat: point.lat,
            lng: point.lng,
        }
    }
}

/// Great-circle distance in meters between `from` and `to`.
///
/// Returns `None` when the target position is unknown.
#[must_use]
pub fn distance_meters(from: &GeoPoint, to: Option<&GeoPoint>) -> Option<f64> {
    let to = to?;
    let lat_from = from.lat.to_radians();
    let lat_to = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lng = (to.lng - from.lng).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat_from.cos() * lat_to.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    Some(EARTH_RADIUS_M * c)
}

/// Outcome of a geofence check against a checkpoint's registered position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusCheck {
    /// True iff the distance is computable and within the radius.
    pub valid: bool,
    /// Measured distance in meters, when both positions are known.
    pub distance_m: Option<f64>,
}

/// Check whether `position` lies within `radius_m` meters of `target`.
///
/// An unknown target makes the check fail with no measured distance.
#[must_use]
pub fn check_radius(position: &GeoPoint, target: Option<&GeoPoint>, radius_m: f64) -> RadiusCheck {
    match distance_meters(position, target) {
        Some(distance) => RadiusCheck {
            valid: distance <= radius_m,
            distance_m: Some(distance),
        },
        None => RadiusCheck {
            valid: false,
            distance_m: None,
        },
    }
}

/// Average speed in km/h over `distance_m` meters in `elapsed_secs` seconds.
///
/// A non-positive elapsed time yields `0.0` rather than a division error.
#[must_use]
pub fn speed_kmh(distance_m: f64, elapsed_secs: f64) -> f64 {
    if elapsed_secs <= 0.0 {
        return 0.0;
    }
    (distance_m / 1000.0) / (elapsed_secs / 3600.0)
}
