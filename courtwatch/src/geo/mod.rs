//! Great-circle distance and circular containment.
//!
//! Everything here treats the Earth as a sphere of radius [`EARTH_RADIUS_KM`].
//! Coordinates are degrees and are not range-checked: out-of-range values
//! flow through the trigonometry unchanged, and validating them is the
//! caller's concern.

use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the haversine formula, in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees (north positive).
    pub latitude: f64,
    /// Longitude in degrees (east positive).
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a new point. No validation is performed.
    #[inline]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6},{:.6}", self.latitude, self.longitude)
    }
}

impl std::str::FromStr for GeoPoint {
    type Err = String;

    /// Parse `"lat,lon"` (whitespace around either part is ignored).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lon) = s
            .split_once(',')
            .ok_or_else(|| format!("expected 'lat,lon', got '{}'", s))?;
        let latitude = lat
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid latitude '{}': {}", lat.trim(), e))?;
        let longitude = lon
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid longitude '{}': {}", lon.trim(), e))?;
        Ok(Self::new(latitude, longitude))
    }
}

/// Haversine distance between two points, in kilometers.
///
/// The result is symmetric in its arguments and exactly `0.0` when both
/// points are the same coordinate pair.
#[inline]
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    // Absolute deltas keep the result bit-identical when arguments are swapped.
    let dlat = (lat2 - lat1).abs();
    let dlon = (b.longitude.to_radians() - a.longitude.to_radians()).abs();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Returns true if `point` lies within `radius_meters` of `center`.
///
/// The boundary is inclusive: a point exactly `radius_meters` away counts
/// as inside.
#[inline]
pub fn within_radius(point: GeoPoint, center: GeoPoint, radius_meters: f64) -> bool {
    distance_km(point, center) * 1000.0 <= radius_meters
}

/// Format a distance for display: meters below 1 km, otherwise kilometers
/// with one decimal.
pub fn format_distance(km: f64) -> String {
    let meters = (km * 1000.0).round();
    if meters < 1000.0 {
        format!("{:.0} m", meters)
    } else {
        format!("{:.1} km", km)
    }
}

/// Point `km` kilometers due north of `origin` along its meridian.
///
/// Used to build points at known distances; latitude is not clamped.
pub fn offset_north(origin: GeoPoint, km: f64) -> GeoPoint {
    let dlat = (km / EARTH_RADIUS_KM).to_degrees();
    GeoPoint::new(origin.latitude + dlat, origin.longitude)
}
