//! Core data types for region monitoring.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::{within_radius, GeoPoint};

/// A named circular region of interest.
///
/// Regions are immutable once loaded. The radius is expected to be positive;
/// enforcing that is the job of whatever loads the regions (see
/// [`crate::catalog::load_regions`]), not of the state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Unique region identifier.
    pub id: String,
    /// Center of the circle.
    pub center: GeoPoint,
    /// Radius in meters.
    pub radius_meters: f64,
}

impl Region {
    /// Create a new region.
    pub fn new(id: impl Into<String>, center: GeoPoint, radius_meters: f64) -> Self {
        Self {
            id: id.into(),
            center,
            radius_meters,
        }
    }

    /// Returns true if `point` is inside this region (boundary inclusive).
    #[inline]
    pub fn contains(&self, point: GeoPoint) -> bool {
        within_radius(point, self.center, self.radius_meters)
    }
}

/// A single location fix from the location-update source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// When the fix was taken.
    pub at: DateTime<Utc>,
}

impl PositionSample {
    /// Create a sample stamped with the current wall-clock time.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self::with_timestamp(latitude, longitude, Utc::now())
    }

    /// Create a sample with an explicit timestamp.
    pub fn with_timestamp(latitude: f64, longitude: f64, at: DateTime<Utc>) -> Self {
        Self {
            latitude,
            longitude,
            at,
        }
    }

    /// The sample's coordinates.
    #[inline]
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// Direction of a boundary crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionKind {
    /// Moved from outside the region to inside it.
    Enter,
    /// Moved from inside the region to outside it.
    Exit,
}

impl std::fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransitionKind::Enter => write!(f, "enter"),
            TransitionKind::Exit => write!(f, "exit"),
        }
    }
}

/// A detected crossing of a region boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionEvent {
    /// Region whose boundary was crossed.
    pub region_id: String,
    /// Crossing direction.
    pub kind: TransitionKind,
    /// Timestamp of the sample that revealed the crossing.
    pub at: DateTime<Utc>,
}

impl TransitionEvent {
    /// Shorthand for an enter event.
    pub fn enter(region_id: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            region_id: region_id.into(),
            kind: TransitionKind::Enter,
            at,
        }
    }

    /// Shorthand for an exit event.
    pub fn exit(region_id: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            region_id: region_id.into(),
            kind: TransitionKind::Exit,
            at,
        }
    }
}

impl std::fmt::Display for TransitionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({}) at {}", self.kind, self.region_id, self.at.to_rfc3339())
    }
}
