//! JSON loaders for regions, courts and position samples.
//!
//! These are the validation boundary for region configuration: the state
//! machine assumes every [`Region`] it is given has a usable radius, so bad
//! records are rejected here.

use std::collections::HashSet;
use std::io::BufRead;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::geo::GeoPoint;
use crate::geofence::{PositionSample, Region};
use crate::poi::PointOfInterest;

/// Errors that can occur while loading catalog data.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Failed to read a catalog file.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File contents are not valid JSON for the expected shape.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A region record failed validation.
    #[error("invalid region '{id}': {reason}")]
    InvalidRegion { id: String, reason: String },

    /// A sample line could not be parsed.
    #[error("invalid sample on line {line}: {reason}")]
    InvalidSample { line: usize, reason: String },
}

/// On-disk region record.
#[derive(Debug, Deserialize)]
struct RegionRecord {
    id: String,
    latitude: f64,
    longitude: f64,
    radius_meters: f64,
}

impl RegionRecord {
    fn into_region(self) -> Result<Region, CatalogError> {
        if self.id.trim().is_empty() {
            return Err(CatalogError::InvalidRegion {
                id: self.id,
                reason: "id must not be empty".to_string(),
            });
        }
        if !self.radius_meters.is_finite() || self.radius_meters <= 0.0 {
            return Err(CatalogError::InvalidRegion {
                reason: format!("radius must be positive, got {}", self.radius_meters),
                id: self.id,
            });
        }
        Ok(Region::new(
            self.id,
            GeoPoint::new(self.latitude, self.longitude),
            self.radius_meters,
        ))
    }
}

/// On-the-wire sample record. A missing timestamp means "now".
#[derive(Debug, Deserialize)]
struct SampleRecord {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
}

fn read_file(path: &Path) -> Result<String, CatalogError> {
    std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse and validate a JSON array of region records.
pub fn parse_regions(json: &str, path: &Path) -> Result<Vec<Region>, CatalogError> {
    let records: Vec<RegionRecord> =
        serde_json::from_str(json).map_err(|source| CatalogError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let mut seen = HashSet::new();
    let mut regions = Vec::with_capacity(records.len());
    for record in records {
        let region = record.into_region()?;
        if !seen.insert(region.id.clone()) {
            return Err(CatalogError::InvalidRegion {
                id: region.id,
                reason: "duplicate id".to_string(),
            });
        }
        regions.push(region);
    }
    Ok(regions)
}

/// Load regions from a JSON file.
pub fn load_regions(path: &Path) -> Result<Vec<Region>, CatalogError> {
    let regions = parse_regions(&read_file(path)?, path)?;
    tracing::info!(path = %path.display(), count = regions.len(), "Loaded regions");
    Ok(regions)
}

/// Load courts from a JSON file.
pub fn load_courts(path: &Path) -> Result<Vec<PointOfInterest>, CatalogError> {
    let courts: Vec<PointOfInterest> =
        serde_json::from_str(&read_file(path)?).map_err(|source| CatalogError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::info!(path = %path.display(), count = courts.len(), "Loaded courts");
    Ok(courts)
}

/// Parse one JSON-lines sample. Returns `Ok(None)` for blank lines.
pub fn parse_sample_line(line: &str, line_no: usize) -> Result<Option<PositionSample>, CatalogError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let record: SampleRecord =
        serde_json::from_str(line).map_err(|e| CatalogError::InvalidSample {
            line: line_no,
            reason: e.to_string(),
        })?;
    Ok(Some(PositionSample::with_timestamp(
        record.latitude,
        record.longitude,
        record.timestamp.unwrap_or_else(Utc::now),
    )))
}

/// Parse a JSON-lines stream of samples, one object per line.
///
/// Line numbers in errors are 1-based.
pub fn parse_samples<R: BufRead>(reader: R) -> Result<Vec<PositionSample>, CatalogError> {
    let mut samples = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| CatalogError::InvalidSample {
            line: idx + 1,
            reason: e.to_string(),
        })?;
        if let Some(sample) = parse_sample_line(&line, idx + 1)? {
            samples.push(sample);
        }
    }
    Ok(samples)
}
