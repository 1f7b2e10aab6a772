//! Filtered proximity search.

use crate::geo::{distance_km, GeoPoint};

use super::model::PointOfInterest;

/// Search constraints. Every `None` (or empty query) means "no constraint";
/// all active constraints must hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilters {
    /// Case-insensitive substring of the court name.
    pub query: Option<String>,
    /// Required status label (exact match).
    pub status: Option<String>,
    /// Required indoor flag.
    pub indoor: Option<bool>,
    /// Required open flag.
    pub is_open: Option<bool>,
    /// Maximum distance from the reference point, in kilometers.
    ///
    /// Ignored when the search has no reference point.
    pub max_distance_km: Option<f64>,
}

impl SearchFilters {
    /// Filters with no constraints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require the name to contain `query`.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Require an exact status label.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Require the indoor flag to equal `indoor`.
    pub fn with_indoor(mut self, indoor: bool) -> Self {
        self.indoor = Some(indoor);
        self
    }

    /// Require the open flag to equal `is_open`.
    pub fn with_open(mut self, is_open: bool) -> Self {
        self.is_open = Some(is_open);
        self
    }

    /// Limit results to `km` from the reference point.
    pub fn with_max_distance_km(mut self, km: f64) -> Self {
        self.max_distance_km = Some(km);
        self
    }

    /// Lowercased query, or `None` when it is empty or all whitespace.
    ///
    /// Non-empty queries keep their surrounding whitespace.
    fn normalized_query(&self) -> Option<String> {
        self.query
            .as_deref()
            .filter(|q| !q.trim().is_empty())
            .map(str::to_lowercase)
    }

    /// Every predicate except distance, in order: name, status, indoor, open.
    fn matches_attributes(&self, poi: &PointOfInterest, query: Option<&str>) -> bool {
        if let Some(q) = query {
            if !poi.name.to_lowercase().contains(q) {
                return false;
            }
        }
        if let Some(status) = &self.status {
            if poi.status.as_ref() != Some(status) {
                return false;
            }
        }
        if let Some(indoor) = self.indoor {
            if poi.indoor != Some(indoor) {
                return false;
            }
        }
        if let Some(is_open) = self.is_open {
            if poi.is_open != Some(is_open) {
                return false;
            }
        }
        true
    }
}

/// A search hit with its distance from the reference point.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedPoi {
    /// The matching court.
    pub poi: PointOfInterest,
    /// Distance in kilometers; `None` when the search had no reference point.
    pub distance_km: Option<f64>,
}

/// Filter `pois` and order them by distance from `reference`.
///
/// With a reference point, results are sorted ascending by distance and
/// equal distances keep their input order. Without one, results keep input
/// order and `max_distance_km` is not applied.
pub fn search_ranked(
    filters: &SearchFilters,
    reference: Option<GeoPoint>,
    pois: &[PointOfInterest],
) -> Vec<RankedPoi> {
    let query = filters.normalized_query();

    let mut hits: Vec<RankedPoi> = pois
        .iter()
        .filter(|poi| filters.matches_attributes(poi, query.as_deref()))
        .filter_map(|poi| {
            let distance_km = reference.map(|r| distance_km(r, poi.location()));
            if let (Some(d), Some(max)) = (distance_km, filters.max_distance_km) {
                if d > max {
                    return None;
                }
            }
            Some(RankedPoi {
                poi: poi.clone(),
                distance_km,
            })
        })
        .collect();

    if reference.is_some() {
        // sort_by is stable: ties keep input order
        hits.sort_by(|a, b| {
            let da = a.distance_km.unwrap_or(f64::INFINITY);
            let db = b.distance_km.unwrap_or(f64::INFINITY);
            da.total_cmp(&db)
        });
    }

    tracing::debug!(
        candidates = pois.len(),
        matches = hits.len(),
        has_reference = reference.is_some(),
        "Court search"
    );

    hits
}

/// Filter `pois` and order them by distance from `reference`.
///
/// See [`search_ranked`] for ordering rules.
pub fn search(
    filters: &SearchFilters,
    reference: Option<GeoPoint>,
    pois: &[PointOfInterest],
) -> Vec<PointOfInterest> {
    search_ranked(filters, reference, pois)
        .into_iter()
        .map(|hit| hit.poi)
        .collect()
}
