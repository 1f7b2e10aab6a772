//! Name suggestions for partially typed queries.

use serde::Serialize;

use super::model::PointOfInterest;

/// Maximum number of suggestions returned.
pub const MAX_SUGGESTIONS: usize = 5;

/// Queries shorter than this (in characters, after trimming) get no suggestions.
pub const MIN_QUERY_CHARS: usize = 2;

/// One autocomplete suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    /// Id of the suggested court.
    pub id: String,
    /// Primary display text (court name).
    pub label: String,
    /// Secondary text (address, empty when unknown).
    pub description: String,
}

/// Suggest up to [`MAX_SUGGESTIONS`] courts whose name contains `query`.
///
/// Matching is a case-insensitive substring test. Suggestions follow the
/// order of `pois`; the first matches win and no relevance ranking is done.
pub fn autocomplete(query: &str, pois: &[PointOfInterest]) -> Vec<Suggestion> {
    let query = query.trim();
    if query.chars().count() < MIN_QUERY_CHARS {
        return Vec::new();
    }
    let needle = query.to_lowercase();

    pois.iter()
        .filter(|poi| poi.name.to_lowercase().contains(&needle))
        .take(MAX_SUGGESTIONS)
        .map(|poi| Suggestion {
            id: poi.id.clone(),
            label: poi.name.clone(),
            description: poi.address.clone().unwrap_or_default(),
        })
        .collect()
}
