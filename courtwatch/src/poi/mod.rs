//! Point-of-interest (court) catalog queries.
//!
//! - [`search`] / [`search_ranked`]: filter a court list and order it by
//!   distance from a reference point.
//! - [`autocomplete`]: name suggestions for a partially typed query.
//!
//! Both are pure functions over an in-memory slice and may be called
//! concurrently.

mod autocomplete;
mod model;
mod search;

pub use autocomplete::{autocomplete, Suggestion, MAX_SUGGESTIONS, MIN_QUERY_CHARS};
pub use model::PointOfInterest;
pub use search::{search, search_ranked, RankedPoi, SearchFilters};
