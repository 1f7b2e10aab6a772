//! `distance` command.

use courtwatch::geo::{distance_km, format_distance};

use super::common::parse_point;
use crate::error::CliError;

/// Print the haversine distance between two points.
pub fn run(from: &str, to: &str) -> Result<(), CliError> {
    let a = parse_point(from)?;
    let b = parse_point(to)?;
    let km = distance_km(a, b);
    println!("{} ({:.6} km)", format_distance(km), km);
    Ok(())
}
