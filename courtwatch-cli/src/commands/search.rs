//! `search` and `suggest` commands.

use std::path::PathBuf;

use clap::Args;
use console::style;
use courtwatch::catalog::load_courts;
use courtwatch::config::ConfigFile;
use courtwatch::geo::{format_distance, GeoPoint};
use courtwatch::poi::{autocomplete, search_ranked, RankedPoi, SearchFilters};

use super::common::{courts_path, parse_point};
use crate::error::CliError;

/// Arguments for `courtwatch search`.
#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Case-insensitive text to look for in court names
    pub query: Option<String>,

    /// Court catalog (JSON); defaults to catalog.courts from config
    #[arg(long)]
    pub courts: Option<PathBuf>,

    /// Only courts with this status label (e.g. open, closed)
    #[arg(long)]
    pub status: Option<String>,

    /// Only indoor courts
    #[arg(long, conflicts_with = "outdoor")]
    pub indoor: bool,

    /// Only outdoor courts
    #[arg(long)]
    pub outdoor: bool,

    /// Only courts that are open now
    #[arg(long)]
    pub open: bool,

    /// Maximum distance in km (needs --near); defaults to search.max_distance_km
    #[arg(long)]
    pub max_km: Option<f64>,

    /// Reference point as LAT,LON for distance sorting
    #[arg(long, allow_hyphen_values = true)]
    pub near: Option<String>,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `courtwatch suggest`.
#[derive(Debug, Args)]
pub struct SuggestArgs {
    /// Partial court name (at least 2 characters)
    pub query: String,

    /// Court catalog (JSON); defaults to catalog.courts from config
    #[arg(long)]
    pub courts: Option<PathBuf>,
}

/// Turn CLI arguments into search filters and an optional reference point.
pub fn build_filters(
    args: &SearchArgs,
    config: &ConfigFile,
) -> Result<(SearchFilters, Option<GeoPoint>), CliError> {
    let reference = args.near.as_deref().map(parse_point).transpose()?;

    if let Some(km) = args.max_km {
        if !km.is_finite() || km <= 0.0 {
            return Err(CliError::InvalidArgument(format!(
                "--max-km must be positive, got {}",
                km
            )));
        }
    }

    let filters = SearchFilters {
        query: args.query.clone(),
        status: args.status.clone(),
        indoor: match (args.indoor, args.outdoor) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        },
        is_open: args.open.then_some(true),
        max_distance_km: args.max_km.or(config.search.max_distance_km),
    };

    if reference.is_none() && args.max_km.is_some() {
        tracing::warn!("--max-km has no effect without --near");
    }

    Ok((filters, reference))
}

/// Run `courtwatch search`.
pub fn run_search(args: SearchArgs, config: &ConfigFile) -> Result<(), CliError> {
    let (filters, reference) = build_filters(&args, config)?;
    let courts = load_courts(&courts_path(args.courts.clone(), config)?)?;

    let results = search_ranked(&filters, reference, &courts);

    if args.json {
        let pois: Vec<_> = results.iter().map(|r| &r.poi).collect();
        let json = serde_json::to_string_pretty(&pois)
            .map_err(|e| CliError::Runtime(format!("failed to encode results: {}", e)))?;
        println!("{}", json);
        return Ok(());
    }

    if results.is_empty() {
        println!("No courts match.");
        return Ok(());
    }

    for (idx, hit) in results.iter().enumerate() {
        println!("{}", format_hit(idx + 1, hit));
    }
    println!();
    println!(
        "{} of {} courts{}",
        results.len(),
        courts.len(),
        if reference.is_some() {
            ", nearest first"
        } else {
            ""
        }
    );

    Ok(())
}

fn format_hit(rank: usize, hit: &RankedPoi) -> String {
    let poi = &hit.poi;
    let mut line = format!("{:>3}. {}", rank, style(&poi.name).bold());

    if let Some(km) = hit.distance_km {
        line.push_str(&format!("  {}", style(format_distance(km)).cyan()));
    }
    if let Some(status) = &poi.status {
        line.push_str(&format!("  [{}]", status));
    }
    if let Some(rating) = poi.rating {
        line.push_str(&format!("  ★ {:.1}", rating));
    }
    if let Some(occupancy) = poi.occupancy {
        line.push_str(&format!("  {} here", occupancy));
    }
    if poi.indoor == Some(true) {
        line.push_str("  indoor");
    }
    if let Some(address) = &poi.address {
        line.push_str(&format!("\n     {}", style(address).dim()));
    }
    line
}

/// Run `courtwatch suggest`.
pub fn run_suggest(args: SuggestArgs, config: &ConfigFile) -> Result<(), CliError> {
    let courts = load_courts(&courts_path(args.courts, config)?)?;

    for suggestion in autocomplete(&args.query, &courts) {
        if suggestion.description.is_empty() {
            println!("{}", suggestion.label);
        } else {
            println!("{}  {}", suggestion.label, style(&suggestion.description).dim());
        }
    }

    Ok(())
}
