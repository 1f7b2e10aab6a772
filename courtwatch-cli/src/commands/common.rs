//! Helpers shared across CLI commands.

use std::path::PathBuf;

use courtwatch::config::{ConfigFile, ConfigKey};
use courtwatch::geo::GeoPoint;

use crate::error::CliError;

/// Pick a catalog file: the CLI argument wins, then the config entry.
pub fn resolve_path(
    cli_value: Option<PathBuf>,
    config_value: Option<&PathBuf>,
    key: ConfigKey,
) -> Result<PathBuf, CliError> {
    cli_value.or_else(|| config_value.cloned()).ok_or_else(|| {
        CliError::Config(format!(
            "no file given. Pass it on the command line or set it with 'courtwatch config set {} <path>'",
            key
        ))
    })
}

/// Courts file from args or config.
pub fn courts_path(cli_value: Option<PathBuf>, config: &ConfigFile) -> Result<PathBuf, CliError> {
    resolve_path(
        cli_value,
        config.catalog.courts.as_ref(),
        ConfigKey::CatalogCourts,
    )
}

/// Regions file from args or config.
pub fn regions_path(cli_value: Option<PathBuf>, config: &ConfigFile) -> Result<PathBuf, CliError> {
    resolve_path(
        cli_value,
        config.catalog.regions.as_ref(),
        ConfigKey::CatalogRegions,
    )
}

/// Parse a `LAT,LON` argument.
pub fn parse_point(s: &str) -> Result<GeoPoint, CliError> {
    s.parse::<GeoPoint>().map_err(CliError::InvalidArgument)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_path_takes_precedence() {
        let mut config = ConfigFile::default();
        config.catalog.courts = Some(PathBuf::from("/config/courts.json"));

        let path = courts_path(Some(PathBuf::from("/cli/courts.json")), &config).unwrap();
        assert_eq!(path, PathBuf::from("/cli/courts.json"));

        let path = courts_path(None, &config).unwrap();
        assert_eq!(path, PathBuf::from("/config/courts.json"));
    }

    #[test]
    fn test_missing_path_names_config_key() {
        let err = regions_path(None, &ConfigFile::default()).unwrap_err();
        assert!(err.to_string().contains("catalog.regions"));
    }

    #[test]
    fn test_parse_point() {
        let p = parse_point("1.28,-103.86").unwrap();
        assert_eq!(p, GeoPoint::new(1.28, -103.86));
        assert!(matches!(parse_point("x"), Err(CliError::InvalidArgument(_))));
    }
}
