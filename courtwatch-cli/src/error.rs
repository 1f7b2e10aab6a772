//! CLI error type.

use std::fmt;

use courtwatch::catalog::CatalogError;
use courtwatch::config::ConfigError;
use courtwatch::logging::LoggingError;

/// Errors surfaced to the user by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Configuration problem (missing file argument, bad key, ...).
    Config(String),

    /// Failed to load or save the configuration file.
    ConfigFile(ConfigError),

    /// Failed to load regions, courts or samples.
    Catalog(CatalogError),

    /// Failed to set up logging.
    Logging(LoggingError),

    /// Invalid command-line argument.
    InvalidArgument(String),

    /// Failed to create the Tokio runtime or a background task failed.
    Runtime(String),

    /// Failed to write output.
    Output(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ConfigFile(e) => write!(f, "Configuration file error: {}", e),
            CliError::Catalog(e) => write!(f, "Catalog error: {}", e),
            CliError::Logging(e) => write!(f, "Logging error: {}", e),
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            CliError::Runtime(msg) => write!(f, "Runtime error: {}", msg),
            CliError::Output(e) => write!(f, "Output error: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::Catalog(e) => Some(e),
            CliError::Logging(e) => Some(e),
            CliError::Output(e) => Some(e),
            CliError::Config(_) | CliError::InvalidArgument(_) | CliError::Runtime(_) => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<CatalogError> for CliError {
    fn from(e: CatalogError) -> Self {
        CliError::Catalog(e)
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Output(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_error_display() {
        let err = CliError::Config("no courts file".to_string());
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("no courts file"));
    }

    #[test]
    fn test_cli_error_from_catalog_error() {
        let catalog_err = CatalogError::InvalidSample {
            line: 3,
            reason: "bad".to_string(),
        };
        let cli_err: CliError = catalog_err.into();
        assert!(matches!(cli_err, CliError::Catalog(_)));
        assert!(std::error::Error::source(&cli_err).is_some());
    }
}
