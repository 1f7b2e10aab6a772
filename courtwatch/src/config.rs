//! User configuration file (`~/.courtwatch/config.ini`).
//!
//! ```ini
//! [catalog]
//! regions = /home/me/.courtwatch/regions.json
//! courts = /home/me/.courtwatch/courts.json
//!
//! [search]
//! max_distance_km = 5
//!
//! [logging]
//! level = info
//! file = /home/me/.courtwatch/courtwatch.log
//! ```
//!
//! A missing file yields defaults. The notification cooldown is fixed and
//! has no setting here.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ini::Ini;
use thiserror::Error;

/// Directory name under the home directory.
pub const CONFIG_DIR_NAME: &str = ".courtwatch";

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Errors from loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The home directory could not be determined.
    #[error("could not determine home directory")]
    NoHomeDir,

    /// Reading or parsing the INI file failed.
    #[error("failed to read config {}: {message}", path.display())]
    Read { path: PathBuf, message: String },

    /// Writing the INI file failed.
    #[error("failed to write config {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A value could not be parsed for its key.
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    /// Unknown `section.key`.
    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),
}

/// Default directory for CourtWatch files.
pub fn config_directory() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(CONFIG_DIR_NAME))
        .ok_or(ConfigError::NoHomeDir)
}

/// Default path of the configuration file.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_directory()?.join(CONFIG_FILE_NAME))
}

/// `[catalog]` section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogSettings {
    /// Region definitions (JSON).
    pub regions: Option<PathBuf>,
    /// Court catalog (JSON).
    pub courts: Option<PathBuf>,
}

/// `[search]` section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchSettings {
    /// Default max distance applied when a search has a reference point.
    pub max_distance_km: Option<f64>,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Level or `EnvFilter` directive.
    pub level: String,
    /// Optional log file.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            file: None,
        }
    }
}

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub catalog: CatalogSettings,
    pub search: SearchSettings,
    pub logging: LoggingSettings,
}

impl ConfigFile {
    /// Load from the default path, returning defaults if the file is absent.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path()?)
    }

    /// Load from `path`, returning defaults if the file is absent.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut config = Self::default();
        for key in ConfigKey::all() {
            if let Some(value) = ini.get_from(Some(key.section()), key.name()) {
                key.set(&mut config, value)?;
            }
        }
        Ok(config)
    }

    /// Save to the default path, creating the directory if needed.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path()?)
    }

    /// Save to `path`, creating parent directories if needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            let value = key.get(self);
            if !value.is_empty() {
                ini.with_section(Some(key.section())).set(key.name(), value);
            }
        }
        ini.write_to_file(path).map_err(write_err)
    }
}

/// A settable configuration key, written as `section.key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    CatalogRegions,
    CatalogCourts,
    SearchMaxDistanceKm,
    LoggingLevel,
    LoggingFile,
}

impl ConfigKey {
    /// Every key, in file order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::CatalogRegions,
            ConfigKey::CatalogCourts,
            ConfigKey::SearchMaxDistanceKm,
            ConfigKey::LoggingLevel,
            ConfigKey::LoggingFile,
        ]
    }

    /// INI section name.
    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::CatalogRegions | ConfigKey::CatalogCourts => "catalog",
            ConfigKey::SearchMaxDistanceKm => "search",
            ConfigKey::LoggingLevel | ConfigKey::LoggingFile => "logging",
        }
    }

    /// Key name within the section.
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::CatalogRegions => "regions",
            ConfigKey::CatalogCourts => "courts",
            ConfigKey::SearchMaxDistanceKm => "max_distance_km",
            ConfigKey::LoggingLevel => "level",
            ConfigKey::LoggingFile => "file",
        }
    }

    /// Current value as a string (empty when unset).
    pub fn get(&self, config: &ConfigFile) -> String {
        fn path(p: &Option<PathBuf>) -> String {
            p.as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        }

        match self {
            ConfigKey::CatalogRegions => path(&config.catalog.regions),
            ConfigKey::CatalogCourts => path(&config.catalog.courts),
            ConfigKey::SearchMaxDistanceKm => config
                .search
                .max_distance_km
                .map(|km| km.to_string())
                .unwrap_or_default(),
            ConfigKey::LoggingLevel => config.logging.level.clone(),
            ConfigKey::LoggingFile => path(&config.logging.file),
        }
    }

    /// Set a value from its string form. An empty string clears optional keys.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        let path = || (!value.is_empty()).then(|| PathBuf::from(value));

        match self {
            ConfigKey::CatalogRegions => config.catalog.regions = path(),
            ConfigKey::CatalogCourts => config.catalog.courts = path(),
            ConfigKey::SearchMaxDistanceKm => {
                config.search.max_distance_km = if value.is_empty() {
                    None
                } else {
                    let km = value.parse::<f64>().map_err(|e| self.invalid(value, e))?;
                    if !km.is_finite() || km <= 0.0 {
                        return Err(self.invalid(value, "must be a positive number"));
                    }
                    Some(km)
                };
            }
            ConfigKey::LoggingLevel => {
                config.logging.level = if value.is_empty() {
                    DEFAULT_LOG_LEVEL.to_string()
                } else {
                    value.to_string()
                };
            }
            ConfigKey::LoggingFile => config.logging.file = path(),
        }
        Ok(())
    }

    fn invalid(&self, value: &str, reason: impl fmt::Display) -> ConfigError {
        ConfigError::InvalidValue {
            key: self.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section(), self.name())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.to_string() == wanted)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}
