use std::{
    cell::OnceCell,
    collections::BTreeMap,
    io,
    path::{Path, PathBuf},
    str::FromStr,
};

use crate::domain::tokenizer::{DEFAULT_PROTECTED, Tokenizer};

/// Where the properties file is looked for when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = "./config/ComplianceMatrixConverter.properties";

/// Keys recognised in the properties file.
pub mod keys {
    /// Enables debug logging (`true`/`false`).
    pub const DEBUG: &str = "DEBUG";
    /// Destination used when no output file is given on the command line.
    pub const OUTPUT_FILE: &str = "complianceMatrixOutputFile";
    /// Extension given to a destination derived from the source path.
    pub const EXTENSION: &str = "complianceMatrixExtension";
    /// Comma-separated abbreviations whose periods never end a sentence.
    pub const PROTECTED_ABBREVIATIONS: &str = "protectedAbbreviations";
}

/// Extension of a derived destination unless configured otherwise.
pub const DEFAULT_EXTENSION: &str = "csv";

/// Settings read from a `key=value` properties file.
///
/// Getters take a default which is returned when the key is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    properties: BTreeMap<String, String>,
}

impl Config {
    /// Loads the configuration from a properties file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if the file does not exist and
    /// [`ConfigError::Io`] if it cannot be read.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        tracing::debug!("Reading properties file {}", path.display());

        let content = std::fs::read_to_string(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => ConfigError::NotFound {
                path: path.to_path_buf(),
            },
            _ => ConfigError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;

        Ok(Self::parse(&content))
    }

    /// Parses properties from text.
    ///
    /// Each line is split at its first `=` and both sides are trimmed. Blank
    /// lines, lines without `=` and lines starting with `#` are skipped. A
    /// repeated key keeps its last value.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let properties = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.starts_with('#'))
            .filter_map(|line| line.split_once('='))
            .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
            .collect();

        Self { properties }
    }

    /// Iterates over all properties in key order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Returns the raw value stored for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Returns the value for `key`, or `default` if it is absent.
    #[must_use]
    pub fn get_string(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or(default).to_string()
    }

    /// Returns the boolean value for `key`.
    ///
    /// Only `true` and `false` (in any letter case) are recognised. Any other
    /// stored value is treated as though the key were absent.
    #[must_use]
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            Some(value) if value.eq_ignore_ascii_case("true") => true,
            Some(value) if value.eq_ignore_ascii_case("false") => false,
            Some(value) => {
                tracing::debug!("ignoring non-boolean value '{value}' for '{key}'");
                default
            }
            None => default,
        }
    }

    /// Returns the integer value for `key`, or `default` if it is absent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the stored value is not an
    /// integer.
    pub fn get_int(&self, key: &str, default: i64) -> Result<i64, ConfigError> {
        self.get_parsed(key, default, "an integer")
    }

    /// Returns the floating point value for `key`, or `default` if it is
    /// absent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the stored value is not a
    /// number.
    pub fn get_float(&self, key: &str, default: f64) -> Result<f64, ConfigError> {
        self.get_parsed(key, default, "a number")
    }

    fn get_parsed<T: FromStr>(
        &self,
        key: &str,
        default: T,
        expected: &'static str,
    ) -> Result<T, ConfigError> {
        self.get(key).map_or(Ok(default), |value| {
            value.parse().map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value: value.to_string(),
                expected,
            })
        })
    }

    /// Whether debug logging is enabled.
    #[must_use]
    pub fn debug(&self) -> bool {
        self.get_bool(keys::DEBUG, false)
    }

    /// The configured destination for the compliance matrix, if any.
    #[must_use]
    pub fn output_file(&self) -> Option<PathBuf> {
        self.get(keys::OUTPUT_FILE)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
    }

    /// The extension given to a destination derived from the source path.
    #[must_use]
    pub fn matrix_extension(&self) -> String {
        let extension = self.get_string(keys::EXTENSION, DEFAULT_EXTENSION);
        let extension = extension.trim_start_matches('.');
        if extension.is_empty() {
            DEFAULT_EXTENSION.to_string()
        } else {
            extension.to_string()
        }
    }

    /// Abbreviations whose periods are not sentence boundaries.
    #[must_use]
    pub fn protected_abbreviations(&self) -> Vec<String> {
        self.get(keys::PROTECTED_ABBREVIATIONS).map_or_else(
            || DEFAULT_PROTECTED.iter().map(ToString::to_string).collect(),
            |value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|abbreviation| !abbreviation.is_empty())
                    .map(ToString::to_string)
                    .collect()
            },
        )
    }

    /// A period tokenizer protecting the configured abbreviations.
    #[must_use]
    pub fn tokenizer(&self) -> Tokenizer {
        Tokenizer::default().with_protected(self.protected_abbreviations())
    }
}

/// Lazily loaded configuration.
///
/// The properties file is read on first access. Pointing the store at a
/// different file discards what was loaded, so the next access reads again.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    loaded: OnceCell<Config>,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_PATH)
    }
}

impl ConfigStore {
    /// Creates a store backed by the properties file at `path`.
    ///
    /// Nothing is read until a value is requested.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            loaded: OnceCell::new(),
        }
    }

    /// The backing properties file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Changes the backing properties file.
    ///
    /// If the path differs from the current one, any loaded configuration is
    /// discarded.
    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if path != self.path {
            self.path = path;
            self.loaded = OnceCell::new();
        }
    }

    /// Whether the backing file has been read.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded.get().is_some()
    }

    /// Returns the configuration, loading it first if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if the properties file cannot be read. A failed load
    /// is retried on the next call.
    pub fn config(&self) -> Result<&Config, ConfigError> {
        if let Some(config) = self.loaded.get() {
            return Ok(config);
        }
        let config = Config::load(&self.path)?;
        Ok(self.loaded.get_or_init(|| config))
    }

    /// See [`Config::get_string`].
    ///
    /// # Errors
    ///
    /// Returns an error if the properties file cannot be read.
    pub fn get_string(&self, key: &str, default: &str) -> Result<String, ConfigError> {
        Ok(self.config()?.get_string(key, default))
    }

    /// See [`Config::get_bool`].
    ///
    /// # Errors
    ///
    /// Returns an error if the properties file cannot be read.
    pub fn get_bool(&self, key: &str, default: bool) -> Result<bool, ConfigError> {
        Ok(self.config()?.get_bool(key, default))
    }

    /// See [`Config::get_int`].
    ///
    /// # Errors
    ///
    /// Returns an error if the properties file cannot be read or the value is
    /// not an integer.
    pub fn get_int(&self, key: &str, default: i64) -> Result<i64, ConfigError> {
        self.config()?.get_int(key, default)
    }

    /// See [`Config::get_float`].
    ///
    /// # Errors
    ///
    /// Returns an error if the properties file cannot be read or the value is
    /// not a number.
    pub fn get_float(&self, key: &str, default: f64) -> Result<f64, ConfigError> {
        self.config()?.get_float(key, default)
    }
}

/// Errors raised while loading or reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The properties file does not exist.
    #[error("configuration file not found: {}", path.display())]
    NotFound {
        /// The missing file.
        path: PathBuf,
    },

    /// The properties file could not be read.
    #[error("failed to read configuration file {}: {source}", path.display())]
    Io {
        /// The file being read.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// A stored value could not be converted to the requested type.
    #[error("invalid value '{value}' for '{key}': expected {expected}")]
    InvalidValue {
        /// The key looked up.
        key: String,
        /// The stored value.
        value: String,
        /// A description of the expected type.
        expected: &'static str,
    },
}
