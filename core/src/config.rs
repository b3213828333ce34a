//! Parser configuration.
//!
//! Controls capacities, the subcommand index size, implicit help flags and
//! the handling of a bare `--` token. Every field has a default, so a
//! configuration file only needs the fields it changes.
//!
//! # Example YAML
//!
//! ```yaml
//! double_dash: end_of_flags
//! implicit_help: true
//! help_short: h
//! index_capacity: 128
//! limits:
//!   max_flags: 64
//!   max_positionals: 8
//!   max_subcommands: 32
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::index::MAX_INDEX_CAPACITY;

/// Default number of buckets in the subcommand index.
pub const DEFAULT_INDEX_CAPACITY: usize = 64;

/// Behavior of a bare `--` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoubleDash {
    /// Consume and ignore the token; later tokens are scanned normally.
    #[default]
    Skip,
    /// Treat every later token as positional.
    EndOfFlags,
}

/// Per-scope declaration capacities.
///
/// # Examples
///
/// ```
/// # use flagscope_core::Limits;
/// let limits = Limits::default();
/// assert_eq!(limits.max_flags, 256);
/// assert_eq!(limits.max_subcommands, 64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum flags per scope, implicit `help` included.
    pub max_flags: usize,
    /// Maximum positional arguments per scope.
    pub max_positionals: usize,
    /// Maximum number of subcommands.
    pub max_subcommands: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_flags: 256,
            max_positionals: 256,
            max_subcommands: 64,
        }
    }
}

/// Top-level parser configuration.
///
/// # Examples
///
/// ```
/// use flagscope_core::{DoubleDash, ParserConfig};
///
/// let config = ParserConfig::from_yaml_str("double_dash: end_of_flags\n").unwrap();
/// assert_eq!(config.double_dash, DoubleDash::EndOfFlags);
/// assert!(config.implicit_help);
/// assert_eq!(config.help_short, Some('h'));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// What a bare `--` does.
    pub double_dash: DoubleDash,
    /// Declare a boolean `help` flag in every scope.
    pub implicit_help: bool,
    /// Short name of the implicit `help` flag.
    pub help_short: Option<char>,
    /// Initial bucket count of the subcommand index (power of two).
    pub index_capacity: usize,
    /// Declaration capacities.
    pub limits: Limits,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            double_dash: DoubleDash::Skip,
            implicit_help: true,
            help_short: Some('h'),
            index_capacity: DEFAULT_INDEX_CAPACITY,
            limits: Limits::default(),
        }
    }
}

impl ParserConfig {
    /// Loads configuration from a YAML or JSON file, chosen by extension.
    ///
    /// Files ending in `.json` are read as JSON; anything else as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](ConfigError::IoError) if the file cannot be read,
    /// a format error if parsing fails, or
    /// [`Invalid`](ConfigError::Invalid) if validation fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let reader = BufReader::new(std::fs::File::open(path)?);
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let config: Self = if is_json {
            serde_json::from_reader(reader)?
        } else {
            serde_yaml::from_reader(reader)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let writer = BufWriter::new(std::fs::File::create(path)?);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Parses and validates a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the index capacity is a usable power of two and that
    /// the flag limit leaves room for the implicit `help` flag.
    ///
    /// # Examples
    ///
    /// ```
    /// use flagscope_core::ParserConfig;
    ///
    /// let mut config = ParserConfig::default();
    /// assert!(config.validate().is_ok());
    ///
    /// config.index_capacity = 100;
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        let capacity = self.index_capacity;
        if capacity == 0 || !capacity.is_power_of_two() {
            return Err(ConfigError::Invalid(format!(
                "index_capacity must be a power of two, got {capacity}"
            )));
        }
        if capacity > MAX_INDEX_CAPACITY {
            return Err(ConfigError::Invalid(format!(
                "index_capacity must not exceed {MAX_INDEX_CAPACITY}, got {capacity}"
            )));
        }
        if self.implicit_help && self.limits.max_flags == 0 {
            return Err(ConfigError::Invalid(
                "limits.max_flags must leave room for the implicit help flag".to_string(),
            ));
        }
        Ok(())
    }
}
