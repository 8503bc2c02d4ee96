use anyhow::{Context, Result};
use log::{warn, LevelFilter};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::errors::ConfigError;
use crate::script::policy::{GenderMode, LocaleMode, ResolutionPolicy};
use crate::script::reflow::ReflowTable;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Gender mode: neutral, masculine, feminine or both (n/m/f/b)
    #[serde(default = "default_gender")]
    pub gender: String,

    /// Hero name written over the name placeholder, empty to keep it
    #[serde(default)]
    pub hero_name: String,

    /// ROM language the patched scripts target: en or ja
    #[serde(default = "default_locale")]
    pub locale: String,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Working directories and tools
    #[serde(default)]
    pub paths: PathsConfig,

    /// Line wrapping profiles
    #[serde(default)]
    pub reflow: ReflowTable,
}

/// Directory and tool locations
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PathsConfig {
    // @field: Directory holding the source .mpt files
    #[serde(default = "default_input_dir")]
    pub input_dir: String,

    // @field: Directory patched files are written under, per language
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    // @field: Directory holding the .nds images
    #[serde(default = "default_roms_dir")]
    pub roms_dir: String,

    // @field: ndstool command or path
    #[serde(default = "default_ndstool")]
    pub ndstool: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_dir: default_input_dir(),
            output_dir: default_output_dir(),
            roms_dir: default_roms_dir(),
            ndstool: default_ndstool(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    // @returns: Matching filter for the log facade
    pub fn to_level_filter(&self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
        }
    }
}

fn default_gender() -> String {
    GenderMode::default().to_string()
}

fn default_locale() -> String {
    LocaleMode::default().code().to_string()
}

fn default_input_dir() -> String {
    "en".to_string()
}

fn default_output_dir() -> String {
    "out".to_string()
}

fn default_roms_dir() -> String {
    "roms".to_string()
}

fn default_ndstool() -> String {
    "ndstool".to_string()
}

impl Config {
    /// Load a configuration file, writing the defaults there first if it is missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let file = File::open(path)
                .context(format!("Failed to open config file: {}", path.display()))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .context(format!("Failed to parse config file: {}", path.display()))?;
            Ok(config)
        } else {
            warn!("Config file not found at '{}', creating default config.", path.display());
            let config = Config::default();
            config.save(path)?;
            Ok(config)
        }
    }

    /// Write the configuration as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, config_json)
            .context(format!("Failed to write config to file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.resolution_policy().map(|_| ())
    }

    /// Build the run-wide policy from the validated settings
    pub fn resolution_policy(&self) -> Result<ResolutionPolicy, ConfigError> {
        let gender_mode: GenderMode = self.gender.parse()?;
        let locale_mode: LocaleMode = self.locale.parse()?;
        ResolutionPolicy::new(gender_mode, self.hero_name.clone(), locale_mode)
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            gender: default_gender(),
            hero_name: String::new(),
            locale: default_locale(),
            log_level: LogLevel::default(),
            paths: PathsConfig::default(),
            reflow: ReflowTable::default(),
        }
    }
}
