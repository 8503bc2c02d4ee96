/*!
 * Tests for application configuration functionality
 */

use anyhow::Result;
use mptpatch::app_config::{Config, LogLevel, PathsConfig};
use mptpatch::errors::ConfigError;
use mptpatch::script::policy::{GenderMode, LocaleMode};
use mptpatch::script::reflow::{ReflowConfig, BATTLE_FILE};

use crate::common;

/// Test default configuration values
#[test]
fn test_defaultConfig_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.gender, "neutral");
    assert_eq!(config.hero_name, "");
    assert_eq!(config.locale, "en");
    assert_eq!(config.log_level, LogLevel::Info);
    assert_eq!(config.paths, PathsConfig::default());
    assert_eq!(config.paths.input_dir, "en");
    assert_eq!(config.paths.output_dir, "out");
    assert_eq!(config.paths.roms_dir, "roms");
    assert_eq!(config.paths.ndstool, "ndstool");

    assert_eq!(config.reflow.default, ReflowConfig::dialogue());
    assert_eq!(config.reflow.for_file(BATTLE_FILE), &ReflowConfig::battle());
}

#[test]
fn test_resolutionPolicy_withValidSettings_shouldBuildPolicy() {
    let mut config = Config::default();
    config.gender = "b".to_string();
    config.hero_name = "Solo".to_string();
    config.locale = "ja".to_string();

    let policy = config.resolution_policy().unwrap();
    assert_eq!(policy.gender_mode(), GenderMode::Both);
    assert_eq!(policy.hero_name(), "Solo");
    assert_eq!(policy.locale_mode(), LocaleMode::NameEmbedded);
}

#[test]
fn test_validate_withBadSettings_shouldReportEachError() {
    let mut config = Config::default();
    config.gender = "x".to_string();
    assert_eq!(
        config.validate(),
        Err(ConfigError::InvalidGenderMode("x".to_string()))
    );

    let mut config = Config::default();
    config.locale = "fr".to_string();
    assert_eq!(
        config.validate(),
        Err(ConfigError::InvalidLocaleMode("fr".to_string()))
    );

    let mut config = Config::default();
    config.hero_name = "Psaro the Manslayer".to_string();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::HeroNameTooLong { max: 7, .. })
    ));
}

#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let config = Config::load_or_create(&path)?;
    assert_eq!(config, Config::default());
    assert!(path.exists());

    let reloaded = Config::load_or_create(&path)?;
    assert_eq!(reloaded, config);
    Ok(())
}

#[test]
fn test_loadOrCreate_withPartialFile_shouldFillDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        br#"{
            "gender": "f",
            "hero_name": "Ragnar",
            "log_level": "debug",
            "reflow": { "files": [ { "file": "b0200000.mpt", "line_limit": 30 } ] }
        }"#,
    )?;

    let config = Config::load_or_create(&path)?;
    assert_eq!(config.gender, "f");
    assert_eq!(config.hero_name, "Ragnar");
    assert_eq!(config.locale, "en");
    assert_eq!(config.log_level, LogLevel::Debug);
    assert_eq!(config.paths.input_dir, "en");

    let profile = config.reflow.for_file("b0200000.mpt");
    assert_eq!(profile.line_limit, 30);
    assert!(profile.force);
    assert!(!profile.trailing_newline);
    assert_eq!(config.reflow.for_file("b0300000.mpt"), &ReflowConfig::dialogue());

    assert_eq!(config.resolution_policy()?.gender_mode(), GenderMode::Feminine);
    Ok(())
}

#[test]
fn test_loadOrCreate_withInvalidJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", b"{ not json")?;

    let result = Config::load_or_create(&path);
    assert!(result.is_err());
    assert!(format!("{:#}", result.unwrap_err()).contains("Failed to parse config file"));
    Ok(())
}

#[test]
fn test_logLevel_toLevelFilter_shouldMatch() {
    assert_eq!(LogLevel::Error.to_level_filter(), log::LevelFilter::Error);
    assert_eq!(LogLevel::Debug.to_level_filter(), log::LevelFilter::Debug);
    assert_eq!(LogLevel::Trace.to_level_filter(), log::LevelFilter::Trace);
}
