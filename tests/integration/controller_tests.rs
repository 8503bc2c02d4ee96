/*!
 * Controller runs over temporary directories
 */

use anyhow::Result;
use std::fs;
use std::path::Path;

use mptpatch::app_controller::{Controller, RunOptions};
use mptpatch::errors::{ConfigError, ScriptError, ToolError};

use crate::common;

fn write_inputs(root: &Path) -> Result<()> {
    common::init_test_logging();
    let input_dir = root.join("en");
    common::create_test_file(&input_dir, "b0200000.mpt", &common::sample_script())?;
    common::create_test_file(
        &input_dir,
        "b0801000.mpt",
        &common::segment("", "A slime appears! ", "@c0@"),
    )?;
    // ignored: not a script
    common::create_test_file(&input_dir, "notes.txt", b"@a@bnot a script@c0@")?;
    Ok(())
}

#[test]
fn test_run_manualMode_shouldPatchEveryScript() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    write_inputs(temp_dir.path())?;

    let controller = Controller::with_config(common::test_config(temp_dir.path()))?;
    let summary = controller.run(&RunOptions {
        file: None,
        manual: true,
    })?;

    assert_eq!(summary.files_patched, 2);
    assert_eq!(summary.output_dir, temp_dir.path().join("out").join("en"));
    assert!(summary.rom.is_none());

    let original = common::sample_script();
    let patched = fs::read(summary.output_dir.join("b0200000.mpt"))?;
    assert_eq!(patched.len(), original.len());
    assert_ne!(patched, original);

    let battle = fs::read(summary.output_dir.join("b0801000.mpt"))?;
    assert_eq!(battle, b"@a@bA slime appears!\n@c0@".to_vec());
    assert!(!summary.output_dir.join("notes.txt").exists());
    Ok(())
}

#[test]
fn test_run_nestedScripts_shouldNotBePatched() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    write_inputs(temp_dir.path())?;
    let nested = temp_dir.path().join("en").join("backup");
    common::create_test_file(&nested, "b0200000.mpt", b"@a@bstale copy@c0@")?;
    common::create_test_file(&nested, "b0300000.mpt", b"@a@bstale copy@c0@")?;

    let controller = Controller::with_config(common::test_config(temp_dir.path()))?;
    let summary = controller.run(&RunOptions {
        file: None,
        manual: true,
    })?;

    assert_eq!(summary.files_patched, 2);
    assert!(!summary.output_dir.join("b0300000.mpt").exists());
    let patched = fs::read(summary.output_dir.join("b0200000.mpt"))?;
    assert_eq!(patched.len(), common::sample_script().len());
    Ok(())
}

#[test]
fn test_run_singleFile_shouldSkipRomToolingAndOtherFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    write_inputs(temp_dir.path())?;

    // no ndstool is configured, so this only works because --file implies manual mode
    let controller = Controller::with_config(common::test_config(temp_dir.path()))?;
    let summary = controller.run(&RunOptions {
        file: Some("b0801000.mpt".to_string()),
        manual: false,
    })?;

    assert_eq!(summary.files_patched, 1);
    assert!(summary.output_dir.join("b0801000.mpt").exists());
    assert!(!summary.output_dir.join("b0200000.mpt").exists());
    Ok(())
}

#[test]
fn test_run_jaLocale_shouldWriteToJaDirectory() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    write_inputs(temp_dir.path())?;

    let mut config = common::test_config(temp_dir.path());
    config.locale = "ja".to_string();
    let controller = Controller::with_config(config)?;
    let summary = controller.run(&RunOptions {
        file: None,
        manual: true,
    })?;

    assert_eq!(summary.output_dir, temp_dir.path().join("out").join("ja"));
    let patched = fs::read(summary.output_dir.join("b0200000.mpt"))?;
    assert_eq!(patched.len(), common::sample_script().len());
    Ok(())
}

#[test]
fn test_run_previousOutput_shouldBeCleared() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    write_inputs(temp_dir.path())?;
    let stale = common::create_test_file(&temp_dir.path().join("out").join("en"), "stale.mpt", b"old")?;

    let controller = Controller::with_config(common::test_config(temp_dir.path()))?;
    controller.run(&RunOptions {
        file: None,
        manual: true,
    })?;

    assert!(!stale.exists());
    Ok(())
}

#[test]
fn test_run_missingInputDirectory_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::with_config(common::test_config(temp_dir.path()))?;

    let result = controller.run(&RunOptions {
        file: None,
        manual: true,
    });

    let error = result.unwrap_err();
    assert!(error.to_string().contains("Input directory does not exist"));
    Ok(())
}

#[test]
fn test_run_missingSingleFile_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    write_inputs(temp_dir.path())?;
    let controller = Controller::with_config(common::test_config(temp_dir.path()))?;

    let result = controller.run(&RunOptions {
        file: Some("b9999999.mpt".to_string()),
        manual: true,
    });
    assert!(result.is_err());
    Ok(())
}

#[test]
fn test_run_overflowingScript_shouldAbortRun() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(
        &temp_dir.path().join("en"),
        "b0200000.mpt",
        &common::segment("", "they's", "@c0@"),
    )?;
    let controller = Controller::with_config(common::test_config(temp_dir.path()))?;

    let error = controller
        .run(&RunOptions {
            file: None,
            manual: true,
        })
        .unwrap_err();

    assert!(matches!(
        error.downcast_ref::<ScriptError>(),
        Some(ScriptError::SegmentOverflow { .. })
    ));
    Ok(())
}

#[test]
fn test_run_automaticWithoutNdstool_shouldReportMissingTool() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    write_inputs(temp_dir.path())?;
    let controller = Controller::with_config(common::test_config(temp_dir.path()))?;

    let error = controller.run(&RunOptions::default()).unwrap_err();

    assert!(matches!(
        error.downcast_ref::<ToolError>(),
        Some(ToolError::ToolNotFound { .. })
    ));
    assert!(error.to_string().contains("--manual"));
    Ok(())
}

#[test]
fn test_withConfig_invalidHeroName_shouldFail() {
    let temp_dir = common::create_temp_dir().unwrap();
    let mut config = common::test_config(temp_dir.path());
    config.hero_name = "Psaro the Manslayer".to_string();

    let error = Controller::with_config(config).err().unwrap();
    assert!(matches!(
        error.downcast_ref::<ConfigError>(),
        Some(ConfigError::HeroNameTooLong { .. })
    ));
}

#[test]
fn test_withConfig_invalidGender_shouldFail() {
    let temp_dir = common::create_temp_dir().unwrap();
    let mut config = common::test_config(temp_dir.path());
    config.gender = "x".to_string();

    assert!(Controller::with_config(config).is_err());
}
