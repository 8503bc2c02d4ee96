/*!
 * Tests for the ndstool helpers that do not need the tool itself
 */

use std::ffi::OsString;
use std::path::Path;

use anyhow::Result;
use mptpatch::errors::ToolError;
use mptpatch::rom_tools::{
    classify_rom_info, image_args, mess_dir, patched_rom_name, NdsTool, RomRegion, RomWorkspace,
};
use mptpatch::script::policy::{GenderMode, LocaleMode, ResolutionPolicy};

use crate::common;

#[test]
fn test_classifyRomInfo_shouldRecognizeBothRegions() {
    let us = "Header CRC  0x1234\nGame code   YIVE (NTR-YIVE-USA)\n";
    let ja = "Game code   YIVJ (NTR-YIVJ-JPN)";
    assert_eq!(classify_rom_info(us), Some(RomRegion::Us));
    assert_eq!(classify_rom_info(ja), Some(RomRegion::Ja));
    assert_eq!(classify_rom_info("Game code   AMCE (NTR-AMCE-USA)"), None);
}

#[test]
fn test_imageArgs_shouldListEveryImagePart() {
    let args = image_args(Path::new("roms/ja"));
    let expected: Vec<OsString> = [
        "-9", "roms/ja/arm9.bin", "-7", "roms/ja/arm7.bin", "-y9", "roms/ja/y9.bin", "-y7",
        "roms/ja/y7.bin", "-t", "roms/ja/banner.bin", "-h", "roms/ja/header.bin", "-d",
        "roms/ja/data", "-y", "roms/ja/overlay",
    ]
    .iter()
    .map(|part| Path::new(part).as_os_str().to_os_string())
    .collect();
    assert_eq!(args, expected);
}

#[test]
fn test_messDir_shouldPointAtLanguageScripts() {
    assert_eq!(
        mess_dir(Path::new("roms/us"), "en"),
        Path::new("roms/us/data/data/MESS/en")
    );
}

#[test]
fn test_patchedRomName_shouldDescribeRun() {
    let policy = ResolutionPolicy::new(GenderMode::Both, "Solo", LocaleMode::NameEmbedded).unwrap();
    assert_eq!(
        patched_rom_name(&policy),
        "Dragon Quest IV Party Chat Patched [yuusha=Solo gender=b lang=ja].nds"
    );
    assert_eq!(
        patched_rom_name(&ResolutionPolicy::default()),
        "Dragon Quest IV Party Chat Patched [yuusha= gender=n lang=en].nds"
    );
}

#[test]
fn test_locate_withMissingTool_shouldGiveGuidance() {
    let result = NdsTool::locate("/definitely/not/a/real/ndstool");
    match result {
        Err(ToolError::ToolNotFound { guidance, .. }) => assert!(guidance.contains("--manual")),
        Err(other) => panic!("Expected ToolNotFound, got {:?}", other),
        // a local ndstool/ndstool checkout satisfies the fallback
        Ok(tool) => assert!(tool.program().starts_with("ndstool")),
    }
}

#[test]
fn test_findRoms_withEmptyDir_shouldFindNothing() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let workspace = RomWorkspace::new(NdsTool::new("ndstool"), temp_dir.path().join("roms"));
    let roms = workspace.find_roms()?;
    assert!(roms.us.is_none());
    assert!(roms.ja.is_none());
    Ok(())
}

#[test]
fn test_findRoms_withExtractedTrees_shouldIgnoreNestedImages() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let roms_dir = temp_dir.path().join("roms");
    common::create_test_file(&roms_dir.join("us"), "copy.nds", b"not a rom")?;
    common::create_test_file(&roms_dir.join("repack"), "old.nds", b"not a rom")?;

    // identifying either image would fail, there is no tool at this path
    let workspace = RomWorkspace::new(NdsTool::new(temp_dir.path().join("no-such-ndstool")), &roms_dir);
    let roms = workspace.find_roms()?;
    assert!(roms.us.is_none());
    assert!(roms.ja.is_none());
    Ok(())
}

#[test]
fn test_extract_withoutRoms_shouldReportMissingJaRom() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let workspace = RomWorkspace::new(NdsTool::new("ndstool"), temp_dir.path().join("roms"));

    let error = workspace.extract(false).unwrap_err();
    match error.downcast_ref::<ToolError>() {
        Some(ToolError::RomMissing { region, .. }) => assert_eq!(region, "JA"),
        other => panic!("Expected RomMissing, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_stageUsScripts_shouldCopyWithoutOverwriting() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let roms = temp_dir.path().join("roms");
    let workspace = RomWorkspace::new(NdsTool::new("ndstool"), &roms);
    let us_scripts = mess_dir(&workspace.region_dir(RomRegion::Us), "en");
    common::create_test_file(&us_scripts, "b0200000.mpt", b"us one")?;
    common::create_test_file(&us_scripts, "b0801000.mpt", b"us two")?;

    let input = temp_dir.path().join("en");
    common::create_test_file(&input, "b0801000.mpt", b"mine")?;

    let staged = workspace.stage_us_scripts(&input)?;
    assert_eq!(staged, 1);
    assert_eq!(std::fs::read(input.join("b0200000.mpt"))?, b"us one".to_vec());
    assert_eq!(std::fs::read(input.join("b0801000.mpt"))?, b"mine".to_vec());
    Ok(())
}
