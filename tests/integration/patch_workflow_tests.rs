/*!
 * End-to-end tests for patching script files
 */

use anyhow::Result;
use mptpatch::errors::ScriptError;
use mptpatch::script::policy::{GenderMode, LocaleMode, ResolutionPolicy};
use mptpatch::script::reflow::ReflowTable;
use mptpatch::script::segmenter::{segments, ScriptPatcher};

use crate::common;

fn patcher(mode: GenderMode, name: &str, locale: LocaleMode) -> ScriptPatcher {
    let policy = ResolutionPolicy::new(mode, name, locale).unwrap();
    ScriptPatcher::new(policy, ReflowTable::default())
}

fn interiors(data: &[u8]) -> Vec<String> {
    segments(data)
        .unwrap()
        .iter()
        .map(|s| String::from_utf8_lossy(s.interior).trim_end().to_string())
        .collect()
}

#[test]
fn test_patchFile_neutralMode_shouldResolveEveryBlock() -> Result<()> {
    let data = common::sample_script();
    let patched = patcher(GenderMode::Neutral, "", LocaleMode::NametagExternal).patch_file("b0200000.mpt", &data)?;

    let lines = interiors(&patched);
    assert_eq!(
        lines,
        vec![
            "I bet they would love a nice long chat\nabout all the shops in town.",
            "We found %a00620 coins in the well, %a00090!",
            "the other person should rest.",
        ]
    );
    Ok(())
}

#[test]
fn test_patchFile_withHeroName_shouldInjectName() -> Result<()> {
    let data = common::sample_script();
    let patched = patcher(GenderMode::Masculine, "Solo", LocaleMode::NametagExternal).patch_file("b0200000.mpt", &data)?;

    let lines = interiors(&patched);
    assert_eq!(lines[0], "I bet he would love a nice long chat about\nall the shops in town.");
    assert_eq!(lines[1], "We found %a00620 coins in the well, Solo!");
    assert_eq!(lines[2], "the other guy should rest.");
    Ok(())
}

#[test]
fn test_patchFile_nameEmbeddedMode_shouldMoveSpeakerIntoText() -> Result<()> {
    let data = common::sample_script();
    let patched = patcher(GenderMode::Feminine, "", LocaleMode::NameEmbedded).patch_file("b0200000.mpt", &data)?;

    assert_eq!(patched.len(), data.len());
    let found = segments(&patched)?;
    assert!(found[0].nametag.is_empty());
    assert!(found[0].interior.starts_with(b"Maya*I bet she would"));
    assert!(found[1].interior.starts_with(b"Meena*We found"));
    // segments without a speaker are unchanged in layout
    assert!(found[2].interior.starts_with(b"the other girl"));
    Ok(())
}

#[test]
fn test_patchFile_battleMessages_shouldUseBattleProfile() -> Result<()> {
    let mut data = common::segment("", "A slime and a drakee appear! ", "@c0@");
    data.extend(common::segment(
        "",
        "The battle is won!\nEach party member receives 12 experience points.",
        "@c1@",
    ));

    let patched = patcher(GenderMode::Neutral, "", LocaleMode::NametagExternal).patch_file("b0801000.mpt", &data)?;
    let lines: Vec<Vec<u8>> = segments(&patched)?.iter().map(|s| s.interior.to_vec()).collect();

    assert_eq!(lines[0], b"A slime and a drakee appear!\n".to_vec());
    assert!(!lines[1].contains(&b'\n'));
    Ok(())
}

#[test]
fn test_patchFile_lineOverride_shouldUseHandAuthoredBreaks() -> Result<()> {
    let data = common::segment(
        "",
        "I'll take that %a00100 off your hands for %a00620 gold coins. Okay?   ",
        "@c0@",
    );
    let patched = patcher(GenderMode::Neutral, "", LocaleMode::NametagExternal).patch_file("b0600000.mpt", &data)?;
    assert_eq!(
        interiors(&patched),
        vec!["I'll take that %a00100 off your\nhands for %a00620 gold coins. Okay?"]
    );
    Ok(())
}

#[test]
fn test_patchFile_overflowingSegment_shouldAbortFile() {
    let data = common::segment("", "they's", "@c0@");
    let result = patcher(GenderMode::Neutral, "", LocaleMode::NametagExternal).patch_file("b0200000.mpt", &data);
    assert!(matches!(result, Err(ScriptError::SegmentOverflow { .. })));
}

#[test]
fn test_patchFile_unterminatedSegment_shouldAbortFile() {
    let result = patcher(GenderMode::Neutral, "", LocaleMode::NametagExternal)
        .patch_file("b0200000.mpt", b"@aMaya@bno terminator here");
    assert!(matches!(result, Err(ScriptError::UnterminatedSegment { .. })));
}
