/*!
 * ROM extraction and repacking through `ndstool`.
 *
 * The patcher itself only rewrites script bytes; this module unpacks the
 * US and JP images, stages the US scripts for patching and rebuilds a JP
 * image around the patched scripts.
 */

use anyhow::{Context, Result};
use log::{error, info, warn};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::errors::ToolError;
use crate::file_utils::FileManager;
use crate::script::policy::ResolutionPolicy;

/// Banner printed by ndstool when run without arguments
const NDSTOOL_BANNER: &str = "Nintendo DS rom tool";

/// Fallback locations checked when the configured command does not run
const NDSTOOL_CANDIDATES: [&str; 2] = ["ndstool/ndstool", "ndstool/ndstool.exe"];

const NDSTOOL_GUIDANCE: &str =
    "ndstool 2.1.2 is required for automatic rom patching. Use --manual if you wish to do everything manually.";

/// Script directory inside an extracted image
const MESS_DIR: &str = "data/data/MESS";

/// Directory the repacked image is written to
pub const PATCHED_DIR: &str = "patched";

/// Scratch directory the JP tree is copied to before repacking
const REPACK_DIR: &str = "repack";

/// Region of a Dragon Quest IV DS image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RomRegion {
    // @region: North American release, source of the English scripts
    Us,
    // @region: Japanese release, target of the patch
    Ja,
}

impl RomRegion {
    // @returns: Game code line printed by `ndstool -i`
    pub fn signature(&self) -> &'static str {
        match self {
            Self::Us => "YIVE (NTR-YIVE-USA)",
            Self::Ja => "YIVJ (NTR-YIVJ-JPN)",
        }
    }

    // @returns: Extraction directory name under the roms folder
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Us => "us",
            Self::Ja => "ja",
        }
    }

    // @returns: Label used in operator messages
    pub fn label(&self) -> &'static str {
        match self {
            Self::Us => "US",
            Self::Ja => "JA",
        }
    }
}

/// Region of an image from its `ndstool -i` output
pub fn classify_rom_info(info: &str) -> Option<RomRegion> {
    [RomRegion::Us, RomRegion::Ja]
        .into_iter()
        .find(|region| info.contains(region.signature()))
}

/// ndstool arguments naming every part of an extracted image tree
pub fn image_args(dir: &Path) -> Vec<OsString> {
    let parts = [
        ("-9", "arm9.bin"),
        ("-7", "arm7.bin"),
        ("-y9", "y9.bin"),
        ("-y7", "y7.bin"),
        ("-t", "banner.bin"),
        ("-h", "header.bin"),
        ("-d", "data"),
        ("-y", "overlay"),
    ];

    parts
        .iter()
        .flat_map(|(flag, name)| [OsString::from(flag), dir.join(name).into_os_string()])
        .collect()
}

/// Script directory for `language` inside an extracted image tree
pub fn mess_dir(image_dir: &Path, language: &str) -> PathBuf {
    image_dir.join(MESS_DIR).join(language)
}

/// File name of the repacked image
pub fn patched_rom_name(policy: &ResolutionPolicy) -> String {
    format!(
        "Dragon Quest IV Party Chat Patched [yuusha={} gender={} lang={}].nds",
        policy.hero_name(),
        policy.gender_mode().code(),
        policy.locale_mode().code()
    )
}

/// Images found in the roms directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RomSet {
    pub us: Option<PathBuf>,
    pub ja: Option<PathBuf>,
}

/// Handle to a working ndstool executable
#[derive(Debug, Clone)]
pub struct NdsTool {
    program: PathBuf,
}

impl NdsTool {
    /// Use `program` without probing it
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Find a working ndstool, trying the configured command first
    pub fn locate(configured: &str) -> Result<Self, ToolError> {
        let tool = Self::new(configured);
        if tool.probe() {
            return Ok(tool);
        }

        NDSTOOL_CANDIDATES
            .iter()
            .map(Path::new)
            .find(|candidate| FileManager::file_exists(candidate))
            .map(Self::new)
            .ok_or_else(|| ToolError::ToolNotFound {
                tool: "ndstool 2.1.2".to_string(),
                guidance: NDSTOOL_GUIDANCE.to_string(),
            })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Whether the program runs and identifies itself as ndstool
    pub fn probe(&self) -> bool {
        match Command::new(&self.program).output() {
            Ok(output) => {
                String::from_utf8_lossy(&output.stdout).contains(NDSTOOL_BANNER)
                    || String::from_utf8_lossy(&output.stderr).contains(NDSTOOL_BANNER)
            }
            Err(_) => false,
        }
    }

    /// Region of the image at `rom`, if it is a Dragon Quest IV image
    pub fn identify(&self, rom: &Path) -> Result<Option<RomRegion>, ToolError> {
        let mut args = vec![OsString::from("-i")];
        args.push(rom.as_os_str().to_os_string());
        let output = self.run(&args)?;
        Ok(classify_rom_info(&String::from_utf8_lossy(&output.stdout)))
    }

    /// Unpack `rom` into `dir`
    pub fn extract(&self, rom: &Path, dir: &Path) -> Result<(), ToolError> {
        let mut args = vec![OsString::from("-x"), rom.as_os_str().to_os_string()];
        args.extend(image_args(dir));
        self.run_checked(&args).map(|_| ())
    }

    /// Build `output` from the image tree in `dir`
    pub fn repack(&self, output: &Path, dir: &Path) -> Result<(), ToolError> {
        let mut args = vec![OsString::from("-c"), output.as_os_str().to_os_string()];
        args.extend(image_args(dir));
        self.run_checked(&args).map(|_| ())
    }

    fn run(&self, args: &[OsString]) -> Result<Output, ToolError> {
        Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|e| ToolError::CommandFailed {
                command: self.describe(args),
                message: e.to_string(),
            })
    }

    fn run_checked(&self, args: &[OsString]) -> Result<Output, ToolError> {
        let output = self.run(args)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!("ndstool failed: {}", stderr.trim());
            return Err(ToolError::CommandFailed {
                command: self.describe(args),
                message: format!("{} {}", output.status, stderr.trim()),
            });
        }
        Ok(output)
    }

    fn describe(&self, args: &[OsString]) -> String {
        let mut parts = vec![self.program.to_string_lossy().to_string()];
        parts.extend(args.iter().map(|arg| arg.to_string_lossy().to_string()));
        parts.join(" ")
    }
}

/// Extracts images and rebuilds the patched one
pub struct RomWorkspace {
    tool: NdsTool,
    roms_dir: PathBuf,
}

impl RomWorkspace {
    pub fn new<P: Into<PathBuf>>(tool: NdsTool, roms_dir: P) -> Self {
        Self {
            tool,
            roms_dir: roms_dir.into(),
        }
    }

    // @returns: Extraction directory for a region
    pub fn region_dir(&self, region: RomRegion) -> PathBuf {
        self.roms_dir.join(region.dir_name())
    }

    /// Identify every .nds image at the top of the roms directory
    pub fn find_roms(&self) -> Result<RomSet> {
        let mut roms = RomSet::default();
        if !FileManager::dir_exists(&self.roms_dir) {
            return Ok(roms);
        }

        for rom in FileManager::find_files(&self.roms_dir, "nds")? {
            match self.tool.identify(&rom)? {
                Some(RomRegion::Us) => roms.us = Some(rom),
                Some(RomRegion::Ja) => roms.ja = Some(rom),
                None => warn!("Skipping unrecognized rom: {:?}", rom),
            }
        }

        Ok(roms)
    }

    /// Extract the JP image, and the US image when `need_us` is set
    pub fn extract(&self, need_us: bool) -> Result<()> {
        let roms = self.find_roms()?;
        let roms_dir = self.roms_dir.to_string_lossy().to_string();

        let ja = roms.ja.ok_or_else(|| ToolError::RomMissing {
            region: RomRegion::Ja.label().to_string(),
            dir: roms_dir.clone(),
        })?;

        let mut targets = Vec::new();
        if need_us {
            let us = roms.us.ok_or_else(|| ToolError::RomMissing {
                region: RomRegion::Us.label().to_string(),
                dir: roms_dir.clone(),
            })?;
            targets.push((RomRegion::Us, us));
        }
        targets.push((RomRegion::Ja, ja));

        for (region, rom) in targets {
            let dir = self.region_dir(region);
            FileManager::ensure_dir(&dir)?;
            info!("Extracting {} rom...", region.dir_name());
            self.tool.extract(&rom, &dir)?;
            info!("Extraction of {} rom complete.", region.dir_name());
        }

        Ok(())
    }

    /// Copy the extracted US scripts into `input_dir`, keeping existing files
    pub fn stage_us_scripts(&self, input_dir: &Path) -> Result<usize> {
        let source = mess_dir(&self.region_dir(RomRegion::Us), "en");
        let mut staged = 0;

        for script in FileManager::find_scripts(&source)? {
            let target = input_dir.join(FileManager::file_id(&script)?);
            if FileManager::file_exists(&target) {
                warn!("File {:?} already exists. Skipping copying the file.", target);
                continue;
            }
            FileManager::copy_file(&script, &target)?;
            staged += 1;
        }

        Ok(staged)
    }

    /// Rebuild the JP image with the scripts in `patched_dir` and return its path
    pub fn repack(&self, patched_dir: &Path, policy: &ResolutionPolicy) -> Result<PathBuf> {
        let repack_dir = self.roms_dir.join(REPACK_DIR);
        FileManager::recreate_dir(&repack_dir)?;
        FileManager::copy_dir_all(self.region_dir(RomRegion::Ja), &repack_dir)
            .context("Failed to copy the extracted JA rom")?;

        let target = mess_dir(&repack_dir, policy.locale_mode().code());
        FileManager::recreate_dir(&target)?;
        for script in FileManager::find_scripts(patched_dir)? {
            FileManager::copy_file(&script, target.join(FileManager::file_id(&script)?))?;
        }

        FileManager::ensure_dir(PATCHED_DIR)?;
        let output = Path::new(PATCHED_DIR).join(patched_rom_name(policy));
        info!("Repacking rom...");
        self.tool.repack(&output, &repack_dir)?;
        info!("Rom repacked: {:?}", output);

        std::fs::remove_dir_all(&repack_dir)
            .with_context(|| format!("Failed to remove {:?}", repack_dir))?;

        Ok(output)
    }
}
