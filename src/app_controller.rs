use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use std::path::{Path, PathBuf};

use crate::app_config::Config;
use crate::file_utils::FileManager;
use crate::rom_tools::{NdsTool, RomWorkspace};
use crate::script::policy::ResolutionPolicy;
use crate::script::segmenter::ScriptPatcher;

// @module: Application controller for script patching

/// Options for a single run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    // @field: Patch only this file from the input directory
    pub file: Option<String>,

    // @field: Skip rom extraction and repacking
    pub manual: bool,
}

/// Outcome of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    // @field: Number of script files written
    pub files_patched: usize,

    // @field: Directory the patched scripts were written to
    pub output_dir: PathBuf,

    // @field: Repacked rom, when the automatic workflow ran
    pub rom: Option<PathBuf>,
}

/// Main application controller for script patching
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Validated run policy
    policy: ResolutionPolicy,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let policy = config
            .resolution_policy()
            .context("Configuration validation failed")?;

        Ok(Self { config, policy })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn policy(&self) -> &ResolutionPolicy {
        &self.policy
    }

    // @returns: Directory patched scripts are written to, e.g. out/en
    pub fn output_dir(&self) -> PathBuf {
        Path::new(&self.config.paths.output_dir).join(self.policy.locale_mode().code())
    }

    /// Run the main workflow
    pub fn run(&self, options: &RunOptions) -> Result<RunSummary> {
        let start_time = std::time::Instant::now();
        let input_dir = PathBuf::from(&self.config.paths.input_dir);
        let output_dir = self.output_dir();
        let manual = options.manual || options.file.is_some();

        info!(
            "Patching directory {}, writing results to '{}'",
            input_dir.display(),
            output_dir.display()
        );

        FileManager::recreate_dir(&self.config.paths.output_dir)?;
        FileManager::ensure_dir(&output_dir)?;

        let workspace = if manual {
            None
        } else {
            Some(self.prepare_workspace(&input_dir)?)
        };

        let patcher = ScriptPatcher::new(self.policy.clone(), self.config.reflow.clone());
        let files_patched = match &options.file {
            Some(file) => {
                self.patch_one(&patcher, &input_dir.join(file), &output_dir)?;
                1
            }
            None => self.patch_directory(&patcher, &input_dir, &output_dir)?,
        };

        let rom = match workspace {
            Some(workspace) => Some(workspace.repack(&output_dir, &self.policy)?),
            None => None,
        };

        info!(
            "Patched {} files in {}",
            files_patched,
            Self::format_duration(start_time.elapsed())
        );

        Ok(RunSummary {
            files_patched,
            output_dir,
            rom,
        })
    }

    /// Locate ndstool, extract the roms and stage the US scripts if needed
    fn prepare_workspace(&self, input_dir: &Path) -> Result<RomWorkspace> {
        let tool = NdsTool::locate(&self.config.paths.ndstool)?;
        info!("Using ndstool at {}", tool.program().display());

        let workspace = RomWorkspace::new(tool, &self.config.paths.roms_dir);
        let need_us = !FileManager::dir_exists(input_dir) || FileManager::find_scripts(input_dir)?.is_empty();
        workspace.extract(need_us)?;

        if need_us {
            FileManager::ensure_dir(input_dir)?;
            let staged = workspace.stage_us_scripts(input_dir)?;
            info!("Staged {} US script files into {}", staged, input_dir.display());
        }

        Ok(workspace)
    }

    /// Patch every script in `input_dir`, stopping at the first failure
    pub fn patch_directory(
        &self,
        patcher: &ScriptPatcher,
        input_dir: &Path,
        output_dir: &Path,
    ) -> Result<usize> {
        if !FileManager::dir_exists(input_dir) {
            return Err(anyhow::anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let scripts = FileManager::find_scripts(input_dir)?;
        if scripts.is_empty() {
            return Err(anyhow::anyhow!("No script files found in directory: {:?}", input_dir));
        }

        let progress_bar = ProgressBar::new(scripts.len() as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));

        for script in &scripts {
            let file_id = FileManager::file_id(script)?;
            progress_bar.set_message(format!("Patching: {}", file_id));

            if let Err(e) = self.patch_one(patcher, script, output_dir) {
                progress_bar.abandon_with_message(format!("Failed: {}", file_id));
                error!("Error patching file {}: {:#}", file_id, e);
                return Err(e);
            }
            progress_bar.inc(1);
        }

        progress_bar.finish_with_message("Patching complete");
        Ok(scripts.len())
    }

    /// Patch a single script into `output_dir`
    pub fn patch_one(&self, patcher: &ScriptPatcher, input: &Path, output_dir: &Path) -> Result<PathBuf> {
        if !FileManager::file_exists(input) {
            return Err(anyhow::anyhow!("Input file does not exist: {:?}", input));
        }

        let file_id = FileManager::file_id(input)?;
        let data = FileManager::read_bytes(input)?;
        let patched = patcher
            .patch_file(&file_id, &data)
            .with_context(|| format!("Failed to patch {}", file_id))?;

        let output_path = output_dir.join(&file_id);
        FileManager::write_bytes(&output_path, &patched)?;
        Ok(output_path)
    }

    // Format duration in a human-readable format
    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let minutes = total_seconds / 60;
        let seconds = total_seconds % 60;

        if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
