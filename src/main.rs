// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;

use mptpatch::app_config::{self, Config};
use mptpatch::app_controller::{Controller, RunOptions};
use mptpatch::script::policy::{GenderMode, LocaleMode};

/// CLI Wrapper for GenderMode to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliGenderMode {
    #[value(alias = "n")]
    Neutral,
    #[value(alias = "m")]
    Masculine,
    #[value(alias = "f")]
    Feminine,
    #[value(alias = "b")]
    Both,
}

impl From<CliGenderMode> for GenderMode {
    fn from(cli_mode: CliGenderMode) -> Self {
        match cli_mode {
            CliGenderMode::Neutral => GenderMode::Neutral,
            CliGenderMode::Masculine => GenderMode::Masculine,
            CliGenderMode::Feminine => GenderMode::Feminine,
            CliGenderMode::Both => GenderMode::Both,
        }
    }
}

/// CLI Wrapper for LocaleMode to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLocale {
    En,
    Ja,
}

impl From<CliLocale> for LocaleMode {
    fn from(cli_locale: CliLocale) -> Self {
        match cli_locale {
            CliLocale::En => LocaleMode::NametagExternal,
            CliLocale::Ja => LocaleMode::NameEmbedded,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for mptpatch
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct PatchArgs {
    /// File to patch, must be present in the input directory. Disables automatic extracting and repacking
    #[arg(long)]
    file: Option<String>,

    /// Hero name, 7 characters or less
    #[arg(long, visible_alias = "hero-name")]
    yuusha: Option<String>,

    /// Hero gender handling
    #[arg(long, value_enum)]
    gender: Option<CliGenderMode>,

    /// Rom language mode: en uses nametags, ja embeds the speaker name in the text
    #[arg(long, value_enum)]
    lang: Option<CliLocale>,

    /// Enable debug logs (same as --log-level debug)
    #[arg(long)]
    debug: bool,

    /// Skip the automatic extractor and repacker
    #[arg(long)]
    manual: bool,

    /// Configuration file path
    #[arg(short, long = "config", default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

impl PatchArgs {
    // @returns: Log level requested on the command line, if any
    fn requested_log_level(&self) -> Option<app_config::LogLevel> {
        if self.debug {
            Some(app_config::LogLevel::Debug)
        } else {
            self.log_level.clone().map(Into::into)
        }
    }
}

/// mptpatch - Dragon Quest IV party chat patcher
///
/// Rewrites the English party chat scripts so they fit the Japanese DS rom.
#[derive(Parser, Debug)]
#[command(name = "mptpatch")]
#[command(version)]
#[command(about = "Patch English script files for the JP Dragon Quest IV rom")]
#[command(long_about = "mptpatch resolves gender, plural and party-member variants in .mpt script
files, rewraps the text for the message window and repacks a patched rom.

EXAMPLES:
    mptpatch                                   # Extract, patch and repack using conf.json
    mptpatch --yuusha Solo --gender b          # Hero name and both-gender wording
    mptpatch --lang ja                         # Embed speaker names in the text
    mptpatch --file b0200000.mpt --debug       # Patch one file only, with debug logs
    mptpatch --manual                          # Patch the input directory, no rom tooling
    mptpatch completions bash > mptpatch.bash  # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    patch: PatchArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        // the logger accepts everything, the max level does the filtering
        log::set_boxed_logger(Box::new(CustomLogger { level: LevelFilter::Trace }))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }

    // @returns: Emoji for log level
    fn emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                Self::emoji_for_level(record.level()),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() {
    if let Err(e) = CustomLogger::init(LevelFilter::Info) {
        eprintln!("Failed to initialize logger: {}", e);
    }

    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "mptpatch", &mut std::io::stdout());
        return;
    }

    if let Err(e) = run_patch(cli.patch) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run_patch(options: PatchArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(level) = options.requested_log_level() {
        log::set_max_level(level.to_level_filter());
    }

    let mut config = Config::load_or_create(&options.config_path)?;

    // Override config with CLI options if provided
    if let Some(gender) = options.gender.clone() {
        config.gender = GenderMode::from(gender).to_string();
    }
    if let Some(name) = &options.yuusha {
        config.hero_name = name.clone();
    }
    if let Some(lang) = options.lang.clone() {
        config.locale = LocaleMode::from(lang).code().to_string();
    }
    if let Some(level) = options.requested_log_level() {
        config.log_level = level;
    } else {
        log::set_max_level(config.log_level.to_level_filter());
    }

    config.validate().context("Configuration validation failed")?;

    let controller = Controller::with_config(config)?;
    let summary = controller.run(&RunOptions {
        file: options.file,
        manual: options.manual,
    })?;

    info!(
        "Success: {} files written to {}",
        summary.files_patched,
        summary.output_dir.display()
    );
    if let Some(rom) = summary.rom {
        info!("Patched rom: {}", rom.display());
    }

    Ok(())
}
