/*!
 * Error types for the mptpatch application.
 *
 * This module contains custom error types for the different parts of the
 * patcher, using the thiserror crate for ergonomic error definitions.
 * Script errors are invariant violations: they point at a gap in the control
 * or override tables, never at a transient condition.
 */

use thiserror::Error;

/// Maximum number of characters the game reserves for the hero's name
pub const MAX_HERO_NAME_LEN: usize = 7;

/// Errors detected while validating run settings, before any file is touched
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    /// Gender mode is not one of neutral/masculine/feminine/both
    #[error("Unsupported gender mode: {0}")]
    InvalidGenderMode(String),

    /// Locale mode is not one of en/ja
    #[error("Unsupported locale mode: {0}")]
    InvalidLocaleMode(String),

    /// Hero name does not fit the name slot
    #[error("Hero name '{name}' must be {max} characters or less")]
    HeroNameTooLong {
        /// Name as supplied
        name: String,
        /// Allowed length
        max: usize,
    },

    /// Hero name is written as raw bytes and must be ASCII
    #[error("Hero name '{0}' must contain only ASCII characters")]
    HeroNameNotAscii(String),
}

/// Invariant violations raised while transforming a script file
#[derive(Error, Debug, PartialEq)]
pub enum ScriptError {
    /// A processed segment came out longer than the slot it must fit in
    #[error("Processed segment size ({produced}) exceeds original size ({original}): {text}")]
    SegmentOverflow {
        /// Length after processing
        produced: usize,
        /// Length of the original segment
        original: usize,
        /// Lossy rendering of the offending text
        text: String,
    },

    /// A whole file changed size
    #[error("Final size of {file} ({produced}) does not match original size ({original})")]
    FileLengthMismatch {
        /// File identifier
        file: String,
        /// Length after processing
        produced: usize,
        /// Length of the input file
        original: usize,
    },

    /// A gender block resolved with no options at all
    #[error("Gender block has no options")]
    EmptyGenderBlock,

    /// A primary block lacks the option its code always selects
    #[error("Control code {code} needs option {index} but only {available} present")]
    MissingVariant {
        /// Marker of the control code, e.g. `%O`
        code: String,
        /// Index the code selects
        index: usize,
        /// Number of options decoded
        available: usize,
    },

    /// A segment start marker was never followed by a nametag end marker
    #[error("Segment starting at offset {offset} has no nametag end marker")]
    UnterminatedNametag {
        /// Offset of the segment start marker
        offset: usize,
    },

    /// A segment was opened but no terminator follows it
    #[error("Segment starting at offset {offset} has no terminator")]
    UnterminatedSegment {
        /// Offset of the first interior byte
        offset: usize,
    },
}

/// Errors raised by the external ROM tooling
#[derive(Error, Debug)]
pub enum ToolError {
    /// ndstool could not be located
    #[error("Could not find {tool}. {guidance}")]
    ToolNotFound {
        /// Tool description
        tool: String,
        /// What the operator should do
        guidance: String,
    },

    /// A required ROM image is not in the roms directory
    #[error("Please provide a {region} DQIV rom in the {dir} folder.")]
    RomMissing {
        /// Region label (US or JA)
        region: String,
        /// Directory that was searched
        dir: String,
    },

    /// A tool invocation exited unsuccessfully
    #[error("Command failed: {command} ({message})")]
    CommandFailed {
        /// Command line that was run
        command: String,
        /// Exit status or stderr excerpt
        message: String,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Script transformation failure
    #[error("Script error: {0}")]
    Script(#[from] ScriptError),

    /// External tool failure
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
