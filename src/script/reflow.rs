/*!
 * Fixed-width word wrapping for message windows.
 *
 * Wrapping is a single greedy left-to-right pass over bytes: when the running
 * line length passes the limit, the latest space seen turns into a line
 * break. There is no look-ahead balancing.
 */

use serde::{Deserialize, Serialize};

use crate::script::markers::contains_bytes;

const LINE_BREAK: u8 = b'\n';
const SPACE: u8 = b' ';

/// Default dialogue window width in characters
pub const DIALOGUE_LINE_LIMIT: usize = 43;

/// Battle message window width in characters
pub const BATTLE_LINE_LIMIT: usize = 45;

/// Script file holding battle messages
pub const BATTLE_FILE: &str = "b0801000.mpt";

/// Wrapping parameters for one kind of script file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReflowConfig {
    /// Maximum characters per line
    #[serde(default = "default_line_limit")]
    pub line_limit: usize,

    /// Re-wrap even when every line already fits
    #[serde(default = "default_true")]
    pub force: bool,

    /// Whether the segment should end in a line break rather than a space
    #[serde(default)]
    pub trailing_newline: bool,

    /// Apply the battle message fixups after wrapping
    #[serde(default)]
    pub battle_messages: bool,
}

impl ReflowConfig {
    /// Settings shared by every dialogue file
    pub fn dialogue() -> Self {
        Self {
            line_limit: DIALOGUE_LINE_LIMIT,
            force: true,
            trailing_newline: false,
            battle_messages: false,
        }
    }

    /// Settings for the battle message file
    pub fn battle() -> Self {
        Self {
            line_limit: BATTLE_LINE_LIMIT,
            force: true,
            trailing_newline: false,
            battle_messages: true,
        }
    }

    /// Wrap `buffer` with these settings, including any file-specific fixups
    pub fn apply(&self, buffer: &[u8]) -> Vec<u8> {
        let wrapped = reflow(buffer, self.line_limit, self.force, self.trailing_newline);
        if self.battle_messages {
            apply_battle_heuristics(wrapped)
        } else {
            wrapped
        }
    }
}

impl Default for ReflowConfig {
    fn default() -> Self {
        Self::dialogue()
    }
}

/// Reflow settings for a specific file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReflowConfig {
    /// File identifier, e.g. `b0801000.mpt`
    pub file: String,

    #[serde(flatten)]
    pub config: ReflowConfig,
}

/// Reflow settings keyed by file identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReflowTable {
    /// Settings for files without their own entry
    #[serde(default)]
    pub default: ReflowConfig,

    /// Per-file settings
    #[serde(default)]
    pub files: Vec<FileReflowConfig>,
}

impl ReflowTable {
    /// Settings that apply to `file_id`
    pub fn for_file(&self, file_id: &str) -> &ReflowConfig {
        self.files
            .iter()
            .find(|entry| entry.file == file_id)
            .map(|entry| &entry.config)
            .unwrap_or(&self.default)
    }
}

impl Default for ReflowTable {
    fn default() -> Self {
        Self {
            default: ReflowConfig::dialogue(),
            files: vec![FileReflowConfig {
                file: BATTLE_FILE.to_string(),
                config: ReflowConfig::battle(),
            }],
        }
    }
}

fn default_line_limit() -> usize {
    DIALOGUE_LINE_LIMIT
}

fn default_true() -> bool {
    true
}

/// Whether any line of `buffer` is longer than `limit`
pub fn exceeds_limit(buffer: &[u8], limit: usize) -> bool {
    buffer.split(|b| *b == LINE_BREAK).any(|line| line.len() > limit)
}

/// Re-wrap `buffer` so lines break at spaces once they pass `limit`
pub fn reflow(buffer: &[u8], limit: usize, force: bool, trailing_newline: bool) -> Vec<u8> {
    if !force && !exceeds_limit(buffer, limit) {
        return buffer.to_vec();
    }

    let mut reflowed: Vec<u8> = buffer
        .iter()
        .map(|b| if *b == LINE_BREAK { SPACE } else { *b })
        .collect();

    let mut line_size = 0;
    let mut last_space: Option<usize> = None;
    for pointer in 0..reflowed.len() {
        if reflowed[pointer] == SPACE {
            last_space = Some(pointer);
        }
        line_size += 1;
        if let Some(space) = last_space.filter(|_| line_size > limit) {
            reflowed[space] = LINE_BREAK;
            // bytes after the break, the current one included
            line_size = pointer - space;
            last_space = None;
        }
    }

    if let Some(last) = reflowed.last_mut() {
        if trailing_newline && *last == SPACE {
            *last = LINE_BREAK;
        } else if !trailing_newline && *last == LINE_BREAK {
            *last = SPACE;
        }
    }

    reflowed
}

/// Battle message fixups applied after wrapping
pub fn apply_battle_heuristics(mut buffer: Vec<u8>) -> Vec<u8> {
    // enemy announcements end with a line break
    if contains_bytes(&buffer, b"appears!") || contains_bytes(&buffer, b"appear!") {
        if let Some(last) = buffer.last_mut() {
            *last = LINE_BREAK;
        }
    }

    // the experience message is shown on a single line
    if contains_bytes(&buffer, b"Each party member receives") {
        buffer = unwrap_lines(&buffer);
    }

    buffer
}

/// Replace every line break with a space
pub fn unwrap_lines(buffer: &[u8]) -> Vec<u8> {
    buffer
        .iter()
        .map(|b| if *b == LINE_BREAK { SPACE } else { *b })
        .collect()
}
