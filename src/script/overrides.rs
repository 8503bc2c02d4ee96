/*!
 * Hand-authored fixes for lines that generic reflow wraps badly.
 *
 * Three tables live here:
 * - positional patches that force a break at a known phrase boundary
 * - full line overrides that replace a whole segment, first match wins
 * - whole-file overrides that rewrite a file without segmenting it
 */

use log::debug;

use crate::script::markers::{find_bytes, replace_bytes, FILE_FILLER};
use crate::script::reflow::unwrap_lines;

const LINE_BREAK: u8 = b'\n';

/// Where a positional patch puts its line break
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BreakAt {
    /// Replace the needle's first byte
    Leading,
    /// Replace the needle's last byte
    Trailing,
}

/// A phrase boundary where a line break is forced
struct PositionalPatch {
    needle: &'static [u8],
    at: BreakAt,
}

const POSITIONAL_PATCHES: &[PositionalPatch] = &[
    PositionalPatch {
        needle: b"exchanges their %a00102 ",
        at: BreakAt::Trailing,
    },
    PositionalPatch {
        needle: b"puts their %a00100 ",
        at: BreakAt::Trailing,
    },
    PositionalPatch {
        needle: b"puts %a02100 ",
        at: BreakAt::Trailing,
    },
    PositionalPatch {
        needle: b"takes %a02100 ",
        at: BreakAt::Trailing,
    },
    PositionalPatch {
        needle: b" Your custom's most appreciated.",
        at: BreakAt::Leading,
    },
];

/// What a full line override produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Replacement {
    /// A literal line with its own breaks
    Literal(&'static [u8]),
    /// The line with every break removed
    Unwrapped,
}

/// Full line overrides, checked in order against the unwrapped line
const LINE_OVERRIDES: &[(&[u8], Replacement)] = &[
    // item exchange
    (
        b"%a02010's %a00101 is exchanged for %a02180's %a00102.",
        Replacement::Literal(b"%a02010's %a00101 is exchanged for\n%a02180's %a00102."),
    ),
    // item reorder
    (
        b"%a02010 puts their %a00100 in a different place. ",
        Replacement::Literal(b"%a02010 puts their %a00100\nin a different place. "),
    ),
    (
        b"%a00110 puts %a02100 in a different place in the bag. ",
        Replacement::Literal(b"%a00110 puts %a02100\nin a different place in the bag. "),
    ),
    // shop sell offers
    (
        b"I'll take that %a00100 off your hands for %a00620 gold coins. Okay?",
        Replacement::Literal(b"I'll take that %a00100 off your\nhands for %a00620 gold coins. Okay?"),
    ),
    (
        b"%a04100? I'll give you %a00620 gold coins for it. Okay?",
        Replacement::Literal(b"%a04100? I'll give you %a00620\ngold coins for it. Okay?"),
    ),
    // %N block with no usable option
    (
        b"%a02010 mashes up the Yggdrasil leaf and administers it to %N180%Xthemself%Y%a02180%Z.",
        Replacement::Literal(b"%a02010 mashes up the\nYggdrasil leaf and administers it."),
    ),
    // typo in the shipped script
    (
        b"*: May divine protection accompany the great , %a00090.",
        Replacement::Literal(b"*: May divine protection accompany the\ngreat %a00090."),
    ),
    // multiheal
    (
        b"%a02010's wounds heal! ",
        Replacement::Literal(b"%a02010's wounds heal!\n"),
    ),
    (
        b"%a02180's wounds heal! ",
        Replacement::Literal(b"%a02180's wounds heal!\n"),
    ),
    (
        b"%a02010 casts %a00170! ",
        Replacement::Literal(b"%a02010 casts %a00170!\n"),
    ),
    // small font line
    (b"t notice the party's ", Replacement::Unwrapped),
    (b"%a02180 takes %a02100 out of the bag.", Replacement::Unwrapped),
    (b"%a00120 puts %a02100 into the bag.", Replacement::Unwrapped),
    (b"%a02010 puts %a02100 in the bag.", Replacement::Unwrapped),
];

/// Chapter title file
pub const CHAPTER_TITLE_FILE: &str = "b1007000.mpt";

/// Chapter titles as (full title, kept prefix)
const CHAPTER_TITLES: &[(&str, &str)] = &[
    (
        "Chapter 1: Ragnar McRyan and the Case of the Missing Children",
        "Chapter 1: Ragnar McRyan",
    ),
    (
        "Chapter 2: Alena and the Journey to the Tourney",
        "Chapter 2: Alena",
    ),
    (
        "Chapter 3: Torneko and the Extravagant Excavation",
        "Chapter 3: Torneko",
    ),
    (
        "Chapter 4: Meena and Maya and the Mahabala Mystery",
        "Chapter 4: Meena and Maya",
    ),
];

/// Apply positional patches and full line overrides to a reflowed segment
pub fn apply_line_overrides(reflowed: Vec<u8>) -> Vec<u8> {
    // both tables match against the unwrapped form taken before any patch
    let unwrapped = unwrap_lines(&reflowed);
    let patched = apply_positional_patches(reflowed, &unwrapped);

    match full_override(&unwrapped) {
        Some(Replacement::Literal(line)) => line.to_vec(),
        Some(Replacement::Unwrapped) => unwrapped,
        None => patched,
    }
}

/// Force a break at each known phrase boundary found in `unwrapped`
fn apply_positional_patches(mut buffer: Vec<u8>, unwrapped: &[u8]) -> Vec<u8> {
    for patch in POSITIONAL_PATCHES {
        if let Some(idx) = find_bytes(unwrapped, patch.needle) {
            let offset = match patch.at {
                BreakAt::Leading => idx,
                BreakAt::Trailing => idx + patch.needle.len() - 1,
            };
            if let Some(byte) = buffer.get_mut(offset) {
                *byte = LINE_BREAK;
            }
        }
    }
    buffer
}

/// First full line override whose needle occurs in `unwrapped`
pub fn full_override(unwrapped: &[u8]) -> Option<Replacement> {
    LINE_OVERRIDES
        .iter()
        .find(|(needle, _)| find_bytes(unwrapped, needle).is_some())
        .map(|(_, replacement)| *replacement)
}

/// Title literal as stored in the file: `@1<title>@`
fn title_literal(title: &str) -> Vec<u8> {
    let mut literal = Vec::with_capacity(title.len() + 3);
    literal.extend_from_slice(b"@1");
    literal.extend_from_slice(title.as_bytes());
    literal.push(b'@');
    literal
}

/// Same-length replacement for a title literal: kept prefix, filler, closing `@`
fn shortened_title(full: &[u8], kept: &str) -> Vec<u8> {
    let mut replacement = title_literal(kept);
    replacement.pop();
    replacement.resize(full.len() - 1, FILE_FILLER);
    replacement.push(b'@');
    replacement
}

/// Rewrite a whole file, bypassing the segmenter, if it has an override
///
/// # Returns
/// * `Some(bytes)` - The rewritten file, always the same length as `data`
/// * `None` - The file has no whole-file override
pub fn whole_file_override(file_id: &str, data: &[u8]) -> Option<Vec<u8>> {
    if file_id != CHAPTER_TITLE_FILE {
        return None;
    }

    let patched = CHAPTER_TITLES
        .iter()
        .fold(data.to_vec(), |patched, (full, kept)| {
            let from = title_literal(full);
            let to = shortened_title(&from, kept);
            debug!("{}: shortening \"{}\" to \"{}\"", file_id, full, kept);
            replace_bytes(&patched, &from, &to)
        });

    Some(patched)
}
