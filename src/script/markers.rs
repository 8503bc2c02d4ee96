/*!
 * Byte-level markers of the `.mpt` message format.
 *
 * Segments look like `@a<nametag>@b<text>@c0@`. Inside the text, control
 * blocks open with a 7-byte header (`%H120%X`, `%A000%X`, ...), separate
 * their options with `%Y` (or a `%B`/`%C` header for gender blocks) and
 * close with `%Z`.
 */

/// Segment start marker
pub const SEGMENT_START: &[u8] = b"@a";

/// Marker closing the nametag and opening the segment text
pub const NAMETAG_END: &[u8] = b"@b";

/// Length of every segment terminator
pub const TERMINATOR_LEN: usize = 4;

/// Every control block header is a 2-byte code plus 5 opaque bytes
pub const HEADER_LEN: usize = 7;

/// Option separator inside primary blocks
pub const OPTION_SEPARATOR: &[u8] = b"%Y";

/// Control block terminator
pub const BLOCK_END: &[u8] = b"%Z";

/// No-op marker stripped during normalization
pub const NOOP_MARKER: &[u8] = b"%0";

/// Placeholder the game expands to the hero's name
pub const HERO_PLACEHOLDER: &[u8] = b"%a00090";

/// Separator between an embedded speaker name and the text
pub const NAME_EMBED_SEPARATOR: u8 = b'*';

/// Filler used to pad segments back to their original size
pub const SEGMENT_FILLER: u8 = b' ';

/// Filler used by whole-file overrides
pub const FILE_FILLER: u8 = 0xFE;

/// Control codes understood by the decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlCode {
    /// `%H`: singular/plural wording
    Plural,
    /// `%M`: plural/singular wording
    Singular,
    /// `%O`: addressed party member vs. another party member
    PartyMember,
    /// `%L`: both sisters vs. one sister
    Sisters,
    /// `%D`: reflexive pronoun used by a single NPC
    Reflexive,
    /// `%A`: masculine/feminine branches, optionally chained with `%B`/`%C`
    Gender,
}

impl ControlCode {
    /// All codes, primary codes first
    pub const ALL: [ControlCode; 6] = [
        ControlCode::Plural,
        ControlCode::Singular,
        ControlCode::PartyMember,
        ControlCode::Sisters,
        ControlCode::Reflexive,
        ControlCode::Gender,
    ];

    /// Recognize a control code at the start of `bytes`
    pub fn from_marker(bytes: &[u8]) -> Option<Self> {
        match bytes.get(..2)? {
            b"%H" => Some(Self::Plural),
            b"%M" => Some(Self::Singular),
            b"%O" => Some(Self::PartyMember),
            b"%L" => Some(Self::Sisters),
            b"%D" => Some(Self::Reflexive),
            b"%A" => Some(Self::Gender),
            _ => None,
        }
    }

    /// The 2-byte marker of this code
    pub fn marker(self) -> &'static [u8] {
        match self {
            Self::Plural => b"%H",
            Self::Singular => b"%M",
            Self::PartyMember => b"%O",
            Self::Sisters => b"%L",
            Self::Reflexive => b"%D",
            Self::Gender => b"%A",
        }
    }

    pub fn is_gender(self) -> bool {
        matches!(self, Self::Gender)
    }
}

impl std::fmt::Display for ControlCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(self.marker()))
    }
}

/// Whether `bytes` starts with a `%B` or `%C` gender branch header
pub fn is_gender_separator(bytes: &[u8]) -> bool {
    matches!(bytes.get(..2), Some(b"%B") | Some(b"%C"))
}

/// The four segment terminators. Which one closed a segment is preserved verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminator {
    C0,
    C1,
    C2,
    C3,
}

impl Terminator {
    /// Recognize a terminator at the start of `bytes`
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        match bytes.get(..TERMINATOR_LEN)? {
            b"@c0@" => Some(Self::C0),
            b"@c1@" => Some(Self::C1),
            b"@c2@" => Some(Self::C2),
            b"@c3@" => Some(Self::C3),
            _ => None,
        }
    }

    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            Self::C0 => b"@c0@",
            Self::C1 => b"@c1@",
            Self::C2 => b"@c2@",
            Self::C3 => b"@c3@",
        }
    }
}

/// Position of the first occurrence of `needle` in `haystack`
pub fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack.windows(needle.len()).position(|window| window == needle)
}

pub fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    find_bytes(haystack, needle).is_some()
}

/// Replace every non-overlapping occurrence of `from`, scanning left to right
pub fn replace_bytes(haystack: &[u8], from: &[u8], to: &[u8]) -> Vec<u8> {
    if from.is_empty() {
        return haystack.to_vec();
    }

    let mut result = Vec::with_capacity(haystack.len());
    let mut rest = haystack;
    while let Some(pos) = find_bytes(rest, from) {
        result.extend_from_slice(&rest[..pos]);
        result.extend_from_slice(to);
        rest = &rest[pos + from.len()..];
    }
    result.extend_from_slice(rest);
    result
}

/// Render bytes for log output
pub fn preview(bytes: &[u8]) -> String {
    format!("{:?}", String::from_utf8_lossy(bytes))
}
