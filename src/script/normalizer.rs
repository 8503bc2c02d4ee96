/*!
 * Text fixups applied once every control block in a segment is resolved.
 *
 * The target font has no glyphs for typographic punctuation and renders
 * them as "%", so they are mapped to ASCII. The grammar patches repair
 * phrases that the neutral pronoun rewrite leaves ungrammatical.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::bytes::{Captures, NoExpand, Regex};

use crate::script::markers::{preview, HERO_PLACEHOLDER, NOOP_MARKER};
use crate::script::policy::ResolutionPolicy;

/// Glyphs the font cannot render and their replacements
const GLYPH_TABLE: &[(&str, &str)] = &[
    ("\u{2014}", "-"),
    ("\u{2018}", "\""),
    ("\u{2019}", "\""),
    ("\u{3221}", ""),
    ("\u{24C6}", ""),
    ("\u{24C7}", ""),
    ("\u{24D5}", ""),
    ("\u{24D6}", ""),
    ("\u{24D7}", ""),
    ("\u{24D8}", ""),
    ("\u{24D9}", ""),
    ("\u{266A}", "~"),
];

/// Grammar patches, applied in order
const GRAMMAR_TABLE: &[(&str, &str)] = &[
    ("they's", "they are"),
    ("weve ", "we've"),
    ("Weve ", "We've"),
    ("What luck!", "Found"),
    ("they cares", "they care"),
];

/// Regex matching exactly `literal`
fn literal_regex(literal: &[u8]) -> Regex {
    Regex::new(&regex::escape(&String::from_utf8_lossy(literal))).expect("Invalid literal regex")
}

/// `%0` markers
static NOOP_REGEX: Lazy<Regex> = Lazy::new(|| literal_regex(NOOP_MARKER));

/// Hero-name placeholder
static HERO_REGEX: Lazy<Regex> = Lazy::new(|| literal_regex(HERO_PLACEHOLDER));

/// Single alternation over every glyph in the table
static GLYPH_REGEX: Lazy<Regex> = Lazy::new(|| {
    let alternation = GLYPH_TABLE
        .iter()
        .map(|(glyph, _)| regex::escape(glyph))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&alternation).expect("Invalid glyph regex")
});

/// Literal grammar patterns
static GRAMMAR_PATTERNS: Lazy<Vec<(Regex, &'static [u8])>> = Lazy::new(|| {
    GRAMMAR_TABLE
        .iter()
        .map(|(from, to)| (literal_regex(from.as_bytes()), to.as_bytes()))
        .collect()
});

/// Run every normalization step on a decoded segment
pub fn normalize(segment: &[u8], file_id: &str, policy: &ResolutionPolicy) -> Vec<u8> {
    let mut normalized = strip_noop_markers(segment);
    normalized = substitute_glyphs(&normalized);
    normalized = fix_grammar(&normalized);

    if let Some(name) = policy.hero_name_bytes() {
        normalized = inject_hero_name(&normalized, name);
    }

    if normalized.as_slice() != segment {
        debug!("{}: normalized {} -> {}", file_id, preview(segment), preview(&normalized));
    }

    normalized
}

/// Remove every `%0` marker
pub fn strip_noop_markers(segment: &[u8]) -> Vec<u8> {
    NOOP_REGEX.replace_all(segment, NoExpand(b"")).into_owned()
}

/// Map unsupported glyphs to ASCII, or drop them
pub fn substitute_glyphs(segment: &[u8]) -> Vec<u8> {
    GLYPH_REGEX
        .replace_all(segment, |caps: &Captures| glyph_replacement(&caps[0]))
        .into_owned()
}

fn glyph_replacement(glyph: &[u8]) -> &'static [u8] {
    GLYPH_TABLE
        .iter()
        .find(|(candidate, _)| candidate.as_bytes() == glyph)
        .map(|(_, replacement)| replacement.as_bytes())
        .unwrap_or_default()
}

/// Apply the grammar patch table
pub fn fix_grammar(segment: &[u8]) -> Vec<u8> {
    GRAMMAR_PATTERNS
        .iter()
        .fold(segment.to_vec(), |text, (pattern, replacement)| {
            pattern.replace_all(&text, NoExpand(*replacement)).into_owned()
        })
}

/// Replace the hero-name placeholder with the name itself
pub fn inject_hero_name(segment: &[u8], name: &[u8]) -> Vec<u8> {
    HERO_REGEX.replace_all(segment, NoExpand(name)).into_owned()
}
