/*!
 * Variant selection for decoded control blocks.
 *
 * Primary codes always pick a fixed option. Gender blocks follow the run's
 * gender mode; in neutral mode the first (masculine) option is looked up in
 * ordered rule tables and rewritten to a neutral term. Unknown terms fall
 * back to the first option with a warning instead of failing the file.
 */

use log::warn;

use crate::errors::ScriptError;
use crate::script::markers::{contains_bytes, preview, ControlCode};
use crate::script::policy::{GenderMode, ResolutionPolicy};

/// Which option a primary control code keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantChoice {
    /// The last option present
    Last,
    /// A fixed zero-based index
    Index(usize),
}

/// Option kept by each primary code
const FIXED_CHOICES: [(ControlCode, VariantChoice); 5] = [
    // %X<singular>%Y<plural>%Z, keep the plural
    (ControlCode::Plural, VariantChoice::Last),
    // %X<plural>%Y<singular>%Z, keep the singular
    (ControlCode::Singular, VariantChoice::Last),
    // the other-party-member wording reads correctly in more places
    (ControlCode::PartyMember, VariantChoice::Index(1)),
    (ControlCode::Sisters, VariantChoice::Index(1)),
    // %D120%Xyourself%Yyourselves%Z
    (ControlCode::Reflexive, VariantChoice::Index(1)),
];

/// Exact masculine terms and their neutral replacements
const NEUTRAL_LEXICON: &[(&[u8], &[u8])] = &[
    (b"his", b"their"),
    (b"he", b"they"),
    (b"man", b"person"),
    (b"him", b"them"),
    (b"himself", b"themself"),
    (b"feen", b"person"),
    (b"laddie", b"child"),
    (b"gent", b"one"),
    (b"monsieur", b"friend"),
    (b"son", b"young one"),
    (b"o mighty hero", b"o mighty warrior"),
];

/// Substrings checked after the lexicon, in order
const NEUTRAL_FRAGMENTS: &[(&[u8], &[u8])] = &[
    (b"guy", b"person"),
    (b"sir", b"friend"),
    (b"boy", b"young one"),
];

/// hero/heroine pairs
const HERO_FRAGMENT: &[u8] = b"ero";
const HEROINE_FRAGMENT: &[u8] = b"eroine";
const HERO_NEUTRAL: &[u8] = b"warrior";

/// Separator used when every gender branch is shown
const BOTH_SEPARATOR: &[u8] = b"/";

/// Fixed choice for a primary code, `None` for gender blocks
pub fn fixed_choice(code: ControlCode) -> Option<VariantChoice> {
    FIXED_CHOICES
        .iter()
        .find(|(candidate, _)| *candidate == code)
        .map(|(_, choice)| *choice)
}

/// Pick the replacement for a decoded control block
pub fn resolve(
    code: ControlCode,
    options: &[Vec<u8>],
    policy: &ResolutionPolicy,
) -> Result<Vec<u8>, ScriptError> {
    match fixed_choice(code) {
        Some(choice) => select_fixed(code, choice, options),
        None => resolve_gender(options, policy.gender_mode()),
    }
}

fn select_fixed(
    code: ControlCode,
    choice: VariantChoice,
    options: &[Vec<u8>],
) -> Result<Vec<u8>, ScriptError> {
    let index = match choice {
        VariantChoice::Last => options.len().saturating_sub(1),
        VariantChoice::Index(index) => index,
    };

    options
        .get(index)
        .cloned()
        .ok_or_else(|| ScriptError::MissingVariant {
            code: code.to_string(),
            index,
            available: options.len(),
        })
}

/// Resolve a gender block under the given mode
pub fn resolve_gender(options: &[Vec<u8>], mode: GenderMode) -> Result<Vec<u8>, ScriptError> {
    let first = options.first().ok_or(ScriptError::EmptyGenderBlock)?;

    let resolved = match mode {
        GenderMode::Both => options.join(BOTH_SEPARATOR),
        GenderMode::Masculine => first.clone(),
        GenderMode::Feminine => options.get(1).unwrap_or(first).clone(),
        GenderMode::Neutral => {
            if options.len() == 1 {
                warn!("Gender block has only one choice: {}", preview(first));
                first.clone()
            } else if let Some(neutral) = neutralize(options) {
                neutral.to_vec()
            } else {
                warn!(
                    "Unhandled gender replacement, falling back to first: {}",
                    preview(first)
                );
                first.clone()
            }
        }
    };

    Ok(resolved)
}

/// Neutral rewrite for a gender block with at least one option
pub fn neutralize(options: &[Vec<u8>]) -> Option<&'static [u8]> {
    let first = options.first()?.as_slice();

    if let Some((_, neutral)) = NEUTRAL_LEXICON.iter().find(|(term, _)| *term == first) {
        return Some(*neutral);
    }

    if let Some((_, neutral)) = NEUTRAL_FRAGMENTS
        .iter()
        .find(|(fragment, _)| contains_bytes(first, fragment))
    {
        return Some(*neutral);
    }

    let second = options.get(1).map(Vec::as_slice).unwrap_or_default();
    if contains_bytes(first, HERO_FRAGMENT) && contains_bytes(second, HEROINE_FRAGMENT) {
        return Some(HERO_NEUTRAL);
    }

    None
}
