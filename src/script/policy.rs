use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::{ConfigError, MAX_HERO_NAME_LEN};

/// How `%A` gender blocks are resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenderMode {
    // @mode: Rule-based rewrite to gender-neutral wording
    #[default]
    #[serde(alias = "n")]
    Neutral,
    // @mode: First (masculine) branch
    #[serde(alias = "m")]
    Masculine,
    // @mode: Second (feminine) branch when present
    #[serde(alias = "f")]
    Feminine,
    // @mode: Every branch joined with '/'
    #[serde(alias = "b")]
    Both,
}

impl GenderMode {
    // @returns: Single-letter code used in output names
    pub fn code(&self) -> &'static str {
        match self {
            Self::Neutral => "n",
            Self::Masculine => "m",
            Self::Feminine => "f",
            Self::Both => "b",
        }
    }
}

impl std::fmt::Display for GenderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Neutral => "neutral",
            Self::Masculine => "masculine",
            Self::Feminine => "feminine",
            Self::Both => "both",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for GenderMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "n" | "neutral" => Ok(Self::Neutral),
            "m" | "masculine" => Ok(Self::Masculine),
            "f" | "feminine" => Ok(Self::Feminine),
            "b" | "both" => Ok(Self::Both),
            _ => Err(ConfigError::InvalidGenderMode(s.to_string())),
        }
    }
}

/// Where the speaker's name is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LocaleMode {
    // @mode: English ROM layout, name shown in a separate nametag
    #[default]
    #[serde(rename = "en")]
    NametagExternal,
    // @mode: Japanese ROM layout, name embedded as "Name*text"
    #[serde(rename = "ja")]
    NameEmbedded,
}

impl LocaleMode {
    // @returns: Language directory used by the ROM
    pub fn code(&self) -> &'static str {
        match self {
            Self::NametagExternal => "en",
            Self::NameEmbedded => "ja",
        }
    }
}

impl std::fmt::Display for LocaleMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for LocaleMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "en" => Ok(Self::NametagExternal),
            "ja" => Ok(Self::NameEmbedded),
            _ => Err(ConfigError::InvalidLocaleMode(s.to_string())),
        }
    }
}

/// Run-wide settings threaded through every stage of the transformation.
///
/// Built once from validated configuration and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolutionPolicy {
    gender_mode: GenderMode,
    hero_name: String,
    locale_mode: LocaleMode,
}

impl ResolutionPolicy {
    /// Create a policy, rejecting hero names that do not fit the name slot
    pub fn new(
        gender_mode: GenderMode,
        hero_name: impl Into<String>,
        locale_mode: LocaleMode,
    ) -> Result<Self, ConfigError> {
        let hero_name = hero_name.into();

        if hero_name.chars().count() > MAX_HERO_NAME_LEN {
            return Err(ConfigError::HeroNameTooLong {
                name: hero_name,
                max: MAX_HERO_NAME_LEN,
            });
        }
        if !hero_name.is_ascii() {
            return Err(ConfigError::HeroNameNotAscii(hero_name));
        }

        Ok(Self {
            gender_mode,
            hero_name,
            locale_mode,
        })
    }

    pub fn gender_mode(&self) -> GenderMode {
        self.gender_mode
    }

    pub fn hero_name(&self) -> &str {
        &self.hero_name
    }

    pub fn locale_mode(&self) -> LocaleMode {
        self.locale_mode
    }

    /// Hero name bytes, if a name was supplied
    pub fn hero_name_bytes(&self) -> Option<&[u8]> {
        if self.hero_name.is_empty() {
            None
        } else {
            Some(self.hero_name.as_bytes())
        }
    }
}
