use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// The seven Streetwise character archetypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Archetype {
    /// Artful Dodge.
    #[default]
    ArtfulDodge,
    /// Brickyard Pug.
    BrickyardPug,
    /// Bright Spark.
    BrightSpark,
    /// Penny Physick.
    PennyPhysick,
    /// Gutter Fixer.
    GutterFixer,
    /// Street Nose.
    StreetNose,
    /// Card Twister.
    CardTwister,
}

impl Archetype {
    /// All archetypes.
    pub const ALL: [Self; 7] = [
        Self::ArtfulDodge,
        Self::BrickyardPug,
        Self::BrightSpark,
        Self::PennyPhysick,
        Self::GutterFixer,
        Self::StreetNose,
        Self::CardTwister,
    ];

    /// The kebab-case id used in JSON.
    pub fn id(self) -> &'static str {
        match self {
            Self::ArtfulDodge => "artful-dodge",
            Self::BrickyardPug => "brickyard-pug",
            Self::BrightSpark => "bright-spark",
            Self::PennyPhysick => "penny-physick",
            Self::GutterFixer => "gutter-fixer",
            Self::StreetNose => "street-nose",
            Self::CardTwister => "card-twister",
        }
    }

    /// The short id used by the legacy flat export format.
    pub fn legacy_id(self) -> &'static str {
        match self {
            Self::ArtfulDodge => "dodge",
            Self::BrickyardPug => "pug",
            Self::BrightSpark => "spark",
            Self::PennyPhysick => "physick",
            Self::GutterFixer => "fixer",
            Self::StreetNose => "nose",
            Self::CardTwister => "twister",
        }
    }

    /// Parse from the kebab-case id.
    pub fn parse(s: &str) -> CoreResult<Self> {
        Self::ALL
            .into_iter()
            .find(|a| a.id() == s)
            .ok_or_else(|| CoreError::UnknownArchetype(s.to_string()))
    }

    /// Parse from a legacy short id.
    pub fn from_legacy_id(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.legacy_id() == s)
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArtfulDodge => write!(f, "Artful Dodge"),
            Self::BrickyardPug => write!(f, "Brickyard Pug"),
            Self::BrightSpark => write!(f, "Bright Spark"),
            Self::PennyPhysick => write!(f, "Penny Physick"),
            Self::GutterFixer => write!(f, "Gutter Fixer"),
            Self::StreetNose => write!(f, "Street Nose"),
            Self::CardTwister => write!(f, "Card Twister"),
        }
    }
}
