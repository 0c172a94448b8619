use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Highest value an attribute or skill may hold.
pub const MAX_RATING: u32 = 10;

/// One of the four Streetwise attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attribute {
    /// Physical power and toughness.
    Strength,
    /// Speed, balance, and nimble fingers.
    Agility,
    /// Reasoning and perception.
    Wits,
    /// Charm, intuition, and care for others.
    Empathy,
}

impl Attribute {
    /// All attributes in sheet order.
    pub const ALL: [Self; 4] = [Self::Strength, Self::Agility, Self::Wits, Self::Empathy];

    /// The lowercase id used in JSON and room metadata.
    pub fn id(self) -> &'static str {
        match self {
            Self::Strength => "strength",
            Self::Agility => "agility",
            Self::Wits => "wits",
            Self::Empathy => "empathy",
        }
    }

    /// Parse an attribute from its id (case-insensitive).
    pub fn parse(s: &str) -> CoreResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "strength" => Ok(Self::Strength),
            "agility" => Ok(Self::Agility),
            "wits" => Ok(Self::Wits),
            "empathy" => Ok(Self::Empathy),
            _ => Err(CoreError::UnknownAttribute(s.to_string())),
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strength => write!(f, "Strength"),
            Self::Agility => write!(f, "Agility"),
            Self::Wits => write!(f, "Wits"),
            Self::Empathy => write!(f, "Empathy"),
        }
    }
}

/// A character's four attribute ratings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Attributes {
    /// Strength rating.
    pub strength: u32,
    /// Agility rating.
    pub agility: u32,
    /// Wits rating.
    pub wits: u32,
    /// Empathy rating.
    pub empathy: u32,
}

impl Attributes {
    /// Build an attribute block, clamping every rating to 0-10.
    pub fn new(strength: u32, agility: u32, wits: u32, empathy: u32) -> Self {
        Self {
            strength: strength.min(MAX_RATING),
            agility: agility.min(MAX_RATING),
            wits: wits.min(MAX_RATING),
            empathy: empathy.min(MAX_RATING),
        }
    }

    /// The rating for one attribute.
    pub fn get(&self, attribute: Attribute) -> u32 {
        match attribute {
            Attribute::Strength => self.strength,
            Attribute::Agility => self.agility,
            Attribute::Wits => self.wits,
            Attribute::Empathy => self.empathy,
        }
    }

    /// Set one attribute, clamped to 0-10.
    pub fn set(&mut self, attribute: Attribute, value: u32) {
        let value = value.min(MAX_RATING);
        match attribute {
            Attribute::Strength => self.strength = value,
            Attribute::Agility => self.agility = value,
            Attribute::Wits => self.wits = value,
            Attribute::Empathy => self.empathy = value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Attribute::parse("Wits").unwrap(), Attribute::Wits);
        assert_eq!(Attribute::parse(" empathy ").unwrap(), Attribute::Empathy);
        assert!(Attribute::parse("luck").is_err());
    }

    #[test]
    fn new_clamps_ratings() {
        let attrs = Attributes::new(12, 3, 0, 10);
        assert_eq!(attrs.strength, 10);
        assert_eq!(attrs.agility, 3);
    }

    #[test]
    fn get_and_set() {
        let mut attrs = Attributes::default();
        attrs.set(Attribute::Empathy, 4);
        attrs.set(Attribute::Wits, 99);
        assert_eq!(attrs.get(Attribute::Empathy), 4);
        assert_eq!(attrs.get(Attribute::Wits), 10);
        assert_eq!(attrs.get(Attribute::Strength), 0);
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&Attribute::Agility).unwrap();
        assert_eq!(json, "\"agility\"");
    }
}
