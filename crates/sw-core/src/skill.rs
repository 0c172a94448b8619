use std::fmt;

use serde::{Deserialize, Serialize};

use crate::attribute::{Attribute, MAX_RATING};
use crate::error::{CoreError, CoreResult};

/// One of the eleven Streetwise skills. Each skill is governed by one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Skill {
    /// Lockpicking, breaking in, petty theft.
    Burgle,
    /// Puzzles, reasoning, connecting dots.
    Deduce,
    /// Deception, distraction, lying.
    Hoodwink,
    /// Spotting clues and hidden threats.
    Notice,
    /// First aid and healing.
    Physick,
    /// Pickpocketing and sleight of hand.
    Pinch,
    /// Running, climbing, exertion.
    Scramble,
    /// Fighting and brawling.
    Scrap,
    /// Moving silently and hiding.
    Sneak,
    /// Knowing the streets and the right contacts.
    Streetwise,
    /// Fixing, breaking, and understanding machinery.
    Tinker,
}

impl Skill {
    /// All skills in sheet order.
    pub const ALL: [Self; 11] = [
        Self::Burgle,
        Self::Deduce,
        Self::Hoodwink,
        Self::Notice,
        Self::Physick,
        Self::Pinch,
        Self::Scramble,
        Self::Scrap,
        Self::Sneak,
        Self::Streetwise,
        Self::Tinker,
    ];

    /// The lowercase id used in JSON, talent definitions, and metadata.
    pub fn id(self) -> &'static str {
        match self {
            Self::Burgle => "burgle",
            Self::Deduce => "deduce",
            Self::Hoodwink => "hoodwink",
            Self::Notice => "notice",
            Self::Physick => "physick",
            Self::Pinch => "pinch",
            Self::Scramble => "scramble",
            Self::Scrap => "scrap",
            Self::Sneak => "sneak",
            Self::Streetwise => "streetwise",
            Self::Tinker => "tinker",
        }
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Burgle => "Burgle",
            Self::Deduce => "Deduce",
            Self::Hoodwink => "Hoodwink",
            Self::Notice => "Notice",
            Self::Physick => "Physick",
            Self::Pinch => "Pinch",
            Self::Scramble => "Scramble",
            Self::Scrap => "Scrap",
            Self::Sneak => "Sneak",
            Self::Streetwise => "Streetwise",
            Self::Tinker => "Tinker",
        }
    }

    /// The attribute this skill is rolled with.
    pub fn attribute(self) -> Attribute {
        match self {
            Self::Burgle
            | Self::Deduce
            | Self::Notice
            | Self::Streetwise
            | Self::Tinker => Attribute::Wits,
            Self::Hoodwink | Self::Physick => Attribute::Empathy,
            Self::Pinch | Self::Scramble | Self::Sneak => Attribute::Agility,
            Self::Scrap => Attribute::Strength,
        }
    }

    /// A one-line summary of what the skill covers.
    pub fn description(self) -> &'static str {
        match self {
            Self::Burgle => "Lockpicking, sneaking into buildings, petty theft",
            Self::Deduce => "Solving puzzles, reasoning, connecting dots",
            Self::Hoodwink => "Deception, distraction, and lying",
            Self::Notice => "Spotting clues, details, or hidden threats",
            Self::Physick => "Physical healing and first aid",
            Self::Pinch => "Pickpocketing, sleight of hand, swiping things",
            Self::Scramble => "Running, climbing, physical exertion",
            Self::Scrap => "Fighting and brawling",
            Self::Sneak => "Moving silently and hiding",
            Self::Streetwise => "Navigating the streets, knowing the right contacts",
            Self::Tinker => "Fixing, breaking, understanding machinery",
        }
    }

    /// Parse a skill from its id (case-insensitive).
    pub fn parse(s: &str) -> CoreResult<Self> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|skill| skill.id() == lower)
            .ok_or_else(|| CoreError::UnknownSkill(s.to_string()))
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A character's eleven skill ratings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Skills {
    /// Burgle rating.
    pub burgle: u32,
    /// Deduce rating.
    pub deduce: u32,
    /// Hoodwink rating.
    pub hoodwink: u32,
    /// Notice rating.
    pub notice: u32,
    /// Physick rating.
    pub physick: u32,
    /// Pinch rating.
    pub pinch: u32,
    /// Scramble rating.
    pub scramble: u32,
    /// Scrap rating.
    pub scrap: u32,
    /// Sneak rating.
    pub sneak: u32,
    /// Streetwise rating.
    pub streetwise: u32,
    /// Tinker rating.
    pub tinker: u32,
}

impl Skills {
    /// The rating for one skill.
    pub fn get(&self, skill: Skill) -> u32 {
        match skill {
            Skill::Burgle => self.burgle,
            Skill::Deduce => self.deduce,
            Skill::Hoodwink => self.hoodwink,
            Skill::Notice => self.notice,
            Skill::Physick => self.physick,
            Skill::Pinch => self.pinch,
            Skill::Scramble => self.scramble,
            Skill::Scrap => self.scrap,
            Skill::Sneak => self.sneak,
            Skill::Streetwise => self.streetwise,
            Skill::Tinker => self.tinker,
        }
    }

    /// Set one skill, clamped to 0-10.
    pub fn set(&mut self, skill: Skill, value: u32) {
        let value = value.min(MAX_RATING);
        let slot = match skill {
            Skill::Burgle => &mut self.burgle,
            Skill::Deduce => &mut self.deduce,
            Skill::Hoodwink => &mut self.hoodwink,
            Skill::Notice => &mut self.notice,
            Skill::Physick => &mut self.physick,
            Skill::Pinch => &mut self.pinch,
            Skill::Scramble => &mut self.scramble,
            Skill::Scrap => &mut self.scrap,
            Skill::Sneak => &mut self.sneak,
            Skill::Streetwise => &mut self.streetwise,
            Skill::Tinker => &mut self.tinker,
        };
        *slot = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn governing_attributes() {
        assert_eq!(Skill::Hoodwink.attribute(), Attribute::Empathy);
        assert_eq!(Skill::Notice.attribute(), Attribute::Wits);
        assert_eq!(Skill::Pinch.attribute(), Attribute::Agility);
        assert_eq!(Skill::Scrap.attribute(), Attribute::Strength);
    }

    #[test]
    fn every_skill_round_trips_through_its_id() {
        for skill in Skill::ALL {
            assert_eq!(Skill::parse(skill.id()).unwrap(), skill);
        }
    }

    #[test]
    fn parse_unknown_skill() {
        assert!(matches!(
            Skill::parse("juggle"),
            Err(CoreError::UnknownSkill(s)) if s == "juggle"
        ));
    }

    #[test]
    fn set_clamps() {
        let mut skills = Skills::default();
        skills.set(Skill::Sneak, 3);
        skills.set(Skill::Tinker, 15);
        assert_eq!(skills.get(Skill::Sneak), 3);
        assert_eq!(skills.get(Skill::Tinker), 10);
        assert_eq!(skills.get(Skill::Burgle), 0);
    }
}
