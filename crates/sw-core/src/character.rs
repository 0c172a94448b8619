//! The Streetwise character sheet.

use serde::{Deserialize, Serialize};

use crate::archetype::Archetype;
use crate::attribute::{Attribute, Attributes};
use crate::condition::Conditions;
use crate::skill::{Skill, Skills};
use crate::talent::{self, TalentDefinition};

/// A player character as stored in shared room state.
///
/// Field names serialize in camelCase to match the room metadata layout
/// and the import/export schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    /// Stable character id.
    pub id: String,
    /// Character name.
    pub name: String,
    /// Archetype the character was built from.
    pub archetype: Archetype,
    /// Optional gender, used to pick a silhouette portrait.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    /// Attribute ratings.
    pub attributes: Attributes,
    /// Skill ratings.
    pub skills: Skills,
    /// Held condition stages.
    #[serde(default)]
    pub conditions: Conditions,
    /// Set when the character has missed sleep.
    #[serde(default)]
    pub sleep_deprived: bool,
    /// Talent names; only names in the talent table have an effect.
    #[serde(default)]
    pub talents: Vec<String>,
    /// Appearance or personality quirks.
    #[serde(default)]
    pub quirks: Vec<String>,
    /// Backstory events.
    #[serde(default)]
    pub backstory: Vec<String>,
    /// The character's dark secret.
    #[serde(default)]
    pub dark_secret: String,
    /// Items carried.
    #[serde(default)]
    pub possessions: String,
    /// Quick session notes.
    #[serde(default)]
    pub notes: String,
    /// Longer history and background.
    #[serde(default)]
    pub extended_notes: String,
    /// Portrait URL or data URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portrait: Option<String>,
    /// Map token this character is linked to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_token_id: Option<String>,
}

impl Character {
    /// Create a blank character with all ratings at zero.
    pub fn new(id: impl Into<String>, name: impl Into<String>, archetype: Archetype) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            archetype,
            gender: None,
            attributes: Attributes::default(),
            skills: Skills::default(),
            conditions: Conditions::healthy(),
            sleep_deprived: false,
            talents: Vec::new(),
            quirks: Vec::new(),
            backstory: Vec::new(),
            dark_secret: String::new(),
            possessions: String::new(),
            notes: String::new(),
            extended_notes: String::new(),
            portrait: None,
            linked_token_id: None,
        }
    }

    /// Set an attribute rating (builder style).
    pub fn with_attribute(mut self, attribute: Attribute, value: u32) -> Self {
        self.attributes.set(attribute, value);
        self
    }

    /// Set a skill rating (builder style).
    pub fn with_skill(mut self, skill: Skill, value: u32) -> Self {
        self.skills.set(skill, value);
        self
    }

    /// Add a talent by name (builder style).
    pub fn with_talent(mut self, name: impl Into<String>) -> Self {
        self.talents.push(name.into());
        self
    }

    /// Set the condition track (builder style).
    pub fn with_conditions(mut self, conditions: Conditions) -> Self {
        self.conditions = conditions;
        self
    }

    /// The rating of an attribute.
    pub fn attribute(&self, attribute: Attribute) -> u32 {
        self.attributes.get(attribute)
    }

    /// The rating of a skill.
    pub fn skill(&self, skill: Skill) -> u32 {
        self.skills.get(skill)
    }

    /// Returns true if the character holds a talent with this name.
    pub fn has_talent(&self, name: &str) -> bool {
        self.talents.iter().any(|t| t == name)
    }

    /// Definitions for every talent the character holds that the table knows.
    pub fn known_talents(&self) -> impl Iterator<Item = (&str, &'static TalentDefinition)> {
        self.talents
            .iter()
            .filter_map(|name| talent::lookup(name).map(|def| (name.as_str(), def)))
    }

    /// A night's rest.
    ///
    /// A sleep-deprived character only shakes off the deprivation; otherwise
    /// the worst condition heals.
    pub fn long_rest(&mut self) {
        if self.sleep_deprived {
            self.sleep_deprived = false;
        } else {
            self.conditions.heal_one();
        }
    }

    /// Physick treatment heals the worst condition.
    pub fn apply_physick(&mut self) -> bool {
        self.conditions.heal_one()
    }

    /// Sheet status line, e.g. "Hurt + Sleep Deprived".
    pub fn status(&self) -> String {
        if self.sleep_deprived {
            format!("{} + Sleep Deprived", self.conditions.label())
        } else {
            self.conditions.label().to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nell() -> Character {
        Character::new("char_1", "Nell", Archetype::ArtfulDodge)
            .with_attribute(Attribute::Agility, 4)
            .with_skill(Skill::Pinch, 3)
            .with_talent("Light Fingered")
            .with_talent("Not A Real Talent")
    }

    #[test]
    fn builder_sets_ratings() {
        let c = nell();
        assert_eq!(c.attribute(Attribute::Agility), 4);
        assert_eq!(c.skill(Skill::Pinch), 3);
        assert_eq!(c.skill(Skill::Sneak), 0);
        assert!(c.has_talent("Light Fingered"));
    }

    #[test]
    fn unknown_talents_are_skipped() {
        let c = nell();
        let names: Vec<_> = c.known_talents().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["Light Fingered"]);
    }

    #[test]
    fn long_rest_clears_sleep_deprivation_first() {
        let mut c = nell().with_conditions(Conditions::at_level(2));
        c.sleep_deprived = true;
        assert_eq!(c.status(), "Hurt + Sleep Deprived");

        c.long_rest();
        assert!(!c.sleep_deprived);
        assert_eq!(c.conditions.level(), 2);

        c.long_rest();
        assert_eq!(c.conditions.level(), 1);
    }

    #[test]
    fn apply_physick_heals_one() {
        let mut c = nell().with_conditions(Conditions::at_level(1));
        assert!(c.apply_physick());
        assert!(!c.apply_physick());
    }

    #[test]
    fn serializes_camel_case() {
        let mut c = nell();
        c.dark_secret = "Owes the Peelers".to_string();
        let value = serde_json::to_value(&c).unwrap();
        assert_eq!(value["darkSecret"], "Owes the Peelers");
        assert_eq!(value["sleepDeprived"], false);
        assert_eq!(value["archetype"], "artful-dodge");
        assert!(value.get("portrait").is_none());
    }
}
