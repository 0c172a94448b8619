//! Talent effects on skill rolls.
//!
//! Reads a character's talents against the talent table and works out which
//! attribute a skill roll uses, how many times it can be pushed, and how many
//! extra dice it gets. [`dice_pool`] then sizes the regular pool, including
//! the condition penalty.

use serde::Serialize;
use sw_core::talent::{self, TalentKind};
use sw_core::{Attribute, Character, Skill};

use crate::dice::RollParameters;

/// What a character's talents do to one skill roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TalentEffect {
    /// Names of the talents that changed the roll, in sheet order.
    pub active_talents: Vec<String>,
    /// The attribute the roll uses.
    pub effective_attribute: Attribute,
    /// Whether a talent replaced the skill's governing attribute.
    pub attribute_swapped: bool,
    /// Extra dice from talents.
    pub roll_modifier: i32,
    /// How many times the roll may be pushed (1 or 2).
    pub max_pushes: u32,
    /// Comma-separated summary of the effects that applied.
    pub description: String,
}

impl TalentEffect {
    fn base(attribute: Attribute) -> Self {
        Self {
            active_talents: Vec::new(),
            effective_attribute: attribute,
            attribute_swapped: false,
            roll_modifier: 0,
            max_pushes: 1,
            description: String::new(),
        }
    }

    /// Returns true if no talent applied.
    pub fn is_empty(&self) -> bool {
        self.active_talents.is_empty()
    }
}

/// Work out the talent effects for a roll of `skill`.
///
/// An attribute swap applies only when the replacement attribute is strictly
/// higher than the governing one. A double push applies when the talent
/// names the skill or the skill's governing attribute. Roll modifiers stack.
pub fn resolve(character: &Character, skill: Skill) -> TalentEffect {
    let base = skill.attribute();
    let mut effect = TalentEffect::base(base);

    for (name, definition) in character.known_talents() {
        let mechanics = &definition.mechanics;
        match mechanics.kind {
            TalentKind::AttributeSwap if mechanics.skill == Some(skill) => {
                let Some(replacement) = mechanics.attribute_to else {
                    continue;
                };
                if character.attribute(replacement) > character.attribute(base) {
                    effect.effective_attribute = replacement;
                    effect.attribute_swapped = true;
                    effect.active_talents.push(name.to_string());
                }
            }
            TalentKind::DoublePush
                if mechanics.skill == Some(skill) || mechanics.attribute_from == Some(base) =>
            {
                effect.max_pushes = 2;
                effect.active_talents.push(name.to_string());
            }
            TalentKind::RollModification if mechanics.skill == Some(skill) => {
                effect.roll_modifier += 1;
                effect.active_talents.push(name.to_string());
            }
            _ => {}
        }
    }

    if !effect.is_empty() {
        let mut parts = Vec::new();
        if effect.attribute_swapped {
            parts.push(format!(
                "Using {} instead of {base}",
                effect.effective_attribute
            ));
        }
        if effect.max_pushes > 1 {
            parts.push("Can push twice".to_string());
        }
        if effect.roll_modifier > 0 {
            parts.push(format!("+{} dice", effect.roll_modifier));
        }
        effect.description = parts.join(", ");
    }

    effect
}

/// Returns true if the character may push a roll of `skill` twice.
pub fn can_push_twice(character: &Character, skill: Skill) -> bool {
    resolve(character, skill).max_pushes > 1
}

/// The attribute rating a roll of `skill` uses after talent swaps.
pub fn effective_attribute_value(character: &Character, skill: Skill) -> u32 {
    character.attribute(resolve(character, skill).effective_attribute)
}

/// How a regular dice pool was sized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolBreakdown {
    /// Regular dice, never below 1.
    pub total: u32,
    /// Rating of the effective attribute.
    pub attribute: u32,
    /// Skill rating, 0 for a raw attribute roll.
    pub skill: u32,
    /// Situational modifier supplied by the caller.
    pub modifier: i32,
    /// Extra dice from talents.
    pub talent_modifier: i32,
    /// Dice lost to held conditions, one per stage.
    pub condition_penalty: u32,
    /// The attribute the roll uses.
    pub effective_attribute: Attribute,
}

impl PoolBreakdown {
    fn new(
        attribute: Attribute,
        attribute_value: u32,
        skill: u32,
        modifier: i32,
        talent_modifier: i32,
        condition_penalty: u32,
    ) -> Self {
        let raw = i64::from(attribute_value) + i64::from(skill) + i64::from(modifier)
            + i64::from(talent_modifier)
            - i64::from(condition_penalty);
        Self {
            total: u32::try_from(raw.max(1)).unwrap_or(u32::MAX),
            attribute: attribute_value,
            skill,
            modifier,
            talent_modifier,
            condition_penalty,
            effective_attribute: attribute,
        }
    }

    /// Net modifier on top of attribute plus skill.
    pub fn net_modifier(&self) -> i32 {
        let penalty = i32::try_from(self.condition_penalty).unwrap_or(i32::MAX);
        self.modifier + self.talent_modifier - penalty
    }

    /// Roll parameters for this pool with `bonus_dice` extra (for example
    /// assistance) and the current scene strain.
    pub fn parameters(&self, bonus_dice: u32, strain_points: u32) -> RollParameters {
        let bonus = i32::try_from(bonus_dice).unwrap_or(i32::MAX);
        RollParameters::new(self.attribute, self.skill)
            .with_modifier(self.net_modifier().saturating_add(bonus))
            .with_strain(strain_points)
    }
}

/// Size the regular pool for a skill roll.
///
/// `total = max(1, attribute + skill + extra_modifier + talent_modifier - condition_penalty)`,
/// where the attribute is the one talents select.
pub fn dice_pool(character: &Character, skill: Skill, extra_modifier: i32) -> PoolBreakdown {
    let effect = resolve(character, skill);
    PoolBreakdown::new(
        effect.effective_attribute,
        character.attribute(effect.effective_attribute),
        character.skill(skill),
        extra_modifier,
        effect.roll_modifier,
        character.conditions.penalty(),
    )
}

/// Size the regular pool for a raw attribute roll. Talents do not apply.
pub fn attribute_pool(character: &Character, attribute: Attribute, modifier: i32) -> PoolBreakdown {
    PoolBreakdown::new(
        attribute,
        character.attribute(attribute),
        0,
        modifier,
        0,
        character.conditions.penalty(),
    )
}

/// Talent names from the table that affect rolls of `skill`, for display.
pub fn talents_for_skill(skill: Skill) -> Vec<&'static str> {
    talent::TALENTS
        .iter()
        .filter(|t| t.mechanics.kind.affects_rolls())
        .filter(|t| {
            let by_attribute = t.mechanics.kind == TalentKind::DoublePush
                && t.mechanics.attribute_from == Some(skill.attribute());
            t.mechanics.skill == Some(skill) || by_attribute
        })
        .map(|t| t.name)
        .collect()
}
